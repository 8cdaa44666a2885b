//! Fréchet mean objective and its per-model analytic gradients.
//!
//! ```text
//! F(ψ; X) = (1/|X|) · Σᵢ d(ψ, xᵢ)²
//! ```
//!
//! The objective is evaluated generically through the manifold's distance,
//! but the gradient is not differentiated generically: each model supplies a
//! closed form for ∇ Σ d² (arccosh chain rule on the ball, Minkowski chain
//! rule with a last-coordinate sign flip on the hyperboloid), scaled by
//! 2/|X| and converted to a Riemannian gradient via `egrad_to_rgrad`.
//!
//! A sample point exactly coincident with ψ makes the closed forms evaluate
//! 0/0 and the gradient comes back NaN. That is intentional: the drivers
//! detect non-finite gradients and terminate the run instead of propagating
//! garbage.

use karcher_manifold::{dot, Hyperboloid, Manifold, PoincareBall};

/// Mean squared geodesic distance from `psi` to every sample point.
pub fn frechet_objective<M: Manifold>(manifold: &M, psi: &[f64], sample: &[Vec<f64>]) -> f64 {
    let sum: f64 = sample
        .iter()
        .map(|x| {
            let d = manifold.distance(psi, x);
            d * d
        })
        .sum();
    sum / sample.len() as f64
}

// ─────────────────────────────────────────────
// Poincaré ball gradient
// ─────────────────────────────────────────────

/// Euclidean gradient of d(x, ·)² summand at `x` toward `y`, ball model.
///
/// ```text
/// ∇d(x,y) = 4/(b·√(c²−1)) · [((⟨y,y⟩ − 2⟨x,y⟩ + 1)/a²)·x − y/a]
/// a = 1−⟨x,x⟩,  b = 1−⟨y,y⟩,  c = 1 + 2⟨x−y,x−y⟩/(ab)
/// ```
///
/// Evaluates to NaN when x = y (the 0/0 at the cut point of √(c²−1)).
fn ball_distance_grad(x: &[f64], y: &[f64]) -> Vec<f64> {
    let a = 1.0 - dot(x, x);
    let b = 1.0 - dot(y, y);
    let diff_sq: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - yi) * (xi - yi))
        .sum();
    let c = 1.0 + 2.0 * diff_sq / (a * b);

    let factor = 4.0 / (b * (c * c - 1.0).sqrt());
    let coeff_x = (dot(y, y) - 2.0 * dot(x, y) + 1.0) / (a * a);

    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| factor * (coeff_x * xi - yi / a))
        .collect()
}

/// Euclidean gradient of the Fréchet objective on the ball:
/// `(2/|X|) · Σᵢ d(ψ,xᵢ)·∇d(ψ,xᵢ)`.
pub fn ball_frechet_egrad(ball: &PoincareBall, psi: &[f64], sample: &[Vec<f64>]) -> Vec<f64> {
    let mut acc = vec![0.0; psi.len()];
    for x in sample {
        let d = ball.distance(psi, x);
        let g = ball_distance_grad(psi, x);
        for (a, gi) in acc.iter_mut().zip(g.iter()) {
            *a += d * gi;
        }
    }
    let scale = 2.0 / sample.len() as f64;
    for a in acc.iter_mut() {
        *a *= scale;
    }
    acc
}

/// Riemannian gradient of the Fréchet objective on the ball.
pub fn ball_frechet_rgrad(ball: &PoincareBall, psi: &[f64], sample: &[Vec<f64>]) -> Vec<f64> {
    let egrad = ball_frechet_egrad(ball, psi, sample);
    ball.egrad_to_rgrad(psi, &egrad)
}

// ─────────────────────────────────────────────
// Hyperboloid gradient
// ─────────────────────────────────────────────

/// Euclidean gradient of the Fréchet objective on the hyperboloid:
/// `(2/|X|) · Σᵢ −d(θ,xᵢ)·(⟨θ,xᵢ⟩_M² − 1)^(−1/2)·x̃ᵢ`, where x̃ᵢ is xᵢ with
/// its last coordinate negated.
pub fn hyperboloid_frechet_egrad(
    hyp: &Hyperboloid,
    theta: &[f64],
    sample: &[Vec<f64>],
) -> Vec<f64> {
    let n = theta.len() - 1;
    let mut acc = vec![0.0; theta.len()];
    for x in sample {
        let mdot = hyp.minkowski_dot(theta, x);
        let d = hyp.distance(theta, x);
        // NaN at mdot² = 1, i.e. x = θ — callers detect and stop
        let coeff = -d / (mdot * mdot - 1.0).sqrt();
        for (i, a) in acc.iter_mut().enumerate() {
            let xi = if i == n { -x[i] } else { x[i] };
            *a += coeff * xi;
        }
    }
    let scale = 2.0 / sample.len() as f64;
    for a in acc.iter_mut() {
        *a *= scale;
    }
    acc
}

/// Riemannian gradient of the Fréchet objective on the hyperboloid.
pub fn hyperboloid_frechet_rgrad(
    hyp: &Hyperboloid,
    theta: &[f64],
    sample: &[Vec<f64>],
) -> Vec<f64> {
    let egrad = hyperboloid_frechet_egrad(hyp, theta, sample);
    hyp.egrad_to_rgrad(theta, &egrad)
}
