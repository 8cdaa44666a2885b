//! Strong Wolfe line search along a geodesic ray.
//!
//! The one-dimensional restriction of the objective is
//!
//! ```text
//! φ(α)  = F(exp_x(α·d))
//! φ'(α) = ⟨ grad F(exp_x(α·d)), T_{x → exp_x(α·d)}(d) ⟩
//! ```
//!
//! and the search accepts α satisfying both
//!
//! ```text
//! φ(α)  ≤ φ(0) + c₁·α·φ'(0)        (sufficient decrease)
//! |φ'(α)| ≤ c₂·|φ'(0)|             (curvature)
//! ```
//!
//! The bracketing phase grows α toward `alpha_max`; zoom bisects the
//! bracket. A zoom that hits its budget returns the current midpoint, which
//! at that depth satisfies sufficient decrease even if the curvature bound
//! is unresolved. Any non-finite evaluation aborts the search with `None`.

use karcher_manifold::{all_finite, scale, Manifold};
use serde::{Deserialize, Serialize};

use crate::error::OptError;
use crate::objective::frechet_objective;

/// Hyperparameters for [`strong_wolfe`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WolfeParams {
    /// Sufficient-decrease constant c₁.
    pub c1: f64,
    /// Curvature constant c₂, with c₁ < c₂ < 1.
    pub c2: f64,
    /// First trial step.
    pub alpha_init: f64,
    /// Upper bound on the trial step.
    pub alpha_max: f64,
    /// Bracketing iterations before giving up.
    pub max_brackets: u32,
    /// Zoom bisections before returning the midpoint best-effort.
    pub max_zooms: u32,
}

impl Default for WolfeParams {
    fn default() -> Self {
        Self {
            c1: 1e-4,
            c2: 0.9,
            alpha_init: 1.0,
            alpha_max: 16.0,
            max_brackets: 16,
            max_zooms: 32,
        }
    }
}

impl WolfeParams {
    pub fn validate(&self) -> Result<(), OptError> {
        if !(self.c1 > 0.0 && self.c1 < 1.0) {
            return Err(OptError::InvalidHyperparameter {
                name: "c1",
                value: self.c1,
            });
        }
        if !(self.c2 > self.c1 && self.c2 < 1.0) {
            return Err(OptError::InvalidHyperparameter {
                name: "c2",
                value: self.c2,
            });
        }
        if !(self.alpha_init > 0.0 && self.alpha_init <= self.alpha_max) {
            return Err(OptError::InvalidHyperparameter {
                name: "alpha_init",
                value: self.alpha_init,
            });
        }
        Ok(())
    }
}

struct RayEval {
    f: f64,
    dphi: f64,
}

/// Find a step length along `direction` satisfying the strong Wolfe
/// conditions. `f0` and `slope0` are φ(0) and φ'(0); `slope0` must be
/// negative for the search to make sense. Returns `None` when the direction
/// is not a descent direction, when any evaluation goes non-finite, or when
/// bracketing fails to find an interval.
pub fn strong_wolfe<M, G>(
    manifold: &M,
    gradient: &G,
    x: &[f64],
    direction: &[f64],
    sample: &[Vec<f64>],
    f0: f64,
    slope0: f64,
    params: &WolfeParams,
) -> Option<f64>
where
    M: Manifold,
    G: Fn(&[f64], &[Vec<f64>]) -> Vec<f64>,
{
    if !(slope0 < 0.0) || !f0.is_finite() {
        return None;
    }

    let eval = |alpha: f64| -> Option<RayEval> {
        let p = manifold.exp_map(x, &scale(alpha, direction));
        let f = frechet_objective(manifold, &p, sample);
        let g = gradient(&p, sample);
        if !f.is_finite() || !all_finite(&g) {
            return None;
        }
        let d_t = manifold.parallel_transport(x, &p, direction);
        let dphi = manifold.inner(&p, &g, &d_t);
        Some(RayEval { f, dphi })
    };

    let sufficient = |alpha: f64, f: f64| f <= f0 + params.c1 * alpha * slope0;

    let zoom = |mut lo: f64, mut f_lo: f64, mut hi: f64| -> Option<f64> {
        let mut mid = 0.5 * (lo + hi);
        for _ in 0..params.max_zooms {
            mid = 0.5 * (lo + hi);
            let e = eval(mid)?;
            if !sufficient(mid, e.f) || e.f >= f_lo {
                hi = mid;
            } else {
                if e.dphi.abs() <= -params.c2 * slope0 {
                    return Some(mid);
                }
                if e.dphi * (hi - lo) >= 0.0 {
                    hi = lo;
                }
                lo = mid;
                f_lo = e.f;
            }
        }
        // budget spent; the last midpoint is the best point located
        Some(mid)
    };

    let mut alpha_prev = 0.0;
    let mut f_prev = f0;
    let mut alpha = params.alpha_init.min(params.alpha_max);

    for i in 0..params.max_brackets {
        let e = eval(alpha)?;
        if !sufficient(alpha, e.f) || (i > 0 && e.f >= f_prev) {
            return zoom(alpha_prev, f_prev, alpha);
        }
        if e.dphi.abs() <= -params.c2 * slope0 {
            return Some(alpha);
        }
        if e.dphi >= 0.0 {
            return zoom(alpha, e.f, alpha_prev);
        }
        if alpha >= params.alpha_max {
            // φ still decreasing at the cap; take the cap
            return Some(alpha);
        }
        alpha_prev = alpha;
        f_prev = e.f;
        alpha = (2.0 * alpha).min(params.alpha_max);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::{ball_frechet_rgrad, frechet_objective};
    use karcher_manifold::PoincareBall;

    fn setup() -> (PoincareBall, Vec<Vec<f64>>, Vec<f64>) {
        let ball = PoincareBall::new(2);
        let sample = vec![vec![0.2, 0.0], vec![-0.1, 0.2], vec![0.0, -0.15]];
        let x = vec![0.15, 0.1];
        (ball, sample, x)
    }

    #[test]
    fn accepted_step_satisfies_both_conditions() {
        let (ball, sample, x) = setup();
        let grad = |p: &[f64], s: &[Vec<f64>]| ball_frechet_rgrad(&ball, p, s);
        let g = grad(&x, &sample);
        let d = scale(-1.0, &g);
        let f0 = frechet_objective(&ball, &x, &sample);
        let slope0 = ball.inner(&x, &g, &d);
        let params = WolfeParams::default();

        let alpha = strong_wolfe(&ball, &grad, &x, &d, &sample, f0, slope0, &params)
            .expect("descent direction must yield a step");

        let p = ball.exp_map(&x, &scale(alpha, &d));
        let f = frechet_objective(&ball, &p, &sample);
        assert!(f <= f0 + params.c1 * alpha * slope0, "sufficient decrease violated");

        let gp = grad(&p, &sample);
        let d_t = ball.parallel_transport(&x, &p, &d);
        let dphi = ball.inner(&p, &gp, &d_t);
        assert!(dphi.abs() <= -params.c2 * slope0 + 1e-12, "curvature violated");
    }

    #[test]
    fn ascent_direction_is_rejected() {
        let (ball, sample, x) = setup();
        let grad = |p: &[f64], s: &[Vec<f64>]| ball_frechet_rgrad(&ball, p, s);
        let g = grad(&x, &sample);
        let f0 = frechet_objective(&ball, &x, &sample);
        // walking along +g increases the objective
        let slope0 = ball.inner(&x, &g, &g);
        assert!(strong_wolfe(&ball, &grad, &x, &g, &sample, f0, slope0, &WolfeParams::default())
            .is_none());
    }

    #[test]
    fn non_finite_objective_aborts_search() {
        let (ball, sample, x) = setup();
        let grad = |_: &[f64], _: &[Vec<f64>]| vec![f64::NAN, f64::NAN];
        let g = ball_frechet_rgrad(&ball, &x, &sample);
        let d = scale(-1.0, &g);
        let f0 = frechet_objective(&ball, &x, &sample);
        let slope0 = ball.inner(&x, &g, &d);
        assert!(
            strong_wolfe(&ball, &grad, &x, &d, &sample, f0, slope0, &WolfeParams::default())
                .is_none()
        );
    }

    #[test]
    fn c2_below_c1_is_rejected() {
        let params = WolfeParams {
            c1: 0.5,
            c2: 0.1,
            ..WolfeParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(OptError::InvalidHyperparameter { name: "c2", .. })
        ));
    }
}
