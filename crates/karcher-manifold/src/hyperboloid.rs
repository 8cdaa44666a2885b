//! # Hyperboloid (Minkowski) model
//!
//! Hyperbolic space as the upper sheet of the hyperboloid
//! `⟨x,x⟩_M = −1, x[n] > 0` embedded in R^(n+1) with the Minkowski bilinear
//! form `⟨x,y⟩_M = Σᵢ<ₙ xᵢyᵢ − xₙyₙ`.
//!
//! Unlike the ball, tangent spaces here are genuine n-dimensional subspaces
//! of the ambient R^(n+1): a tangent vector at `x` must be
//! Minkowski-orthogonal to `x`, an invariant enforced by
//! [`Manifold::project_tangent`].
//!
//! ## Key formulas
//!
//! ```text
//! d(x, y)   = acosh(max(1, −⟨x,y⟩_M))
//! exp_x(v)  = cosh(‖v‖_M)·x + (sinh(‖v‖_M)/‖v‖_M)·v
//! log_x(y)  = (d/sinh(d)) · proj_x(y),   d = d(x, y)
//! P_{x1→x2}(v) = proj_{x2}(v)
//! ```
//!
//! Both `sinh` ratios are defined as 1 at 0.

use crate::{axpy, scale, Manifold};

/// The hyperboloid model over R^(n+1).
#[derive(Debug, Clone, Copy)]
pub struct Hyperboloid {
    dim: usize,
}

impl Hyperboloid {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Minkowski bilinear form `Σᵢ<ₙ xᵢyᵢ − xₙyₙ`.
    #[inline]
    pub fn minkowski_dot(&self, x: &[f64], y: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), y.len(), "dimension mismatch in Minkowski dot");
        let n = x.len() - 1;
        let spatial: f64 = x[..n].iter().zip(y[..n].iter()).map(|(a, b)| a * b).sum();
        spatial - x[n] * y[n]
    }
}

impl Manifold for Hyperboloid {
    fn dim(&self) -> usize {
        self.dim
    }

    fn ambient_dim(&self) -> usize {
        self.dim + 1
    }

    /// The Minkowski form restricted to the tangent space (positive definite
    /// there).
    fn inner(&self, _base: &[f64], u: &[f64], v: &[f64]) -> f64 {
        self.minkowski_dot(u, v)
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        // Clamp to ≥ 1.0: roundoff can push −⟨x,y⟩_M slightly under 1
        let alpha = (-self.minkowski_dot(x, y)).max(1.0);
        alpha.acosh()
    }

    fn exp_map(&self, base: &[f64], v: &[f64]) -> Vec<f64> {
        let v_norm = self.norm(base, v);
        if v_norm < 1e-15 {
            return base.to_vec();
        }
        // cosh(‖v‖)·x + (sinh(‖v‖)/‖v‖)·v
        let cosh_n = v_norm.cosh();
        let ratio = v_norm.sinh() / v_norm;
        let mut out: Vec<f64> = base
            .iter()
            .zip(v.iter())
            .map(|(&xi, &vi)| cosh_n * xi + ratio * vi)
            .collect();

        // Roundoff in the cosh/sinh combination drifts off the sheet for
        // large coordinates; rescale so ⟨r,r⟩_M = −1 holds exactly again.
        let q = -self.minkowski_dot(&out, &out);
        if q > 0.0 {
            let correction = 1.0 / q.sqrt();
            for c in out.iter_mut() {
                *c *= correction;
            }
        }
        out
    }

    fn log_map(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        let alpha = (-self.minkowski_dot(x, y)).max(1.0);
        let d = alpha.acosh();
        let sinh_d = (alpha * alpha - 1.0).max(0.0).sqrt();
        // d/sinh(d) → 1 as d → 0
        let ratio = if sinh_d < 1e-15 { 1.0 } else { d / sinh_d };
        scale(ratio, &self.project_tangent(x, y))
    }

    /// Transport by re-projection at the destination point.
    fn parallel_transport(&self, _x1: &[f64], x2: &[f64], v: &[f64]) -> Vec<f64> {
        self.project_tangent(x2, v)
    }

    /// `v + x·⟨x,v⟩_M` — removes the Minkowski-normal component.
    fn project_tangent(&self, x: &[f64], v: &[f64]) -> Vec<f64> {
        let inner = self.minkowski_dot(x, v);
        axpy(inner, x, v)
    }

    /// Negate the last coordinate (metric signature flip), then project onto
    /// the tangent space.
    fn egrad_to_rgrad(&self, x: &[f64], g: &[f64]) -> Vec<f64> {
        let mut flipped = g.to_vec();
        let n = flipped.len() - 1;
        flipped[n] = -flipped[n];
        self.project_tangent(x, &flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYP: Hyperboloid = Hyperboloid { dim: 2 };

    /// Lift a 2D spatial vector onto the sheet: x[2] = sqrt(1 + ‖s‖²).
    fn lift(s: &[f64; 2]) -> Vec<f64> {
        let norm_sq = s[0] * s[0] + s[1] * s[1];
        vec![s[0], s[1], (1.0 + norm_sq).sqrt()]
    }

    #[test]
    fn lifted_points_satisfy_sheet_invariant() {
        let x = lift(&[0.7, -1.2]);
        let p = HYP.minkowski_dot(&x, &x);
        assert!((p + 1.0).abs() < 1e-12, "⟨x,x⟩_M = {p}");
    }

    // ── distance ───────────────────────────────

    #[test]
    fn distance_self_is_zero() {
        let x = lift(&[0.5, 0.2]);
        // ⟨x,x⟩_M = −1 exactly, so the clamp to 1 must kick in
        assert_eq!(HYP.distance(&x, &x), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let x = lift(&[0.1, 0.4]);
        let y = lift(&[-0.6, 0.3]);
        assert!((HYP.distance(&x, &y) - HYP.distance(&y, &x)).abs() < 1e-14);
    }

    #[test]
    fn distance_along_axis_is_arcsinh_difference() {
        // Points (sinh t, 0, cosh t) have geodesic coordinate t
        let t1 = 0.3_f64;
        let t2 = 1.1_f64;
        let x = vec![t1.sinh(), 0.0, t1.cosh()];
        let y = vec![t2.sinh(), 0.0, t2.cosh()];
        let d = HYP.distance(&x, &y);
        assert!((d - (t2 - t1)).abs() < 1e-12, "d = {d}");
    }

    // ── tangent projection ─────────────────────

    #[test]
    fn projected_vector_is_minkowski_orthogonal() {
        let x = lift(&[0.4, -0.2]);
        let v = vec![1.0, 2.0, 3.0];
        let t = HYP.project_tangent(&x, &v);
        assert!(HYP.minkowski_dot(&x, &t).abs() < 1e-12);
    }

    #[test]
    fn projection_is_idempotent() {
        let x = lift(&[0.4, -0.2]);
        let v = vec![1.0, 2.0, 3.0];
        let once = HYP.project_tangent(&x, &v);
        let twice = HYP.project_tangent(&x, &once);
        for (a, b) in once.iter().zip(twice.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    // ── exp / log ──────────────────────────────

    #[test]
    fn exp_map_of_zero_vector_is_base() {
        let x = lift(&[0.3, 0.3]);
        let r = HYP.exp_map(&x, &[0.0, 0.0, 0.0]);
        assert_eq!(r, x);
    }

    #[test]
    fn exp_map_stays_on_sheet() {
        let x = lift(&[0.2, -0.5]);
        let v = HYP.project_tangent(&x, &[0.7, 0.1, 0.0]);
        let r = HYP.exp_map(&x, &v);
        let p = HYP.minkowski_dot(&r, &r);
        assert!((p + 1.0).abs() < 1e-10, "⟨r,r⟩_M = {p}");
        assert!(r[2] > 0.0, "left the upper sheet");
    }

    #[test]
    fn exp_map_renormalizes_far_from_apex() {
        // Large coordinates amplify roundoff in cosh·x + sinh·v; the result
        // must still sit on the sheet to high precision.
        let x = lift(&[6.0, -3.0]);
        let v = HYP.project_tangent(&x, &[2.0, 1.0, 0.0]);
        let r = HYP.exp_map(&x, &v);
        let p = HYP.minkowski_dot(&r, &r);
        assert!((p + 1.0).abs() < 1e-9, "⟨r,r⟩_M = {p}");
        assert!(r[2] > 0.0);
    }

    #[test]
    fn exp_log_inverse() {
        let x = lift(&[0.1, 0.2]);
        let y = lift(&[-0.4, 0.6]);
        let v = HYP.log_map(&x, &y);
        let back = HYP.exp_map(&x, &v);
        for (a, b) in y.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-10, "exp∘log failed: {a} vs {b}");
        }
    }

    #[test]
    fn log_map_of_same_point_is_zero() {
        let x = lift(&[0.2, 0.7]);
        let v = HYP.log_map(&x, &x);
        assert!(v.iter().all(|c| c.abs() < 1e-12));
    }

    #[test]
    fn log_map_norm_equals_distance() {
        let x = lift(&[0.0, 0.1]);
        let y = lift(&[0.8, -0.3]);
        let v = HYP.log_map(&x, &y);
        let n = HYP.norm(&x, &v);
        let d = HYP.distance(&x, &y);
        assert!((n - d).abs() < 1e-10, "‖log‖ = {n}, d = {d}");
    }

    // ── gradient conversion ────────────────────

    #[test]
    fn rgrad_is_tangent() {
        let x = lift(&[0.5, -0.1]);
        let g = vec![0.3, -0.8, 0.2];
        let rg = HYP.egrad_to_rgrad(&x, &g);
        assert!(HYP.minkowski_dot(&x, &rg).abs() < 1e-12);
    }

    #[test]
    fn transport_lands_in_destination_tangent_space() {
        let x1 = lift(&[0.1, 0.1]);
        let x2 = lift(&[-0.6, 0.4]);
        let v = HYP.project_tangent(&x1, &[1.0, 0.0, 0.0]);
        let t = HYP.parallel_transport(&x1, &x2, &v);
        assert!(HYP.minkowski_dot(&x2, &t).abs() < 1e-12);
    }

    // ── norm clamp ─────────────────────────────

    #[test]
    fn norm_clamps_negative_roundoff() {
        let x = lift(&[0.0, 0.0]);
        // The base point itself has ⟨x,x⟩_M = −1; norm must clamp, not NaN
        let n = HYP.norm(&x, &x);
        assert_eq!(n, 0.0);
    }
}
