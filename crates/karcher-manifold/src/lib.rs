//! # karcher-manifold
//!
//! Geometry primitives for hyperbolic space in two coordinate representations:
//! the Poincaré ball and the hyperboloid (Minkowski) model. Both implement the
//! same [`Manifold`] contract, so optimization code written against the trait
//! runs unchanged on either representation.
//!
//! ## Operation set
//!
//! | Operation | Purpose |
//! |---|---|
//! | [`Manifold::inner`] | Riemannian inner product at a base point |
//! | [`Manifold::distance`] | geodesic distance |
//! | [`Manifold::exp_map`] | follow a geodesic for unit time |
//! | [`Manifold::log_map`] | initial geodesic velocity between two points |
//! | [`Manifold::parallel_transport`] | move a tangent vector between tangent spaces |
//! | [`Manifold::project_tangent`] | remove the normal component of an ambient vector |
//! | [`Manifold::egrad_to_rgrad`] | Euclidean → Riemannian gradient |
//!
//! ## Safety invariants
//!
//! Ball points satisfy **‖x‖ < 1.0** (open unit ball). Hyperboloid points
//! satisfy **⟨x,x⟩_M = −1** with positive last coordinate. Roundoff that would
//! push an `acosh` argument below 1 is clamped, never propagated.

pub mod ball;
pub mod bridge;
pub mod error;
pub mod hyperboloid;

pub use ball::PoincareBall;
pub use error::ManifoldError;
pub use hyperboloid::Hyperboloid;

/// Shared contract for both coordinate representations.
///
/// Implementations are stateless apart from the dimension; every method is a
/// pure function of its arguments.
pub trait Manifold {
    /// Intrinsic dimension n of the manifold.
    fn dim(&self) -> usize;

    /// Length of a point's coordinate vector (n for the ball, n+1 for the
    /// hyperboloid).
    fn ambient_dim(&self) -> usize;

    /// Riemannian inner product of tangent vectors `u`, `v` at `base`.
    fn inner(&self, base: &[f64], u: &[f64], v: &[f64]) -> f64;

    /// Riemannian norm of `v` at `base`.
    ///
    /// Clamped against small negative inner products from floating-point error.
    fn norm(&self, base: &[f64], v: &[f64]) -> f64 {
        self.inner(base, v, v).max(0.0).sqrt()
    }

    /// Geodesic distance between `x` and `y`.
    fn distance(&self, x: &[f64], y: &[f64]) -> f64;

    /// Follow the geodesic starting at `base` with velocity `v` for unit time.
    ///
    /// A zero tangent vector yields `base` unchanged.
    fn exp_map(&self, base: &[f64], v: &[f64]) -> Vec<f64>;

    /// Initial velocity of the geodesic from `x` to `y`; inverse of
    /// [`Manifold::exp_map`].
    fn log_map(&self, x: &[f64], y: &[f64]) -> Vec<f64>;

    /// Re-express a tangent vector at `x1` in the tangent space at `x2`.
    fn parallel_transport(&self, x1: &[f64], x2: &[f64], v: &[f64]) -> Vec<f64>;

    /// Project an ambient vector onto the tangent space at `x`.
    fn project_tangent(&self, x: &[f64], v: &[f64]) -> Vec<f64>;

    /// Convert a Euclidean gradient at `x` into the Riemannian gradient.
    fn egrad_to_rgrad(&self, x: &[f64], g: &[f64]) -> Vec<f64>;
}

// ─────────────────────────────────────────────
// Slice helpers shared by both models
// ─────────────────────────────────────────────

/// Euclidean dot product.
#[inline]
pub fn dot(u: &[f64], v: &[f64]) -> f64 {
    debug_assert_eq!(u.len(), v.len(), "dimension mismatch in dot");
    u.iter().zip(v.iter()).map(|(a, b)| a * b).sum()
}

/// Euclidean L2 norm.
#[inline]
pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// `a·x + y` over slices.
#[inline]
pub fn axpy(a: f64, x: &[f64], y: &[f64]) -> Vec<f64> {
    debug_assert_eq!(x.len(), y.len(), "dimension mismatch in axpy");
    x.iter().zip(y.iter()).map(|(xi, yi)| a * xi + yi).collect()
}

/// Scale a slice by a scalar.
#[inline]
pub fn scale(a: f64, x: &[f64]) -> Vec<f64> {
    x.iter().map(|xi| a * xi).collect()
}

/// True when every component is finite (no NaN, no ±Inf).
#[inline]
pub fn all_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_of_orthogonal_is_zero() {
        assert_eq!(dot(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn axpy_combines() {
        let r = axpy(2.0, &[1.0, 2.0], &[0.5, 0.5]);
        assert_eq!(r, vec![2.5, 4.5]);
    }

    #[test]
    fn all_finite_rejects_nan_and_inf() {
        assert!(all_finite(&[0.0, 1.0, -2.0]));
        assert!(!all_finite(&[0.0, f64::NAN]));
        assert!(!all_finite(&[f64::INFINITY, 0.0]));
    }
}
