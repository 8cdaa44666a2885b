//! Error types for manifold operations.

/// Errors raised when inputs violate a manifold's point invariants.
///
/// Numerical degeneracies inside geometry formulas (acosh arguments below 1,
/// near-zero Möbius denominators) are clamped, not reported; these variants
/// cover contract violations only.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ManifoldError {
    /// A ball point had squared norm ≥ 1.
    #[error("point outside Poincaré ball: ‖x‖ = {norm:.6} ≥ 1.0")]
    OutsideBall { norm: f64 },

    /// A hyperboloid point failed the sheet invariant (⟨x,x⟩_M = −1, last
    /// coordinate positive).
    #[error("point not on hyperboloid sheet: ⟨x,x⟩_M = {product:.6}, x[n] = {last:.6}")]
    OffSheet { product: f64, last: f64 },
}
