//! # Coordinate bridge
//!
//! Stateless conversion between the hyperboloid and ball representations of
//! the same hyperbolic space. It lets one sample set and one optimization
//! driver be exercised on both models for side-by-side comparison.
//!
//! ## Conversion formulas
//!
//! ```text
//! hyperboloid → ball:  y_i = x_i / (x_n + 1)           (i < n)
//! ball → hyperboloid:  x   = [y, (1+r)/2] · 2/(1−r),   r = ‖y‖²
//! ```
//!
//! Composing the two in either order returns the original point within 1e-9.

use crate::error::ManifoldError;
use crate::{dot, l2_norm};

/// Tolerance on the sheet invariant ⟨x,x⟩_M = −1 accepted by [`to_ball`].
const SHEET_TOL: f64 = 1e-6;

/// Project a hyperboloid point down to Poincaré-ball coordinates.
///
/// ```text
/// y_i = x_i / (x_n + 1)
/// ```
///
/// # Errors
///
/// Returns [`ManifoldError::OffSheet`] if the point violates
/// ⟨x,x⟩_M = −1 (tolerance 1e-6) or has a non-positive last coordinate.
pub fn to_ball(x: &[f64]) -> Result<Vec<f64>, ManifoldError> {
    let n = x.len() - 1;
    let spatial: f64 = x[..n].iter().map(|v| v * v).sum();
    let product = spatial - x[n] * x[n];
    if (product + 1.0).abs() > SHEET_TOL || x[n] <= 0.0 {
        return Err(ManifoldError::OffSheet { product, last: x[n] });
    }
    let denom = x[n] + 1.0;
    Ok(x[..n].iter().map(|&xi| xi / denom).collect())
}

/// Lift a Poincaré-ball point onto the hyperboloid sheet.
///
/// ```text
/// x = [y, (1+r)/2] · 2/(1−r),   r = ‖y‖²
/// ```
///
/// The result satisfies ⟨x,x⟩_M = −1 with positive last coordinate.
///
/// # Errors
///
/// Returns [`ManifoldError::OutsideBall`] if ‖y‖ ≥ 1.
pub fn to_hyperboloid(y: &[f64]) -> Result<Vec<f64>, ManifoldError> {
    let r = dot(y, y);
    if r >= 1.0 {
        return Err(ManifoldError::OutsideBall { norm: l2_norm(y) });
    }
    let scale = 2.0 / (1.0 - r);
    let mut out = Vec::with_capacity(y.len() + 1);
    out.extend(y.iter().map(|&yi| yi * scale));
    out.push((1.0 + r) / 2.0 * scale);
    Ok(out)
}
