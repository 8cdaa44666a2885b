//! # Poincaré ball model
//!
//! Hyperbolic space as the open unit ball with the conformal metric
//! `λ_x = 2 / (1 − ‖x‖²)`. Tangent spaces are globally identified with R^n,
//! which makes projection and parallel transport the identity — a
//! representation-specific simplification the hyperboloid model does not share.
//!
//! ## Key formulas
//!
//! ```text
//! d(x, y)    = acosh(1 + 2‖x−y‖² / ((1−‖x‖²)(1−‖y‖²)))
//! exp_x(v)   = x ⊕ tanh(λ_x·‖v‖/2) · v/‖v‖
//! log_x(y)   = (2/λ_x) · atanh(‖a‖) · a/‖a‖,   a = (−x) ⊕ y
//! ⟨u,v⟩_x    = λ_x² · ⟨u,v⟩
//! ```
//!
//! where ⊕ is Möbius addition. The acosh argument is clamped to ≥ 1 and the
//! Möbius denominator is floor-clamped near zero; both are roundoff guards,
//! never errors.

use crate::{dot, l2_norm, scale, Manifold};

/// Floor applied to the Möbius-addition denominator to avoid blow-up when two
/// near-boundary points nearly cancel.
const MOBIUS_DENOM_FLOOR: f64 = 1e-13;

/// The Poincaré ball over R^n.
#[derive(Debug, Clone, Copy)]
pub struct PoincareBall {
    dim: usize,
}

impl PoincareBall {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Conformal factor `λ_x = 2 / (1 − ‖x‖²)` at `x`.
    #[inline]
    pub fn conformal_factor(&self, x: &[f64]) -> f64 {
        2.0 / (1.0 - dot(x, x)).max(1e-15)
    }

    /// Möbius addition x ⊕ y.
    ///
    /// ```text
    /// x ⊕ y = [(1 + 2⟨x,y⟩ + ‖y‖²)·x + (1 − ‖x‖²)·y]
    ///          / (1 + 2⟨x,y⟩ + ‖x‖²‖y‖²)
    /// ```
    pub fn mobius_add(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        debug_assert_eq!(x.len(), y.len(), "dimension mismatch in Möbius add");

        let dot_xy = dot(x, y);
        let norm_x_sq = dot(x, x);
        let norm_y_sq = dot(y, y);

        let mut denom = 1.0 + 2.0 * dot_xy + norm_x_sq * norm_y_sq;
        if denom.abs() < MOBIUS_DENOM_FLOOR {
            denom = MOBIUS_DENOM_FLOOR.copysign(denom);
        }

        let coeff_x = (1.0 + 2.0 * dot_xy + norm_y_sq) / denom;
        let coeff_y = (1.0 - norm_x_sq) / denom;

        x.iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| coeff_x * xi + coeff_y * yi)
            .collect()
    }
}

impl Manifold for PoincareBall {
    fn dim(&self) -> usize {
        self.dim
    }

    fn ambient_dim(&self) -> usize {
        self.dim
    }

    /// `⟨u,v⟩_x = λ_x² · ⟨u,v⟩` — Euclidean dot scaled by the squared
    /// conformal factor.
    fn inner(&self, base: &[f64], u: &[f64], v: &[f64]) -> f64 {
        let lambda = self.conformal_factor(base);
        lambda * lambda * dot(u, v)
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), y.len(), "dimension mismatch in distance");

        let diff_sq: f64 = x
            .iter()
            .zip(y.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        let denom = (1.0 - dot(x, x)) * (1.0 - dot(y, y));
        if denom <= 0.0 {
            return f64::INFINITY;
        }

        // Clamp to ≥ 1.0: roundoff can push the argument under acosh's domain
        let arg = (1.0 + 2.0 * diff_sq / denom).max(1.0);
        arg.acosh()
    }

    fn exp_map(&self, base: &[f64], v: &[f64]) -> Vec<f64> {
        let v_norm = l2_norm(v);
        if v_norm < 1e-15 {
            return base.to_vec();
        }

        let lambda = self.conformal_factor(base);
        let step = (lambda * v_norm / 2.0).tanh() / v_norm;
        self.mobius_add(base, &scale(step, v))
    }

    fn log_map(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        let neg_x = scale(-1.0, x);
        let a = self.mobius_add(&neg_x, y);
        let a_norm = l2_norm(&a);
        if a_norm < 1e-15 {
            return vec![0.0; x.len()];
        }

        // atanh domain guard for near-boundary roundoff
        let clamped = a_norm.min(1.0 - 1e-15);
        let coeff = (2.0 / self.conformal_factor(x)) * clamped.atanh() / a_norm;
        scale(coeff, &a)
    }

    /// Identity: the ball's tangent spaces are globally identified with R^n.
    fn parallel_transport(&self, _x1: &[f64], _x2: &[f64], v: &[f64]) -> Vec<f64> {
        v.to_vec()
    }

    /// Identity: the embedding space is the tangent space.
    fn project_tangent(&self, _x: &[f64], v: &[f64]) -> Vec<f64> {
        v.to_vec()
    }

    /// Divide by the squared conformal factor.
    fn egrad_to_rgrad(&self, x: &[f64], g: &[f64]) -> Vec<f64> {
        let lambda = self.conformal_factor(x);
        scale(1.0 / (lambda * lambda), g)
    }
}
