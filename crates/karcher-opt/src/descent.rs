//! First-order descent drivers: fixed step and Armijo backtracking.
//!
//! Both follow the shared iteration contract (see the crate docs): the
//! gradient is evaluated at the head of each pass, including once at the
//! final iterate, so the returned trace carries a gradient snapshot for
//! every retained point.

use karcher_manifold::{all_finite, scale, Manifold};
use serde::{Deserialize, Serialize};

use crate::error::OptError;
use crate::objective::frechet_objective;
use crate::trace::{IterateTrace, StopReason};

/// Hyperparameters for [`fixed_step`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixedStepParams {
    /// Constant learning rate η applied to the negative Riemannian gradient.
    pub step: f64,
    /// Iteration cap.
    pub max_steps: usize,
    /// Gradient norm below which the run is declared converged.
    pub tol: f64,
}

impl Default for FixedStepParams {
    fn default() -> Self {
        Self {
            step: 0.3,
            max_steps: 100,
            tol: 1e-6,
        }
    }
}

impl FixedStepParams {
    pub fn validate(&self) -> Result<(), OptError> {
        if !(self.step > 0.0 && self.step.is_finite()) {
            return Err(OptError::InvalidHyperparameter {
                name: "step",
                value: self.step,
            });
        }
        if !(self.tol > 0.0) {
            return Err(OptError::InvalidHyperparameter {
                name: "tol",
                value: self.tol,
            });
        }
        Ok(())
    }
}

/// Riemannian gradient descent with a constant learning rate.
///
/// `gradient` returns the Riemannian gradient of the Fréchet objective at a
/// point; the next iterate is `exp_x(−η·g)`.
pub fn fixed_step<M, G>(
    manifold: &M,
    gradient: G,
    x0: &[f64],
    sample: &[Vec<f64>],
    params: &FixedStepParams,
) -> Result<IterateTrace, OptError>
where
    M: Manifold,
    G: Fn(&[f64], &[Vec<f64>]) -> Vec<f64>,
{
    params.validate()?;

    let mut trace = IterateTrace::start(x0.to_vec(), frechet_objective(manifold, x0, sample));
    let mut x = x0.to_vec();
    let mut steps = 0usize;

    loop {
        let g = gradient(&x, sample);
        if !all_finite(&g) {
            trace.discard_unevaluated();
            trace.stop = StopReason::NumericalDivergence;
            break;
        }
        let g_norm = manifold.norm(&x, &g);
        trace.push_gradient(g.clone());
        if g_norm < params.tol {
            trace.stop = StopReason::Converged;
            break;
        }
        if steps == params.max_steps {
            trace.stop = StopReason::BudgetExhausted;
            break;
        }

        let x_next = manifold.exp_map(&x, &scale(-params.step, &g));
        let f_next = frechet_objective(manifold, &x_next, sample);
        tracing::trace!(step = steps, objective = f_next, grad_norm = g_norm, "fixed step");
        trace.push_step(x_next.clone(), f_next);
        x = x_next;
        steps += 1;
    }

    Ok(trace)
}

// ─────────────────────────────────────────────
// Armijo backtracking
// ─────────────────────────────────────────────

/// Hyperparameters for [`armijo`].
///
/// The accepted step length is `σ^h · λ` for the smallest h satisfying the
/// sufficient-decrease condition
///
/// ```text
/// F(exp_x(−σ^h λ g)) ≤ F(x) − γ σ^h λ ⟨g, g⟩_x
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArmijoParams {
    /// Backtracking contraction factor σ ∈ (0, 1).
    pub sigma: f64,
    /// Sufficient-decrease constant γ.
    pub gamma: f64,
    /// Base step length λ tried first.
    pub lambda: f64,
    /// Backtracking attempts before the search is declared degenerate.
    pub max_backtracks: u32,
    pub max_steps: usize,
    pub tol: f64,
}

impl Default for ArmijoParams {
    fn default() -> Self {
        Self {
            sigma: 0.3,
            gamma: 1e-3,
            lambda: 0.9,
            max_backtracks: 64,
            max_steps: 100,
            tol: 1e-6,
        }
    }
}

impl ArmijoParams {
    pub fn validate(&self) -> Result<(), OptError> {
        if !(self.sigma > 0.0 && self.sigma < 1.0) {
            return Err(OptError::InvalidHyperparameter {
                name: "sigma",
                value: self.sigma,
            });
        }
        if !(self.gamma > 0.0) {
            return Err(OptError::InvalidHyperparameter {
                name: "gamma",
                value: self.gamma,
            });
        }
        if !(self.lambda > 0.0 && self.lambda.is_finite()) {
            return Err(OptError::InvalidHyperparameter {
                name: "lambda",
                value: self.lambda,
            });
        }
        if !(self.tol > 0.0) {
            return Err(OptError::InvalidHyperparameter {
                name: "tol",
                value: self.tol,
            });
        }
        Ok(())
    }
}

/// Riemannian gradient descent with Armijo backtracking line search.
///
/// A run whose backtracking loop exhausts `max_backtracks` without a step
/// satisfying sufficient decrease stops with
/// [`StopReason::DegenerateLineSearch`] and returns the trace built so far.
pub fn armijo<M, G>(
    manifold: &M,
    gradient: G,
    x0: &[f64],
    sample: &[Vec<f64>],
    params: &ArmijoParams,
) -> Result<IterateTrace, OptError>
where
    M: Manifold,
    G: Fn(&[f64], &[Vec<f64>]) -> Vec<f64>,
{
    params.validate()?;

    let mut trace = IterateTrace::start(x0.to_vec(), frechet_objective(manifold, x0, sample));
    let mut x = x0.to_vec();
    let mut steps = 0usize;

    loop {
        let g = gradient(&x, sample);
        if !all_finite(&g) {
            trace.discard_unevaluated();
            trace.stop = StopReason::NumericalDivergence;
            break;
        }
        let g_norm = manifold.norm(&x, &g);
        trace.push_gradient(g.clone());
        if g_norm < params.tol {
            trace.stop = StopReason::Converged;
            break;
        }
        if steps == params.max_steps {
            trace.stop = StopReason::BudgetExhausted;
            break;
        }

        let f_cur = trace.final_objective();
        let slope = manifold.inner(&x, &g, &g);
        let mut accepted = None;
        let mut alpha = params.lambda;
        for h in 0..params.max_backtracks {
            let cand = manifold.exp_map(&x, &scale(-alpha, &g));
            let f_cand = frechet_objective(manifold, &cand, sample);
            if f_cand.is_finite() && f_cand <= f_cur - params.gamma * alpha * slope {
                tracing::trace!(step = steps, backtracks = h, alpha, objective = f_cand, "armijo step");
                accepted = Some((cand, f_cand));
                break;
            }
            alpha *= params.sigma;
        }

        let Some((x_next, f_next)) = accepted else {
            trace.stop = StopReason::DegenerateLineSearch;
            break;
        };
        trace.push_step(x_next.clone(), f_next);
        x = x_next;
        steps += 1;
    }

    Ok(trace)
}
