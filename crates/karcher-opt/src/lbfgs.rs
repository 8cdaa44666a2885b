//! Riemannian limited-memory BFGS.
//!
//! Curvature pairs (s, y, ρ) live in the tangent space of the current
//! iterate. After every accepted step the stored pairs are parallel
//! transported to the new point and ρ is refreshed against the metric
//! there, so the two-loop recursion only ever combines vectors from one
//! tangent space. Pairs with non-positive ⟨s, y⟩ are skipped at insertion,
//! keeping the implicit Hessian approximation positive definite.

use std::collections::VecDeque;

use karcher_manifold::{all_finite, axpy, scale, Manifold};
use serde::{Deserialize, Serialize};

use crate::error::OptError;
use crate::objective::frechet_objective;
use crate::trace::{IterateTrace, StopReason};
use crate::wolfe::{strong_wolfe, WolfeParams};

/// How the step length along the two-loop direction is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepRule {
    /// Always take the full quasi-Newton step.
    Unit,
    /// Strong Wolfe line search along the geodesic ray.
    StrongWolfe,
}

/// Hyperparameters for [`lbfgs`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LbfgsParams {
    /// Curvature pairs retained; the oldest pair is evicted beyond this.
    pub memory: usize,
    pub step_rule: StepRule,
    pub wolfe: WolfeParams,
    pub max_steps: usize,
    pub tol: f64,
}

impl Default for LbfgsParams {
    fn default() -> Self {
        Self {
            memory: 5,
            step_rule: StepRule::StrongWolfe,
            wolfe: WolfeParams::default(),
            max_steps: 100,
            tol: 1e-6,
        }
    }
}

impl LbfgsParams {
    pub fn validate(&self) -> Result<(), OptError> {
        if self.memory == 0 {
            return Err(OptError::EmptyMemory { got: 0 });
        }
        if !(self.tol > 0.0) {
            return Err(OptError::InvalidHyperparameter {
                name: "tol",
                value: self.tol,
            });
        }
        self.wolfe.validate()
    }
}

struct Pair {
    s: Vec<f64>,
    y: Vec<f64>,
    rho: f64,
}

/// Bounded history of curvature pairs, newest at the back.
struct History {
    pairs: VecDeque<Pair>,
    capacity: usize,
}

impl History {
    fn new(capacity: usize) -> Self {
        Self {
            pairs: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Insert a pair, evicting the oldest at capacity. Pairs without
    /// positive curvature are dropped.
    fn push<M: Manifold>(&mut self, manifold: &M, x: &[f64], s: Vec<f64>, y: Vec<f64>) {
        let sy = manifold.inner(x, &s, &y);
        if !(sy > 0.0) || !sy.is_finite() {
            return;
        }
        if self.pairs.len() == self.capacity {
            self.pairs.pop_front();
        }
        self.pairs.push_back(Pair { s, y, rho: 1.0 / sy });
    }

    /// Carry every stored pair from the tangent space at `from` to the one
    /// at `to`, refreshing ρ against the metric at `to`.
    fn transport<M: Manifold>(&mut self, manifold: &M, from: &[f64], to: &[f64]) {
        for pair in self.pairs.iter_mut() {
            pair.s = manifold.parallel_transport(from, to, &pair.s);
            pair.y = manifold.parallel_transport(from, to, &pair.y);
            let sy = manifold.inner(to, &pair.s, &pair.y);
            pair.rho = 1.0 / sy;
        }
        self.pairs.retain(|p| p.rho.is_finite() && p.rho > 0.0);
    }

    /// Two-loop recursion: returns −H·g where H approximates the inverse
    /// Hessian. With an empty history this is plain steepest descent.
    fn direction<M: Manifold>(&self, manifold: &M, x: &[f64], g: &[f64]) -> Vec<f64> {
        let mut q = g.to_vec();
        let mut alphas = Vec::with_capacity(self.pairs.len());
        for pair in self.pairs.iter().rev() {
            let a = pair.rho * manifold.inner(x, &pair.s, &q);
            q = axpy(-a, &pair.y, &q);
            alphas.push(a);
        }

        // initial scaling γ = ⟨s, y⟩ / ⟨y, y⟩ from the newest pair
        if let Some(newest) = self.pairs.back() {
            let yy = manifold.inner(x, &newest.y, &newest.y);
            if yy > 0.0 {
                let gamma = manifold.inner(x, &newest.s, &newest.y) / yy;
                q = scale(gamma, &q);
            }
        }

        for (pair, a) in self.pairs.iter().zip(alphas.iter().rev()) {
            let b = pair.rho * manifold.inner(x, &pair.y, &q);
            q = axpy(a - b, &pair.s, &q);
        }
        scale(-1.0, &q)
    }
}

/// Limited-memory BFGS on a hyperbolic manifold.
///
/// When the two-loop direction fails to be a descent direction (possible
/// after aggressive transport of stale pairs) the history is cleared and the
/// step falls back to steepest descent for that iteration.
pub fn lbfgs<M, G>(
    manifold: &M,
    gradient: G,
    x0: &[f64],
    sample: &[Vec<f64>],
    params: &LbfgsParams,
) -> Result<IterateTrace, OptError>
where
    M: Manifold,
    G: Fn(&[f64], &[Vec<f64>]) -> Vec<f64>,
{
    params.validate()?;

    let mut trace = IterateTrace::start(x0.to_vec(), frechet_objective(manifold, x0, sample));
    let mut x = x0.to_vec();
    let mut steps = 0usize;
    let mut history = History::new(params.memory);

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

        let mut d = history.direction(manifold, &x, &g);
        let mut slope = manifold.inner(&x, &g, &d);
        if !(slope < 0.0) {
            tracing::debug!(step = steps, "two-loop direction not a descent direction, resetting");
            history.pairs.clear();
            d = scale(-1.0, &g);
            slope = -manifold.inner(&x, &g, &g);
        }

        let f_cur = trace.final_objective();
        let alpha = match params.step_rule {
            StepRule::Unit => 1.0,
            StepRule::StrongWolfe => {
                match strong_wolfe(manifold, &gradient, &x, &d, sample, f_cur, slope, &params.wolfe)
                {
                    Some(a) => a,
                    None => {
                        trace.stop = StopReason::DegenerateLineSearch;
                        break;
                    }
                }
            }
        };

        let step_vec = scale(alpha, &d);
        let x_next = manifold.exp_map(&x, &step_vec);
        let f_next = frechet_objective(manifold, &x_next, sample);
        tracing::trace!(step = steps, alpha, objective = f_next, pairs = history.len(), "lbfgs step");

        let g_next = gradient(&x_next, sample);
        history.transport(manifold, &x, &x_next);
        if all_finite(&g_next) {
            let s_new = manifold.parallel_transport(&x, &x_next, &step_vec);
            let y_new = axpy(-1.0, &manifold.parallel_transport(&x, &x_next, &g), &g_next);
            history.push(manifold, &x_next, s_new, y_new);
        }

        trace.push_step(x_next.clone(), f_next);
        x = x_next;
        steps += 1;
    }

    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::ball_frechet_rgrad;
    use karcher_manifold::{l2_norm, PoincareBall};

    fn small_sample() -> Vec<Vec<f64>> {
        vec![vec![0.1, 0.0], vec![-0.1, 0.1], vec![0.0, -0.1]]
    }

    #[test]
    fn empty_history_direction_is_steepest_descent() {
        let ball = PoincareBall::new(2);
        let history = History::new(5);
        let x = vec![0.1, 0.2];
        let g = vec![0.3, -0.4];
        let d = history.direction(&ball, &x, &g);
        let diff = axpy(1.0, &g, &d);
        assert!(l2_norm(&diff) < 1e-15);
    }

    #[test]
    fn history_never_exceeds_capacity() {
        let ball = PoincareBall::new(2);
        let mut history = History::new(3);
        let x = vec![0.0, 0.0];
        for k in 0..10 {
            let s = vec![0.1 + 0.01 * k as f64, 0.05];
            let y = vec![0.2, 0.1 + 0.01 * k as f64];
            history.push(&ball, &x, s, y);
            assert!(history.len() <= 3);
        }
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn non_positive_curvature_pair_is_dropped() {
        let ball = PoincareBall::new(2);
        let mut history = History::new(3);
        let x = vec![0.0, 0.0];
        history.push(&ball, &x, vec![0.1, 0.0], vec![-0.1, 0.0]);
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn converges_with_strong_wolfe() {
        let ball = PoincareBall::new(2);
        let sample = small_sample();
        let trace = lbfgs(
            &ball,
            |x, s| ball_frechet_rgrad(&ball, x, s),
            &[0.05, 0.05],
            &sample,
            &LbfgsParams::default(),
        )
        .unwrap();
        assert_eq!(trace.stop, StopReason::Converged);
        assert!(trace.len() < 50, "took {} iterates", trace.len());
    }

    #[test]
    fn converges_with_unit_steps() {
        let ball = PoincareBall::new(2);
        let sample = small_sample();
        let params = LbfgsParams {
            step_rule: StepRule::Unit,
            max_steps: 200,
            ..LbfgsParams::default()
        };
        let trace = lbfgs(
            &ball,
            |x, s| ball_frechet_rgrad(&ball, x, s),
            &[0.02, -0.03],
            &sample,
            &params,
        )
        .unwrap();
        assert_eq!(trace.stop, StopReason::Converged);
    }

    #[test]
    fn zero_memory_is_rejected() {
        let ball = PoincareBall::new(2);
        let params = LbfgsParams {
            memory: 0,
            ..LbfgsParams::default()
        };
        let err = lbfgs(
            &ball,
            |x, s| ball_frechet_rgrad(&ball, x, s),
            &[0.0, 0.0],
            &small_sample(),
            &params,
        )
        .unwrap_err();
        assert!(matches!(err, OptError::EmptyMemory { got: 0 }));
    }
}
