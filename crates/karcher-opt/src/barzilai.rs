//! Riemannian Barzilai–Borwein descent.
//!
//! The step length adapts from iteration to iteration via a secant pair
//! built in the tangent space of the freshly accepted point:
//!
//! ```text
//! s_k = −a_k · T_{x_k → x_{k+1}}(g_k)
//! y_k = g_{k+1} + s_k / a_k          (= g_{k+1} − T(g_k))
//! a_{k+1} = clamp(⟨s_k, s_k⟩ / ⟨s_k, y_k⟩, a_min, a_max)
//! ```
//!
//! Both inner products use the metric at x_{k+1}. The previous gradient is
//! parallel-transported before it enters the secant; the untransported
//! difference g_{k+1} − g_k would mix vectors from two different tangent
//! spaces. When ⟨s, y⟩ ≤ 0 the quotient carries no curvature information
//! and the step resets to a_max. The very first step uses a_min.

use karcher_manifold::{all_finite, scale, Manifold};
use serde::{Deserialize, Serialize};

use crate::error::OptError;
use crate::objective::frechet_objective;
use crate::trace::{IterateTrace, StopReason};

/// Hyperparameters for [`rbb`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RbbParams {
    /// Lower step clamp, also the first step length.
    pub a_min: f64,
    /// Upper step clamp, also the fallback when the secant quotient is
    /// non-positive.
    pub a_max: f64,
    pub max_steps: usize,
    pub tol: f64,
}

impl Default for RbbParams {
    fn default() -> Self {
        Self {
            a_min: 1e-4,
            a_max: 0.9,
            max_steps: 100,
            tol: 1e-6,
        }
    }
}

impl RbbParams {
    pub fn validate(&self) -> Result<(), OptError> {
        if !(self.a_min > 0.0 && self.a_min.is_finite()) {
            return Err(OptError::InvalidHyperparameter {
                name: "a_min",
                value: self.a_min,
            });
        }
        if !(self.a_max >= self.a_min && self.a_max.is_finite()) {
            return Err(OptError::InvalidHyperparameter {
                name: "a_max",
                value: self.a_max,
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

/// Barzilai–Borwein gradient descent on a hyperbolic manifold.
pub fn rbb<M, G>(
    manifold: &M,
    gradient: G,
    x0: &[f64],
    sample: &[Vec<f64>],
    params: &RbbParams,
) -> Result<IterateTrace, OptError>
where
    M: Manifold,
    G: Fn(&[f64], &[Vec<f64>]) -> Vec<f64>,
{
    params.validate()?;

    let mut trace = IterateTrace::start(x0.to_vec(), frechet_objective(manifold, x0, sample));
    let mut x = x0.to_vec();
    let mut steps = 0usize;
    let mut a_bb = params.a_min;

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

        let a_k = a_bb;
        let x_next = manifold.exp_map(&x, &scale(-a_k, &g));
        let f_next = frechet_objective(manifold, &x_next, sample);

        let g_next = gradient(&x_next, sample);
        let s = scale(-a_k, &manifold.parallel_transport(&x, &x_next, &g));
        let y: Vec<f64> = g_next
            .iter()
            .zip(s.iter())
            .map(|(gi, si)| gi + si / a_k)
            .collect();

        let sy = manifold.inner(&x_next, &s, &y);
        a_bb = if sy > 0.0 {
            let tau = manifold.inner(&x_next, &s, &s) / sy;
            tau.clamp(params.a_min, params.a_max)
        } else {
            params.a_max
        };
        tracing::trace!(step = steps, a_k, next_step = a_bb, objective = f_next, "bb step");

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
    use karcher_manifold::{axpy, l2_norm, PoincareBall};

    fn small_sample() -> Vec<Vec<f64>> {
        vec![vec![0.1, 0.0], vec![-0.1, 0.1], vec![0.0, -0.1]]
    }

    #[test]
    fn first_step_length_is_a_min() {
        let ball = PoincareBall::new(2);
        let sample = small_sample();
        let params = RbbParams {
            max_steps: 1,
            ..RbbParams::default()
        };
        let x0 = vec![0.05, 0.02];
        let trace = rbb(
            &ball,
            |x, s| ball_frechet_rgrad(&ball, x, s),
            &x0,
            &sample,
            &params,
        )
        .unwrap();

        let g0 = ball_frechet_rgrad(&ball, &x0, &sample);
        let expected = ball.exp_map(&x0, &scale(-params.a_min, &g0));
        let diff = axpy(-1.0, &expected, &trace.iterates[1]);
        assert!(l2_norm(&diff) < 1e-14);
    }

    #[test]
    fn converges_on_ball_sample() {
        let ball = PoincareBall::new(2);
        let sample = small_sample();
        let trace = rbb(
            &ball,
            |x, s| ball_frechet_rgrad(&ball, x, s),
            &[0.0, 0.0],
            &sample,
            &RbbParams::default(),
        )
        .unwrap();
        assert_eq!(trace.stop, StopReason::Converged);
    }

    #[test]
    fn secant_differs_from_untransported_difference() {
        // The secant uses the transported previous gradient. On the
        // hyperboloid, transport is a genuine projection between tangent
        // spaces, so the raw coordinate difference g_{k+1} − g_k is a
        // different vector.
        use crate::objective::hyperboloid_frechet_rgrad;
        use karcher_manifold::{bridge, Hyperboloid};

        let hyp = Hyperboloid::new(2);
        let sample = vec![
            bridge::to_hyperboloid(&[0.4, 0.0]).unwrap(),
            bridge::to_hyperboloid(&[0.0, 0.4]).unwrap(),
        ];
        let x = bridge::to_hyperboloid(&[0.3, -0.2]).unwrap();
        let g = hyperboloid_frechet_rgrad(&hyp, &x, &sample);
        let a_k = 0.2;

        let x_next = hyp.exp_map(&x, &scale(-a_k, &g));
        let g_next = hyperboloid_frechet_rgrad(&hyp, &x_next, &sample);

        let s = scale(-a_k, &hyp.parallel_transport(&x, &x_next, &g));
        let y_transported: Vec<f64> = g_next
            .iter()
            .zip(s.iter())
            .map(|(gi, si)| gi + si / a_k)
            .collect();
        let y_raw = axpy(-1.0, &g, &g_next);

        let diff = axpy(-1.0, &y_raw, &y_transported);
        assert!(l2_norm(&diff) > 1e-6, "transport changed nothing");
    }

    #[test]
    fn rejects_inverted_clamp_interval() {
        let ball = PoincareBall::new(2);
        let params = RbbParams {
            a_min: 0.5,
            a_max: 0.1,
            ..RbbParams::default()
        };
        assert!(rbb(
            &ball,
            |x, s| ball_frechet_rgrad(&ball, x, s),
            &[0.0, 0.0],
            &small_sample(),
            &params,
        )
        .is_err());
    }

    #[test]
    fn coincident_sample_point_stops_cleanly() {
        let ball = PoincareBall::new(2);
        let x0 = vec![0.1, 0.1];
        let sample = vec![x0.clone(), vec![0.2, -0.2]];
        let trace = rbb(
            &ball,
            |x, s| ball_frechet_rgrad(&ball, x, s),
            &x0,
            &sample,
            &RbbParams::default(),
        )
        .unwrap();
        assert_eq!(trace.stop, StopReason::NumericalDivergence);
        assert_eq!(trace.len(), 1);
    }
}
