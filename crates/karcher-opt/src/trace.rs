//! Optimization run output: three parallel append-only sequences.
//!
//! A trace is created fresh inside one driver call, owns its data, and is
//! returned whole — external consumers (plotting, comparison statistics)
//! only ever read it.

use serde::{Deserialize, Serialize};

/// Why a driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Gradient norm dropped below the tolerance.
    Converged,
    /// The gradient evaluated to NaN/Inf; the unevaluated trailing iterate
    /// was discarded and the partial trace returned.
    NumericalDivergence,
    /// A bounded line search exhausted its budget without an acceptable step.
    DegenerateLineSearch,
    /// The iteration cap was reached; inspect the final gradient norm to
    /// judge the result.
    BudgetExhausted,
}

impl StopReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::NumericalDivergence => "numerical_divergence",
            Self::DegenerateLineSearch => "degenerate_line_search",
            Self::BudgetExhausted => "budget_exhausted",
        }
    }
}

/// Iterates, objective values and gradient snapshots of one run.
///
/// The three sequences are index-aligned: `objectives[k]` and `gradients[k]`
/// belong to `iterates[k]`. An iterate is only kept once its gradient has
/// been evaluated to a finite vector, so a trace never ends in a
/// half-evaluated entry; the initial point is always present (length ≥ 1)
/// even when its own gradient diverges immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterateTrace {
    pub iterates: Vec<Vec<f64>>,
    pub objectives: Vec<f64>,
    pub gradients: Vec<Vec<f64>>,
    pub stop: StopReason,
}

impl IterateTrace {
    /// Open a trace at the initial point with its objective value.
    pub fn start(x0: Vec<f64>, f0: f64) -> Self {
        Self {
            iterates: vec![x0],
            objectives: vec![f0],
            gradients: Vec::new(),
            stop: StopReason::BudgetExhausted,
        }
    }

    /// Append an accepted step (point + objective). Its gradient follows via
    /// [`IterateTrace::push_gradient`] once evaluated.
    pub fn push_step(&mut self, x: Vec<f64>, f: f64) {
        self.iterates.push(x);
        self.objectives.push(f);
    }

    /// Record the gradient snapshot for the newest iterate.
    pub fn push_gradient(&mut self, g: Vec<f64>) {
        debug_assert!(self.gradients.len() < self.iterates.len());
        self.gradients.push(g);
    }

    /// Drop the trailing iterate whose gradient never evaluated to a finite
    /// vector. The initial point is kept so the trace stays non-empty.
    pub fn discard_unevaluated(&mut self) {
        if self.iterates.len() > 1 && self.gradients.len() < self.iterates.len() {
            self.iterates.pop();
            self.objectives.pop();
        }
    }

    /// Number of retained iterates.
    pub fn len(&self) -> usize {
        self.iterates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterates.is_empty()
    }

    /// Last retained iterate.
    pub fn final_point(&self) -> &[f64] {
        self.iterates.last().expect("trace always holds the initial point")
    }

    /// Objective value at the last retained iterate.
    pub fn final_objective(&self) -> f64 {
        *self.objectives.last().expect("trace always holds the initial point")
    }
}
