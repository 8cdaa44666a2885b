//! Error types for optimizer configuration.

/// Errors raised by hyperparameter validation.
///
/// Numerical trouble during a run (NaN gradients, unresolved line searches)
/// is reported through [`crate::trace::StopReason`] on the returned trace,
/// never through this type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OptError {
    /// A hyperparameter was outside its valid range.
    #[error("invalid hyperparameter {name}: {value}")]
    InvalidHyperparameter { name: &'static str, value: f64 },

    /// The L-BFGS history capacity must be at least 1.
    #[error("L-BFGS memory must be ≥ 1, got {got}")]
    EmptyMemory { got: usize },
}
