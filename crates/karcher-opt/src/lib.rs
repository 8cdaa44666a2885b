//! # karcher-opt
//!
//! Riemannian optimization drivers for computing the Fréchet (Karcher) mean
//! of a point sample on a hyperbolic manifold. Every driver is generic over
//! the [`karcher_manifold::Manifold`] contract, so the same algorithm runs on
//! the Poincaré ball and on the hyperboloid model unchanged.
//!
//! ## Drivers
//!
//! | Driver | Step selection |
//! |---|---|
//! | [`descent::fixed_step`] | constant learning rate |
//! | [`descent::armijo`] | backtracking sufficient-decrease search |
//! | [`barzilai::rbb`] | Riemannian Barzilai–Borwein adaptive step |
//! | [`lbfgs::lbfgs`] | two-loop recursion, unit step or strong Wolfe |
//!
//! ## Iteration contract
//!
//! Every driver takes a manifold, a gradient function, an initial point, the
//! immutable sample and a hyperparameter struct, and returns an
//! [`trace::IterateTrace`]: three parallel sequences (iterates, objective
//! values, gradient snapshots) plus the [`trace::StopReason`]. Runs stop on
//! gradient norm below tolerance, on a non-finite gradient (the unevaluated
//! trailing iterate is discarded) or on budget exhaustion. Numerical failure
//! is terminal for a run — it yields a well-formed partial trace, never a
//! panic or an error value.

pub mod barzilai;
pub mod descent;
pub mod error;
pub mod lbfgs;
pub mod objective;
pub mod trace;
pub mod wolfe;

pub use error::OptError;
pub use trace::{IterateTrace, StopReason};
