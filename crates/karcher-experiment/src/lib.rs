//! # karcher-experiment
//!
//! Harness for comparing Fréchet mean solvers across the two models of
//! hyperbolic space.
//!
//! A dataset file provides point samples together with a high-precision
//! reference mean. For every sample the harness runs each optimization
//! driver twice, once on the Poincaré ball and once on the hyperboloid
//! (mapping the sample through the chart bridge), plus the slow iterative
//! baseline, and reports how close each run lands to the reference.
//!
//! Per-step telemetry goes to one CSV per (driver, model) pair.

pub mod baseline;
pub mod dataset;
pub mod telemetry;
