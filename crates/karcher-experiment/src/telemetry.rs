//! Telemetry output: one CSV per optimization run, one row per iterate.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use karcher_manifold::Manifold;
use karcher_opt::IterateTrace;

/// One row in a run CSV.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub driver: String,
    pub model: String,
    pub step: usize,
    pub objective: f64,
    pub grad_norm: f64,
}

/// Flatten a trace into per-step records, computing gradient norms with the
/// metric of the model the run was performed on.
pub fn records_from_trace<M: Manifold>(
    manifold: &M,
    driver: &str,
    model: &str,
    trace: &IterateTrace,
) -> Vec<StepRecord> {
    trace
        .iterates
        .iter()
        .zip(trace.objectives.iter())
        .zip(trace.gradients.iter())
        .enumerate()
        .map(|(step, ((x, &objective), g))| StepRecord {
            driver: driver.to_string(),
            model: model.to_string(),
            step,
            objective,
            grad_norm: manifold.norm(x, g),
        })
        .collect()
}

/// Write a full run to CSV. The stop reason goes into a trailing comment
/// row so a plotting script can annotate the curve.
pub fn write_csv(path: &Path, records: &[StepRecord], stop_label: &str) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(w, "driver,model,step,objective,grad_norm")?;
    for r in records {
        writeln!(
            w,
            "{},{},{},{:.12e},{:.12e}",
            r.driver, r.model, r.step, r.objective, r.grad_norm,
        )?;
    }
    writeln!(w, "# stop: {stop_label}")?;

    w.flush()
}
