//! # Fréchet Mean Comparison Experiment
//!
//! Runs every optimization driver on every case of a dataset file, on both
//! models of hyperbolic space, and reports the distance of each computed
//! mean to the dataset's high-precision reference.
//!
//! ## Drivers
//!
//! | Name | Algorithm |
//! |------|-----------|
//! | fixed | constant-rate gradient descent |
//! | armijo | backtracking line search |
//! | rbb | Riemannian Barzilai–Borwein |
//! | lbfgs | limited-memory BFGS, strong Wolfe |
//!
//! ## Usage
//!
//! ```text
//! experiment --data points.txt --out-dir ./telemetry --baseline-steps 100000
//! ```
//!
//! Output: `telemetry/case{i}_{driver}_{model}.csv` plus a summary on the log.

use std::path::PathBuf;

use karcher_experiment::baseline::{euclidean_centroid, iterative_mean};
use karcher_experiment::dataset::{load_cases, MeanCase};
use karcher_experiment::telemetry::{records_from_trace, write_csv};

use karcher_manifold::{bridge, Hyperboloid, Manifold, PoincareBall};
use karcher_opt::barzilai::{rbb, RbbParams};
use karcher_opt::descent::{armijo, fixed_step, ArmijoParams, FixedStepParams};
use karcher_opt::lbfgs::{lbfgs, LbfgsParams};
use karcher_opt::objective::{ball_frechet_rgrad, hyperboloid_frechet_rgrad};
use karcher_opt::IterateTrace;

// ─────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Driver {
    Fixed,
    Armijo,
    Rbb,
    Lbfgs,
}

impl Driver {
    const ALL: [Driver; 4] = [Self::Fixed, Self::Armijo, Self::Rbb, Self::Lbfgs];

    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fixed" => Some(Self::Fixed),
            "armijo" => Some(Self::Armijo),
            "rbb" => Some(Self::Rbb),
            "lbfgs" => Some(Self::Lbfgs),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Armijo => "armijo",
            Self::Rbb => "rbb",
            Self::Lbfgs => "lbfgs",
        }
    }
}

struct ExperimentConfig {
    data: PathBuf,
    out_dir: PathBuf,
    drivers: Vec<Driver>,
    baseline_steps: usize,
    fixed_rate: f64,
}

// ─────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("karcher_experiment=info,karcher_opt=warn")
        .init();

    let config = parse_args();

    let cases = load_cases(&config.data).unwrap_or_else(|e| {
        eprintln!("failed to load {}: {e}", config.data.display());
        std::process::exit(1);
    });
    std::fs::create_dir_all(&config.out_dir).expect("failed to create output directory");

    tracing::info!(
        cases = cases.len(),
        data = %config.data.display(),
        "Starting mean comparison experiment"
    );

    for (idx, case) in cases.iter().enumerate() {
        run_case(idx, case, &config);
    }
}

fn run_case(idx: usize, case: &MeanCase, config: &ExperimentConfig) {
    let ball = PoincareBall::new(case.dim);
    let hyp = Hyperboloid::new(case.dim);

    let sample_h: Vec<Vec<f64>> = case
        .sample
        .iter()
        .map(|x| bridge::to_hyperboloid(x).expect("dataset point outside the ball"))
        .collect();
    let x0 = euclidean_centroid(&case.sample);
    let theta0 = bridge::to_hyperboloid(&x0).expect("centroid outside the ball");

    tracing::info!(case = idx, dim = case.dim, points = case.sample.len(), "Case loaded");

    for driver in &config.drivers {
        let ball_trace = run_driver_ball(*driver, &ball, &x0, &case.sample, config);
        report(idx, driver.label(), "ball", &ball, ball_trace.final_point(), case, config, &ball_trace);

        let hyp_trace = run_driver_hyperboloid(*driver, &hyp, &theta0, &sample_h, config);
        let back = bridge::to_ball(hyp_trace.final_point()).expect("iterate left the sheet");
        report(idx, driver.label(), "hyperboloid", &hyp, &back, case, config, &hyp_trace);
    }

    // slow reference: round-robin averaging on both models
    let mean_iter_ball = iterative_mean(&ball, &case.sample, config.baseline_steps);
    let mean_iter_hyp =
        bridge::to_ball(&iterative_mean(&hyp, &sample_h, config.baseline_steps))
            .expect("iterate left the sheet");
    tracing::info!(
        case = idx,
        to_reference_ball = format!("{:.3e}", ball.distance(&mean_iter_ball, &case.reference)),
        to_reference_hyp = format!("{:.3e}", ball.distance(&mean_iter_hyp, &case.reference)),
        steps = config.baseline_steps,
        "Iterative baseline"
    );
}

fn run_driver_ball(
    driver: Driver,
    ball: &PoincareBall,
    x0: &[f64],
    sample: &[Vec<f64>],
    config: &ExperimentConfig,
) -> IterateTrace {
    let grad = |x: &[f64], s: &[Vec<f64>]| ball_frechet_rgrad(ball, x, s);
    match driver {
        Driver::Fixed => fixed_step(
            ball,
            grad,
            x0,
            sample,
            &FixedStepParams {
                step: config.fixed_rate,
                ..FixedStepParams::default()
            },
        ),
        Driver::Armijo => armijo(ball, grad, x0, sample, &ArmijoParams::default()),
        Driver::Rbb => rbb(ball, grad, x0, sample, &RbbParams::default()),
        Driver::Lbfgs => lbfgs(ball, grad, x0, sample, &LbfgsParams::default()),
    }
    .expect("default hyperparameters are valid")
}

fn run_driver_hyperboloid(
    driver: Driver,
    hyp: &Hyperboloid,
    theta0: &[f64],
    sample: &[Vec<f64>],
    config: &ExperimentConfig,
) -> IterateTrace {
    let grad = |x: &[f64], s: &[Vec<f64>]| hyperboloid_frechet_rgrad(hyp, x, s);
    match driver {
        Driver::Fixed => fixed_step(
            hyp,
            grad,
            theta0,
            sample,
            &FixedStepParams {
                step: config.fixed_rate,
                ..FixedStepParams::default()
            },
        ),
        Driver::Armijo => armijo(hyp, grad, theta0, sample, &ArmijoParams::default()),
        Driver::Rbb => rbb(hyp, grad, theta0, sample, &RbbParams::default()),
        Driver::Lbfgs => lbfgs(hyp, grad, theta0, sample, &LbfgsParams::default()),
    }
    .expect("default hyperparameters are valid")
}

#[allow(clippy::too_many_arguments)]
fn report<M: Manifold>(
    case: usize,
    driver: &str,
    model: &str,
    manifold: &M,
    mean_in_ball: &[f64],
    mean_case: &MeanCase,
    config: &ExperimentConfig,
    trace: &IterateTrace,
) {
    let ball = PoincareBall::new(mean_case.dim);
    let to_reference = ball.distance(mean_in_ball, &mean_case.reference);

    let records = records_from_trace(manifold, driver, model, trace);
    let path = config
        .out_dir
        .join(format!("case{case}_{driver}_{model}.csv"));
    write_csv(&path, &records, trace.stop.label()).expect("failed to write CSV");

    tracing::info!(
        case,
        driver,
        model,
        iterates = trace.len(),
        stop = trace.stop.label(),
        objective = format!("{:.6e}", trace.final_objective()),
        to_reference = format!("{:.3e}", to_reference),
        "Run complete"
    );
}

/// Minimal argument parser (no external deps).
fn parse_args() -> ExperimentConfig {
    let args: Vec<String> = std::env::args().collect();

    let mut data = PathBuf::from("points.txt");
    let mut out_dir = PathBuf::from("./telemetry");
    let mut drivers: Vec<Driver> = Driver::ALL.to_vec();
    let mut baseline_steps: usize = 100_000;
    let mut fixed_rate: f64 = 0.3;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data" => {
                i += 1;
                data = PathBuf::from(&args[i]);
            }
            "--out-dir" => {
                i += 1;
                out_dir = PathBuf::from(&args[i]);
            }
            "--driver" => {
                i += 1;
                let d = Driver::from_str(&args[i]).unwrap_or_else(|| {
                    eprintln!("Unknown driver '{}'. Use: fixed, armijo, rbb, lbfgs", args[i]);
                    std::process::exit(1);
                });
                drivers = vec![d];
            }
            "--baseline-steps" => {
                i += 1;
                baseline_steps = args[i].parse().unwrap_or(100_000);
            }
            "--fixed-rate" => {
                i += 1;
                fixed_rate = args[i].parse().unwrap_or(0.3);
            }
            "--help" | "-h" => {
                eprintln!("Usage: experiment [--data PATH] [--out-dir PATH] [--driver fixed|armijo|rbb|lbfgs] [--baseline-steps N] [--fixed-rate ETA]");
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    ExperimentConfig {
        data,
        out_dir,
        drivers,
        baseline_steps,
        fixed_rate,
    }
}
