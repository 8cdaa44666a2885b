//! Dataset loading for mean-computation experiments.
//!
//! Each line of the file is one test case, comma-separated:
//!
//! ```text
//! dim, p₁…p_dim, p₁…p_dim, …, ref₁…ref_dim
//! ```
//!
//! The first field is the dimension, the last `dim` fields are a
//! high-precision reference mean, everything in between is the sample
//! flattened point by point. All points are Poincaré ball coordinates.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use karcher_manifold::l2_norm;

/// One test case: a sample and the reference mean to compare against.
#[derive(Debug, Clone)]
pub struct MeanCase {
    pub dim: usize,
    pub sample: Vec<Vec<f64>>,
    pub reference: Vec<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("io error reading dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: bad field {field:?}")]
    BadField { line: usize, field: String },

    #[error("line {line}: dimension must be ≥ 1")]
    BadDimension { line: usize },

    #[error("line {line}: expected dim + k·dim + dim fields, got {got}")]
    TruncatedLine { line: usize, got: usize },

    #[error("line {line}: point {index} lies outside the unit ball (‖p‖ = {norm})")]
    OutsideBall { line: usize, index: usize, norm: f64 },
}

/// Parse every case in `path`. Empty lines are skipped.
pub fn load_cases(path: &Path) -> Result<Vec<MeanCase>, DatasetError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut cases = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        cases.push(parse_line(&line, idx + 1)?);
    }
    Ok(cases)
}

fn parse_line(line: &str, line_no: usize) -> Result<MeanCase, DatasetError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    let dim: usize = fields[0]
        .parse()
        .map_err(|_| DatasetError::BadField {
            line: line_no,
            field: fields[0].to_string(),
        })?;
    if dim == 0 {
        return Err(DatasetError::BadDimension { line: line_no });
    }
    // dim field + at least one point + trailing reference
    if fields.len() < 1 + 2 * dim || (fields.len() - 1) % dim != 0 {
        return Err(DatasetError::TruncatedLine {
            line: line_no,
            got: fields.len(),
        });
    }

    let parse_f64 = |s: &str| -> Result<f64, DatasetError> {
        s.parse().map_err(|_| DatasetError::BadField {
            line: line_no,
            field: s.to_string(),
        })
    };

    let point_fields = &fields[1..fields.len() - dim];
    let mut sample = Vec::with_capacity(point_fields.len() / dim);
    for (index, chunk) in point_fields.chunks(dim).enumerate() {
        let point: Vec<f64> = chunk
            .iter()
            .map(|s| parse_f64(s))
            .collect::<Result<_, _>>()?;
        let norm = l2_norm(&point);
        if norm >= 1.0 {
            return Err(DatasetError::OutsideBall {
                line: line_no,
                index,
                norm,
            });
        }
        sample.push(point);
    }

    let reference: Vec<f64> = fields[fields.len() - dim..]
        .iter()
        .map(|s| parse_f64(s))
        .collect::<Result<_, _>>()?;

    Ok(MeanCase {
        dim,
        sample,
        reference,
    })
}
