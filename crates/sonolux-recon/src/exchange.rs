//! The struct-of-arrays exchange payload handed to the external solver.
//!
//! The payload is written to a single binary file at a configured path; the
//! solver writes its companion output file at the same path with a `tr`
//! suffix, containing named result fields.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayD};
use serde::{Deserialize, Serialize};

use sonolux_core::config::SolverOptions;

use crate::engine::EngineError;

/// Scalar parameters forwarded to the time-reversal routine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverParams {
    /// Number of detector elements.
    pub num_elements: usize,
    /// Directivity size of one element (m).
    pub directivity_size_m: f64,
    /// Sensor center frequency (Hz).
    pub center_frequency_hz: f64,
    /// Sensor fractional bandwidth (%).
    pub bandwidth_percent: f64,
    /// Sampling interval (s).
    pub dt_s: f64,
    /// Number of recorded time samples.
    pub nt: usize,
    /// Voxel spacing of the grid (mm).
    pub spacing_mm: f64,
    /// Whether the acoustic model runs in 3D.
    pub three_dimensional: bool,
    /// Optional pass-through solver options.
    pub options: SolverOptions,
}

/// Everything the external solver needs for one reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeData {
    /// Recorded pressure, shape (channel, time sample), already reordered
    /// into the solver's mask-traversal order.
    pub time_series: Array2<f64>,
    /// Binary sensor mask over the voxel grid.
    pub sensor_mask: ArrayD<f64>,
    /// Acoustic property maps keyed by field name.
    pub properties: BTreeMap<String, ArrayD<f64>>,
    /// Scalar solver parameters.
    pub params: SolverParams,
}

/// Named result fields written by the solver.
pub type SolverOutput = BTreeMap<String, ArrayD<f64>>;

/// The companion output path for an exchange file: `<path>tr`.
pub fn output_path_for(exchange_path: &Path) -> PathBuf {
    let mut name = exchange_path.as_os_str().to_os_string();
    name.push("tr");
    PathBuf::from(name)
}

/// Serialize the exchange payload to `path`.
pub fn write_exchange(data: &ExchangeData, path: &Path) -> Result<(), EngineError> {
    let writer = BufWriter::new(File::create(path)?);
    Ok(bincode::serialize_into(writer, data)?)
}

/// Parse the solver's named output fields from `path`.
pub fn read_solver_output(path: &Path) -> Result<SolverOutput, EngineError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}
