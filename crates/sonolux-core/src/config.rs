//! Explicit pipeline configuration.
//!
//! Each stage receives an immutable configuration struct, and anything a
//! stage derives (e.g. sensor parameters from geometry validation) is
//! returned explicitly instead of written back into shared settings.

use serde::{Deserialize, Serialize};

use crate::types::VolumeSpec;

/// Global simulation context consumed by every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// The simulated tissue volume and its discretisation.
    pub volume: VolumeSpec,
    /// Illumination wavelength (nm) keying the persisted data fields.
    pub wavelength_nm: f64,
    /// Placement of the device origin in volume coordinates (mm).
    /// `None` means the device frame coincides with the volume frame.
    #[serde(default)]
    pub device_position_mm: Option<[f64; 3]>,
}

impl GlobalConfig {
    /// The device placement offset, identity when unset.
    pub fn device_offset_mm(&self) -> [f64; 3] {
        self.device_position_mm.unwrap_or([0.0, 0.0, 0.0])
    }
}

/// Configuration of the time-reversal reconstruction stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconstructionConfig {
    /// Run the acoustic model in 3D (default: 2D).
    #[serde(default)]
    pub three_dimensional: bool,
    /// Explicit solver time step (s); derived from the sampling frequency
    /// when unset.
    #[serde(default)]
    pub specific_dt_s: Option<f64>,
    /// Explicit number of solver time steps; taken from the time-series
    /// sample count when unset.
    #[serde(default)]
    pub specific_nt: Option<usize>,
    /// Options forwarded verbatim to the external solver.
    #[serde(default)]
    pub solver: SolverOptions,
}

/// Pass-through options for the external wave solver. All optional; unset
/// options are omitted from the exchange file and the solver applies its
/// own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Power-law absorption exponent.
    #[serde(default)]
    pub alpha_power: Option<f64>,
    /// Run the solver on the GPU.
    #[serde(default)]
    pub gpu: Option<bool>,
    /// Place the perfectly matched layer inside the grid.
    #[serde(default)]
    pub pml_inside: Option<bool>,
    /// PML absorption coefficient.
    #[serde(default)]
    pub pml_alpha: Option<f64>,
    /// Visualise the PML during the solve.
    #[serde(default)]
    pub plot_pml: Option<bool>,
    /// Record a movie of the propagating wave field.
    #[serde(default)]
    pub record_movie: Option<bool>,
    /// File name for the recorded movie.
    #[serde(default)]
    pub movie_name: Option<String>,
    /// Log-scale compression of the recorded field.
    #[serde(default)]
    pub log_scale: Option<bool>,
    /// Sensor directivity pattern identifier.
    #[serde(default)]
    pub directivity_pattern: Option<String>,
}
