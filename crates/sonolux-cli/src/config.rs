//! TOML configuration deserialisation for reconstruction jobs.

use std::path::PathBuf;

use serde::Deserialize;

use sonolux_core::config::{GlobalConfig, ReconstructionConfig};
use sonolux_core::types::VolumeSpec;
use sonolux_geometry::DetectionGeometry;
use sonolux_process::crop::CropSettings;
use sonolux_process::noise::UniformNoise;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    /// The simulated volume.
    pub volume: VolumeSpec,
    /// Illumination wavelength (nm) keying the persisted data fields.
    pub wavelength_nm: f64,
    /// Device placement in volume coordinates (mm).
    #[serde(default)]
    pub device_position_mm: Option<[f64; 3]>,
    /// Detection device (tagged: `type = "linear"` or `type = "curved"`).
    pub device: DetectionGeometry,
    pub reconstruction: ReconstructionJobConfig,
    /// Optional uniform noise applied to the time series before
    /// reconstruction.
    #[serde(default)]
    pub noise: Option<UniformNoise>,
    /// Optional cropping applied to the reconstructed image.
    #[serde(default)]
    pub crop: Option<CropSettings>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Reconstruction settings plus the external solver binary wiring.
#[derive(Debug, Deserialize)]
pub struct ReconstructionJobConfig {
    /// The external solver executable.
    pub binary_path: PathBuf,
    /// Directory containing the time-reversal scripts.
    pub script_dir: PathBuf,
    /// Working directory for the solver run.
    pub simulation_dir: PathBuf,
    /// Where the exchange file is written (default: `exchange.sxb` in the
    /// simulation directory).
    #[serde(default)]
    pub exchange_path: Option<PathBuf>,
    #[serde(flatten)]
    pub settings: ReconstructionConfig,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Field-store directory holding the persisted data fields
    /// (default: "./store").
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// Whether to also write the reconstructed image as CSV
    /// (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            save_csv: true,
        }
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("./store")
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    /// The global pipeline configuration this job describes.
    pub fn global_config(&self) -> GlobalConfig {
        GlobalConfig {
            volume: self.volume.clone(),
            wavelength_nm: self.wavelength_nm,
            device_position_mm: self.device_position_mm,
        }
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: JobConfig = toml::from_str(&content)?;
    Ok(config)
}
