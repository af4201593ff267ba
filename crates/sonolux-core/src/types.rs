//! Core types shared across the Sonolux toolkit.
//!
//! This module defines the fundamental data structures used throughout the
//! reconstruction pipeline: the simulated volume grid, derived sensor
//! parameters, and acoustic property identifiers.

use serde::{Deserialize, Serialize};

/// The physical extent and discretisation of the simulated tissue volume.
///
/// The grid is implicit: voxel index = `round(position_mm / spacing_mm)`.
/// An index outside `[0, dim)` for a point physically inside the volume
/// indicates a configuration error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeSpec {
    /// Lateral extent along x (mm).
    pub x_mm: f64,
    /// Elevational extent along y (mm).
    pub y_mm: f64,
    /// Depth extent along z (mm).
    pub z_mm: f64,
    /// Uniform voxel spacing (mm).
    pub spacing_mm: f64,
}

impl VolumeSpec {
    /// Voxel dimensions `[x, y, z]` of the discretised volume.
    pub fn dims_voxels(&self) -> [usize; 3] {
        [
            (self.x_mm / self.spacing_mm).round() as usize,
            (self.y_mm / self.spacing_mm).round() as usize,
            (self.z_mm / self.spacing_mm).round() as usize,
        ]
    }
}

/// Acoustic sensor parameters derived from a validated detection device.
///
/// Returned explicitly by geometry validation for downstream consumption,
/// rather than being written back into a shared settings object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSensorParams {
    /// Center frequency of the detector elements (Hz).
    pub center_frequency_hz: f64,
    /// Sampling frequency of the data acquisition (MHz).
    pub sampling_frequency_mhz: f64,
    /// Fractional bandwidth of the detector elements (%).
    pub bandwidth_percent: f64,
}

impl DerivedSensorParams {
    /// Time per sample (s), `1 / (f_s * 1e6)`.
    pub fn time_per_sample_s(&self) -> f64 {
        1.0 / (self.sampling_frequency_mhz * 1e6)
    }
}

/// Acoustic material properties consumed by the time-reversal solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcousticProperty {
    SpeedOfSound,
    Density,
    AlphaCoeff,
}

impl AcousticProperty {
    /// All properties the reconstruction stage attempts to gather.
    pub const ALL: [AcousticProperty; 3] = [
        AcousticProperty::SpeedOfSound,
        AcousticProperty::Density,
        AcousticProperty::AlphaCoeff,
    ];

    /// The data-field name under which this property is persisted.
    pub fn field_name(&self) -> &'static str {
        match self {
            AcousticProperty::SpeedOfSound => fields::SPEED_OF_SOUND,
            AcousticProperty::Density => fields::DENSITY,
            AcousticProperty::AlphaCoeff => fields::ALPHA_COEFF,
        }
    }
}

/// Well-known data-field names used by the pipeline stages.
pub mod fields {
    /// Recorded pressure time series, shape (channel, time sample).
    pub const TIME_SERIES_DATA: &str = "time_series_data";
    /// Reconstructed initial pressure image.
    pub const RECONSTRUCTED_DATA: &str = "reconstructed_data";
    /// Speed of sound map (m/s).
    pub const SPEED_OF_SOUND: &str = "speed_of_sound";
    /// Tissue density map (kg/m³).
    pub const DENSITY: &str = "density";
    /// Acoustic attenuation coefficient map.
    pub const ALPHA_COEFF: &str = "alpha_coeff";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_dims_round_to_nearest() {
        let volume = VolumeSpec {
            x_mm: 40.0,
            y_mm: 20.0,
            z_mm: 25.05,
            spacing_mm: 0.1,
        };
        assert_eq!(volume.dims_voxels(), [400, 200, 251]);
    }

    #[test]
    fn test_time_per_sample() {
        let params = DerivedSensorParams {
            center_frequency_hz: 3.96e6,
            sampling_frequency_mhz: 40.0,
            bandwidth_percent: 55.0,
        };
        assert!((params.time_per_sample_s() - 2.5e-8).abs() < 1e-20);
    }
}
