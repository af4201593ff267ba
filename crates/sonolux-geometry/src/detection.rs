//! The detection-geometry variant and its shared capability surface.
//!
//! Every array type exposes the same three views of its elements: local
//! ("base") positions in the device frame, unit orientation vectors along the
//! sensitive axis, and global positions after applying the device placement.
//! Validation against a target volume yields the derived sensor parameters
//! consumed by the reconstruction stage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sonolux_core::types::{DerivedSensorParams, VolumeSpec};

use crate::curved::CurvedArray;
use crate::linear::LinearArray;

/// Errors from detection-geometry construction and validation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Detection array must have at least one element")]
    NoElements,

    #[error("Invalid {name}: {value} mm (must be positive)")]
    NonPositiveParameter { name: &'static str, value: f64 },

    #[error(
        "Element arc spans {span_rad:.3} rad; the pitch span must stay below \
         a half circle for radius {radius_mm} mm"
    )]
    ArcTooLong { span_rad: f64, radius_mm: f64 },

    #[error("Element {element} coincides with the focus point; orientation is undefined")]
    DegenerateOrientation { element: usize },

    #[error(
        "Volume {axis} dimension is too small to encompass the device in simulation! \
         Must be larger than {required_mm} mm but was {actual_mm} mm"
    )]
    VolumeTooSmall {
        axis: char,
        required_mm: f64,
        actual_mm: f64,
    },
}

/// A detection array that can record photoacoustic time-series data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetectionGeometry {
    Linear(LinearArray),
    Curved(CurvedArray),
}

impl DetectionGeometry {
    /// Number of detector elements.
    pub fn element_count(&self) -> usize {
        match self {
            DetectionGeometry::Linear(a) => a.num_elements,
            DetectionGeometry::Curved(a) => a.num_elements,
        }
    }

    /// Center-to-center spacing between adjacent elements (mm).
    pub fn pitch_mm(&self) -> f64 {
        match self {
            DetectionGeometry::Linear(a) => a.pitch_mm,
            DetectionGeometry::Curved(a) => a.pitch_mm,
        }
    }

    /// In-plane width of a single element (mm).
    pub fn element_width_mm(&self) -> f64 {
        match self {
            DetectionGeometry::Linear(a) => a.element_width_mm,
            DetectionGeometry::Curved(a) => a.element_width_mm,
        }
    }

    /// Elevational length of a single element (mm).
    pub fn element_length_mm(&self) -> f64 {
        match self {
            DetectionGeometry::Linear(a) => a.element_length_mm,
            DetectionGeometry::Curved(a) => a.element_length_mm,
        }
    }

    /// Total lateral footprint of the probe (mm), derived from pitch and
    /// element count (and curvature radius for curved arrays).
    pub fn probe_width_mm(&self) -> f64 {
        match self {
            DetectionGeometry::Linear(a) => a.probe_width_mm(),
            DetectionGeometry::Curved(a) => a.probe_width_mm(),
        }
    }

    /// Element positions in the device-centred frame (mm).
    ///
    /// The origin convention depends on the variant: the array midpoint for
    /// linear arrays, the geometric focus or curvature centre for curved
    /// arrays.
    pub fn element_positions_local(&self) -> Vec<[f64; 3]> {
        match self {
            DetectionGeometry::Linear(a) => a.element_positions_local(),
            DetectionGeometry::Curved(a) => a.element_positions_local(),
        }
    }

    /// Unit orientation vectors along each element's sensitive axis.
    ///
    /// Fails if any element's orientation is undefined (element coinciding
    /// with the focus point); this is a configuration error, never silently
    /// tolerated.
    pub fn element_orientations(&self) -> Result<Vec<[f64; 3]>, GeometryError> {
        match self {
            DetectionGeometry::Linear(a) => Ok(a.element_orientations()),
            DetectionGeometry::Curved(a) => a.element_orientations(),
        }
    }

    /// Element positions in volume coordinates (mm), composing the local
    /// frame with the device placement offset.
    pub fn element_positions_global(&self, device_position_mm: [f64; 3]) -> Vec<[f64; 3]> {
        self.element_positions_local()
            .into_iter()
            .map(|p| {
                [
                    p[0] + device_position_mm[0],
                    p[1] + device_position_mm[1],
                    p[2] + device_position_mm[2],
                ]
            })
            .collect()
    }

    /// Check that the configured probe physically fits inside the target
    /// volume, strictly along every relevant axis.
    ///
    /// On success, returns the acoustic sensor parameters the device imposes
    /// on downstream stages.
    pub fn validate_against_volume(
        &self,
        volume: &VolumeSpec,
    ) -> Result<DerivedSensorParams, GeometryError> {
        self.check_parameters()?;

        if let DetectionGeometry::Curved(a) = self {
            let required_z = a.radius_mm + 1.0;
            if volume.z_mm <= required_z {
                log::error!(
                    "Volume z dimension {} mm cannot encompass the curved array (needs > {} mm)",
                    volume.z_mm,
                    required_z
                );
                return Err(GeometryError::VolumeTooSmall {
                    axis: 'z',
                    required_mm: required_z,
                    actual_mm: volume.z_mm,
                });
            }
        }

        let probe_width = self.probe_width_mm();
        if volume.x_mm <= probe_width {
            log::error!(
                "Volume x dimension {} mm cannot encompass the probe (needs > {} mm)",
                volume.x_mm,
                probe_width
            );
            return Err(GeometryError::VolumeTooSmall {
                axis: 'x',
                required_mm: probe_width,
                actual_mm: volume.x_mm,
            });
        }

        Ok(match self {
            DetectionGeometry::Linear(a) => DerivedSensorParams {
                center_frequency_hz: a.center_frequency_hz,
                sampling_frequency_mhz: a.sampling_frequency_mhz,
                bandwidth_percent: a.bandwidth_percent,
            },
            DetectionGeometry::Curved(a) => DerivedSensorParams {
                center_frequency_hz: a.center_frequency_hz,
                sampling_frequency_mhz: a.sampling_frequency_mhz,
                bandwidth_percent: a.bandwidth_percent,
            },
        })
    }

    fn check_parameters(&self) -> Result<(), GeometryError> {
        if self.element_count() == 0 {
            return Err(GeometryError::NoElements);
        }
        if self.pitch_mm() <= 0.0 {
            return Err(GeometryError::NonPositiveParameter {
                name: "pitch",
                value: self.pitch_mm(),
            });
        }
        if let DetectionGeometry::Curved(a) = self {
            if a.radius_mm <= 0.0 {
                return Err(GeometryError::NonPositiveParameter {
                    name: "radius",
                    value: a.radius_mm,
                });
            }
            let half_span = a.num_elements as f64 / 2.0 * a.pitch_mm / a.radius_mm;
            if half_span >= std::f64::consts::PI {
                return Err(GeometryError::ArcTooLong {
                    span_rad: 2.0 * half_span,
                    radius_mm: a.radius_mm,
                });
            }
        }
        Ok(())
    }
}
