//! Curved (arc) detection arrays.
//!
//! Elements sit on a circular arc of configurable radius. Each element's
//! angular position is `(i - n/2 + 0.5) * pitch / radius`; the half-step
//! offset keeps even element counts symmetric about the array midline
//! without a double-counted centre element.

use serde::{Deserialize, Serialize};

use crate::detection::GeometryError;

/// Placement convention for arc elements in the local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "convention", rename_all = "snake_case")]
pub enum CurvedConvention {
    /// Elements directly on a circle about the curvature centre, rotated by
    /// a fixed angular origin offset (π puts the arc below the centre).
    Circular { angular_origin_offset_rad: f64 },
    /// Element depth derived from the arc equation
    /// `z = focus_z − sqrt(r² − (r·sinθ)²)` so the arc curves toward the
    /// focus point at `(0, 0, focus_offset_mm)`.
    FocusRelative { focus_offset_mm: f64 },
}

impl Default for CurvedConvention {
    fn default() -> Self {
        CurvedConvention::Circular {
            angular_origin_offset_rad: std::f64::consts::PI,
        }
    }
}

/// A digital twin of an ultrasound detection device with a curved detection
/// geometry. The local origin is the centre of curvature (the focus).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvedArray {
    /// Center-to-center element spacing along the arc (mm).
    pub pitch_mm: f64,
    /// Curvature radius of the arc (mm).
    pub radius_mm: f64,
    /// Number of detector elements.
    pub num_elements: usize,
    /// In-plane width of one element (mm).
    pub element_width_mm: f64,
    /// Elevational length of one element (mm).
    pub element_length_mm: f64,
    /// Center frequency (Hz).
    pub center_frequency_hz: f64,
    /// Fractional bandwidth (%).
    pub bandwidth_percent: f64,
    /// Sampling frequency (MHz).
    pub sampling_frequency_mhz: f64,
    /// Element placement convention.
    pub convention: CurvedConvention,
}

impl Default for CurvedArray {
    fn default() -> Self {
        Self {
            pitch_mm: 0.5,
            radius_mm: 40.0,
            num_elements: 256,
            element_width_mm: 0.24,
            element_length_mm: 13.0,
            center_frequency_hz: 3.96e6,
            bandwidth_percent: 55.0,
            sampling_frequency_mhz: 40.0,
            convention: CurvedConvention::default(),
        }
    }
}

impl CurvedArray {
    /// Chord width of the probe (mm), spanned by half the elements on
    /// either side of the midline.
    pub fn probe_width_mm(&self) -> f64 {
        let half_span = self.pitch_mm / self.radius_mm * self.num_elements as f64 / 2.0;
        2.0 * half_span.sin() * self.radius_mm
    }

    /// Angular position of each element (rad), symmetric about the midline.
    fn element_angles(&self) -> impl Iterator<Item = f64> + '_ {
        let pitch_angle = self.pitch_mm / self.radius_mm;
        let half = self.num_elements as f64 / 2.0;
        (0..self.num_elements).map(move |i| (i as f64 - half + 0.5) * pitch_angle)
    }

    /// Element positions in the device frame (mm).
    pub fn element_positions_local(&self) -> Vec<[f64; 3]> {
        log::debug!("pitch angle: {}", self.pitch_mm / self.radius_mm);
        let r = self.radius_mm;
        match self.convention {
            CurvedConvention::Circular {
                angular_origin_offset_rad: offset,
            } => self
                .element_angles()
                .map(|theta| {
                    [
                        (theta - offset).sin() * r,
                        0.0,
                        (theta - offset).cos() * r,
                    ]
                })
                .collect(),
            CurvedConvention::FocusRelative { focus_offset_mm } => self
                .element_angles()
                .map(|theta| {
                    let x = r * theta.sin();
                    [x, 0.0, focus_offset_mm - (r * r - x * x).sqrt()]
                })
                .collect(),
        }
    }

    /// The focus point of the arc in the device frame (mm).
    pub fn focus_point_local(&self) -> [f64; 3] {
        match self.convention {
            CurvedConvention::Circular { .. } => [0.0, 0.0, 0.0],
            CurvedConvention::FocusRelative { focus_offset_mm } => [0.0, 0.0, focus_offset_mm],
        }
    }

    /// Unit orientation vectors pointing from each element toward the focus.
    ///
    /// Fails if an element coincides with the focus point, which would make
    /// its orientation non-finite.
    pub fn element_orientations(&self) -> Result<Vec<[f64; 3]>, GeometryError> {
        let focus = self.focus_point_local();
        self.element_positions_local()
            .into_iter()
            .enumerate()
            .map(|(element, p)| {
                let v = [focus[0] - p[0], focus[1] - p[1], focus[2] - p[2]];
                let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
                if !norm.is_finite() || norm < 1e-9 {
                    return Err(GeometryError::DegenerateOrientation { element });
                }
                Ok([v[0] / norm, v[1] / norm, v[2] / norm])
            })
            .collect()
    }
}
