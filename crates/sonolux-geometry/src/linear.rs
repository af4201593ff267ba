//! Linear detection arrays.

use serde::{Deserialize, Serialize};

/// A digital twin of an ultrasound detection device with a linear detection
/// geometry. The local origin is the midpoint of the array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearArray {
    /// Center-to-center element spacing (mm).
    pub pitch_mm: f64,
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
}

impl Default for LinearArray {
    fn default() -> Self {
        Self {
            pitch_mm: 0.5,
            num_elements: 100,
            element_width_mm: 0.24,
            element_length_mm: 0.5,
            center_frequency_hz: 3.96e6,
            bandwidth_percent: 55.0,
            sampling_frequency_mhz: 40.0,
        }
    }
}

impl LinearArray {
    /// Total lateral footprint of the probe (mm).
    pub fn probe_width_mm(&self) -> f64 {
        self.num_elements as f64 * self.pitch_mm
    }

    /// Element positions in the device frame: a straight line along x,
    /// centred on the origin and spaced by the pitch.
    pub fn element_positions_local(&self) -> Vec<[f64; 3]> {
        let half = (self.num_elements as f64 - 1.0) / 2.0;
        (0..self.num_elements)
            .map(|i| [(i as f64 - half) * self.pitch_mm, 0.0, 0.0])
            .collect()
    }

    /// Constant unit orientation along the depth axis, pointing into the
    /// tissue (away from the device).
    pub fn element_orientations(&self) -> Vec<[f64; 3]> {
        vec![[0.0, 0.0, 1.0]; self.num_elements]
    }
}
