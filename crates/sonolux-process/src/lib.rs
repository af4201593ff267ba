//! # Sonolux Processing
//!
//! Post-processing components applied before or after the reconstruction
//! core:
//!
//! - [`noise`] — Uniform noise models and recorded (in-aqua) additive noise
//!   with broken-sensor handling.
//! - [`crop`] — Image cropping: explicit windows, top-centre crops, and
//!   power-of-two shrinking for FFT-friendly dimensions.

pub mod crop;
pub mod noise;

use thiserror::Error;

/// Errors from post-processing components.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(
        "Number of sensors do not match between noisy ({noise}) and \
         simulated ({signal}) time series data"
    )]
    SensorCountMismatch { noise: usize, signal: usize },

    #[error("Broken sensor index {index} exceeds the {count} available channels")]
    BrokenSensorOutOfRange { index: usize, count: usize },

    #[error(
        "Noise window [{start}, {end}) does not fit the {samples}-sample \
         time series"
    )]
    NoiseWindowOutOfRange {
        start: isize,
        end: isize,
        samples: usize,
    },

    #[error("Crop of {target:?} at offset {offset:?} exceeds the {input:?} image")]
    CropOutOfBounds {
        offset: [usize; 2],
        target: [usize; 2],
        input: [usize; 2],
    },
}
