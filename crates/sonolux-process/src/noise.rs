//! Noise models for simulated data fields.
//!
//! Two flavours: synthetic uniform noise applied to any data field, and
//! recorded in-aqua noise added onto simulated time-series data to make it
//! semi-synthetic (including zeroing channels of broken sensors).

use ndarray::{s, Array2, ArrayD};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProcessError;

/// How noise combines with the underlying data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseMode {
    #[default]
    Additive,
    Multiplicative,
}

/// Uniform noise drawn from `[min, max)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformNoise {
    pub min: f64,
    pub max: f64,
    pub mode: NoiseMode,
}

impl Default for UniformNoise {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            mode: NoiseMode::Additive,
        }
    }
}

impl UniformNoise {
    /// Apply the noise model element-wise, in place.
    pub fn apply(&self, data: &mut ArrayD<f64>, rng: &mut impl Rng) {
        log::debug!(
            "Noise model mode: {:?}, min: {}, max: {}",
            self.mode,
            self.min,
            self.max
        );
        let span = self.max - self.min;
        match self.mode {
            NoiseMode::Additive => {
                data.mapv_inplace(|v| v + rng.random::<f64>() * span + self.min)
            }
            NoiseMode::Multiplicative => {
                data.mapv_inplace(|v| v * rng.random::<f64>() * span + self.min)
            }
        }
    }
}

/// Recorded (in-aqua) noise added onto simulated time-series data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordedNoise {
    /// Scaling factor of the noise data: signal + factor × noise.
    pub scaling_factor: f64,
    /// Channels of broken sensors, zeroed in the simulated signal.
    pub broken_sensors: Vec<usize>,
    /// Reconstruction time-step window `(start, end)`, `start <= end`, used
    /// to centre a shorter noise recording; required when the noise has
    /// fewer samples than the signal.
    pub window: Option<(usize, usize)>,
}

impl Default for RecordedNoise {
    fn default() -> Self {
        Self {
            scaling_factor: 1.0,
            broken_sensors: Vec::new(),
            window: None,
        }
    }
}

impl RecordedNoise {
    /// Combine the simulated signal with the recorded noise, returning a
    /// new array.
    ///
    /// The sensor counts of both arrays must match. Noise with the same
    /// sample count is added across the full duration; shorter noise is
    /// centred around the configured reconstruction window.
    pub fn apply(
        &self,
        signal: &Array2<f64>,
        noise: &Array2<f64>,
    ) -> Result<Array2<f64>, ProcessError> {
        let (sensors, samples) = signal.dim();
        if noise.nrows() != sensors {
            return Err(ProcessError::SensorCountMismatch {
                noise: noise.nrows(),
                signal: sensors,
            });
        }

        let mut result = signal.clone();
        for &index in &self.broken_sensors {
            if index >= sensors {
                return Err(ProcessError::BrokenSensorOutOfRange {
                    index,
                    count: sensors,
                });
            }
            result.row_mut(index).fill(0.0);
        }

        if noise.ncols() == samples {
            result += &(noise * self.scaling_factor);
            return Ok(result);
        }

        // Shorter noise: centre it around the reconstruction window.
        let (window_start, window_end) = self.window.ok_or(ProcessError::NoiseWindowOutOfRange {
            start: 0,
            end: noise.ncols() as isize,
            samples,
        })?;
        if window_end < window_start {
            return Err(ProcessError::NoiseWindowOutOfRange {
                start: window_start as isize,
                end: window_end as isize,
                samples,
            });
        }
        let window_len = window_end + 1 - window_start;
        let margin = (noise.ncols().saturating_sub(window_len) as f64 / 2.0).round() as isize;
        let noise_start = window_start as isize - margin;
        let noise_end = noise_start + noise.ncols() as isize;
        if noise_start < 0 || noise_end > samples as isize {
            return Err(ProcessError::NoiseWindowOutOfRange {
                start: noise_start,
                end: noise_end,
                samples,
            });
        }

        log::info!("Add noise from time step {noise_start} to {noise_end}");
        let mut slice = result.slice_mut(s![.., noise_start as usize..noise_end as usize]);
        slice += &(noise * self.scaling_factor);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_additive_uniform_noise_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut data = ArrayD::zeros(ndarray::IxDyn(&[16, 16]));
        let model = UniformNoise {
            min: 2.0,
            max: 3.0,
            mode: NoiseMode::Additive,
        };
        model.apply(&mut data, &mut rng);
        for &v in &data {
            assert!((2.0..3.0).contains(&v), "out of band: {v}");
        }
    }

    #[test]
    fn test_multiplicative_noise_scales() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut data = ArrayD::from_elem(ndarray::IxDyn(&[8, 8]), 10.0);
        let model = UniformNoise {
            min: 0.0,
            max: 1.0,
            mode: NoiseMode::Multiplicative,
        };
        model.apply(&mut data, &mut rng);
        for &v in &data {
            assert!((0.0..10.0).contains(&v), "out of band: {v}");
        }
    }

    #[test]
    fn test_equal_length_noise_added_with_scaling() {
        let signal = array![[1.0, 2.0], [3.0, 4.0]];
        let noise = array![[0.1, 0.2], [0.3, 0.4]];
        let model = RecordedNoise {
            scaling_factor: 2.0,
            ..Default::default()
        };
        let out = model.apply(&signal, &noise).unwrap();
        assert_relative_eq!(out[[0, 0]], 1.2, epsilon = 1e-12);
        assert_relative_eq!(out[[1, 1]], 4.8, epsilon = 1e-12);
    }

    #[test]
    fn test_broken_sensors_zeroed_before_noise() {
        let signal = array![[1.0, 1.0], [1.0, 1.0]];
        let noise = array![[0.5, 0.5], [0.5, 0.5]];
        let model = RecordedNoise {
            broken_sensors: vec![1],
            ..Default::default()
        };
        let out = model.apply(&signal, &noise).unwrap();
        assert_relative_eq!(out[[0, 0]], 1.5, epsilon = 1e-12);
        // Broken channel keeps only the noise contribution.
        assert_relative_eq!(out[[1, 0]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_sensor_count_mismatch_aborts() {
        let signal = Array2::zeros((4, 10));
        let noise = Array2::zeros((3, 10));
        let model = RecordedNoise::default();
        assert!(matches!(
            model.apply(&signal, &noise),
            Err(ProcessError::SensorCountMismatch {
                noise: 3,
                signal: 4
            })
        ));
    }

    #[test]
    fn test_short_noise_centred_on_window() {
        let signal = Array2::zeros((1, 20));
        let noise = Array2::from_elem((1, 6), 1.0);
        let model = RecordedNoise {
            window: Some((8, 11)),
            ..Default::default()
        };
        let out = model.apply(&signal, &noise).unwrap();
        // Window is [8, 11] (4 steps), margin = round((6-4)/2) = 1, so the
        // noise occupies steps 7..13.
        let hot: Vec<usize> = (0..20).filter(|&t| out[[0, t]] != 0.0).collect();
        assert_eq!(hot, vec![7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_short_noise_without_window_rejected() {
        let signal = Array2::zeros((1, 20));
        let noise = Array2::zeros((1, 6));
        let model = RecordedNoise::default();
        assert!(matches!(
            model.apply(&signal, &noise),
            Err(ProcessError::NoiseWindowOutOfRange { .. })
        ));
    }

    #[test]
    fn test_reversed_window_rejected() {
        let signal = Array2::zeros((1, 20));
        let noise = Array2::zeros((1, 6));
        let model = RecordedNoise {
            window: Some((5, 2)),
            ..Default::default()
        };
        assert!(matches!(
            model.apply(&signal, &noise),
            Err(ProcessError::NoiseWindowOutOfRange {
                start: 5,
                end: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_input_signal_not_mutated() {
        let signal = array![[1.0, 2.0]];
        let noise = array![[1.0, 1.0]];
        let model = RecordedNoise::default();
        let _ = model.apply(&signal, &noise).unwrap();
        assert_eq!(signal, array![[1.0, 2.0]]);
    }
}
