//! The time-reversal reconstruction orchestrator.
//!
//! Ties the stage together: geometry validation, channel reordering, sensor
//! rasterization, property gathering, exchange assembly, and the engine
//! call. The adapter never mutates its configuration or the input time
//! series.

use ndarray::{Array2, ArrayD, Ix2};

use sonolux_core::config::{GlobalConfig, ReconstructionConfig};
use sonolux_core::store::FieldStore;
use sonolux_core::types::fields;
use sonolux_geometry::DetectionGeometry;

use crate::engine::ReconstructionEngine;
use crate::exchange::{ExchangeData, SolverParams};
use crate::mask::{gather_acoustic_properties, rasterize_sensor_mask};
use crate::reorder::reorder_time_series;
use crate::ReconError;

/// Runs time-reversal reconstruction for one wavelength.
pub struct TimeReversalAdapter<'a, E: ReconstructionEngine> {
    engine: &'a E,
    store: &'a dyn FieldStore,
    global: &'a GlobalConfig,
    recon: &'a ReconstructionConfig,
}

impl<'a, E: ReconstructionEngine> TimeReversalAdapter<'a, E> {
    pub fn new(
        engine: &'a E,
        store: &'a dyn FieldStore,
        global: &'a GlobalConfig,
        recon: &'a ReconstructionConfig,
    ) -> Self {
        Self {
            engine,
            store,
            global,
            recon,
        }
    }

    /// Reconstruct an image from recorded time-series data.
    ///
    /// Validates the device against the volume, reorders the channels into
    /// the solver's order, rasterizes the sensor mask, gathers the acoustic
    /// properties, and submits the assembled exchange payload.
    pub fn reconstruct(
        &self,
        time_series: &Array2<f64>,
        geometry: &DetectionGeometry,
    ) -> Result<ArrayD<f64>, ReconError> {
        let derived = geometry.validate_against_volume(&self.global.volume)?;
        let positions = geometry.element_positions_global(self.global.device_offset_mm());

        let reordered = reorder_time_series(time_series, &positions)?;
        let sensor_mask = rasterize_sensor_mask(
            &positions,
            self.global.volume.spacing_mm,
            self.global.volume.dims_voxels(),
            self.recon.three_dimensional,
        )?;
        let properties = gather_acoustic_properties(
            self.store,
            self.global.wavelength_nm,
            self.recon.three_dimensional,
        )?;

        let params = SolverParams {
            num_elements: geometry.element_count(),
            directivity_size_m: geometry.element_width_mm() / 1000.0,
            center_frequency_hz: derived.center_frequency_hz,
            bandwidth_percent: derived.bandwidth_percent,
            dt_s: self
                .recon
                .specific_dt_s
                .unwrap_or_else(|| derived.time_per_sample_s()),
            nt: self.recon.specific_nt.unwrap_or(reordered.ncols()),
            spacing_mm: self.global.volume.spacing_mm,
            three_dimensional: self.recon.three_dimensional,
            options: self.recon.solver.clone(),
        };

        log::info!(
            "Reconstructing {} channels x {} samples ({})",
            reordered.nrows(),
            reordered.ncols(),
            if params.three_dimensional { "3D" } else { "2D" },
        );

        let exchange = ExchangeData {
            time_series: reordered,
            sensor_mask,
            properties,
            params,
        };
        Ok(self.engine.submit(&exchange)?)
    }

    /// Load the recorded time series from the field store, reconstruct, and
    /// persist the image under the reconstructed-data field.
    pub fn run(&self, geometry: &DetectionGeometry) -> Result<ArrayD<f64>, ReconError> {
        let wavelength = self.global.wavelength_nm;
        let raw = self.store.load(fields::TIME_SERIES_DATA, wavelength)?;
        let ndim = raw.ndim();
        let time_series = raw
            .into_dimensionality::<Ix2>()
            .map_err(|_| ReconError::BadFieldShape {
                field: fields::TIME_SERIES_DATA.to_string(),
                ndim,
                expected: 2,
            })?;

        let image = self.reconstruct(&time_series, geometry)?;
        self.store.save(&image, fields::RECONSTRUCTED_DATA, wavelength)?;
        Ok(image)
    }
}
