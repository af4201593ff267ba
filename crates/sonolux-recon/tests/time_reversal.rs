//! Integration test: full reconstruction stage with an injected fake engine.
//!
//! Exercises the 256-element curved-array scenario end to end without a real
//! external solver binary: geometry validation, channel reordering, sensor
//! rasterization, property gathering, and exchange assembly.

use std::cell::RefCell;
use std::collections::BTreeMap;

use approx::assert_relative_eq;
use ndarray::{Array2, ArrayD};

use sonolux_core::config::{GlobalConfig, ReconstructionConfig};
use sonolux_core::store::{FieldStore, MemoryFieldStore};
use sonolux_core::types::{fields, VolumeSpec};
use sonolux_geometry::{CurvedArray, CurvedConvention, DetectionGeometry};
use sonolux_recon::adapter::TimeReversalAdapter;
use sonolux_recon::engine::{EngineError, ReconstructionEngine};
use sonolux_recon::exchange::ExchangeData;
use sonolux_recon::ReconError;

/// Records the submitted exchange and returns a mask-shaped image.
#[derive(Default)]
struct FakeEngine {
    submitted: RefCell<Option<ExchangeData>>,
}

impl ReconstructionEngine for FakeEngine {
    fn submit(&self, exchange: &ExchangeData) -> Result<ArrayD<f64>, EngineError> {
        *self.submitted.borrow_mut() = Some(exchange.clone());
        Ok(ArrayD::zeros(exchange.sensor_mask.shape()))
    }
}

fn curved_probe() -> DetectionGeometry {
    DetectionGeometry::Curved(CurvedArray {
        pitch_mm: 0.5,
        radius_mm: 40.0,
        num_elements: 256,
        convention: CurvedConvention::FocusRelative { focus_offset_mm: 0.0 },
        ..Default::default()
    })
}

fn configs() -> (GlobalConfig, ReconstructionConfig) {
    let global = GlobalConfig {
        volume: VolumeSpec {
            x_mm: 90.0,
            y_mm: 20.0,
            z_mm: 45.0,
            spacing_mm: 0.5,
        },
        wavelength_nm: 800.0,
        // Device at its focus, 40 mm above the probe face.
        device_position_mm: Some([45.0, 0.0, 42.0]),
    };
    (global, ReconstructionConfig::default())
}

#[test]
fn test_curved_array_reconstruction_pipeline() {
    let (global, recon) = configs();
    let geometry = curved_probe();
    let store = MemoryFieldStore::new();
    store
        .save(
            &ArrayD::from_elem(ndarray::IxDyn(&[90, 180]), 1500.0),
            fields::SPEED_OF_SOUND,
            800.0,
        )
        .unwrap();

    let engine = FakeEngine::default();
    let adapter = TimeReversalAdapter::new(&engine, &store, &global, &recon);

    let time_series = Array2::from_shape_fn((256, 512), |(c, t)| c as f64 + t as f64 * 1e-3);
    let image = adapter.reconstruct(&time_series, &geometry).unwrap();

    // 2D mask over (z, x) voxels; the fake engine mirrors its shape.
    assert_eq!(image.shape(), &[90, 180]);

    let exchange = engine.submitted.borrow().clone().unwrap();
    assert_eq!(exchange.time_series.dim(), (256, 512));
    // Elements collapsing into a shared voxel collapse in the mask too; the
    // hot-voxel count equals the number of distinct element voxels.
    let positions = geometry.element_positions_global(global.device_offset_mm());
    let distinct: std::collections::HashSet<(i64, i64)> = positions
        .iter()
        .map(|p| ((p[2] / 0.5).round() as i64, (p[0] / 0.5).round() as i64))
        .collect();
    assert_eq!(exchange.sensor_mask.sum(), distinct.len() as f64);
    assert_eq!(exchange.params.num_elements, 256);
    assert_eq!(exchange.params.nt, 512);
    assert_relative_eq!(exchange.params.dt_s, 2.5e-8, epsilon = 1e-20);
    assert_relative_eq!(exchange.params.directivity_size_m, 2.4e-4, epsilon = 1e-12);
    assert!(exchange.properties.contains_key(fields::SPEED_OF_SOUND));

    // Channels arrive permuted (each encodes its source element in its first
    // sample) and sorted ascending in the elements' global x coordinate.
    let mut seen = vec![false; 256];
    let mut previous_x = f64::NEG_INFINITY;
    for channel in 0..256 {
        let source = exchange.time_series[[channel, 0]] as usize;
        assert!(!seen[source], "channel {source} appeared twice");
        seen[source] = true;
        let x = positions[source][0];
        assert!(x >= previous_x, "x order violated at channel {channel}");
        previous_x = x;
    }
}

#[test]
fn test_run_persists_reconstructed_image() {
    let (global, recon) = configs();
    let geometry = curved_probe();
    let store = MemoryFieldStore::new();
    store
        .save(
            &Array2::from_elem((256, 128), 0.5).into_dyn(),
            fields::TIME_SERIES_DATA,
            800.0,
        )
        .unwrap();

    let engine = FakeEngine::default();
    let adapter = TimeReversalAdapter::new(&engine, &store, &global, &recon);
    let image = adapter.run(&geometry).unwrap();

    let persisted = store.load(fields::RECONSTRUCTED_DATA, 800.0).unwrap();
    assert_eq!(persisted, image);
}

#[test]
fn test_volume_too_small_aborts_before_engine() {
    let (mut global, recon) = configs();
    global.volume.x_mm = 70.0; // narrower than the ~80 mm probe
    let geometry = curved_probe();
    let store = MemoryFieldStore::new();
    let engine = FakeEngine::default();
    let adapter = TimeReversalAdapter::new(&engine, &store, &global, &recon);

    let time_series = Array2::zeros((256, 128));
    let err = adapter.reconstruct(&time_series, &geometry).unwrap_err();
    assert!(matches!(err, ReconError::Geometry(_)));
    assert!(engine.submitted.borrow().is_none());
}

#[test]
fn test_channel_mismatch_aborts() {
    let (global, recon) = configs();
    let geometry = curved_probe();
    let store = MemoryFieldStore::new();
    let engine = FakeEngine::default();
    let adapter = TimeReversalAdapter::new(&engine, &store, &global, &recon);

    let time_series = Array2::zeros((100, 128));
    assert!(matches!(
        adapter.reconstruct(&time_series, &geometry),
        Err(ReconError::ChannelCountMismatch { .. })
    ));
}

#[test]
fn test_non_2d_time_series_field_rejected() {
    let (global, recon) = configs();
    let geometry = curved_probe();
    let store = MemoryFieldStore::new();
    store
        .save(
            &ArrayD::zeros(ndarray::IxDyn(&[2, 3, 4])),
            fields::TIME_SERIES_DATA,
            800.0,
        )
        .unwrap();

    let engine = FakeEngine::default();
    let adapter = TimeReversalAdapter::new(&engine, &store, &global, &recon);
    assert!(matches!(
        adapter.run(&geometry),
        Err(ReconError::BadFieldShape { ndim: 3, .. })
    ));
}
