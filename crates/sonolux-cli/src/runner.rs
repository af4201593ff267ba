//! Job runner: ties together geometry, processing, and the solver driver.

use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Ix2;

use sonolux_core::store::{BinFieldStore, FieldStore};
use sonolux_core::types::fields;
use sonolux_recon::adapter::TimeReversalAdapter;
use sonolux_recon::engine::MatlabEngine;
use sonolux_process::crop::preprocess_image;

use crate::config::JobConfig;

/// Run a full reconstruction job from a parsed configuration.
pub fn run_job(job: &JobConfig) -> Result<()> {
    let global = job.global_config();
    let store = BinFieldStore::open(&job.output.store_dir)
        .with_context(|| format!("Opening field store {}", job.output.store_dir.display()))?;

    println!(
        "Device: {} elements, probe width {:.2} mm",
        job.device.element_count(),
        job.device.probe_width_mm()
    );

    // Optional uniform noise on the recorded time series.
    if let Some(noise) = &job.noise {
        println!("Applying uniform noise model...");
        let mut time_series = store
            .load(fields::TIME_SERIES_DATA, global.wavelength_nm)
            .context("Loading time series for noise model")?;
        noise.apply(&mut time_series, &mut rand::rng());
        store.save(&time_series, fields::TIME_SERIES_DATA, global.wavelength_nm)?;
    }

    let engine = MatlabEngine {
        binary_path: job.reconstruction.binary_path.clone(),
        script_dir: job.reconstruction.script_dir.clone(),
        simulation_dir: job.reconstruction.simulation_dir.clone(),
        exchange_path: job
            .reconstruction
            .exchange_path
            .clone()
            .unwrap_or_else(|| job.reconstruction.simulation_dir.join("exchange.sxb")),
    };

    println!("Running time-reversal reconstruction...");
    let adapter = TimeReversalAdapter::new(
        &engine,
        &store,
        &global,
        &job.reconstruction.settings,
    );
    let mut image = adapter
        .run(&job.device)
        .context("Time-reversal reconstruction failed")?;
    println!("Reconstructed image: {:?} voxels", image.shape());

    // Optional cropping of a 2D reconstruction.
    if let Some(crop) = &job.crop {
        let plane = image
            .clone()
            .into_dimensionality::<Ix2>()
            .context("Cropping requires a 2D reconstruction")?;
        let cropped = preprocess_image(&plane, crop, global.volume.spacing_mm)?;
        println!("Cropped image: {:?}", cropped.dim());
        image = cropped.into_dyn();
        store.save(&image, fields::RECONSTRUCTED_DATA, global.wavelength_nm)?;
    }

    if job.output.save_csv {
        let csv_path = job.output.store_dir.join("reconstructed_data.csv");
        write_image_csv(&image, &csv_path)?;
    }

    println!("Reconstruction complete.");
    Ok(())
}

/// Write a 2D image (or the first plane of a 3D one) to a CSV file.
fn write_image_csv(image: &ndarray::ArrayD<f64>, path: &Path) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# Sonolux — Reconstructed initial pressure")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# Shape: {:?}", image.shape())?;

    let plane = match image.ndim() {
        2 => image.view().into_dimensionality::<Ix2>()?,
        _ => image
            .index_axis(ndarray::Axis(0), 0)
            .into_dimensionality::<Ix2>()?,
    };
    for row in plane.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{v:.6e}")).collect();
        writeln!(file, "{}", line.join(","))?;
    }

    println!("Image written to: {}", path.display());
    Ok(())
}
