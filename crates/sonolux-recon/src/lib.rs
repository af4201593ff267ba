//! # Sonolux Reconstruction
//!
//! Time-reversal image reconstruction: runs the acoustic forward model
//! backward in time from recorded boundary data (Treeby, Zhang & Cox,
//! *Inverse Problems* **26**, 115003, 2010) via an external wave solver.
//!
//! ## Modules
//!
//! - [`mask`] — Sensor-mask rasterization onto the voxel grid and acoustic
//!   property gathering/rotation.
//! - [`reorder`] — Channel reordering into the solver's mask-traversal order.
//! - [`exchange`] — The serialized exchange payload handed to the solver.
//! - [`engine`] — The [`engine::ReconstructionEngine`] seam and the
//!   subprocess-based MATLAB/k-Wave implementation.
//! - [`adapter`] — The [`adapter::TimeReversalAdapter`] orchestrating the
//!   full reconstruction stage.

pub mod adapter;
pub mod engine;
pub mod exchange;
pub mod mask;
pub mod reorder;

use thiserror::Error;

use sonolux_core::store::StoreError;
use sonolux_geometry::GeometryError;

use crate::engine::EngineError;

/// Errors from the reconstruction stage.
#[derive(Debug, Error)]
pub enum ReconError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(
        "Time series has {channels} channels but the detection geometry has \
         {elements} elements"
    )]
    ChannelCountMismatch { channels: usize, elements: usize },

    #[error(
        "Detector element {element} maps to voxel {voxel:?} outside the \
         {dims:?} grid; the device placement does not match the volume"
    )]
    SensorOutsideVolume {
        element: usize,
        voxel: [i64; 3],
        dims: [usize; 3],
    },

    #[error("Field '{field}' has {ndim} dimensions, expected {expected}")]
    BadFieldShape {
        field: String,
        ndim: usize,
        expected: usize,
    },
}
