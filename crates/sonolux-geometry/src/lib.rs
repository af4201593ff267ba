//! # Sonolux Geometry
//!
//! Digital twins of ultrasound detection arrays. This crate provides:
//!
//! - **Array variants** ([`detection`]) — The [`detection::DetectionGeometry`]
//!   tagged variant over linear and curved arrays, with element positions,
//!   orientations, and volume validation.
//! - **Linear arrays** ([`linear`]) — Elements on a straight line, constant
//!   orientation along the depth axis.
//! - **Curved arrays** ([`curved`]) — Elements on a circular arc, oriented
//!   toward the geometric focus.
//!
//! All coordinates are millimetres. Local ("base") positions are expressed in
//! a device-centred frame; global positions compose the local frame with the
//! configured device placement in the volume.

pub mod curved;
pub mod detection;
pub mod linear;

pub use curved::{CurvedArray, CurvedConvention};
pub use detection::{DetectionGeometry, GeometryError};
pub use linear::LinearArray;
