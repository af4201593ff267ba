//! # Sonolux Core
//!
//! Shared foundations of the Sonolux photoacoustic simulation toolkit.
//!
//! ## Modules
//!
//! - [`types`] — Volume grid description, derived sensor parameters, and
//!   acoustic property identifiers.
//! - [`config`] — Explicit configuration structs passed into each pipeline
//!   stage (no shared mutable settings dictionary).
//! - [`store`] — The field-store collaborator: named, wavelength-indexed
//!   array fields persisted between pipeline stages.

pub mod config;
pub mod store;
pub mod types;
