//! Reflection profile prediction for rotation diffraction experiments
//!
//! This library predicts, for a single reflection recorded while a crystal is rotated
//! through the diffracting condition, the region of detector pixels and rotation frames
//! where signal can occur, a foreground/background mask of that region and a predicted
//! intensity density over it.
//!
//! Models are immutable once constructed; per-reflection queries either return values
//! (bounding boxes) or write into caller-supplied storage (masks, profiles).

#[macro_use]
mod error;

pub mod config;
pub mod experiment;
pub mod geometry;
pub mod interfaces;
pub mod model;
pub mod shoebox;
pub mod support;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{BoxFace, ProfileError};

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
