//! ih-core: shared error taxonomy, media formats, and configuration.
//!
//! This crate is the foundational dependency for all other ih-* crates. It
//! provides the unified [`Error`] type that every layer funnels failures into,
//! the [`ImageFormat`] media enum, and the JSON-backed application
//! configuration.

pub mod config;
pub mod error;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::ImageFormat;
