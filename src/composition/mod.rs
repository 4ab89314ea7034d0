//! # Composition Engine
//!
//! The composition engine runs the side-by-side pipeline against any
//! [`MediaBackend`](crate::video::MediaBackend).

pub mod engine;

// Re-exports for convenience
pub use engine::CompositionEngine;
