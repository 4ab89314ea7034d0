//! # Clip-Stacker
//!
//! Stack two recordings side by side and export a single 720p video for sharing.
//!
//! The heavy lifting (decoding, scaling, encoding) is done by FFmpeg. This
//! crate checks that the tools are present, checks the inputs, and drives a
//! short pipeline of clip operations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clip_stacker::{
//!     composition::CompositionEngine,
//!     config::Config,
//!     video::{ensure_inputs_exist, FfmpegToolkit},
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let toolkit = FfmpegToolkit::acquire(&config.tools).await?;
//! ensure_inputs_exist(&[config.inputs.left.as_path(), config.inputs.right.as_path()])?;
//!
//! let engine = CompositionEngine::new(config, toolkit);
//! let exported = engine.compose().await?;
//! println!("Created {}", exported.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`video`] - Media capability, input checks, clip operations
//! - [`composition`] - The side-by-side pipeline
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! ## Other media libraries
//!
//! The pipeline only talks to the [`Clip`](video::Clip) and
//! [`MediaBackend`](video::MediaBackend) traits, so a different library can
//! be plugged in by implementing them.

pub mod composition;
pub mod config;
pub mod error;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::CompositionEngine,
    config::Config,
    error::{StackError, Result},
    video::{Clip, MediaBackend},
};
