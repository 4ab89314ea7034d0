//! # Video Module
//!
//! Media capability, input checks, and the clip abstraction with its FFmpeg
//! implementation.

pub mod clip;
pub mod ffmpeg;
pub mod inputs;
pub mod probe;
pub mod toolkit;
pub mod types;

pub use clip::{Clip, MediaBackend};
pub use ffmpeg::FfmpegClip;
pub use inputs::ensure_inputs_exist;
pub use toolkit::FfmpegToolkit;
pub use types::{Codecs, Dimensions, ExportedVideo, StackLayout, VideoMetadata};
