//! Clip operations shared by every media backend.
//!
//! Operations take the clip by value and hand back the derived clip, so a
//! pipeline reads as a chain of transformations.

use std::path::Path;

use crate::error::Result;
use crate::video::types::{Codecs, Dimensions, ExportedVideo};

/// A decoded (or lazily described) video resource
pub trait Clip: Sized {
    /// Current frame size
    fn dimensions(&self) -> Dimensions;

    /// Current duration in seconds
    fn duration(&self) -> f64;

    /// Whether the clip still carries an audio track
    fn has_audio(&self) -> bool;

    /// Keep everything from `offset` seconds to the natural end.
    ///
    /// `offset` must be finite and lie in `[0, duration)`.
    fn trim_from(self, offset: f64) -> Result<Self>;

    /// Drop the audio track
    fn without_audio(self) -> Self;

    /// Scale to `height`, keeping the aspect ratio
    fn resize_to_height(self, height: u32) -> Result<Self>;
}

/// Capability set of an external media library
#[allow(async_fn_in_trait)]
pub trait MediaBackend {
    type Clip: Clip;

    /// Open a file as a clip
    async fn open(&self, path: &Path) -> Result<Self::Clip>;

    /// Lay clips out left to right in a single row, top aligned.
    ///
    /// The row is as tall as its tallest member, lasts as long as its
    /// shortest member, and mixes the audio of every member that has any.
    fn stack_horizontally(&self, clips: Vec<Self::Clip>) -> Result<Self::Clip>;

    /// Encode `clip` to `output`
    async fn export(
        &self,
        clip: Self::Clip,
        output: &Path,
        codecs: &Codecs,
    ) -> Result<ExportedVideo>;
}

/// Validate a trim offset against a clip duration
pub(crate) fn check_trim(offset: f64, duration: f64) -> Result<()> {
    if !offset.is_finite() || offset < 0.0 || (offset > 0.0 && offset >= duration) {
        return Err(crate::error::VideoError::InvalidTrim { offset, duration }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_trim_bounds() {
        assert!(check_trim(0.0, 10.0).is_ok());
        assert!(check_trim(9.5, 10.0).is_ok());
        assert!(check_trim(10.0, 10.0).is_err());
        assert!(check_trim(-0.1, 10.0).is_err());
        assert!(check_trim(f64::INFINITY, 10.0).is_err());
    }

    #[test]
    fn test_zero_trim_allowed_on_unknown_duration() {
        // Some containers report no duration; trimming nothing is still fine.
        assert!(check_trim(0.0, 0.0).is_ok());
    }
}
