use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, VideoError};

/// Frame size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale to `height`, keeping the aspect ratio.
    ///
    /// The width is rounded to the nearest even number (at least 2) so the
    /// result can be encoded as yuv420p, even when the height is unchanged.
    /// Scaling twice to the same height gives the same dimensions.
    pub fn scaled_to_height(self, height: u32) -> Result<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(VideoError::InvalidDimensions {
                details: format!("cannot scale a {} frame", self),
            }
            .into());
        }
        if height == 0 {
            return Err(VideoError::InvalidDimensions {
                details: "target height must be positive".to_string(),
            }
            .into());
        }
        let exact = self.width as f64 * height as f64 / self.height as f64;
        let width = ((exact / 2.0).round() as u32 * 2).max(2);
        Ok(Self { width, height })
    }

    /// Frame that holds `members` side by side, top aligned
    pub fn side_by_side(members: &[Dimensions]) -> Option<Self> {
        if members.is_empty() {
            return None;
        }
        Some(Self {
            width: members.iter().map(|d| d.width).sum(),
            height: members.iter().map(|d| d.height).max().unwrap_or(0),
        })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Facts about an input file gathered by the media backend
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub path: PathBuf,
    pub dimensions: Dimensions,
    /// Duration in seconds
    pub duration: f64,
    pub fps: f64,
    pub codec: String,
    pub has_audio: bool,
}

/// Encoder pair used for export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codecs {
    pub video: String,
    pub audio: String,
}

impl Codecs {
    pub fn new(video: &str, audio: &str) -> Self {
        Self {
            video: video.to_string(),
            audio: audio.to_string(),
        }
    }
}

impl Default for Codecs {
    fn default() -> Self {
        Self::new("libx264", "aac")
    }
}

/// Represents a written output file
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedVideo {
    pub path: PathBuf,
    pub dimensions: Dimensions,
    pub duration: f64,
    pub has_audio: bool,
    pub file_size: u64,
}

/// Geometry of a two-up composition at every stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackLayout {
    pub left: Dimensions,
    /// Right clip after matching the left clip's height
    pub right: Dimensions,
    pub stacked: Dimensions,
    pub output: Dimensions,
}

impl StackLayout {
    pub fn plan(left: Dimensions, right: Dimensions, output_height: u32) -> Result<Self> {
        let right = right.scaled_to_height(left.height)?;
        let stacked = Dimensions::side_by_side(&[left, right]).ok_or(VideoError::EmptyStack)?;
        let output = stacked.scaled_to_height(output_height)?;
        Ok(Self { left, right, stacked, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_keeps_aspect_ratio() {
        let d = Dimensions::new(320, 240).scaled_to_height(480).unwrap();
        assert_eq!(d, Dimensions::new(640, 480));

        let d = Dimensions::new(1920, 1080).scaled_to_height(720).unwrap();
        assert_eq!(d, Dimensions::new(1280, 720));
    }

    #[test]
    fn test_scale_rounds_to_even_width() {
        // 1080 * 720 / 2400 = 324
        let d = Dimensions::new(1080, 2400).scaled_to_height(720).unwrap();
        assert_eq!(d, Dimensions::new(324, 720));

        // 175 * 2 / 3 = 116.67, nearest even is 116
        let d = Dimensions::new(175, 300).scaled_to_height(200).unwrap();
        assert_eq!(d.width % 2, 0);
        assert_eq!(d, Dimensions::new(116, 200));
    }

    #[test]
    fn test_scale_is_idempotent() {
        let once = Dimensions::new(853, 467).scaled_to_height(480).unwrap();
        let twice = once.scaled_to_height(480).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_same_height_still_evens_the_width() {
        let d = Dimensions::new(1281, 720).scaled_to_height(720).unwrap();
        assert_eq!(d, Dimensions::new(1282, 720));
        assert_eq!(d.scaled_to_height(720).unwrap(), d);
    }

    #[test]
    fn test_plan_with_odd_left_width_at_output_height() {
        let layout = StackLayout::plan(
            Dimensions::new(1281, 720),
            Dimensions::new(640, 360),
            720,
        )
        .unwrap();

        assert_eq!(layout.stacked, Dimensions::new(2561, 720));
        assert_eq!(layout.output, Dimensions::new(2562, 720));
        assert_eq!(layout.output.width % 2, 0);
    }

    #[test]
    fn test_scale_rejects_degenerate_sizes() {
        assert!(Dimensions::new(0, 480).scaled_to_height(720).is_err());
        assert!(Dimensions::new(640, 480).scaled_to_height(0).is_err());
    }

    #[test]
    fn test_side_by_side() {
        let d = Dimensions::side_by_side(&[Dimensions::new(640, 480), Dimensions::new(320, 240)]);
        assert_eq!(d, Some(Dimensions::new(960, 480)));
        assert_eq!(Dimensions::side_by_side(&[]), None);
    }

    #[test]
    fn test_plan_two_up_layout() {
        let layout = StackLayout::plan(
            Dimensions::new(640, 480),
            Dimensions::new(320, 240),
            720,
        )
        .unwrap();

        assert_eq!(layout.right, Dimensions::new(640, 480));
        assert_eq!(layout.stacked, Dimensions::new(1280, 480));
        assert_eq!(layout.output, Dimensions::new(1920, 720));
    }
}
