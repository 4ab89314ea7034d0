use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    video::Codecs,
};

/// Default left-hand recording (phone screen capture)
pub const DEFAULT_LEFT_INPUT: &str = "Screenrecorder-2026-01-24-15-23-12-263.mp4";

/// Default right-hand recording (laptop camera)
pub const DEFAULT_RIGHT_INPUT: &str = "VID_20260124_091715.3gp";

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "linkedin_demo.mp4";

/// Default height of the exported video
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 720;

/// Main configuration for clip-stacker
///
/// Every field has a default, so an empty TOML file (or no file at all)
/// reproduces the stock behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input file locations
    pub inputs: InputConfig,

    /// Seconds skipped at the start of each input
    pub trim: TrimConfig,

    /// Output file and encoding settings
    pub output: OutputConfig,

    /// External tool locations
    pub tools: ToolsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.inputs.validate()?;
        self.trim.validate()?;
        self.output.validate()?;
        self.tools.validate()?;
        Ok(())
    }
}

/// Input file locations, left and right as they appear in the output frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub left: PathBuf,
    pub right: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            left: PathBuf::from(DEFAULT_LEFT_INPUT),
            right: PathBuf::from(DEFAULT_RIGHT_INPUT),
        }
    }
}

impl InputConfig {
    fn validate(&self) -> Result<()> {
        for (key, path) in [("inputs.left", &self.left), ("inputs.right", &self.right)] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: String::new(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Start offsets in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    pub left_start: f64,
    pub right_start: f64,
}

impl TrimConfig {
    fn validate(&self) -> Result<()> {
        let offsets = [
            ("trim.left_start", self.left_start),
            ("trim.right_start", self.right_start),
        ];
        for (key, value) in offsets {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Output file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the combined video is written
    pub path: PathBuf,

    /// Final frame height; width follows the aspect ratio
    pub height: u32,

    /// FFmpeg video encoder name
    pub video_codec: String,

    /// FFmpeg audio encoder name
    pub audio_codec: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT),
            height: DEFAULT_OUTPUT_HEIGHT,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.path".to_string(),
                value: String::new(),
            }
            .into());
        }

        // yuv420p needs even dimensions
        if self.height < 2 || self.height % 2 != 0 {
            return Err(ConfigError::InvalidValue {
                key: "output.height".to_string(),
                value: self.height.to_string(),
            }
            .into());
        }

        if self.video_codec.trim().is_empty() || self.audio_codec.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.codecs".to_string(),
                value: format!("{}/{}", self.video_codec, self.audio_codec),
            }
            .into());
        }

        Ok(())
    }

    /// Encoder pair handed to the export step
    pub fn codecs(&self) -> Codecs {
        Codecs::new(&self.video_codec, &self.audio_codec)
    }
}

/// Locations of the FFmpeg executables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl ToolsConfig {
    fn validate(&self) -> Result<()> {
        if self.ffmpeg.as_os_str().is_empty() || self.ffprobe.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "tools".to_string(),
                value: format!("{}/{}", self.ffmpeg.display(), self.ffprobe.display()),
            }
            .into());
        }
        Ok(())
    }
}
