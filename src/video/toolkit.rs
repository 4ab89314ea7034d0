use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ToolsConfig;
use crate::error::{CapabilityError, Result};

/// Handle to a working FFmpeg installation
///
/// Obtaining one is the only way to get a media backend, so holding a
/// toolkit means both executables answered `-version`.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegToolkit {
    /// Locate ffmpeg and ffprobe and make sure both run
    pub async fn acquire(tools: &ToolsConfig) -> Result<Self> {
        let version = check_tool(&tools.ffmpeg).await?;
        check_tool(&tools.ffprobe).await?;

        info!("Using {}", version);
        Ok(Self {
            ffmpeg: tools.ffmpeg.clone(),
            ffprobe: tools.ffprobe.clone(),
        })
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe(&self) -> &Path {
        &self.ffprobe
    }
}

/// Run `<program> -version`, returning the first line of its output
async fn check_tool(program: &Path) -> Result<String> {
    let tool = program.display().to_string();
    debug!("Checking for {}", tool);

    let output = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| CapabilityError::ToolNotFound {
            tool: tool.clone(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CapabilityError::ToolFailed {
            tool,
            status: output.status.to_string(),
        }
        .into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().next().unwrap_or(tool.as_str()).trim().to_string())
}
