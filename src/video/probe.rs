//! FFprobe metadata for input files.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, VideoError};
use crate::video::ffmpeg::path_arg;
use crate::video::types::{Dimensions, VideoMetadata};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    tags: Option<ProbeTags>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
}

#[derive(Debug, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Run ffprobe on `path` and collect the metadata of its first video stream
pub async fn probe(ffprobe: &Path, path: &Path) -> Result<VideoMetadata> {
    debug!("Probing {}", path.display());

    let output = Command::new(ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_streams", "-show_format"])
        .arg(path_arg(path))
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| VideoError::ProbeFailed {
            path: path.display().to_string(),
            reason: format!("ffprobe execution failed: {}", e),
        })?;

    if !output.status.success() {
        return Err(VideoError::ProbeFailed {
            path: path.display().to_string(),
            reason: format!("ffprobe exited with {}", output.status),
        }
        .into());
    }

    let metadata = parse_probe_output(path, &output.stdout)?;
    info!(
        "Video metadata: {} @ {:.1}fps, {:.1}s, audio: {}",
        metadata.dimensions, metadata.fps, metadata.duration, metadata.has_audio
    );
    Ok(metadata)
}

/// Turn ffprobe's JSON into [`VideoMetadata`]
pub fn parse_probe_output(path: &Path, json: &[u8]) -> Result<VideoMetadata> {
    let failed = |reason: String| VideoError::ProbeFailed {
        path: path.display().to_string(),
        reason,
    };

    let probe: ProbeOutput = serde_json::from_slice(json)
        .map_err(|e| failed(format!("invalid ffprobe output: {}", e)))?;

    let video = probe.streams.iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| failed("no video stream".to_string()))?;

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(failed("video stream has no frame size".to_string()).into()),
    };

    // Decoders apply the display matrix, so quarter turns swap the frame size
    let dimensions = if rotation(video).rem_euclid(180) == 90 {
        Dimensions::new(height, width)
    } else {
        Dimensions::new(width, height)
    };

    let duration = probe.format.as_ref()
        .and_then(|f| parse_seconds(f.duration.as_deref()))
        .or_else(|| parse_seconds(video.duration.as_deref()))
        .unwrap_or(0.0);

    let has_audio = probe.streams.iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoMetadata {
        path: path.to_path_buf(),
        dimensions,
        duration,
        fps: video.avg_frame_rate.as_deref().and_then(parse_rate).unwrap_or(0.0),
        codec: video.codec_name.clone().unwrap_or_else(|| "unknown".to_string()),
        has_audio,
    })
}

fn rotation(stream: &ProbeStream) -> i64 {
    let from_side_data = stream.side_data_list.iter().find_map(|d| d.rotation);
    let from_tags = stream.tags.as_ref()
        .and_then(|t| t.rotate.as_deref())
        .and_then(|r| r.trim().parse::<f64>().ok());

    from_side_data.or(from_tags).map(|r| r.round() as i64).unwrap_or(0)
}

fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0)
}

/// Parse a rational like `30000/1001`
fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = rate.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    (den != 0.0).then(|| num / den)
}
