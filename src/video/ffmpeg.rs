//! FFmpeg-backed clips.
//!
//! Clip operations are only recorded. `export` renders the whole clip tree
//! into one `-filter_complex` graph and runs a single ffmpeg process, so no
//! intermediate files are written.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, VideoError};
use crate::video::clip::{check_trim, Clip, MediaBackend};
use crate::video::probe;
use crate::video::toolkit::FfmpegToolkit;
use crate::video::types::{Codecs, Dimensions, ExportedVideo, VideoMetadata};

/// Lines of ffmpeg stderr kept in error messages
const STDERR_TAIL_LINES: usize = 12;

#[derive(Debug, Clone, PartialEq)]
enum Source {
    File(VideoMetadata),
    Row(Vec<FfmpegClip>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Trim(f64),
    Scale(Dimensions),
    Mute,
}

/// A clip described as a source plus the operations applied to it
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegClip {
    source: Source,
    ops: Vec<Op>,
    dimensions: Dimensions,
    duration: f64,
    has_audio: bool,
}

impl FfmpegClip {
    /// Clip that plays a whole file
    pub fn from_metadata(metadata: VideoMetadata) -> Self {
        Self {
            dimensions: metadata.dimensions,
            duration: metadata.duration,
            has_audio: metadata.has_audio,
            source: Source::File(metadata),
            ops: Vec::new(),
        }
    }

    /// Single row of clips, top aligned
    pub fn row(members: Vec<FfmpegClip>) -> Result<Self> {
        let sizes: Vec<Dimensions> = members.iter().map(|m| m.dimensions).collect();
        let dimensions = Dimensions::side_by_side(&sizes).ok_or(VideoError::EmptyStack)?;
        let duration = shortest(&members);
        let has_audio = members.iter().any(|m| m.has_audio);

        Ok(Self {
            source: Source::Row(members),
            ops: Vec::new(),
            dimensions,
            duration,
            has_audio,
        })
    }

    fn is_muted(&self) -> bool {
        self.ops.contains(&Op::Mute)
    }

    /// Add this clip's filters to `graph`.
    ///
    /// Audio chains are only built when `want_audio` holds and the clip is
    /// not muted; an audio filter whose output goes nowhere makes ffmpeg
    /// refuse the graph.
    fn render(&self, graph: &mut FilterGraph, want_audio: bool) -> Streams {
        let want_audio = want_audio && !self.is_muted();

        let mut streams = match &self.source {
            Source::File(meta) => {
                let index = graph.input(&meta.path);
                Streams {
                    video: format!("[{}:v:0]", index),
                    audio: (want_audio && meta.has_audio).then(|| format!("[{}:a:0]", index)),
                }
            }
            Source::Row(members) => {
                let row_height = self.row_height(members);
                let mut videos = Vec::with_capacity(members.len());
                let mut audios = Vec::new();

                for member in members {
                    let rendered = member.render(graph, want_audio);
                    let video = if member.dimensions.height < row_height {
                        let pad = format!("pad={}:{}:0:0", member.dimensions.width, row_height);
                        graph.push(&[rendered.video.as_str()], &pad, 'v')
                    } else {
                        rendered.video
                    };
                    videos.push(video);
                    audios.extend(rendered.audio);
                }

                let video = if videos.len() == 1 {
                    videos.remove(0)
                } else {
                    let refs: Vec<&str> = videos.iter().map(String::as_str).collect();
                    let hstack = format!("hstack=inputs={}:shortest=1", videos.len());
                    graph.push(&refs, &hstack, 'v')
                };

                let audio = match audios.len() {
                    0 => None,
                    1 => audios.pop(),
                    n => {
                        let refs: Vec<&str> = audios.iter().map(String::as_str).collect();
                        let amix = format!("amix=inputs={}:duration=shortest", n);
                        Some(graph.push(&refs, &amix, 'a'))
                    }
                };

                // hstack stops at the shortest video; the audio has to stop with it
                let duration = shortest(members);
                let audio = match audio {
                    Some(pad) if duration.is_finite() && duration > 0.0 => {
                        let atrim = format!("atrim=duration={},asetpts=PTS-STARTPTS", duration);
                        Some(graph.push(&[pad.as_str()], &atrim, 'a'))
                    }
                    other => other,
                };

                Streams { video, audio }
            }
        };

        for op in &self.ops {
            match *op {
                Op::Trim(start) => {
                    let trim = format!("trim=start={},setpts=PTS-STARTPTS", start);
                    streams.video = graph.push(&[streams.video.as_str()], &trim, 'v');
                    if let Some(audio) = streams.audio.take() {
                        let atrim = format!("atrim=start={},asetpts=PTS-STARTPTS", start);
                        streams.audio = Some(graph.push(&[audio.as_str()], &atrim, 'a'));
                    }
                }
                Op::Scale(size) => {
                    let scale = format!("scale={}:{}", size.width, size.height);
                    streams.video = graph.push(&[streams.video.as_str()], &scale, 'v');
                }
                Op::Mute => streams.audio = None,
            }
        }

        streams
    }

    fn row_height(&self, members: &[FfmpegClip]) -> u32 {
        members.iter().map(|m| m.dimensions.height).max().unwrap_or(0)
    }

    /// Arguments for an ffmpeg run that encodes this clip to `output`
    pub fn export_args(&self, output: &Path, codecs: &Codecs) -> Vec<OsString> {
        let mut graph = FilterGraph::default();
        let streams = self.render(&mut graph, true);
        let video = graph.push(&[streams.video.as_str()], "format=yuv420p", 'v');

        let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-y".into()];
        for input in &graph.inputs {
            args.push("-i".into());
            args.push(path_arg(input));
        }

        args.push("-filter_complex".into());
        args.push(graph.chains.join(";").into());
        args.push("-map".into());
        args.push(map_target(&video).into());
        if let Some(audio) = &streams.audio {
            args.push("-map".into());
            args.push(map_target(audio).into());
        }

        args.push("-c:v".into());
        args.push(codecs.video.as_str().into());
        if streams.audio.is_some() {
            args.push("-c:a".into());
            args.push(codecs.audio.as_str().into());
        } else {
            args.push("-an".into());
        }

        args.push(path_arg(output));
        args
    }
}

impl Clip for FfmpegClip {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn has_audio(&self) -> bool {
        self.has_audio
    }

    fn trim_from(mut self, offset: f64) -> Result<Self> {
        check_trim(offset, self.duration)?;
        if offset > 0.0 {
            self.ops.push(Op::Trim(offset));
            self.duration -= offset;
        }
        Ok(self)
    }

    fn without_audio(mut self) -> Self {
        if self.has_audio {
            self.ops.push(Op::Mute);
            self.has_audio = false;
        }
        self
    }

    fn resize_to_height(mut self, height: u32) -> Result<Self> {
        let target = self.dimensions.scaled_to_height(height)?;
        if target != self.dimensions {
            self.ops.push(Op::Scale(target));
            self.dimensions = target;
        }
        Ok(self)
    }
}

impl MediaBackend for FfmpegToolkit {
    type Clip = FfmpegClip;

    async fn open(&self, path: &Path) -> Result<FfmpegClip> {
        let metadata = probe::probe(self.ffprobe(), path).await?;
        Ok(FfmpegClip::from_metadata(metadata))
    }

    fn stack_horizontally(&self, clips: Vec<FfmpegClip>) -> Result<FfmpegClip> {
        FfmpegClip::row(clips)
    }

    async fn export(
        &self,
        clip: FfmpegClip,
        output: &Path,
        codecs: &Codecs,
    ) -> Result<ExportedVideo> {
        let args = clip.export_args(output, codecs);
        debug!("ffmpeg {:?}", args);

        info!(
            "Encoding {} ({:.1}s) with {}/{}",
            clip.dimensions, clip.duration, codecs.video, codecs.audio
        );

        let result = Command::new(self.ffmpeg())
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| VideoError::EncodingFailed {
                reason: format!("FFmpeg execution failed: {}", e),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(VideoError::EncodingFailed {
                reason: format!("FFmpeg exited with {}: {}", result.status, stderr_tail(&stderr)),
            }
            .into());
        }

        let file_size = tokio::fs::metadata(output).await?.len();
        Ok(ExportedVideo {
            path: output.to_path_buf(),
            dimensions: clip.dimensions,
            duration: clip.duration,
            has_audio: clip.has_audio,
            file_size,
        })
    }
}

/// Output pads of a rendered clip
struct Streams {
    video: String,
    audio: Option<String>,
}

#[derive(Default)]
struct FilterGraph {
    inputs: Vec<PathBuf>,
    chains: Vec<String>,
    next_label: usize,
}

impl FilterGraph {
    fn input(&mut self, path: &Path) -> usize {
        self.inputs.push(path.to_path_buf());
        self.inputs.len() - 1
    }

    /// Append `inputs -> filter` and return the new output pad
    fn push(&mut self, inputs: &[&str], filter: &str, kind: char) -> String {
        let label = format!("[{}{}]", kind, self.next_label);
        self.next_label += 1;
        self.chains.push(format!("{}{}{}", inputs.concat(), filter, label));
        label
    }
}

/// Path as an ffmpeg argument.
///
/// Relative paths get a `./` prefix so a name like `-clip.mp4` is never read
/// as an option.
pub(crate) fn path_arg(path: &Path) -> OsString {
    if path.is_relative() {
        Path::new(".").join(path).into_os_string()
    } else {
        path.as_os_str().to_os_string()
    }
}

/// Stack duration: the shortest member
fn shortest(members: &[FfmpegClip]) -> f64 {
    members.iter().map(|m| m.duration).fold(f64::INFINITY, f64::min)
}

/// `-map` wants bare specifiers for input streams and brackets for graph outputs
fn map_target(pad: &str) -> String {
    let inner = pad.trim_start_matches('[').trim_end_matches(']');
    if inner.contains(':') {
        inner.to_string()
    } else {
        pad.to_string()
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
