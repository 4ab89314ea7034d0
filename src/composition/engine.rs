use tracing::{debug, info};

use crate::{
    config::Config,
    error::Result,
    video::{Clip, ExportedVideo, MediaBackend, StackLayout},
};

/// Runs the two-up composition against a media backend
///
/// The engine follows a fixed pipeline:
/// 1. Open - Open the left and right recordings
/// 2. Trim - Skip the configured seconds at the start of each clip
/// 3. Mute - Drop the right clip's audio
/// 4. Match - Resize the right clip to the left clip's height
/// 5. Stack - Place both clips in one row, left to right
/// 6. Scale - Resize the row to the output height
/// 7. Export - Encode the result to the output file
pub struct CompositionEngine<B: MediaBackend> {
    config: Config,
    backend: B,
}

impl<B: MediaBackend> CompositionEngine<B> {
    pub fn new(config: Config, backend: B) -> Self {
        Self { config, backend }
    }

    /// Predicted geometry for a pair of freshly opened clips
    pub fn plan(&self, left: &B::Clip, right: &B::Clip) -> Result<StackLayout> {
        StackLayout::plan(left.dimensions(), right.dimensions(), self.config.output.height)
    }

    /// Main composition method - runs the whole pipeline and returns a
    /// summary of the written file
    pub async fn compose(&self) -> Result<ExportedVideo> {
        let inputs = &self.config.inputs;
        let trim = &self.config.trim;
        let output = &self.config.output;

        info!("🎬 Starting side-by-side composition");
        info!("   Left: {:?}", inputs.left);
        info!("   Right: {:?}", inputs.right);
        info!("   Output: {:?}", output.path);

        // Step 1: Open
        info!("📂 Step 1: Opening clips...");
        let left = self.backend.open(&inputs.left).await?;
        let right = self.backend.open(&inputs.right).await?;
        info!(
            "   Left: {} ({:.1}s, audio: {})",
            left.dimensions(),
            left.duration(),
            left.has_audio()
        );
        info!(
            "   Right: {} ({:.1}s, audio: {})",
            right.dimensions(),
            right.duration(),
            right.has_audio()
        );

        let layout = self.plan(&left, &right)?;
        debug!(
            "Planned layout: {} + {} -> {} -> {}",
            layout.left, layout.right, layout.stacked, layout.output
        );

        // Step 2: Trim
        info!(
            "✂️  Step 2: Trimming (left from {}s, right from {}s)...",
            trim.left_start, trim.right_start
        );
        let left = left.trim_from(trim.left_start)?;
        let right = right.trim_from(trim.right_start)?;

        // Step 3: Mute
        info!("🔇 Step 3: Removing audio from the right clip...");
        let right = right.without_audio();

        // Step 4: Match heights
        let target_height = left.dimensions().height;
        info!("📐 Step 4: Resizing right clip to {}px high...", target_height);
        let right = right.resize_to_height(target_height)?;
        debug!("Right clip is now {}", right.dimensions());

        // Step 5: Stack
        info!("🧱 Step 5: Stacking clips side by side...");
        let stacked = self.backend.stack_horizontally(vec![left, right])?;
        debug!("Stacked clip: {} ({:.1}s)", stacked.dimensions(), stacked.duration());

        // Step 6: Scale
        info!("📏 Step 6: Resizing to {}px high...", output.height);
        let stacked = stacked.resize_to_height(output.height)?;

        // Step 7: Export
        info!("💾 Step 7: Exporting with {}/{}...", output.video_codec, output.audio_codec);
        let exported = self
            .backend
            .export(stacked, &output.path, &output.codecs())
            .await?;

        info!("   ✅ Export complete:");
        info!("      File saved: {:?}", exported.path);
        info!("      Frame: {}", exported.dimensions);
        info!("      Duration: {:.1}s", exported.duration);
        info!("      File size: {:.1} MB", exported.file_size as f64 / 1024.0 / 1024.0);

        Ok(exported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use crate::{
        error::{StackError, VideoError},
        video::{clip::check_trim, Codecs, Dimensions},
    };

    /// In-memory clip that tracks where its audio comes from
    #[derive(Debug, Clone)]
    struct FakeClip {
        dimensions: Dimensions,
        duration: f64,
        audio_sources: Vec<PathBuf>,
        ops: Vec<String>,
    }

    impl Clip for FakeClip {
        fn dimensions(&self) -> Dimensions {
            self.dimensions
        }

        fn duration(&self) -> f64 {
            self.duration
        }

        fn has_audio(&self) -> bool {
            !self.audio_sources.is_empty()
        }

        fn trim_from(mut self, offset: f64) -> Result<Self> {
            check_trim(offset, self.duration)?;
            self.duration -= offset;
            self.ops.push(format!("trim {}", offset));
            Ok(self)
        }

        fn without_audio(mut self) -> Self {
            self.audio_sources.clear();
            self.ops.push("mute".to_string());
            self
        }

        fn resize_to_height(mut self, height: u32) -> Result<Self> {
            self.dimensions = self.dimensions.scaled_to_height(height)?;
            self.ops.push(format!("resize {}", height));
            Ok(self)
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        files: HashMap<PathBuf, (Dimensions, f64, bool)>,
        exports: RefCell<Vec<(PathBuf, Codecs, FakeClip)>>,
    }

    impl FakeBackend {
        fn with_file(
            mut self,
            path: &str,
            width: u32,
            height: u32,
            duration: f64,
            audio: bool,
        ) -> Self {
            let size = Dimensions::new(width, height);
            self.files.insert(PathBuf::from(path), (size, duration, audio));
            self
        }
    }

    impl MediaBackend for FakeBackend {
        type Clip = FakeClip;

        async fn open(&self, path: &Path) -> Result<FakeClip> {
            let (dimensions, duration, audio) = self.files.get(path).copied().ok_or_else(|| {
                VideoError::ProbeFailed {
                    path: path.display().to_string(),
                    reason: "unreadable".to_string(),
                }
            })?;

            Ok(FakeClip {
                dimensions,
                duration,
                audio_sources: if audio { vec![path.to_path_buf()] } else { Vec::new() },
                ops: Vec::new(),
            })
        }

        fn stack_horizontally(&self, clips: Vec<FakeClip>) -> Result<FakeClip> {
            let sizes: Vec<Dimensions> = clips.iter().map(|c| c.dimensions).collect();
            let dimensions = Dimensions::side_by_side(&sizes).ok_or(VideoError::EmptyStack)?;
            Ok(FakeClip {
                dimensions,
                duration: clips.iter().map(|c| c.duration).fold(f64::INFINITY, f64::min),
                audio_sources: clips.iter().flat_map(|c| c.audio_sources.clone()).collect(),
                ops: vec!["stack".to_string()],
            })
        }

        async fn export(
            &self,
            clip: FakeClip,
            output: &Path,
            codecs: &Codecs,
        ) -> Result<ExportedVideo> {
            let exported = ExportedVideo {
                path: output.to_path_buf(),
                dimensions: clip.dimensions,
                duration: clip.duration,
                has_audio: clip.has_audio(),
                file_size: 0,
            };
            self.exports.borrow_mut().push((output.to_path_buf(), codecs.clone(), clip));
            Ok(exported)
        }
    }

    fn config_for(left: &str, right: &str) -> Config {
        let mut config = Config::default();
        config.inputs.left = PathBuf::from(left);
        config.inputs.right = PathBuf::from(right);
        config
    }

    #[tokio::test]
    async fn test_two_up_scenario() {
        let backend = FakeBackend::default()
            .with_file("a.mp4", 640, 480, 10.0, true)
            .with_file("b.mp4", 320, 240, 8.0, true);
        let engine = CompositionEngine::new(config_for("a.mp4", "b.mp4"), backend);

        let exported = engine.compose().await.unwrap();

        assert_eq!(exported.dimensions, Dimensions::new(1920, 720));
        assert_eq!(exported.duration, 8.0);
        assert!(exported.has_audio);
        assert_eq!(exported.path, PathBuf::from("linkedin_demo.mp4"));

        let exports = engine.backend.exports.borrow();
        assert_eq!(exports.len(), 1);
        let (path, codecs, clip) = &exports[0];
        assert_eq!(path, &PathBuf::from("linkedin_demo.mp4"));
        assert_eq!(codecs, &Codecs::new("libx264", "aac"));
        assert_eq!(clip.audio_sources, vec![PathBuf::from("a.mp4")]);
        assert_eq!(clip.ops, vec!["stack".to_string(), "resize 720".to_string()]);
    }

    #[tokio::test]
    async fn test_output_width_is_sum_of_scaled_widths() {
        // Portrait phone capture next to a landscape webcam
        let backend = FakeBackend::default()
            .with_file("phone.mp4", 1080, 2400, 30.0, true)
            .with_file("cam.3gp", 176, 144, 40.0, true);
        let engine = CompositionEngine::new(config_for("phone.mp4", "cam.3gp"), backend);

        let exported = engine.compose().await.unwrap();

        let right = Dimensions::new(176, 144).scaled_to_height(2400).unwrap();
        let stacked = Dimensions::new(1080 + right.width, 2400);
        assert_eq!(exported.dimensions, stacked.scaled_to_height(720).unwrap());
        assert_eq!(exported.dimensions.height, 720);
        assert_eq!(exported.duration, 30.0);
    }

    #[tokio::test]
    async fn test_start_offsets_shorten_clips() {
        let backend = FakeBackend::default()
            .with_file("a.mp4", 640, 480, 10.0, true)
            .with_file("b.mp4", 640, 480, 10.0, true);
        let mut config = config_for("a.mp4", "b.mp4");
        config.trim.left_start = 1.0;
        config.trim.right_start = 4.0;
        let engine = CompositionEngine::new(config, backend);

        let exported = engine.compose().await.unwrap();
        assert_eq!(exported.duration, 6.0);
    }

    #[tokio::test]
    async fn test_right_audio_never_survives() {
        let backend = FakeBackend::default()
            .with_file("silent.mp4", 640, 480, 5.0, false)
            .with_file("loud.mp4", 640, 480, 5.0, true);
        let engine = CompositionEngine::new(config_for("silent.mp4", "loud.mp4"), backend);

        let exported = engine.compose().await.unwrap();
        assert!(!exported.has_audio);
    }

    #[tokio::test]
    async fn test_unreadable_input_is_a_processing_failure() {
        let backend = FakeBackend::default().with_file("a.mp4", 640, 480, 5.0, true);
        let engine = CompositionEngine::new(config_for("a.mp4", "corrupt.mp4"), backend);

        let err = engine.compose().await.unwrap_err();
        assert!(matches!(err, StackError::Video(VideoError::ProbeFailed { .. })));
        assert!(!err.is_fatal());
        assert!(engine.backend.exports.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_offset_past_end_fails_before_export() {
        let backend = FakeBackend::default()
            .with_file("a.mp4", 640, 480, 5.0, true)
            .with_file("b.mp4", 640, 480, 3.0, true);
        let mut config = config_for("a.mp4", "b.mp4");
        config.trim.right_start = 3.0;
        let engine = CompositionEngine::new(config, backend);

        let err = engine.compose().await.unwrap_err();
        assert!(matches!(err, StackError::Video(VideoError::InvalidTrim { .. })));
        assert!(engine.backend.exports.borrow().is_empty());
    }

    #[test]
    fn test_plan_matches_pipeline_geometry() {
        let backend = FakeBackend::default();
        let engine = CompositionEngine::new(Config::default(), backend);
        let clip = |w, h| FakeClip {
            dimensions: Dimensions::new(w, h),
            duration: 1.0,
            audio_sources: Vec::new(),
            ops: Vec::new(),
        };

        let layout = engine.plan(&clip(640, 480), &clip(320, 240)).unwrap();
        assert_eq!(layout.output, Dimensions::new(1920, 720));
    }
}
