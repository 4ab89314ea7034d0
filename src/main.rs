use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use clip_stacker::{
    composition::CompositionEngine,
    config::Config,
    error::StackError,
    video::{ensure_inputs_exist, ExportedVideo, FfmpegToolkit},
};

#[derive(Parser)]
#[command(
    name = "clip-stacker",
    version,
    about = "Stack two recordings side by side into one 720p video",
    long_about = "Clip-Stacker places a left and a right recording next to each other, matches their heights, keeps only the left recording's audio, and exports the result at 720p. Run without arguments to use the built-in file names."
)]
struct Cli {
    /// Left-hand recording (keeps its audio)
    #[arg(short, long)]
    left: Option<PathBuf>,

    /// Right-hand recording (muted)
    #[arg(short, long)]
    right: Option<PathBuf>,

    /// Output video file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seconds to skip at the start of the left recording
    #[arg(long)]
    left_start: Option<f64>,

    /// Seconds to skip at the start of the right recording
    #[arg(long)]
    right_start: Option<f64>,

    /// Output height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Path to the ffmpeg executable
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe executable
    #[arg(long)]
    ffprobe: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Command-line values win over the configuration file
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(left) = &self.left {
            config.inputs.left = left.clone();
        }
        if let Some(right) = &self.right {
            config.inputs.right = right.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(start) = self.left_start {
            config.trim.left_start = start;
        }
        if let Some(start) = self.right_start {
            config.trim.right_start = start;
        }
        if let Some(height) = self.height {
            config.output.height = height;
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            config.tools.ffmpeg = ffmpeg.clone();
        }
        if let Some(ffprobe) = &self.ffprobe {
            config.tools.ffprobe = ffprobe.clone();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.as_str())),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Clip-Stacker v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)
                .with_context(|| format!("loading {}", config_path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    let output = config.output.path.clone();
    match run(config).await {
        Ok(_) => {
            println!("🎉 Done! Created {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(ExitCode::from(report_failure(&e))),
    }
}

/// Loader, file check and pipeline, in that order
async fn run(config: Config) -> clip_stacker::Result<ExportedVideo> {
    let toolkit = FfmpegToolkit::acquire(&config.tools).await?;
    ensure_inputs_exist(&[config.inputs.left.as_path(), config.inputs.right.as_path()])?;

    println!("✅ Files found. Processing video... (This might take a minute)");

    CompositionEngine::new(config, toolkit).compose().await
}

/// Print the failure and pick the exit status.
///
/// Processing failures are reported but do not change the exit status.
fn report_failure(e: &StackError) -> u8 {
    if !e.is_fatal() {
        error!("Composition failed: {}", e);
        println!("❌ An error occurred: {}", e.user_message());
        return 0;
    }

    println!("❌ {}", e.user_message());
    if matches!(e, StackError::Capability(_)) {
        println!("👉 Install FFmpeg (ffmpeg and ffprobe) or point --ffmpeg/--ffprobe at it.");
    }
    1
}
