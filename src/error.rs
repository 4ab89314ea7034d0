use thiserror::Error;

/// Main error type for the clip-stacker library
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Media toolkit unavailable: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The external media tools could not be acquired
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("could not run {tool}: {reason}")]
    ToolNotFound { tool: String, reason: String },

    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: String },
}

/// Input file errors
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Cannot find file: {path}")]
    NotFound { path: String },
}

/// Errors raised while opening, transforming or exporting clips
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to probe {path}: {reason}")]
    ProbeFailed { path: String, reason: String },

    #[error("Cannot trim from {offset}s: clip is only {duration}s long")]
    InvalidTrim { offset: f64, duration: f64 },

    #[error("Invalid dimensions: {details}")]
    InvalidDimensions { details: String },

    #[error("Cannot stack an empty set of clips")]
    EmptyStack,

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file {path}: {reason}")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using StackError
pub type Result<T> = std::result::Result<T, StackError>;

impl StackError {
    /// Fatal errors stop the program before any processing starts.
    ///
    /// Everything else is a processing failure, which is reported and
    /// swallowed by the binary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Capability(_) | Self::Input(_) | Self::Config(_))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Capability(e) => format!("Media toolkit unavailable: {}", e),
            Self::Input(e) => e.to_string(),
            Self::Video(e) => e.to_string(),
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
