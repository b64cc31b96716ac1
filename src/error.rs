//! Error handling for Distroar
//!
//! Only lifecycle and offline I/O can fail. The per-block processing path
//! never returns an error: bad parameters are clamped and unusable blocks
//! are skipped.

use thiserror::Error;

/// Result type alias for Distroar operations
pub type Result<T> = std::result::Result<T, DistroarError>;

/// Main error type for Distroar operations
#[derive(Error, Debug)]
pub enum DistroarError {
    // Configuration errors (raised by prepare)
    #[error("Invalid sample rate: {sample_rate} Hz (must be > 0)")]
    InvalidSampleRate { sample_rate: f64 },

    #[error("Invalid block size: {block_size} (must be > 0)")]
    InvalidBlockSize { block_size: usize },

    #[error("Unsupported channel count: {channels} (supported: 1 to {max})")]
    UnsupportedChannelCount { channels: usize, max: usize },

    #[error("Channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {param} = {value} ({expected})")]
    InvalidConfig {
        param: String,
        value: String,
        expected: String,
    },

    #[error("Engine has not been prepared")]
    NotPrepared,

    // Buffer errors
    #[error("Audio buffer is empty")]
    EmptyBuffer,

    #[error("Sample count {samples} is not divisible by channel count {channels}")]
    MisalignedBuffer { samples: usize, channels: usize },

    // Audio I/O errors
    #[error("Failed to read audio file: {path}")]
    AudioReadError {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to write audio file: {path}")]
    AudioWriteError {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DistroarError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSampleRate { .. } => "INVALID_SAMPLE_RATE",
            Self::InvalidBlockSize { .. } => "INVALID_BLOCK_SIZE",
            Self::UnsupportedChannelCount { .. } => "UNSUPPORTED_CHANNEL_COUNT",
            Self::ChannelMismatch { .. } => "CHANNEL_MISMATCH",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::NotPrepared => "NOT_PREPARED",
            Self::EmptyBuffer => "EMPTY_BUFFER",
            Self::MisalignedBuffer { .. } => "MISALIGNED_BUFFER",
            Self::AudioReadError { .. } => "AUDIO_READ_ERROR",
            Self::AudioWriteError { .. } => "AUDIO_WRITE_ERROR",
            Self::IoError(_) => "IO_ERROR",
            Self::SerializationError(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error leaves the engine unusable until the next prepare
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSampleRate { .. }
                | Self::InvalidBlockSize { .. }
                | Self::UnsupportedChannelCount { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::InvalidSampleRate { .. } => "Prepare the engine with a positive sample rate",
            Self::InvalidBlockSize { .. } => "Prepare the engine with a block size of at least 1 frame",
            Self::UnsupportedChannelCount { .. } => "Use a mono or stereo channel layout",
            Self::ChannelMismatch { .. } => "Re-prepare the engine with the buffer's channel count",
            Self::InvalidConfig { .. } => "Adjust the configuration value to be within range",
            Self::NotPrepared => "Call prepare() before processing audio",
            Self::EmptyBuffer => "Load audio before processing",
            Self::AudioReadError { .. } => "Check that the file exists and is a valid WAV file",
            Self::AudioWriteError { .. } => "Check that the output location is writable",
            _ => "Check the error details and try again",
        }
    }
}
