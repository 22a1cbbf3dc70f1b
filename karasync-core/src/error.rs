use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - please edit it with your song mapping and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Lyric loading errors
    #[error("Failed to fetch lyrics from {path}: {reason}")]
    FetchFailed { path: String, reason: String },

    #[error("No lyric file mapped for song: {song}")]
    NoMappingForSong { song: String },

    #[error("Lyric file {path} could not be parsed: {reason}")]
    EmptyOrUnparseable { path: String, reason: String },

    // Network errors
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    /// Short human-readable message shown in the lyric display area.
    #[must_use]
    pub fn status_message(&self) -> String {
        match self {
            Self::NoMappingForSong { .. } => "Lyrics not available for this song".to_string(),
            Self::FetchFailed { .. } | Self::NetworkError(_) | Self::IoError(_) => {
                "Error loading lyrics".to_string()
            }
            Self::EmptyOrUnparseable { .. } => "Lyrics file could not be read".to_string(),
            Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. } | Self::ConfigParseError(_) => {
                format!("Configuration error: {self}")
            }
        }
    }

    /// Whether this error belongs to a single load attempt, as opposed to setup.
    #[must_use]
    pub const fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. }
                | Self::NoMappingForSong { .. }
                | Self::EmptyOrUnparseable { .. }
                | Self::NetworkError(_)
                | Self::IoError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
