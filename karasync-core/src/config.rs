use crate::error::{CoreError, Result};
use crate::index::LookupPolicy;
use crate::loader::{SongMapping, SyncDataLoader};
use crate::session::SessionOptions;
use crate::source::{FileSource, HttpSource, LyricSource, SourceKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub songs: SongsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where lyric files are fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// Base URL (http) or directory (file) lyric paths are resolved against
    pub base: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongsConfig {
    /// Pair unmapped songs with `<stem>.lrc` next to the audio file
    #[serde(default)]
    pub auto_pair: bool,
    /// Audio filename to lyric file path
    #[serde(default)]
    pub mapping: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds added to the media position before lookup
    #[serde(default)]
    pub calibration_offset_secs: f64,
    /// Overrides the lookup policy implied by the lyric format
    #[serde(default)]
    pub policy: Option<LookupPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_window_radius")]
    pub window_radius: usize,
}

const fn default_window_radius() -> usize {
    2
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_radius: default_window_radius(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file in the config directory
    #[serde(default)]
    pub enabled: bool,
}

impl Config {
    /// Get the configuration directory path (~/.config/karasync/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/karasync/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default path, creating a template on first run
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed, or fails validation.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Load config from `config_path`, writing [`CONFIG_TEMPLATE`] there if it is missing
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template, or an error if the
    /// file cannot be read, parsed, or fails validation.
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(config_path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(config_path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure or a value is out of range.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.source.base.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "source.base must not be empty".to_string(),
            });
        }
        if self.source.timeout_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "source.timeout_ms must be greater than zero".to_string(),
            });
        }
        if !self.sync.calibration_offset_secs.is_finite() {
            return Err(CoreError::ConfigInvalid {
                message: "sync.calibration_offset_secs must be a finite number".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.source.timeout_ms)
    }

    #[must_use]
    pub const fn session_options(&self) -> SessionOptions {
        SessionOptions {
            calibration_offset: self.sync.calibration_offset_secs,
            policy: self.sync.policy,
            window_radius: self.display.window_radius,
        }
    }

    #[must_use]
    pub fn song_mapping(&self) -> SongMapping {
        SongMapping::new(self.songs.mapping.clone()).with_auto_pair(self.songs.auto_pair)
    }

    /// Build the lyric source described by `[source]`
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP base is not a valid URL or the client cannot be created.
    pub fn build_source(&self) -> Result<Arc<dyn LyricSource>> {
        let source: Arc<dyn LyricSource> = match self.source.kind {
            SourceKind::Http => Arc::new(HttpSource::new(&self.source.base, self.timeout())?),
            SourceKind::File => Arc::new(FileSource::new(&self.source.base)),
        };
        Ok(source)
    }

    /// Build a loader from the mapping and source sections
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be built.
    pub fn build_loader(&self) -> Result<SyncDataLoader> {
        Ok(SyncDataLoader::new(
            self.song_mapping(),
            self.build_source()?,
            self.timeout(),
        ))
    }
}

pub const CONFIG_TEMPLATE: &str = r#"# Karasync Configuration
# ~/.config/karasync/config.toml

[source]
# "http" fetches lyric files relative to a base URL, "file" reads them from a directory
kind = "http"
base = "http://localhost:8000/"
timeout_ms = 10000

[songs]
# Fall back to <audio stem>.lrc for songs not listed below
auto_pair = false

[songs.mapping]
# Audio filename = lyric file path (relative to source.base)
"DoesToMe.mp3" = "processed_audio/DoesToMeVocals_sync.json"

[sync]
# Seconds added to the playback position before looking up lyrics.
# Negative values show lyrics later, positive values earlier.
calibration_offset_secs = 0.0
# Uncomment to force a lookup policy: "range" or "floor"
# policy = "floor"

[display]
# Lines shown above and below the current line
window_radius = 2

[logging]
# Also write logs to ~/.config/karasync/karasync.log
enabled = false
"#;
