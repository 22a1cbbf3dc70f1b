pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod lrc;
pub mod media;
pub mod paths;
pub mod player;
pub mod render;
pub mod session;
pub mod source;
pub mod time;
pub mod track;
pub mod word;

pub use config::{
    Config, DisplayConfig, LoggingConfig, SongsConfig, SourceConfig, SyncConfig, CONFIG_TEMPLATE,
};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use error::CoreError;
pub use index::{ActiveEntry, LookupPolicy};
pub use loader::{parse_lyrics, SongMapping, SyncDataLoader};
pub use lrc::TrackMetadata;
pub use media::{MediaEvent, PlaybackClock};
pub use paths::{config_dir, config_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME};
pub use player::{Player, PlayerCommand, PlayerHandle};
pub use render::{
    DisplayFragment, DisplayLine, LyricDisplay, LyricRenderer, RenderMode, RenderState,
    ScrollBehavior,
};
pub use session::{LoadPhase, LoadTicket, Session, SessionOptions, STATUS_LOADING, STATUS_NO_LYRICS_DATA};
pub use source::{FileSource, HttpSource, LyricSource, SourceKind};
pub use time::{format_timestamp, sanitize_seconds};
pub use track::{LyricEntry, LyricFormat, LyricTrack};
