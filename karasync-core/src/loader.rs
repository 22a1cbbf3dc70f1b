//! Resolving a song to its lyric file, fetching it and parsing it into a track.

use crate::error::{CoreError, Result};
use crate::source::LyricSource;
use crate::track::{LyricFormat, LyricTrack};
use crate::{lrc, word};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Static table from audio filename to lyric filename
#[derive(Debug, Clone, Default)]
pub struct SongMapping {
    entries: HashMap<String, String>,
    auto_pair: bool,
}

impl SongMapping {
    #[must_use]
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self {
            entries,
            auto_pair: false,
        }
    }

    /// Fall back to `<audio stem>.lrc` for songs without an explicit entry
    #[must_use]
    pub const fn with_auto_pair(mut self, auto_pair: bool) -> Self {
        self.auto_pair = auto_pair;
        self
    }

    /// Add an explicit song → lyric file entry
    #[must_use]
    pub fn with_entry(mut self, song: impl Into<String>, lyric_path: impl Into<String>) -> Self {
        self.entries.insert(song.into(), lyric_path.into());
        self
    }

    /// Lyric file path for `song`, or `None` if the song has no lyrics mapped
    #[must_use]
    pub fn resolve(&self, song: &str) -> Option<String> {
        if let Some(path) = self.entries.get(song) {
            return Some(path.clone());
        }
        if !self.auto_pair {
            return None;
        }
        let path = Path::new(song);
        let stem = path.file_stem()?.to_str()?;
        let paired = path.with_file_name(format!("{stem}.lrc"));
        paired.to_str().map(str::to_string)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse fetched lyric text according to the format implied by its path.
///
/// # Errors
///
/// Returns [`CoreError::EmptyOrUnparseable`] if a word-timed JSON file is malformed.
/// Tagged text never fails to parse.
pub fn parse_lyrics(path: &str, body: &str) -> Result<LyricTrack> {
    match LyricFormat::from_path(path) {
        LyricFormat::WordTimedJson => word::parse(path, body),
        LyricFormat::TaggedText => Ok(lrc::parse(body)),
    }
}

/// Loads the lyric track for a song through a [`LyricSource`]
pub struct SyncDataLoader {
    mapping: SongMapping,
    source: Arc<dyn LyricSource>,
    timeout: Duration,
}

impl SyncDataLoader {
    /// Create a new loader
    ///
    /// # Arguments
    /// * `mapping` - Song to lyric file table
    /// * `source` - Transport used to fetch lyric files
    /// * `timeout` - Upper bound for a single fetch
    pub fn new(mapping: SongMapping, source: Arc<dyn LyricSource>, timeout: Duration) -> Self {
        Self {
            mapping,
            source,
            timeout,
        }
    }

    #[must_use]
    pub const fn mapping(&self) -> &SongMapping {
        &self.mapping
    }

    /// Resolve, fetch and parse the lyrics for `song`.
    ///
    /// Songs without a mapping fail before any fetch is attempted. A fetch that
    /// does not finish within the timeout counts as a failed fetch.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoMappingForSong`], [`CoreError::FetchFailed`] (or a
    /// transport error) or [`CoreError::EmptyOrUnparseable`].
    pub async fn load(&self, song: &str) -> Result<LyricTrack> {
        let Some(path) = self.mapping.resolve(song) else {
            info!("No lyric file mapped for {}", song);
            return Err(CoreError::NoMappingForSong {
                song: song.to_string(),
            });
        };

        info!(
            "Loading lyrics for {} from {} (source: {})",
            song,
            path,
            self.source.name()
        );

        let body = match tokio::time::timeout(self.timeout, self.source.fetch_text(&path)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Fetching {} timed out after {:?}", path, self.timeout);
                return Err(CoreError::FetchFailed {
                    path,
                    reason: format!("timed out after {}ms", self.timeout.as_millis()),
                });
            }
        };

        let track = parse_lyrics(&path, &body)?;
        info!(
            "Loaded {} {} entries for {}",
            track.len(),
            track.format(),
            song
        );
        Ok(track)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source with optional per-path delays and a fetch counter
    #[derive(Default)]
    pub(crate) struct StubSource {
        files: HashMap<String, String>,
        delays: HashMap<String, Duration>,
        pub fetches: AtomicUsize,
    }

    impl StubSource {
        pub(crate) fn with_file(mut self, path: &str, body: &str) -> Self {
            self.files.insert(path.to_string(), body.to_string());
            self
        }

        pub(crate) fn with_delay(mut self, path: &str, delay: Duration) -> Self {
            self.delays.insert(path.to_string(), delay);
            self
        }
    }

    #[async_trait]
    impl LyricSource for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_text(&self, path: &str) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(path) {
                tokio::time::sleep(*delay).await;
            }
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| CoreError::FetchFailed {
                    path: path.to_string(),
                    reason: "HTTP 404 Not Found".to_string(),
                })
        }
    }

    fn loader(mapping: SongMapping, source: Arc<StubSource>) -> SyncDataLoader {
        SyncDataLoader::new(mapping, source, Duration::from_secs(10))
    }

    #[test]
    fn test_mapping_resolve() {
        let mapping = SongMapping::default().with_entry("DoesToMe.mp3", "processed_audio/DoesToMeVocals_sync.json");
        assert_eq!(
            mapping.resolve("DoesToMe.mp3").as_deref(),
            Some("processed_audio/DoesToMeVocals_sync.json")
        );
        assert_eq!(mapping.resolve("unknown.mp3"), None);
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_mapping_auto_pair_by_stem() {
        let mapping = SongMapping::default()
            .with_entry("explicit.mp3", "lyrics/explicit.json")
            .with_auto_pair(true);
        assert_eq!(mapping.resolve("Artist_Title.wav").as_deref(), Some("Artist_Title.lrc"));
        assert_eq!(mapping.resolve("audio/track.mp3").as_deref(), Some("audio/track.lrc"));
        assert_eq!(mapping.resolve("explicit.mp3").as_deref(), Some("lyrics/explicit.json"));
    }

    #[tokio::test]
    async fn test_mapping_miss_does_not_fetch() {
        let source = Arc::new(StubSource::default());
        let loader = loader(SongMapping::default(), source.clone());

        let err = loader.load("unknown.mp3").await.unwrap_err();
        assert!(matches!(err, CoreError::NoMappingForSong { ref song } if song == "unknown.mp3"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_load_word_timed_json() {
        let source = Arc::new(StubSource::default().with_file(
            "sync.json",
            r#"[{"word":"hello","start_time":0,"end_time":1}]"#,
        ));
        let loader = loader(SongMapping::default().with_entry("song.mp3", "sync.json"), source);

        let track = loader.load("song.mp3").await.unwrap();
        assert_eq!(track.format(), LyricFormat::WordTimedJson);
        assert_eq!(track.entries()[0].text(), "hello");
    }

    #[tokio::test]
    async fn test_load_tagged_text() {
        let source = Arc::new(
            StubSource::default().with_file("song.lrc", "[00:20.00]Second\n[00:10.00]First"),
        );
        let loader = loader(SongMapping::default().with_entry("song.mp3", "song.lrc"), source);

        let track = loader.load("song.mp3").await.unwrap();
        assert_eq!(track.format(), LyricFormat::TaggedText);
        assert_eq!(track.entries()[0].text(), "First");
        assert_eq!(track.len(), 2);
    }

    #[tokio::test]
    async fn test_load_tagged_text_without_matches_is_empty_success() {
        let source = Arc::new(StubSource::default().with_file("song.lrc", "plain words only"));
        let loader = loader(SongMapping::default().with_entry("song.mp3", "song.lrc"), source);

        let track = loader.load("song.mp3").await.unwrap();
        assert!(track.is_empty());
    }

    #[tokio::test]
    async fn test_load_fetch_failure() {
        let source = Arc::new(StubSource::default());
        let loader = loader(SongMapping::default().with_entry("song.mp3", "gone.lrc"), source.clone());

        let err = loader.load("song.mp3").await.unwrap_err();
        assert!(matches!(err, CoreError::FetchFailed { ref path, .. } if path == "gone.lrc"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_malformed_json() {
        let source = Arc::new(StubSource::default().with_file("sync.json", "<html>oops</html>"));
        let loader = loader(SongMapping::default().with_entry("song.mp3", "sync.json"), source);

        let err = loader.load("song.mp3").await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyOrUnparseable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_timeout_is_fetch_failure() {
        let source = Arc::new(
            StubSource::default()
                .with_file("slow.lrc", "[00:01.00]Late")
                .with_delay("slow.lrc", Duration::from_secs(60)),
        );
        let loader = SyncDataLoader::new(
            SongMapping::default().with_entry("song.mp3", "slow.lrc"),
            source,
            Duration::from_secs(5),
        );

        let err = loader.load("song.mp3").await.unwrap_err();
        assert!(
            matches!(err, CoreError::FetchFailed { ref reason, .. } if reason.contains("timed out"))
        );
    }
}
