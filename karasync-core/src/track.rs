use crate::index::LookupPolicy;
use crate::lrc::TrackMetadata;
use crate::render::RenderMode;
use crate::time::format_timestamp;
use std::fmt::Write;

/// A single timed piece of lyric text (a word or a whole line).
///
/// Entries are immutable once parsed; `start_time >= 0` and, when present,
/// `end_time >= start_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricEntry {
    text: String,
    start_time: f64,
    end_time: Option<f64>,
}

impl LyricEntry {
    /// Create an entry, returning `None` if the timing is invalid.
    pub fn new(text: impl Into<String>, start_time: f64, end_time: Option<f64>) -> Option<Self> {
        if !start_time.is_finite() || start_time < 0.0 {
            return None;
        }
        if let Some(end) = end_time {
            if !end.is_finite() || end < start_time {
                return None;
            }
        }
        Some(Self {
            text: text.into(),
            start_time,
            end_time,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Start time in seconds
    #[must_use]
    pub const fn start_time(&self) -> f64 {
        self.start_time
    }

    /// End time in seconds, if the source provided one
    #[must_use]
    pub const fn end_time(&self) -> Option<f64> {
        self.end_time
    }
}

/// Source format of a lyric file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LyricFormat {
    /// Array of `{ word, start_time, end_time }` objects
    WordTimedJson,
    /// LRC-style `[MM:SS.ff]text` lines
    #[default]
    TaggedText,
}

impl LyricFormat {
    /// Pick the format from a lyric file path: `.json` is word-timed, anything else is LRC.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let is_json = std::path::Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::WordTimedJson
        } else {
            Self::TaggedText
        }
    }

    /// Lookup policy used when the config does not override it
    #[must_use]
    pub const fn default_policy(self) -> LookupPolicy {
        match self {
            Self::WordTimedJson => LookupPolicy::Range,
            Self::TaggedText => LookupPolicy::Floor,
        }
    }

    #[must_use]
    pub const fn render_mode(self) -> RenderMode {
        match self {
            Self::WordTimedJson => RenderMode::Word,
            Self::TaggedText => RenderMode::Line,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WordTimedJson => "word_timed_json",
            Self::TaggedText => "tagged_text",
        }
    }
}

impl std::fmt::Display for LyricFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All lyric entries for one loaded song, sorted ascending by start time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricTrack {
    format: LyricFormat,
    metadata: TrackMetadata,
    entries: Vec<LyricEntry>,
}

impl LyricTrack {
    /// Build a track; entries are stably sorted by start time so ties keep parse order.
    #[must_use]
    pub fn new(format: LyricFormat, metadata: TrackMetadata, mut entries: Vec<LyricEntry>) -> Self {
        entries.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        Self {
            format,
            metadata,
            entries,
        }
    }

    #[must_use]
    pub fn empty(format: LyricFormat) -> Self {
        Self::new(format, TrackMetadata::default(), Vec::new())
    }

    #[must_use]
    pub const fn format(&self) -> LyricFormat {
        self.format
    }

    #[must_use]
    pub const fn metadata(&self) -> &TrackMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn entries(&self) -> &[LyricEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LyricEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the track as LRC text.
    ///
    /// Title and artist tags come first when known. Word-timed tracks produce
    /// one line per word.
    #[must_use]
    pub fn to_lrc(&self) -> String {
        let mut out = String::new();
        if let Some(ref artist) = self.metadata.artist {
            let _ = writeln!(out, "[ar:{artist}]");
        }
        if let Some(ref title) = self.metadata.title {
            let _ = writeln!(out, "[ti:{title}]");
        }
        for entry in &self.entries {
            let _ = writeln!(out, "{}{}", format_timestamp(entry.start_time), entry.text);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, start: f64) -> LyricEntry {
        LyricEntry::new(text, start, None).unwrap()
    }

    #[test]
    fn test_entry_rejects_invalid_timing() {
        assert!(LyricEntry::new("a", -1.0, None).is_none());
        assert!(LyricEntry::new("a", f64::NAN, None).is_none());
        assert!(LyricEntry::new("a", 2.0, Some(1.0)).is_none());
        assert!(LyricEntry::new("a", 1.0, Some(f64::INFINITY)).is_none());
        assert!(LyricEntry::new("a", 1.0, Some(1.0)).is_some());
        assert!(LyricEntry::new("a", 0.0, None).is_some());
    }

    #[test]
    fn test_track_sorted_stably() {
        let track = LyricTrack::new(
            LyricFormat::TaggedText,
            TrackMetadata::default(),
            vec![entry("c", 20.0), entry("a", 10.0), entry("b", 10.0)],
        );
        let texts: Vec<_> = track.entries().iter().map(LyricEntry::text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            LyricFormat::from_path("processed_audio/DoesToMeVocals_sync.json"),
            LyricFormat::WordTimedJson
        );
        assert_eq!(LyricFormat::from_path("song.JSON"), LyricFormat::WordTimedJson);
        assert_eq!(LyricFormat::from_path("song.lrc"), LyricFormat::TaggedText);
        assert_eq!(LyricFormat::from_path("song"), LyricFormat::TaggedText);
    }

    #[test]
    fn test_format_defaults() {
        assert_eq!(LyricFormat::WordTimedJson.default_policy(), LookupPolicy::Range);
        assert_eq!(LyricFormat::TaggedText.default_policy(), LookupPolicy::Floor);
        assert_eq!(LyricFormat::WordTimedJson.render_mode(), RenderMode::Word);
        assert_eq!(LyricFormat::TaggedText.render_mode(), RenderMode::Line);
    }

    #[test]
    fn test_to_lrc() {
        let metadata = TrackMetadata {
            title: Some("Does To Me".to_string()),
            artist: Some("Artist".to_string()),
            ..Default::default()
        };
        let track = LyricTrack::new(
            LyricFormat::WordTimedJson,
            metadata,
            vec![entry("hello", 0.5), entry("world", 61.25)],
        );
        assert_eq!(
            track.to_lrc(),
            "[ar:Artist]\n[ti:Does To Me]\n[00:00.50]hello\n[01:01.25]world\n"
        );
    }

    #[test]
    fn test_empty_track() {
        let track = LyricTrack::empty(LyricFormat::WordTimedJson);
        assert!(track.is_empty());
        assert_eq!(track.len(), 0);
        assert_eq!(track.format(), LyricFormat::WordTimedJson);
        assert!(track.get(0).is_none());
    }
}
