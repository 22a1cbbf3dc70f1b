//! Word-timed JSON lyrics: `[{ "word": ..., "start_time": ..., "end_time": ... }, ...]`.

use crate::error::{CoreError, Result};
use crate::lrc::TrackMetadata;
use crate::track::{LyricEntry, LyricFormat, LyricTrack};
use serde::Deserialize;
use tracing::warn;

/// One record of a word-timed sync file
#[derive(Debug, Deserialize)]
struct WordRecord {
    word: String,
    start_time: f64,
    end_time: f64,
}

/// Parse a word-timed JSON document into a track.
///
/// Records whose timing is invalid (negative, non-finite, or ending before they
/// start) are skipped with a warning. An empty array is a valid, empty track.
///
/// # Errors
///
/// Returns [`CoreError::EmptyOrUnparseable`] if the document is not an array of
/// word records.
pub fn parse(path: &str, input: &str) -> Result<LyricTrack> {
    let records: Vec<WordRecord> =
        serde_json::from_str(input).map_err(|e| CoreError::EmptyOrUnparseable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    let total = records.len();
    let entries: Vec<LyricEntry> = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let entry = LyricEntry::new(record.word, record.start_time, Some(record.end_time));
            if entry.is_none() {
                warn!(
                    "Skipping word record {} in {}: invalid timing {}..{}",
                    i, path, record.start_time, record.end_time
                );
            }
            entry
        })
        .collect();

    if entries.len() < total {
        warn!("Kept {} of {} word records from {}", entries.len(), total, path);
    }

    Ok(LyricTrack::new(
        LyricFormat::WordTimedJson,
        TrackMetadata::default(),
        entries,
    ))
}
