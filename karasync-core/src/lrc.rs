use crate::time::sanitize_seconds;
use crate::track::{LyricEntry, LyricFormat, LyricTrack};
use tracing::warn;

/// LRC metadata from ID tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub author: Option<String>,
    /// Track length in seconds
    pub length: Option<f64>,
    pub offset_ms: i64, // can be negative
}

/// Parse LRC text into a line-timed track.
///
/// Lines without a leading timestamp tag are ignored. Parsing never fails:
/// input with no timed lines yields an empty track and a diagnostic.
pub fn parse(input: &str) -> LyricTrack {
    let mut metadata = TrackMetadata::default();
    let mut lines: Vec<(f64, String)> = Vec::new();

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Try to parse as ID tag first
        if let Some((tag, value)) = parse_id_tag(line) {
            match tag.to_lowercase().as_str() {
                "ti" => metadata.title = Some(value),
                "ar" => metadata.artist = Some(value),
                "al" => metadata.album = Some(value),
                "au" => metadata.author = Some(value),
                "length" => metadata.length = parse_timestamp(&value),
                "offset" => {
                    if let Ok(offset) = value.parse::<i64>() {
                        metadata.offset_ms = offset;
                    }
                }
                _ => {} // Ignore unknown tags
            }
            continue;
        }

        if let Some(parsed) = parse_lyric_line(line) {
            lines.extend(parsed);
        }
    }

    if lines.is_empty() {
        warn!("No timestamped lines found in LRC input ({} bytes)", input.len());
    }

    // Offset is applied after all tags are read, so its position in the file does not matter
    #[allow(clippy::cast_precision_loss)]
    let offset_secs = metadata.offset_ms as f64 / 1000.0;
    let entries = lines
        .into_iter()
        .filter_map(|(time, text)| LyricEntry::new(text, sanitize_seconds(time + offset_secs), None))
        .collect();

    LyricTrack::new(LyricFormat::TaggedText, metadata, entries)
}

/// Parse an ID tag like [ti:Title] or [ar:Artist]
fn parse_id_tag(line: &str) -> Option<(String, String)> {
    if !line.starts_with('[') || !line.contains(':') {
        return None;
    }

    let end = line.find(']')?;
    let content = &line[1..end];

    let first_colon = content.find(':')?;
    let tag = &content[..first_colon];

    // If the tag part looks like a number, it's a timestamp, not an ID tag
    if tag.is_empty() || tag.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let value = content[first_colon + 1..].trim().to_string();
    Some((tag.to_string(), value))
}

/// Parse a lyric line like [00:12.34]Hello world or [00:12.34][00:15.67]Same lyrics
fn parse_lyric_line(line: &str) -> Option<Vec<(f64, String)>> {
    let mut remaining = line;
    let mut timestamps = Vec::new();

    // Extract all timestamps at the beginning
    while remaining.starts_with('[') {
        let Some(end) = remaining.find(']') else {
            break;
        };
        match parse_timestamp(&remaining[1..end]) {
            Some(time) => {
                timestamps.push(time);
                remaining = &remaining[end + 1..];
            }
            None => break,
        }
    }

    if timestamps.is_empty() {
        return None;
    }

    let text = remaining.trim();
    Some(
        timestamps
            .into_iter()
            .map(|time| (time, text.to_string()))
            .collect(),
    )
}

/// Parse a timestamp string like "00:12.34", "00:12" or "00:12:34" into seconds
fn parse_timestamp(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.trim().split(':').collect();

    match parts.as_slice() {
        [minutes, seconds] => {
            // mm:ss.fraction or mm:ss
            let minutes: u32 = minutes.parse().ok()?;
            if !is_decimal(seconds) {
                return None;
            }
            let seconds: f64 = seconds.parse().ok()?;
            Some(f64::from(minutes) * 60.0 + seconds)
        }
        [minutes, seconds, hundredths] => {
            // mm:ss:xx (hundredths)
            let minutes: u32 = minutes.parse().ok()?;
            let seconds: u32 = seconds.parse().ok()?;
            let hundredths: u32 = hundredths.parse().ok()?;
            Some(f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(hundredths) / 100.0)
        }
        _ => None,
    }
}

/// Digits with at most one decimal point; rejects signs, exponents and `inf`/`nan`.
fn is_decimal(s: &str) -> bool {
    let mut dots = 0;
    !s.is_empty()
        && s.chars().all(|c| {
            if c == '.' {
                dots += 1;
                dots == 1
            } else {
                c.is_ascii_digit()
            }
        })
        && s != "."
}
