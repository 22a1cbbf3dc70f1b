//! Time conversion utilities for second-based lyric timestamps.
//!
//! Lyric entries and media positions are plain `f64` seconds. This module
//! provides the few conversions that need explicit clamping or rounding.

/// Clamp a seconds value into the valid timeline range.
///
/// Non-finite values map to `0.0`, negative values clamp to `0.0`.
#[must_use]
pub fn sanitize_seconds(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 {
        secs
    } else {
        0.0
    }
}

/// Format seconds as an LRC timestamp tag: `[MM:SS.cc]`.
///
/// Minutes are not wrapped at 60, so long tracks produce `[75:03.20]`.
#[must_use]
pub fn format_timestamp(secs: f64) -> String {
    let centis = centiseconds(secs);
    let minutes = centis / 6000;
    let seconds = (centis % 6000) / 100;
    let hundredths = centis % 100;
    format!("[{minutes:02}:{seconds:02}.{hundredths:02}]")
}

/// Convert seconds to whole centiseconds, rounding to nearest and saturating.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn centiseconds(secs: f64) -> u64 {
    let scaled = (sanitize_seconds(secs) * 100.0).round();
    // Saturates at u64::MAX, ~5.8 billion years of audio
    if scaled >= u64::MAX as f64 {
        u64::MAX
    } else {
        scaled as u64
    }
}
