//! Media element events and a clock for extrapolating playback position between them.

use crate::time::sanitize_seconds;
use std::time::Instant;

/// Events raised by the audio element that drive the session
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Periodic position report, in seconds from the start of the audio
    TimeUpdate { current_time: f64 },
    /// Audio metadata became available
    MetadataLoaded { duration: f64 },
    /// Audio failed to load or play
    Error { message: String },
}

/// Playback position tracking for hosts that do not emit their own ticks
#[derive(Debug, Clone, Copy)]
pub struct PlaybackClock {
    /// Whether playback is advancing
    pub is_playing: bool,
    /// Position at `updated_at`, in seconds
    pub position: f64,
    /// Total length, if known
    pub duration: Option<f64>,
    /// When `position` was last set (for interpolation)
    pub updated_at: Instant,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            is_playing: false,
            position: 0.0,
            duration: None,
            updated_at: Instant::now(),
        }
    }
}

impl PlaybackClock {
    /// Create a clock positioned at the start
    #[must_use]
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            duration: duration.filter(|d| d.is_finite() && *d >= 0.0),
            ..Self::default()
        }
    }

    pub fn play(&mut self) {
        if !self.is_playing {
            self.position = self.position_at(Instant::now());
            self.updated_at = Instant::now();
            self.is_playing = true;
        }
    }

    pub fn pause(&mut self) {
        if self.is_playing {
            self.position = self.position_at(Instant::now());
            self.updated_at = Instant::now();
            self.is_playing = false;
        }
    }

    /// Jump to `position` seconds
    pub fn seek(&mut self, position: f64) {
        self.position = self.clamp(sanitize_seconds(position));
        self.updated_at = Instant::now();
    }

    /// Interpolated position now
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position_at(Instant::now())
    }

    /// Interpolated position at `now`, clamped to the duration
    #[must_use]
    pub fn position_at(&self, now: Instant) -> f64 {
        if !self.is_playing {
            return self.position;
        }
        let elapsed = now.saturating_duration_since(self.updated_at).as_secs_f64();
        self.clamp(self.position + elapsed)
    }

    /// Whether playback has reached the known duration
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.duration.is_some_and(|d| self.position() >= d)
    }

    /// Tick event for the current position
    #[must_use]
    pub fn time_update(&self) -> MediaEvent {
        MediaEvent::TimeUpdate {
            current_time: self.position(),
        }
    }

    fn clamp(&self, position: f64) -> f64 {
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_clock_default() {
        let clock = PlaybackClock::default();
        assert!(!clock.is_playing);
        assert_eq!(clock.position, 0.0);
        assert!(clock.duration.is_none());
    }

    #[test]
    fn test_new_ignores_invalid_duration() {
        assert_eq!(PlaybackClock::new(Some(f64::NAN)).duration, None);
        assert_eq!(PlaybackClock::new(Some(180.0)).duration, Some(180.0));
    }

    #[test]
    fn test_position_paused_does_not_advance() {
        let clock = PlaybackClock {
            is_playing: false,
            position: 30.0,
            duration: Some(180.0),
            updated_at: Instant::now() - Duration::from_secs(5),
        };
        assert_eq!(clock.position(), 30.0);
    }

    #[test]
    fn test_position_interpolates_while_playing() {
        let start = Instant::now();
        let clock = PlaybackClock {
            is_playing: true,
            position: 10.0,
            duration: Some(180.0),
            updated_at: start,
        };
        let later = start + Duration::from_millis(2500);
        assert!((clock.position_at(later) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_position_clamped_to_duration() {
        let clock = PlaybackClock {
            is_playing: true,
            position: 178.0,
            duration: Some(180.0),
            updated_at: Instant::now() - Duration::from_secs(10),
        };
        assert_eq!(clock.position(), 180.0);
        assert!(clock.is_finished());
    }

    #[test]
    fn test_seek_sanitizes_and_clamps() {
        let mut clock = PlaybackClock::new(Some(60.0));
        clock.seek(-4.0);
        assert_eq!(clock.position(), 0.0);
        clock.seek(90.0);
        assert_eq!(clock.position(), 60.0);
        clock.seek(12.0);
        assert_eq!(
            clock.time_update(),
            MediaEvent::TimeUpdate { current_time: 12.0 }
        );
    }

    #[test]
    fn test_pause_freezes_position() {
        let mut clock = PlaybackClock {
            is_playing: true,
            position: 5.0,
            duration: None,
            updated_at: Instant::now() - Duration::from_secs(2),
        };
        clock.pause();
        assert!(!clock.is_playing);
        let frozen = clock.position();
        assert!(frozen >= 7.0);
        assert_eq!(clock.position(), frozen);
    }
}
