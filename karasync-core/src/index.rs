//! Active-entry lookup over a sorted [`LyricTrack`].

use crate::track::{LyricEntry, LyricTrack};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Strategy for deciding which entry is active at a playback time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// The entry whose `[start_time, end_time]` interval contains the time.
    /// Overlapping intervals resolve to the first match in track order.
    Range,
    /// The last entry whose `start_time` does not exceed the time.
    Floor,
}

/// An entry found by [`LyricTrack::find_active`], with its position in the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEntry<'a> {
    pub index: usize,
    pub entry: &'a LyricEntry,
}

impl LyricTrack {
    /// Find the entry active at `time` (seconds) under `policy`.
    #[must_use]
    pub fn find_active(&self, time: f64, policy: LookupPolicy) -> Option<ActiveEntry<'_>> {
        if time.is_nan() {
            return None;
        }
        let index = match policy {
            LookupPolicy::Range => self.find_in_range(time),
            LookupPolicy::Floor => self.find_floor(time),
        }?;
        Some(ActiveEntry {
            index,
            entry: &self.entries()[index],
        })
    }

    /// Linear scan for the first interval containing `time`.
    ///
    /// Entries without an explicit end last until the next entry starts; the
    /// final open-ended entry never ends.
    fn find_in_range(&self, time: f64) -> Option<usize> {
        let entries = self.entries();
        entries.iter().enumerate().find_map(|(i, entry)| {
            let end = entry
                .end_time()
                .or_else(|| entries.get(i + 1).map(LyricEntry::start_time))
                .unwrap_or(f64::INFINITY);
            (entry.start_time() <= time && time <= end).then_some(i)
        })
    }

    /// Binary search for the rightmost entry with `start_time <= time`.
    fn find_floor(&self, time: f64) -> Option<usize> {
        let after = self
            .entries()
            .partition_point(|entry| entry.start_time() <= time);
        after.checked_sub(1)
    }

    /// Index range of up to `radius` entries either side of `index`, clamped to the track.
    #[must_use]
    pub fn window(&self, index: usize, radius: usize) -> Range<usize> {
        if self.is_empty() {
            return 0..0;
        }
        let index = index.min(self.len() - 1);
        let start = index.saturating_sub(radius);
        let end = index.saturating_add(radius).saturating_add(1).min(self.len());
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrc::TrackMetadata;
    use crate::track::LyricFormat;

    fn words(items: &[(&str, f64, f64)]) -> LyricTrack {
        let entries = items
            .iter()
            .map(|(text, start, end)| LyricEntry::new(*text, *start, Some(*end)).unwrap())
            .collect();
        LyricTrack::new(LyricFormat::WordTimedJson, TrackMetadata::default(), entries)
    }

    fn lines(starts: &[f64]) -> LyricTrack {
        let entries = starts
            .iter()
            .enumerate()
            .map(|(i, start)| LyricEntry::new(format!("Line {i}"), *start, None).unwrap())
            .collect();
        LyricTrack::new(LyricFormat::TaggedText, TrackMetadata::default(), entries)
    }

    fn active_index(track: &LyricTrack, time: f64, policy: LookupPolicy) -> Option<usize> {
        track.find_active(time, policy).map(|a| a.index)
    }

    #[test]
    fn test_range_word_example() {
        let track = words(&[("hello", 0.0, 1.0), ("world", 1.0, 2.0)]);

        let hit = track.find_active(0.5, LookupPolicy::Range).unwrap();
        assert_eq!(hit.entry.text(), "hello");
        let hit = track.find_active(1.5, LookupPolicy::Range).unwrap();
        assert_eq!(hit.entry.text(), "world");
        assert!(track.find_active(5.0, LookupPolicy::Range).is_none());
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let track = words(&[("a", 1.0, 2.0), ("b", 3.0, 4.0)]);
        assert_eq!(active_index(&track, 1.0, LookupPolicy::Range), Some(0));
        assert_eq!(active_index(&track, 2.0, LookupPolicy::Range), Some(0));
        assert_eq!(active_index(&track, 2.5, LookupPolicy::Range), None);
        assert_eq!(active_index(&track, 0.5, LookupPolicy::Range), None);
        assert_eq!(active_index(&track, 4.0, LookupPolicy::Range), Some(1));
    }

    #[test]
    fn test_range_shared_boundary_prefers_first() {
        let track = words(&[("hello", 0.0, 1.0), ("world", 1.0, 2.0)]);
        assert_eq!(active_index(&track, 1.0, LookupPolicy::Range), Some(0));
    }

    #[test]
    fn test_range_overlap_first_match() {
        let track = words(&[("long", 0.0, 10.0), ("short", 2.0, 3.0)]);
        assert_eq!(active_index(&track, 2.5, LookupPolicy::Range), Some(0));
    }

    #[test]
    fn test_range_every_point_inside_entry() {
        let track = words(&[("a", 0.0, 0.4), ("b", 0.5, 0.9), ("c", 1.2, 2.0)]);
        for (i, entry) in track.entries().iter().enumerate() {
            let start = entry.start_time();
            let end = entry.end_time().unwrap();
            for step in 0..=4 {
                let t = start + (end - start) * f64::from(step) / 4.0;
                assert_eq!(active_index(&track, t, LookupPolicy::Range), Some(i));
            }
        }
    }

    #[test]
    fn test_range_open_ended_lines() {
        let track = lines(&[10.0, 20.0]);
        assert_eq!(active_index(&track, 5.0, LookupPolicy::Range), None);
        assert_eq!(active_index(&track, 15.0, LookupPolicy::Range), Some(0));
        assert_eq!(active_index(&track, 25.0, LookupPolicy::Range), Some(1));
    }

    #[test]
    fn test_floor_line_example() {
        let track = lines(&[10.0, 20.0]);
        assert_eq!(active_index(&track, 15.0, LookupPolicy::Floor), Some(0));
        assert_eq!(active_index(&track, 25.0, LookupPolicy::Floor), Some(1));
        assert_eq!(active_index(&track, 5.0, LookupPolicy::Floor), None);
    }

    #[test]
    fn test_floor_before_first_and_after_last() {
        let track = lines(&[3.0, 7.5, 12.0, 30.0]);
        for t in [0.0, 1.0, 2.999] {
            assert_eq!(active_index(&track, t, LookupPolicy::Floor), None);
        }
        for t in [30.0, 31.0, 1000.0] {
            assert_eq!(active_index(&track, t, LookupPolicy::Floor), Some(3));
        }
    }

    #[test]
    fn test_floor_exact_start() {
        let track = lines(&[3.0, 7.5, 12.0]);
        assert_eq!(active_index(&track, 7.5, LookupPolicy::Floor), Some(1));
    }

    #[test]
    fn test_floor_matches_linear_scan() {
        let track = lines(&[0.5, 2.0, 2.0, 4.25, 9.0]);
        for step in 0..200 {
            let t = f64::from(step) * 0.05;
            let linear = track
                .entries()
                .iter()
                .enumerate()
                .rev()
                .find(|(_, e)| e.start_time() <= t)
                .map(|(i, _)| i);
            assert_eq!(active_index(&track, t, LookupPolicy::Floor), linear, "t = {t}");
        }
    }

    #[test]
    fn test_empty_track_and_nan() {
        let empty = lines(&[]);
        assert!(empty.find_active(1.0, LookupPolicy::Floor).is_none());
        assert!(empty.find_active(1.0, LookupPolicy::Range).is_none());

        let track = lines(&[1.0]);
        assert!(track.find_active(f64::NAN, LookupPolicy::Floor).is_none());
        assert!(track.find_active(f64::NAN, LookupPolicy::Range).is_none());
    }

    #[test]
    fn test_window_clamped() {
        let track = lines(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(track.window(0, 2), 0..3);
        assert_eq!(track.window(3, 2), 1..6);
        assert_eq!(track.window(5, 2), 3..6);
        assert_eq!(track.window(2, 0), 2..3);
        assert_eq!(track.window(99, 1), 4..6);
        assert_eq!(lines(&[]).window(0, 2), 0..0);
    }
}
