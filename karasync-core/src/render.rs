//! Turning lookup results into display content.

use crate::index::ActiveEntry;
use crate::track::LyricTrack;
use tracing::trace;

/// How the active entry is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Only the active word, emphasized
    Word,
    /// A window of lines around the active line
    Line,
}

/// How the display should bring the current line into view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Smooth scroll with the current line centered
    SmoothCenter,
}

/// A line inside a [`DisplayFragment::Lines`] window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub text: String,
    pub current: bool,
}

/// Content handed to the display in place of whatever it showed before
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayFragment {
    /// Nothing active; clear the lyric area
    Empty,
    /// A single emphasized word or phrase
    Word(String),
    /// A window of lines, exactly one of which is current
    Lines(Vec<DisplayLine>),
}

/// The surface lyrics are drawn on.
///
/// Implementations replace their whole content on each call; the renderer
/// takes care of not calling them when nothing changed.
pub trait LyricDisplay {
    /// Replace the lyric content
    fn replace_content(&mut self, fragment: &DisplayFragment);

    /// Show a short status message (loading, unavailable, errors)
    fn set_status(&mut self, message: &str);

    /// Remove any status message
    fn clear_status(&mut self) {
        self.set_status("");
    }

    /// Bring the current line into view
    fn scroll_to_current(&mut self, behavior: ScrollBehavior);
}

/// Identity of what is currently shown, for suppressing redundant renders
#[derive(Debug, Clone, Copy, PartialEq)]
enum RenderKey {
    /// Display was cleared because nothing is active
    Blank,
    /// Word mode: index of the shown entry
    Index(usize),
    /// Line mode: start time of the anchor line
    StartTime(f64),
}

/// What was last pushed to the display. Reset whenever the track is replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderState {
    last_shown_key: Option<RenderKey>,
}

impl RenderState {
    /// Start time of the most recently rendered line, if one is shown
    #[must_use]
    pub const fn last_shown_start(&self) -> Option<f64> {
        match self.last_shown_key {
            Some(RenderKey::StartTime(start)) => Some(start),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        self.last_shown_key.is_none()
    }
}

/// Renders lookup results, skipping ticks whose active entry did not change
#[derive(Debug, Clone)]
pub struct LyricRenderer {
    mode: RenderMode,
    window_radius: usize,
    state: RenderState,
}

impl LyricRenderer {
    #[must_use]
    pub fn new(mode: RenderMode, window_radius: usize) -> Self {
        Self {
            mode,
            window_radius,
            state: RenderState::default(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> RenderMode {
        self.mode
    }

    #[must_use]
    pub const fn state(&self) -> &RenderState {
        &self.state
    }

    /// Switch mode for a newly loaded track and forget what was shown
    pub fn reset(&mut self, mode: RenderMode) {
        self.mode = mode;
        self.state = RenderState::default();
    }

    /// Build the fragment for `active` without touching render state
    #[must_use]
    pub fn fragment(&self, active: Option<ActiveEntry<'_>>, track: &LyricTrack) -> DisplayFragment {
        let Some(active) = active else {
            return DisplayFragment::Empty;
        };
        match self.mode {
            RenderMode::Word => DisplayFragment::Word(active.entry.text().to_string()),
            RenderMode::Line => {
                let lines = track
                    .window(active.index, self.window_radius)
                    .filter_map(|i| {
                        track.get(i).map(|entry| DisplayLine {
                            text: entry.text().to_string(),
                            current: i == active.index,
                        })
                    })
                    .collect();
                DisplayFragment::Lines(lines)
            }
        }
    }

    /// Push the fragment for `active` to `display` if it differs from the last one.
    ///
    /// Returns `true` when the display content was replaced.
    pub fn render(
        &mut self,
        active: Option<ActiveEntry<'_>>,
        track: &LyricTrack,
        display: &mut dyn LyricDisplay,
    ) -> bool {
        let key = match (active, self.mode) {
            (None, _) => RenderKey::Blank,
            (Some(a), RenderMode::Word) => RenderKey::Index(a.index),
            (Some(a), RenderMode::Line) => RenderKey::StartTime(a.entry.start_time()),
        };
        if self.state.last_shown_key == Some(key) {
            trace!("Active entry unchanged, skipping render");
            return false;
        }

        display.replace_content(&self.fragment(active, track));
        if self.mode == RenderMode::Line && active.is_some() {
            display.scroll_to_current(ScrollBehavior::SmoothCenter);
        }
        self.state.last_shown_key = Some(key);
        true
    }
}
