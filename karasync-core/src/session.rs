use crate::error::Result;
use crate::index::LookupPolicy;
use crate::media::MediaEvent;
use crate::render::{DisplayFragment, LyricDisplay, LyricRenderer, RenderMode};
use crate::track::LyricTrack;
use tracing::{debug, info, trace, warn};

pub const STATUS_LOADING: &str = "Loading lyrics...";
pub const STATUS_NO_LYRICS_DATA: &str = "No lyrics data";

/// Where the session is in loading lyrics for the selected song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// No song selected yet
    #[default]
    NoData,
    /// A load is in flight
    Loading,
    /// A track is loaded (possibly empty)
    Ready,
    /// The last load failed or the song has no lyrics mapped
    Unavailable,
}

/// Identifies one load attempt. Only the ticket from the latest
/// [`Session::begin_load`] is accepted by [`Session::complete_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Static tuning applied to every lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Seconds added to the raw media position before lookup
    pub calibration_offset: f64,
    /// Forces a lookup policy instead of the track format's default
    pub policy: Option<LookupPolicy>,
    /// Lines shown either side of the current line in line mode
    pub window_radius: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            calibration_offset: 0.0,
            policy: None,
            window_radius: 2,
        }
    }
}

/// Player state for one display: the loaded track, what is shown, and the load state machine.
///
/// All handlers take `&mut self` and run to completion, so a tick never sees a
/// partially replaced track.
pub struct Session<D: LyricDisplay> {
    display: D,
    options: SessionOptions,
    track: LyricTrack,
    renderer: LyricRenderer,
    phase: LoadPhase,
    generation: u64,
    song: Option<String>,
    media_duration: Option<f64>,
}

impl<D: LyricDisplay> Session<D> {
    pub fn new(display: D, options: SessionOptions) -> Self {
        let track = LyricTrack::default();
        let renderer = LyricRenderer::new(track.format().render_mode(), options.window_radius);
        Self {
            display,
            options,
            track,
            renderer,
            phase: LoadPhase::NoData,
            generation: 0,
            song: None,
            media_duration: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> LoadPhase {
        self.phase
    }

    #[must_use]
    pub const fn track(&self) -> &LyricTrack {
        &self.track
    }

    #[must_use]
    pub const fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Song of the most recent load
    #[must_use]
    pub fn song(&self) -> Option<&str> {
        self.song.as_deref()
    }

    /// Duration reported by the media element, if metadata has loaded
    #[must_use]
    pub const fn media_duration(&self) -> Option<f64> {
        self.media_duration
    }

    #[must_use]
    pub const fn render_mode(&self) -> RenderMode {
        self.renderer.mode()
    }

    /// Lookup policy for the current track
    #[must_use]
    pub fn policy(&self) -> LookupPolicy {
        self.options
            .policy
            .unwrap_or_else(|| self.track.format().default_policy())
    }

    /// Start loading lyrics for `song`. Any earlier load in flight becomes stale.
    pub fn begin_load(&mut self, song: &str) -> LoadTicket {
        self.generation += 1;
        info!("Selected song {} (load #{})", song, self.generation);

        self.song = Some(song.to_string());
        self.replace_track(LyricTrack::default());
        self.phase = LoadPhase::Loading;
        self.display.set_status(STATUS_LOADING);

        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the outcome of a load. Returns `false` if the ticket is stale and the result was dropped.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<LyricTrack>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale load #{} (current is #{})",
                ticket.generation, self.generation
            );
            return false;
        }

        match result {
            Ok(track) => {
                info!("Lyrics ready: {} entries ({})", track.len(), track.format());
                let empty = track.is_empty();
                self.replace_track(track);
                self.phase = LoadPhase::Ready;
                if empty {
                    self.display.set_status(STATUS_NO_LYRICS_DATA);
                } else {
                    self.display.clear_status();
                }
            }
            Err(e) => {
                warn!("Lyrics unavailable: {}", e);
                self.replace_track(LyricTrack::default());
                self.phase = LoadPhase::Unavailable;
                self.display.set_status(&e.status_message());
            }
        }
        true
    }

    /// Dispatch a media element event
    pub fn on_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::TimeUpdate { current_time } => {
                self.on_time_update(current_time);
            }
            MediaEvent::MetadataLoaded { duration } => self.on_metadata_loaded(duration),
            MediaEvent::Error { message } => self.on_media_error(&message),
        }
    }

    /// Handle a playback position tick. Returns `true` if the display content changed.
    pub fn on_time_update(&mut self, current_time: f64) -> bool {
        if self.phase != LoadPhase::Ready {
            debug!("Tick at {:.2}s ignored while {:?}", current_time, self.phase);
            return false;
        }
        if self.track.is_empty() {
            trace!("Tick at {:.2}s with no lyric entries", current_time);
            return false;
        }

        let time = current_time + self.options.calibration_offset;
        let active = self.track.find_active(time, self.policy());
        self.renderer.render(active, &self.track, &mut self.display)
    }

    pub fn on_metadata_loaded(&mut self, duration: f64) {
        debug!("Media metadata loaded, duration {:.2}s", duration);
        self.media_duration = duration.is_finite().then_some(duration);
    }

    /// Report an audio error. Lyric state is left as it is.
    pub fn on_media_error(&mut self, message: &str) {
        warn!("Media error: {}", message);
        self.display
            .set_status(&format!("Audio playback error: {message}"));
    }

    /// Swap in a new track. Anything drawn for the old one is cleared.
    fn replace_track(&mut self, track: LyricTrack) {
        if !self.renderer.state().is_fresh() {
            self.display.replace_content(&DisplayFragment::Empty);
        }
        self.renderer.reset(track.format().render_mode());
        self.track = track;
    }
}
