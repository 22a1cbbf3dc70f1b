//! Driver task that owns a [`Session`] and feeds it song selections, media events and load results.

use crate::error::Result;
use crate::loader::SyncDataLoader;
use crate::media::MediaEvent;
use crate::render::LyricDisplay;
use crate::session::{LoadTicket, Session};
use crate::track::LyricTrack;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Input accepted by a running player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// The user picked a song; load its lyrics
    SelectSong(String),
    /// Forward a media element event to the session
    Media(MediaEvent),
}

/// Sender side of a running player. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<PlayerCommand>,
    cancel_token: CancellationToken,
}

impl PlayerHandle {
    /// Select a song. Returns `false` if the player has stopped.
    pub fn select_song(&self, song: impl Into<String>) -> bool {
        self.send(PlayerCommand::SelectSong(song.into()))
    }

    /// Forward a media event. Returns `false` if the player has stopped.
    pub fn media_event(&self, event: MediaEvent) -> bool {
        self.send(PlayerCommand::Media(event))
    }

    pub fn send(&self, command: PlayerCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Get a clone of the cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Ask the player to stop once queued commands are handled
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

type Completion = (LoadTicket, Result<LyricTrack>);

/// Event loop serializing everything that touches a session.
///
/// Loads run on their own tasks and report back through a channel, so ticks
/// keep being handled while a fetch is in flight.
pub struct Player<D: LyricDisplay> {
    session: Session<D>,
    loader: Arc<SyncDataLoader>,
    commands: mpsc::UnboundedReceiver<PlayerCommand>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    cancel_token: CancellationToken,
}

impl<D: LyricDisplay + Send + 'static> Player<D> {
    /// Start a player in a background task
    ///
    /// # Arguments
    /// * `session` - Session to drive; returned when the task ends
    /// * `loader` - Loader used for every song selection
    /// * `cancel_token` - Optional external cancellation token for graceful shutdown
    #[must_use]
    pub fn spawn(
        session: Session<D>,
        loader: Arc<SyncDataLoader>,
        cancel_token: Option<CancellationToken>,
    ) -> (PlayerHandle, JoinHandle<Session<D>>) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let cancel_token = cancel_token.unwrap_or_default();

        let player = Self {
            session,
            loader,
            commands,
            completions_tx,
            completions_rx,
            cancel_token: cancel_token.clone(),
        };
        let handle = PlayerHandle {
            commands: commands_tx,
            cancel_token,
        };
        (handle, tokio::spawn(player.run()))
    }

    async fn run(mut self) -> Session<D> {
        info!("Player started");

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        info!("All player handles dropped, stopping");
                        break;
                    };
                    self.handle_command(command);
                }
                Some((ticket, result)) = self.completions_rx.recv() => {
                    self.session.complete_load(ticket, result);
                }
                () = self.cancel_token.cancelled() => {
                    info!("Player shutting down");
                    break;
                }
            }
        }

        self.session
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::SelectSong(song) => self.start_load(song),
            PlayerCommand::Media(event) => self.session.on_media_event(event),
        }
    }

    fn start_load(&mut self, song: String) {
        let ticket = self.session.begin_load(&song);
        let loader = Arc::clone(&self.loader);
        let completions = self.completions_tx.clone();

        tokio::spawn(async move {
            let result = loader.load(&song).await;
            if completions.send((ticket, result)).is_err() {
                debug!("Player stopped before lyrics for {} finished loading", song);
            }
        });
    }
}
