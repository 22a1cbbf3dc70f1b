mod display;

use crate::display::TerminalDisplay;
use karasync_core::{
    Config, CoreError, MediaEvent, PlaybackClock, Player, PlayerHandle, Session,
};
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often the simulated media element reports its position
const TICK_INTERVAL: Duration = Duration::from_millis(250);

const USAGE: &str = "Usage: karasync <song> [duration-secs]";

fn main() {
    let file_logging_enabled = check_file_logging_enabled();
    init_tracing(file_logging_enabled);

    let mut args = std::env::args().skip(1);
    let Some(song) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let duration = match args.next().map(|d| d.parse::<f64>()) {
        None => None,
        Some(Ok(secs)) => Some(secs),
        Some(Err(e)) => {
            eprintln!("Invalid duration: {e}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let config = match Config::load_or_create() {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            info!(
                "Created a new config at {}. Edit it and run karasync again.",
                path.display()
            );
            std::process::exit(0);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let loader = match config.build_loader() {
        Ok(loader) => Arc::new(loader),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    info!(
        "Loaded {} song mapping(s) from {}",
        loader.mapping().len(),
        Config::config_path().display()
    );

    let cancel_token = CancellationToken::new();

    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    let session = Session::new(TerminalDisplay::stdout(), config.session_options());

    runtime.block_on(async move {
        let (handle, task) = Player::spawn(session, loader, Some(cancel_token.clone()));
        let input = BufReader::new(tokio::io::stdin());
        play(&handle, &song, duration, input, &cancel_token).await;
        handle.shutdown();

        match task.await {
            Ok(session) => info!(
                "Stopped with {:?} lyrics for {}",
                session.phase(),
                session.song().unwrap_or("no song")
            ),
            Err(e) => error!("Player task failed: {e}"),
        }
    });

    // A pending stdin read would otherwise keep the runtime alive
    runtime.shutdown_background();
}

/// Simulate a media element: tick the position and switch songs on each input line
async fn play<R: AsyncBufRead + Unpin>(
    handle: &PlayerHandle,
    song: &str,
    duration: Option<f64>,
    input: R,
    cancel_token: &CancellationToken,
) {
    let mut clock = PlaybackClock::new(duration);
    start_song(handle, &mut clock, song);

    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    let mut lines = input.lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                if !handle.media_event(clock.time_update()) {
                    warn!("Player stopped unexpectedly");
                    break;
                }
                if clock.is_finished() {
                    info!("Playback finished");
                    break;
                }
            }
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => {
                    let next = line.trim();
                    if !next.is_empty() {
                        start_song(handle, &mut clock, next);
                    }
                }
                Ok(None) => input_open = false,
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    input_open = false;
                }
            },
        }
    }
}

fn start_song(handle: &PlayerHandle, clock: &mut PlaybackClock, song: &str) {
    handle.select_song(song);
    clock.seek(0.0);
    clock.play();
    if let Some(duration) = clock.duration {
        handle.media_event(MediaEvent::MetadataLoaded { duration });
    }
}

/// Check if file logging is enabled by reading the config file.
/// This is done before full config loading to set up tracing first.
/// Returns `false` if config doesn't exist or can't be parsed.
fn check_file_logging_enabled() -> bool {
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let Ok(content) = std::fs::read_to_string(Config::config_path()) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing on stderr with optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = karasync_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
