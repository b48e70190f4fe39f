//! tap-play - Play Tapstreak from the terminal
//!
//! Reads one command per line from stdin and prints a frame for every
//! state the game publishes.

mod command;

use std::future::Future;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use libtapstreak::logging::{LogFormat, LoggingConfig};
use libtapstreak::{
    Config, FeatureBuilder, FileStore, MemoryStore, RandomSquares, Renderer, TapStreakError,
    TextRenderer, Wish,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::command::Command;

#[derive(Parser, Debug)]
#[command(name = "tap-play")]
#[command(version)]
#[command(about = "Play Tapstreak from the terminal")]
#[command(long_about = "\
tap-play - Play Tapstreak from the terminal

DESCRIPTION:
    Squares appear one at a time on a square board. Press inside each one
    before it disappears to grow your streak. Miss one and the run is over.
    Squares shrink and come faster as the streak grows.

COMMANDS (one per line on stdin):
    press X Y    Press the board at X,Y (alias: p X Y)
    pause        Stop all timers
    resume       Restart the timer for the current phase
    quit         Leave the game

USAGE:
    # Play on the default 100x100 board
    tap-play

    # Reproducible square placement, no saved high score
    tap-play --seed 42 --ephemeral

SIGNALS:
    SIGTERM, SIGINT - Pause and exit cleanly

CONFIGURATION:
    Configuration file: ~/.config/tapstreak/config.toml
    High score: ~/.local/share/tapstreak/highscore.json

EXIT CODES:
    0 - Clean exit
    1 - Runtime or storage error
    2 - Configuration error
    3 - Invalid input
")]
struct Cli {
    /// Configuration file (default: $TAPSTREAK_CONFIG or the XDG config dir)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Board side length (overrides config)
    #[arg(long, value_name = "UNITS")]
    board_size: Option<u32>,

    /// Countdown length in seconds (overrides config)
    #[arg(long, value_name = "SECONDS")]
    countdown: Option<u32>,

    /// Seed for square placement
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the high score in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log output format: text, json or pretty
    #[arg(long, default_value = "text", env = "TAPSTREAK_LOG_FORMAT")]
    log_format: LogFormat,

    /// Minimum log level when not verbose
    #[arg(long, default_value = "warn", env = "TAPSTREAK_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::new(cli.log_format, cli.log_level.clone(), cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<TapStreakError>()
            .map(TapStreakError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    let builder = if cli.ephemeral {
        FeatureBuilder::from_config(&config, MemoryStore::default())
    } else {
        let store = FileStore::from_config(&config.storage);
        debug!(path = %store.path().display(), "using high score file");
        FeatureBuilder::from_config(&config, store)
    };
    let builder = match cli.seed {
        Some(seed) => builder.squares(RandomSquares::seeded(seed)),
        None => builder,
    };

    let feature = builder.spawn()?;
    let mut states = feature.subscribe();
    let mut renderer = TextRenderer::new(io::stdout());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!(board_size = config.board.size, "tap-play starting");
    eprintln!("{}", command::USAGE);
    renderer.render(&feature.current().state)?;

    // Hosts resume once on start-up
    feature.send(Wish::Resume)?;

    let signal = shutdown_signal()?;
    tokio::pin!(signal);

    loop {
        tokio::select! {
            _ = &mut signal => break,

            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    debug!("stdin closed");
                    break;
                };
                match Command::parse(&line) {
                    Some(Ok(Command::Wish(wish))) => feature.send(wish)?,
                    Some(Ok(Command::Quit)) => break,
                    Some(Err(e)) => eprintln!("{}", e),
                    None => {}
                }
            }

            snapshot = states.recv() => match snapshot {
                Ok(snapshot) => renderer.render(&snapshot.state)?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "renderer fell behind");
                    renderer.render(&feature.current().state)?;
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    // Already closed is fine; shutdown below settles either way
    let _ = feature.send(Wish::Pause);
    feature.shutdown().await;
    info!("tap-play stopped");
    Ok(())
}

fn load_config(cli: &Cli) -> libtapstreak::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    if let Some(size) = cli.board_size {
        config.board.size = size;
    }
    if let Some(countdown) = cli.countdown {
        config.board.countdown_length = countdown;
    }
    config.validate()?;

    Ok(config)
}

#[cfg(unix)]
fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
    use futures::stream::StreamExt;
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook_tokio::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("signal setup failed")?;
    Ok(async move {
        if let Some(signal) = signals.next().await {
            info!(signal, "received shutdown signal, stopping");
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
    Ok(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c, stopping");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "tap-play",
            "--config",
            "/nonexistent/tapstreak.toml",
            "--board-size",
            "240",
        ]);
        assert_eq!(cli.board_size, Some(240));

        // A missing explicit config file is an error, not the defaults
        assert!(matches!(
            load_config(&cli),
            Err(TapStreakError::Config(_))
        ));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tap-play"]);
        assert!(!cli.ephemeral);
        assert!(cli.seed.is_none());
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_cli_rejects_unknown_log_format() {
        let result = Cli::try_parse_from(["tap-play", "--log-format", "xml"]);
        assert!(result.is_err());
    }
}
