//! Live PGN tournament simulator
//!
//! Plays random legal moves on several boards at a fixed cadence and rewrites
//! `board_N.pgn` after every move. Finished games can be collected in
//! `tournament.pgn` and boards restarted automatically.
//!
//! Usage: pgn-simulator --config config.yaml [--verbose]

use std::path::PathBuf;
use std::sync::Arc;

use chess_core::rules::StandardRules;
use clap::Parser;
use simulator::{Orchestrator, PgnWriter, SimulatorConfig};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pgn-simulator", about = "Chess tournament simulator with live PGN updates")]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(long)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .init();

    info!("Loading configuration from {}", args.config.display());
    let config = match SimulatorConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            return Err(e.into());
        }
    };

    info!("Configuration loaded:");
    info!("  Boards: {}", config.number_of_boards);
    info!("  Move interval: {}s", config.move_interval_seconds);
    info!("  Max moves per game: {}", config.max_moves_per_game);
    info!("  Output directory: {}", config.output_directory);
    info!("  Event: {}", config.event_name);
    info!("  Auto-restart: {}", config.auto_restart_games);
    info!("  Tournament file: {}", config.use_single_tournament_file);

    let writer = PgnWriter::new(&config.output_directory)?;
    info!("Output directory ready: {}", writer.output_directory().display());

    let interval = config.move_interval();
    let mut orchestrator = Orchestrator::initialize(config, Arc::new(StandardRules::new()), writer)?;

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Starting tournament simulation...");
    info!("Press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Received interrupt signal, shutting down gracefully...");
                break;
            }
            _ = ticker.tick() => {
                // Runs to completion; the signal is only observed between ticks.
                if let Err(e) = orchestrator.tick() {
                    error!(error = %e, "Tick failed, flushing boards before exit");
                    if let Err(flush) = orchestrator.shutdown() {
                        error!(error = %flush, "Final flush failed");
                    }
                    return Err(e.into());
                }
            }
        }
    }

    orchestrator.shutdown()?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
