//! Athan CLI - live prayer times with an automatic call to prayer
//!
//! - Shows the clock, today's five prayer times and the countdown to the next
//! - Plays the athan once when each prayer begins (Fajr has its own recording)
//! - Press Enter to play the athan now

use std::io::BufRead;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use athan::cli::{Cli, Commands, Display, RunArgs, TodayArgs};
use athan::daemon::{build_snapshot, spawn_wall_clock, AthanEngine, EngineCommand, EngineEvent};
use athan::schedule::build;
use athan::sound::{try_create_backend, AudioBackend, PlaybackController, SilentBackend, SoundAssets};
use athan::source::{fetch_day, AladhanClient};
use athan::types::AthanConfig;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => run_live(args).await,
        Some(Commands::Today(args)) => show_today(args).await,
        None => run_live(RunArgs::default()).await,
    }
}

fn validated(config: AthanConfig) -> Result<AthanConfig> {
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;
    Ok(config)
}

fn create_client(config: &AthanConfig, api_url: &str) -> Result<AladhanClient> {
    let client = AladhanClient::new(config.location.clone(), config.request_timeout())
        .context("Failed to create HTTP client")?
        .with_base_url(api_url);
    Ok(client)
}

/// Runs the live engine until Ctrl-C.
async fn run_live(args: RunArgs) -> Result<()> {
    let config = validated(args.to_config())?;
    let client = create_client(&config, &args.source.api_url)?;

    let backend: Arc<dyn AudioBackend> =
        match try_create_backend(SoundAssets::new(&config.sounds_dir), args.no_sound) {
            Some(backend) => Arc::new(backend),
            None => Arc::new(SilentBackend),
        };
    let playback = Arc::new(PlaybackController::new(backend));

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (tick_tx, tick_rx) = mpsc::channel(8);
    let (command_tx, command_rx) = mpsc::channel(8);

    let mut engine = AthanEngine::new(config, Arc::new(client), playback, event_tx)?;
    let clock = spawn_wall_clock(tick_tx);
    spawn_manual_trigger(command_tx.clone());
    spawn_ctrl_c_handler(command_tx);

    let json = args.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match &event {
                EngineEvent::Tick(snapshot) if json => {
                    if let Err(e) = Display::show_json(snapshot) {
                        warn!("{:#}", e);
                    }
                }
                EngineEvent::Tick(snapshot) => Display::show_status_line(snapshot),
                other if !json => Display::show_event(other),
                _ => {}
            }
        }
    });

    let result = engine.run(tick_rx, command_rx).await;

    clock.abort();
    // Dropping the engine closes the event channel, which ends the printer.
    drop(engine);
    let _ = printer.await;
    if !json {
        println!();
    }
    result
}

/// Fetches today's data once and prints it.
async fn show_today(args: TodayArgs) -> Result<()> {
    let config = validated(args.to_config())?;
    let client = create_client(&config, &args.source.api_url)?;

    let now = Local::now().naive_local();
    let day = fetch_day(&client, now.date(), config.request_timeout()).await;
    let raw = day.timings.context("Failed to fetch prayer times")?;
    let schedule = build(&raw).context("Received an unusable schedule")?;
    let snapshot = build_snapshot(Some(&schedule), now, day.hijri.ok().as_ref(), None);

    if args.json {
        Display::show_json(&snapshot)
    } else {
        Display::show_schedule(&snapshot);
        Ok(())
    }
}

/// Sends `PlayNow` each time a line is read from stdin.
///
/// Runs on a plain thread so a pending read never holds up runtime shutdown.
fn spawn_manual_trigger(tx: mpsc::Sender<EngineCommand>) {
    let spawned = thread::Builder::new()
        .name("athan-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if line.is_err() || tx.blocking_send(EngineCommand::PlayNow).is_err() {
                    break;
                }
            }
            debug!("Stdin closed, manual playback unavailable");
        });
    if let Err(e) = spawned {
        warn!("Manual playback unavailable: {}", e);
    }
}

/// Sends `Shutdown` on Ctrl-C.
fn spawn_ctrl_c_handler(tx: mpsc::Sender<EngineCommand>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(EngineCommand::Shutdown).await;
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}

// ============================================================================
// Tests
// ============================================================================
