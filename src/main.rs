//! Head-turn liveness replay tool.

use anyhow::{Context, Result};
use clap::Parser;
use head_pose_liveness::{
    app::{AppConfig, ReplayApp},
    config::{Config, EXAMPLE_CONFIG},
    session::{LivenessEvent, SessionOutcome},
};
use log::{info, warn};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines trace of detection frames to replay
    #[arg(short, long, required_unless_present = "write_example_config")]
    trace: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Path reported for the session video (no recording when omitted)
    #[arg(long)]
    video_output: Option<PathBuf>,

    /// Path reported for the still photo (no photo when omitted)
    #[arg(long)]
    photo_output: Option<PathBuf>,

    /// Pace frames by their timestamps instead of replaying at full speed
    #[arg(long)]
    realtime: bool,

    /// Write an example configuration file and exit
    #[arg(long, value_name = "PATH")]
    write_example_config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if let Some(path) = &args.write_example_config {
        std::fs::write(path, EXAMPLE_CONFIG)
            .with_context(|| format!("Failed to write example config to {}", path.display()))?;
        info!("Example configuration written to {}", path.display());
        return Ok(());
    }

    info!("Head Pose Liveness - trace replay");

    // Load configuration if provided
    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    let trace = args.trace.context("--trace is required")?;
    let app = ReplayApp::new(AppConfig {
        trace,
        config,
        video_output: args.video_output,
        photo_output: args.photo_output,
        realtime: args.realtime,
    })?;

    // Print every event as one JSON line
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<LivenessEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize event: {}", e),
            }
        }
    });

    let outcome = app.run(events_tx).await?;
    printer.await.context("Event printer failed")?;

    match outcome {
        SessionOutcome::Completed(result) => info!("Liveness confirmed: {:?}", result),
        SessionOutcome::TimedOut => warn!("Liveness session timed out"),
        SessionOutcome::Abandoned => warn!("Trace ended before the gesture was complete"),
    }

    Ok(())
}
