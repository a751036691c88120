mod camera;
mod frame;
mod pipeline;
mod settings;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::frame::FrameSlot;
use crate::pipeline::{CycleOutcome, DetectorSuite, Pipeline};
use crate::settings::VisionSettings;
use crate::telemetry::{JsonlSink, LogSink, TelemetrySink};

/// Continuously analyzes camera frames for game pieces and retroreflective
/// vision targets and publishes distance/angle telemetry every cycle.
#[derive(Debug, Parser)]
#[command(name = "fieldvision")]
struct Args {
    /// Vision settings file; defaults apply when absent or unreadable.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Camera device index.
    #[arg(long, default_value_t = 0)]
    device: u32,

    /// Stop after this many detection cycles (runs forever by default).
    #[arg(long)]
    cycles: Option<u64>,

    /// Record telemetry as JSON lines to this file instead of the log.
    #[arg(long)]
    telemetry: Option<PathBuf>,

    /// Disable the ball detector.
    #[arg(long)]
    no_balls: bool,

    /// Disable the field-marker detector.
    #[arg(long)]
    no_markers: bool,

    /// Enable the paired-stripe goal detector.
    #[arg(long)]
    find_goal: bool,
}

// Pause when no frame is available yet, so startup doesn't busy-wait.
const IDLE_DELAY: Duration = Duration::from_millis(20);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => VisionSettings::load(path),
        None => VisionSettings::default(),
    };

    let suite = DetectorSuite {
        camera: settings.camera_model(),
        ball: (!args.no_balls)
            .then(|| settings.ball_config())
            .transpose()
            .context("invalid ball color range")?,
        marker: (!args.no_markers)
            .then(|| settings.marker_config())
            .transpose()
            .context("invalid tape color range")?,
        goal: args
            .find_goal
            .then(|| settings.goal_config())
            .transpose()
            .context("invalid goal color range")?
            .map(|config| (config, settings.goal_mount())),
    };

    let device = camera::open_camera(args.device, &settings.camera)
        .context("unable to open camera")?;
    let slot = Arc::new(FrameSlot::new());
    let capture = camera::spawn_capture(device, Arc::clone(&slot))
        .context("unable to start capture thread")?;
    tracing::info!(device = args.device, "capture started");

    let mut sink: Box<dyn TelemetrySink> = match &args.telemetry {
        Some(path) => Box::new(JsonlSink::create(path).context("unable to create telemetry file")?),
        None => Box::new(LogSink),
    };

    let mut pipeline = Pipeline::new(slot, suite);
    let mut completed = 0_u64;
    loop {
        match pipeline.run_cycle(sink.as_mut()) {
            CycleOutcome::Skipped => std::thread::sleep(IDLE_DELAY),
            CycleOutcome::Processed { balls, markers, tape_found } => {
                completed += 1;
                tracing::debug!(cycle = completed, balls, markers, tape_found, "cycle done");
                if args.cycles.is_some_and(|max| completed >= max) {
                    break;
                }
            }
        }
    }

    capture.stop();
    tracing::info!(cycles = completed, "shut down cleanly");
    Ok(())
}
