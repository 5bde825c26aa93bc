//! Virtual Keyboard - drive keyboard firmware logic from typed or scripted
//! matrix scans.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

use virtual_keyboard::{
    config::Config,
    hid::{HidKeyboard, StandardReportConsumer},
    input::{ConsoleSource, LineSource, ScriptSource},
    leds::LedStrip,
    session::SessionReport,
    telemetry::{self, TelemetryLog},
    CycleOutcome, VirtualKeyboard,
};

/// The emulated board: reference dispatcher on the reference matrix
type Device = VirtualKeyboard;

#[derive(Parser)]
#[command(name = "virtual-keyboard")]
#[command(about = "Virtual key matrix and USB HID report emulator")]
struct Cli {
    /// Play back matrix scan lines from a file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,
    /// Config file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for telemetry logs
    #[arg(long)]
    results_dir: Option<PathBuf>,
    /// Write a JSON session report here when the session ends
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            Config::load_from(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => Config::load().unwrap_or_else(|e| {
            warn!("using default config: {}", e);
            Config::default()
        }),
    };
    if let Some(dir) = cli.results_dir {
        config.telemetry.results_dir = dir;
    }
    if let Some(path) = cli.report {
        config.session.report_path = Some(path);
    }

    // Telemetry plumbing
    let (telemetry_tx, telemetry_rx) = telemetry::channel();
    let mut telemetry = if config.telemetry.enabled {
        TelemetryLog::new(telemetry_rx, &config.telemetry.results_dir)
    } else {
        TelemetryLog::disabled(telemetry_rx)
    };

    let consumer = if config.session.echo_reports {
        StandardReportConsumer::stdout()
    } else {
        StandardReportConsumer::silent()
    };
    let keyboard = HidKeyboard::new(Box::new(consumer.with_telemetry(telemetry_tx.clone())));
    let leds = LedStrip::new(config.leds.count, Device::MATRIX_COLS).with_telemetry(telemetry_tx);

    let mut device = Device::new(keyboard, leds);
    device.setup();
    device.matrix.set_read_enabled(config.matrix.read_enabled);
    info!(
        "emulating a {}x{} matrix",
        device.matrix.rows(),
        device.matrix.cols()
    );

    ctrlc::set_handler(|| {
        info!("interrupted");
        std::process::exit(0);
    })
    .context("installing Ctrl+C handler")?;

    let mut source: Box<dyn LineSource> = match &cli.script {
        Some(path) => Box::new(
            ScriptSource::open(path).with_context(|| format!("opening script {}", path.display()))?,
        ),
        None => Box::new(ConsoleSource::new()),
    };

    let start_time = Instant::now();
    loop {
        let outcome = device
            .cycle(source.as_mut())
            .context("reading matrix scan input")?;
        match outcome {
            CycleOutcome::Continue => {
                device.sync_leds();
                telemetry.drain().context("writing telemetry")?;
            }
            // Operator escape hatch: leave immediately
            CycleOutcome::Quit => std::process::exit(0),
            CycleOutcome::EndOfInput => break,
            CycleOutcome::Idle => {
                warn!("matrix reading is disabled, nothing to do");
                break;
            }
        }
    }

    device.end();
    telemetry.drain().context("writing telemetry")?;
    telemetry.flush().context("flushing telemetry")?;

    if let Some(path) = &config.session.report_path {
        SessionReport::new(start_time, &device.stats)
            .export_json(path)
            .with_context(|| format!("writing session report {}", path.display()))?;
        info!("session report written to {}", path.display());
    }

    info!(
        "session complete: {} cycles, {} reports sent",
        device.stats.cycles, device.stats.reports_sent
    );

    Ok(())
}
