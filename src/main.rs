//! CLI entry point for segtemp
//!
//! # Usage
//!
//! Run the monitor loop:
//! ```bash
//! segtemp run
//! segtemp --config config/segtemp.toml run --iterations 500
//! ```
//!
//! Work with recorded captures:
//! ```bash
//! segtemp record captures/boot.cap
//! segtemp decode captures/boot.cap
//! ```
//!
//! Inspect state:
//! ```bash
//! segtemp current
//! segtemp config
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use segtemp::capture::CaptureWindow;
use segtemp::config::{MonitorConfig, DEFAULT_CONFIG_PATH};
use segtemp::decode::FrameDecoder;
use segtemp::hardware::{open_sampler, LinePins};
use segtemp::monitor::Monitor;
use segtemp::storage::{read_current, FileSink};
use tracing::info;

#[derive(Parser)]
#[command(name = "segtemp")]
#[command(about = "Seven-segment display temperature reader", long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/segtemp.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capture/decode/persist loop
    Run {
        /// Stop after this many iterations instead of running forever
        #[arg(long)]
        iterations: Option<u64>,
    },

    /// Decode a recorded capture file once
    Decode {
        /// Capture file written by `record`
        capture: PathBuf,
    },

    /// Record one capture window to a file
    Record {
        /// Destination capture file
        output: PathBuf,
    },

    /// Print the value held in the current-value file
    Current,

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MonitorConfig::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => MonitorConfig::load()
            .with_context(|| format!("loading configuration from {DEFAULT_CONFIG_PATH}"))?,
    };
    config.validate().context("invalid configuration")?;

    match cli.command {
        Commands::Run { iterations } => run_monitor(&config, iterations),
        Commands::Decode { capture } => decode_capture(&config, capture),
        Commands::Record { output } => record_capture(&config, output),
        Commands::Current => print_current(&config),
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn run_monitor(config: &MonitorConfig, iterations: Option<u64>) -> Result<()> {
    segtemp::logging::init_from_config(config).context("initialising logging")?;
    info!(backend = ?config.sampler.backend, "segtemp starting");

    let sampler = open_sampler(config).context("opening line sampler")?;
    let sink = FileSink::from_config(&config.storage);
    let mut monitor = Monitor::new(config, sampler, sink);

    let stats = monitor.run(iterations).context("monitor stopped")?;
    info!(
        iterations = stats.iterations,
        commits = stats.commits,
        rejected = stats.rejections(),
        "segtemp finished"
    );
    Ok(())
}

fn decode_capture(config: &MonitorConfig, path: PathBuf) -> Result<()> {
    let window = CaptureWindow::load(&path)
        .with_context(|| format!("reading capture {}", path.display()))?;
    let decoder = FrameDecoder::from_config(&config.decoder);

    match decoder.decode(&window) {
        Ok(value) => println!("{value}"),
        Err(reason) => println!("rejected: {reason}"),
    }
    Ok(())
}

fn record_capture(config: &MonitorConfig, path: PathBuf) -> Result<()> {
    let mut sampler = open_sampler(config).context("opening line sampler")?;
    let pins = LinePins::new(config.sampler.clock_pin, config.sampler.data_pin);
    let window = CaptureWindow::capture(&mut sampler, pins, config.sampler.sample_count)
        .context("capturing window")?;
    window
        .save(&path)
        .with_context(|| format!("writing capture {}", path.display()))?;
    println!("Recorded {} samples to {}", window.len(), path.display());
    Ok(())
}

fn print_current(config: &MonitorConfig) -> Result<()> {
    let path = &config.storage.current_path;
    let value = read_current(path).with_context(|| format!("reading {}", path.display()))?;
    println!("{value}");
    Ok(())
}
