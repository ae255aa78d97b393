// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

mod app;
mod config;

use anyhow::{Context, Result};
use app::{Invocation, OutputFormat};
use clap::Parser;
use config::{Config, LoggingConfig};
use launcher_hid::{
    Direction, EmulatedLauncher, Launcher, LauncherDevice, MoveDuration, SystemClock,
};
use log::{debug, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// USB missile launcher application for Dream Cheeky's Rocket Baby device.
/// If no action is requested, fires one missile and exits.
#[derive(Parser, Debug)]
#[command(name = "launcher", version)]
pub struct Cli {
    /// Move the turret in the requested direction. Must be one of up, down, left, or right
    #[arg(short = 'm', long = "move", value_name = "DIR")]
    pub movement: Option<Direction>,

    /// The duration for moving the requested direction, in milliseconds (0-9999)
    #[arg(short, long, value_name = "TIME")]
    pub time: Option<MoveDuration>,

    /// Fire the turret
    #[arg(short, long)]
    pub fire: bool,

    /// Print out status information
    #[arg(short = 'p', long)]
    pub status: bool,

    /// Status output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Drive the built-in emulator instead of the USB device
    #[arg(long)]
    pub emulate: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    init_logging(&config.logging, cli.verbose);

    let invocation = Invocation::from_cli(&cli, &config)?;
    debug!("Invocation: {:?}", invocation);

    let clock = SystemClock::new();
    let sequencer = config.sequencer_config();

    // The device is closed when the launcher goes out of scope, on success and on error
    let outcome = if cli.emulate {
        info!("Using emulated launcher");
        let emulator = EmulatedLauncher::with_config(clock, config.emulator_config());
        let mut launcher = Launcher::new(emulator, clock).with_config(sequencer);
        app::run(&invocation, &mut launcher)?
    } else {
        let device = LauncherDevice::open(&config.device_info())
            .context("Failed to open requested device")?
            .with_read_timeout(config.read_timeout());
        let mut launcher = Launcher::new(device, clock).with_config(sequencer);
        app::run(&invocation, &mut launcher)?
    };

    if let Some((direction, duration)) = outcome.moved {
        info!("Moved {} for {}", direction, duration);
    }
    if let Some(summary) = outcome.fired {
        info!(
            "Missile fired, confirmed after {} polls ({:?})",
            summary.polls, summary.confirmed_after
        );
    }
    if let Some(status) = outcome.status {
        println!("{}", app::render_status(&status, invocation.format)?);
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig, verbose: u8) {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "info",
        _ => "debug",
    };

    env_logger::Builder::new()
        .parse_filters(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
