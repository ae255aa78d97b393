// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

use crate::config::Config;
use crate::Cli;
use anyhow::{Context, Result};
use launcher_hid::{
    Clock, Direction, FireSummary, Launcher, MoveDuration, StatusReport, Transport,
};
use log::debug;

/// How status information is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything one run of the tool will do, fixed before the device is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub movement: Option<(Direction, MoveDuration)>,
    pub fire: bool,
    pub status: bool,
    pub format: OutputFormat,
}

impl Invocation {
    /// Resolve parsed arguments against the configuration.
    ///
    /// Without any of move, fire or status the run fires one missile.
    pub fn from_cli(cli: &Cli, config: &Config) -> Result<Self> {
        let nothing_requested = cli.movement.is_none() && !cli.fire && !cli.status;

        if cli.movement.is_none() && cli.time.is_some() {
            debug!("--time given without --move, ignoring");
        }

        let movement = match cli.movement {
            Some(direction) => {
                let duration = match cli.time {
                    Some(duration) => duration,
                    None => config.default_move_duration()?,
                };
                Some((direction, duration))
            }
            None => None,
        };

        Ok(Self {
            movement,
            fire: cli.fire || nothing_requested,
            status: cli.status,
            format: cli.format,
        })
    }
}

/// What a completed run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub moved: Option<(Direction, MoveDuration)>,
    pub fired: Option<FireSummary>,
    pub status: Option<StatusReport>,
}

/// Move, then fire, then query status, stopping at the first failure
pub fn run<T: Transport, C: Clock>(
    invocation: &Invocation,
    launcher: &mut Launcher<T, C>,
) -> Result<Outcome> {
    let mut outcome = Outcome::default();

    if let Some((direction, duration)) = invocation.movement {
        launcher
            .move_turret(direction, duration)
            .context("Failed to move turret")?;
        outcome.moved = Some((direction, duration));
    }

    if invocation.fire {
        let summary = launcher.fire().context("Failed to fire missile")?;
        outcome.fired = Some(summary);
    }

    if invocation.status {
        let status = launcher
            .query_status()
            .context("Failed to retrieve status information")?;
        outcome.status = Some(status);
    }

    Ok(outcome)
}

pub fn render_status(status: &StatusReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(status.to_string()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(status).context("Failed to serialize status")
        }
    }
}
