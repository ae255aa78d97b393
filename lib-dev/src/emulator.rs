// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

//! Software stand-in for the launcher hardware.
//!
//! Speaks the same two-byte output / one-byte input protocol as the real
//! device, so the sequencer can be exercised without USB hardware.

use crate::clock::Clock;
use crate::constants::{HID_REPORT_ID, OUTPUT_REPORT_SIZE};
use crate::hid_commands::{Command, StatusReport};
use crate::hid_device::{HidError, Transport};
use crate::types::Direction;
use log::{debug, warn};
use std::time::Duration;

/// Mechanical limits of the emulated turret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulatorConfig {
    /// Travel time from the left limit to the right limit
    pub pan_range: Duration,
    /// Travel time from the down limit to the up limit
    pub tilt_range: Duration,
    /// Status polls until a fire cycle reports complete
    pub fire_cycle_polls: u32,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            pan_range: Duration::from_millis(6000),
            tilt_range: Duration::from_millis(1500),
            fire_cycle_polls: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    Moving { direction: Direction, since: Duration },
    Firing { polls: u32 },
}

/// Emulated turret, starting centred on both axes
pub struct EmulatedLauncher<C: Clock> {
    clock: C,
    config: EmulatorConfig,
    active: Option<Active>,
    /// Pan offset from centre in ms of travel, negative is left
    pan: i64,
    /// Tilt offset from centre in ms of travel, negative is down
    tilt: i64,
    fired: bool,
    shots: u32,
    pending_status: Option<u8>,
    history: Vec<Command>,
}

impl<C: Clock> EmulatedLauncher<C> {
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, EmulatorConfig::default())
    }

    pub fn with_config(clock: C, config: EmulatorConfig) -> Self {
        Self {
            clock,
            config,
            active: None,
            pan: 0,
            tilt: 0,
            fired: false,
            shots: 0,
            pending_status: None,
            history: Vec::new(),
        }
    }

    /// Current status as the device would report it
    pub fn status(&self) -> StatusReport {
        let pan_limit = half_range(self.config.pan_range);
        let tilt_limit = half_range(self.config.tilt_range);

        StatusReport {
            up_limit: self.tilt >= tilt_limit,
            down_limit: self.tilt <= -tilt_limit,
            left_limit: self.pan <= -pan_limit,
            right_limit: self.pan >= pan_limit,
            fired: self.fired,
        }
    }

    /// `(pan, tilt)` offsets from centre in milliseconds of travel
    pub fn position(&self) -> (i64, i64) {
        (self.pan, self.tilt)
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Every command received, in order
    pub fn history(&self) -> &[Command] {
        &self.history
    }

    fn settle_motion(&mut self) {
        let Some(Active::Moving { direction, since }) = self.active else {
            return;
        };

        let now = self.clock.now();
        let travelled = now.saturating_sub(since).as_millis() as i64;
        let pan_limit = half_range(self.config.pan_range);
        let tilt_limit = half_range(self.config.tilt_range);

        match direction {
            Direction::Left => self.pan = (self.pan - travelled).max(-pan_limit),
            Direction::Right => self.pan = (self.pan + travelled).min(pan_limit),
            Direction::Down => self.tilt = (self.tilt - travelled).max(-tilt_limit),
            Direction::Up => self.tilt = (self.tilt + travelled).min(tilt_limit),
        }
        self.active = Some(Active::Moving { direction, since: now });
    }

    fn apply(&mut self, command: Command) {
        self.settle_motion();
        self.history.push(command);

        match command {
            Command::MoveUp | Command::MoveDown | Command::MoveLeft | Command::MoveRight => {
                let direction = match command {
                    Command::MoveUp => Direction::Up,
                    Command::MoveDown => Direction::Down,
                    Command::MoveLeft => Direction::Left,
                    _ => Direction::Right,
                };
                self.active = Some(Active::Moving {
                    direction,
                    since: self.clock.now(),
                });
            }
            Command::Fire => {
                self.fired = false;
                self.active = Some(Active::Firing { polls: 0 });
            }
            Command::Stop => {
                if matches!(self.active, Some(Active::Firing { .. })) {
                    self.fired = false;
                }
                self.active = None;
            }
            Command::GetStatus => {
                if let Some(Active::Firing { polls }) = self.active {
                    let polls = polls + 1;
                    if !self.fired && polls >= self.config.fire_cycle_polls {
                        self.fired = true;
                        self.shots += 1;
                        debug!("Emulator: shot {} fired", self.shots);
                    }
                    self.active = Some(Active::Firing { polls });
                }
                self.pending_status = Some(self.status().to_byte());
            }
        }
    }
}

impl<C: Clock> Transport for EmulatedLauncher<C> {
    fn write(&mut self, report: &[u8]) -> Result<usize, HidError> {
        debug!("Emulator RX: {:02x?}", report);

        if report.len() != OUTPUT_REPORT_SIZE || report[0] != HID_REPORT_ID {
            return Err(HidError::WriteFailed(format!(
                "malformed output report {:02x?}",
                report
            )));
        }

        let command = Command::from_wire(report[1]).ok_or_else(|| {
            warn!("Emulator: unknown command {:#04x}", report[1]);
            HidError::WriteFailed(format!("unknown command {:#04x}", report[1]))
        })?;

        self.apply(command);
        Ok(report.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, HidError> {
        let Some(slot) = buffer.first_mut() else {
            return Ok(0);
        };

        let status = self
            .pending_status
            .take()
            .ok_or_else(|| HidError::ReadFailed("no status request pending".to_string()))?;

        *slot = status;
        debug!("Emulator TX: [{:02x}]", status);
        Ok(1)
    }
}

fn half_range(range: Duration) -> i64 {
    (range.as_millis() / 2) as i64
}
