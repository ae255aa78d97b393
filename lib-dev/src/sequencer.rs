// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

//! Turns user intents into framed command sequences.
//!
//! Every motor action is bracketed: the start command goes out, the
//! sequencer waits (for a fixed time, or until the device confirms), and a
//! Stop closes the action. The first failing write or read aborts the
//! action and is reported together with the step that failed.

use crate::clock::Clock;
use crate::constants::{FIRE_OVERSHOOT_TIME_MS, INPUT_REPORT_SIZE};
use crate::hid_commands::{encode, Command, StatusReport};
use crate::hid_device::{HidError, Transport};
use crate::types::{Direction, MoveDuration};
use log::{debug, error, info, warn};
use std::fmt;
use std::time::Duration;

/// Point in an action at which a transport call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    MoveCommand(Direction),
    FireCommand,
    StopCommand,
    StatusRequest,
    StatusRead,
    FireConfirmation,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::MoveCommand(direction) => write!(f, "move {} command", direction),
            Step::FireCommand => write!(f, "fire command"),
            Step::StopCommand => write!(f, "stop command"),
            Step::StatusRequest => write!(f, "status request"),
            Step::StatusRead => write!(f, "status read"),
            Step::FireConfirmation => write!(f, "fire confirmation"),
        }
    }
}

/// Errors that abort an action
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Failed to send {step}: {source}")]
    WriteFailure {
        step: Step,
        #[source]
        source: HidError,
    },

    #[error("Failed to complete {step}: {source}")]
    ReadFailure {
        step: Step,
        #[source]
        source: HidError,
    },

    #[error("Device did not report a completed fire cycle within {timeout:?} ({polls} polls)")]
    FireTimeout { timeout: Duration, polls: u32 },
}

impl ActionError {
    /// The step the action failed at
    pub fn step(&self) -> Step {
        match self {
            ActionError::WriteFailure { step, .. } | ActionError::ReadFailure { step, .. } => *step,
            ActionError::FireTimeout { .. } => Step::FireConfirmation,
        }
    }
}

/// Progress of a fire action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireState {
    Idle,
    Firing,
    Confirming { polls: u32 },
    Stopping,
    Done,
    Failed(Step),
}

/// Tunable timing of the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Extra time to keep firing after the device reports a completed cycle
    pub fire_overshoot: Duration,
    /// Pause between status polls while waiting for the fire cycle, zero polls back to back
    pub poll_interval: Duration,
    /// Give up waiting for the fire cycle after this long; `None` waits forever
    pub fire_timeout: Option<Duration>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            fire_overshoot: Duration::from_millis(FIRE_OVERSHOOT_TIME_MS),
            poll_interval: Duration::ZERO,
            fire_timeout: None,
        }
    }
}

/// Result of a confirmed shot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireSummary {
    /// Status round-trips until the device reported the cycle complete
    pub polls: u32,
    /// Time from the fire command until confirmation
    pub confirmed_after: Duration,
}

/// Drives a launcher through a transport, waiting on an injected clock
pub struct Launcher<T: Transport, C: Clock> {
    transport: T,
    clock: C,
    config: SequencerConfig,
    active: Option<Command>,
    fire_state: FireState,
}

impl<T: Transport, C: Clock> Launcher<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            config: SequencerConfig::default(),
            active: None,
            fire_state: FireState::Idle,
        }
    }

    pub fn with_config(mut self, config: SequencerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Move or fire command sent without a successful Stop since
    pub fn active_command(&self) -> Option<Command> {
        self.active
    }

    /// State the last fire action ended in
    pub fn fire_state(&self) -> FireState {
        self.fire_state
    }

    /// Move in `direction` for `duration`, then stop.
    ///
    /// If the Stop cannot be sent the error is returned, but the motor may
    /// keep running; no second Stop is attempted.
    pub fn move_turret(
        &mut self,
        direction: Direction,
        duration: MoveDuration,
    ) -> Result<(), ActionError> {
        info!("Moving {} for {}", direction, duration);

        if let Err(e) = self.send(Command::movement(direction), Step::MoveCommand(direction)) {
            error!("Failed to perform requested movement: {}", e);
            return Err(e);
        }

        self.clock.sleep(duration.as_duration());

        if let Err(e) = self.send(Command::Stop, Step::StopCommand) {
            error!("Failed to stop movement, turret may still be moving: {}", e);
            return Err(e);
        }

        Ok(())
    }

    /// Fire one missile and wait for the device to confirm the cycle
    pub fn fire(&mut self) -> Result<FireSummary, ActionError> {
        self.fire_state = FireState::Idle;
        let mut started = Duration::ZERO;
        let mut summary = FireSummary {
            polls: 0,
            confirmed_after: Duration::ZERO,
        };

        loop {
            let next = match self.fire_state {
                FireState::Idle => {
                    info!("Firing");
                    self.fire_step(Command::Fire, Step::FireCommand)?;
                    started = self.clock.now();
                    FireState::Firing
                }
                FireState::Firing | FireState::Confirming { .. } => {
                    let polls = match self.fire_state {
                        FireState::Confirming { polls } => polls,
                        _ => 0,
                    };
                    if polls > 0 {
                        if let Some(timeout) = self.config.fire_timeout {
                            if self.clock.now().saturating_sub(started) >= timeout {
                                return Err(self.abort_fire(timeout, polls));
                            }
                        }
                        if !self.config.poll_interval.is_zero() {
                            self.clock.sleep(self.config.poll_interval);
                        }
                    }

                    let status = self.fire_poll()?;
                    let polls = polls + 1;
                    if status.fired {
                        debug!("Fire cycle confirmed after {} polls", polls);
                        summary.polls = polls;
                        summary.confirmed_after = self.clock.now().saturating_sub(started);
                        FireState::Stopping
                    } else {
                        FireState::Confirming { polls }
                    }
                }
                FireState::Stopping => {
                    // Overshoot so the cycle has physically finished before stopping
                    self.clock.sleep(self.config.fire_overshoot);
                    self.fire_step(Command::Stop, Step::StopCommand)?;
                    FireState::Done
                }
                FireState::Done | FireState::Failed(_) => break,
            };
            self.fire_state = next;
        }

        Ok(summary)
    }

    /// Read the current status without moving anything
    pub fn query_status(&mut self) -> Result<StatusReport, ActionError> {
        self.poll_status()
    }

    /// Send a bare Stop.
    ///
    /// Recovery for an action whose own Stop failed: while
    /// [`active_command`](Self::active_command) is `Some`, the motor may
    /// still be running.
    pub fn stop(&mut self) -> Result<(), ActionError> {
        self.send(Command::Stop, Step::StopCommand)
    }

    fn fire_poll(&mut self) -> Result<StatusReport, ActionError> {
        self.poll_status().map_err(|e| {
            error!("Failed to get status while firing: {}", e);
            self.fire_state = FireState::Failed(e.step());
            e
        })
    }

    fn fire_step(&mut self, command: Command, step: Step) -> Result<(), ActionError> {
        self.send(command, step).map_err(|e| {
            error!("Failed to {}: {}", command, e);
            self.fire_state = FireState::Failed(step);
            e
        })
    }

    fn abort_fire(&mut self, timeout: Duration, polls: u32) -> ActionError {
        warn!("No fire confirmation after {:?}, stopping", timeout);
        if let Err(e) = self.send(Command::Stop, Step::StopCommand) {
            error!("Failed to stop firing after timeout: {}", e);
        }
        self.fire_state = FireState::Failed(Step::FireConfirmation);
        ActionError::FireTimeout { timeout, polls }
    }

    fn poll_status(&mut self) -> Result<StatusReport, ActionError> {
        self.send(Command::GetStatus, Step::StatusRequest)?;

        let mut buffer = [0u8; INPUT_REPORT_SIZE];
        let size = self
            .transport
            .read(&mut buffer)
            .map_err(|source| ActionError::ReadFailure {
                step: Step::StatusRead,
                source,
            })?;
        if size == 0 {
            return Err(ActionError::ReadFailure {
                step: Step::StatusRead,
                source: HidError::ReadFailed("no status report received".to_string()),
            });
        }

        let status = StatusReport::decode(buffer[0]);
        debug!("Status {:#04x}: {:?}", buffer[0], status);
        Ok(status)
    }

    fn send(&mut self, command: Command, step: Step) -> Result<(), ActionError> {
        if command.is_active() {
            if let Some(active) = self.active {
                warn!("Sending {} while {} was never stopped", command, active);
            }
        }

        self.transport
            .write(&encode(command))
            .map_err(|source| ActionError::WriteFailure { step, source })?;

        match command {
            Command::Stop => self.active = None,
            c if c.is_active() => self.active = Some(c),
            _ => {}
        }
        Ok(())
    }
}
