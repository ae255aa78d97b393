// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

//! # Launcher HID Control Library
//!
//! This library drives a USB missile launcher over its HID report channel:
//! - Command encoding and status decoding for the fixed two-byte protocol
//! - Timed movement and fire-until-confirmed sequencing
//! - An injectable clock and transport for testing without hardware
//! - A software emulator of the device

pub mod clock;
pub mod constants;
pub mod emulator;
pub mod hid_commands;
pub mod hid_device;
pub mod sequencer;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use constants::*;
pub use emulator::{EmulatedLauncher, EmulatorConfig};
pub use hid_commands::{decode, encode, Command, StatusReport};
pub use hid_device::{DeviceInfo, HidError, LauncherDevice, Transport};
pub use sequencer::{ActionError, FireState, FireSummary, Launcher, SequencerConfig, Step};
pub use types::{Direction, InvalidArgument, MoveDuration};
