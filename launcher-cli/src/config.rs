// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

//! Configuration for the launcher command line tool
//!
//! Configuration files are searched in the following order:
//! 1. Current directory (launcher.yaml)
//! 2. User's config directory:
//!    - macOS: ~/Library/Application Support/launcher/launcher.yaml
//!    - Linux: ~/.config/launcher/launcher.yaml
//!    - Windows: %APPDATA%\launcher\launcher.yaml
//!
//! If no configuration file is found, built-in defaults are used.

use anyhow::{Context, Result};
use launcher_hid::{
    DeviceInfo, EmulatorConfig, MoveDuration, SequencerConfig, DEFAULT_MOVE_TIME_MS,
    FIRE_OVERSHOOT_TIME_MS, LAUNCHER_PRODUCT_ID, LAUNCHER_VENDOR_ID,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "launcher.yaml";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub device: DeviceIdentification,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub emulator: EmulatorSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Device identification (vendor ID, product ID, optional serial)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceIdentification {
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,
    #[serde(default = "default_product_id")]
    pub product_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

impl Default for DeviceIdentification {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            serial_number: None,
        }
    }
}

fn default_vendor_id() -> u16 {
    LAUNCHER_VENDOR_ID
}

fn default_product_id() -> u16 {
    LAUNCHER_PRODUCT_ID
}

/// Timing configuration, all values in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_move_ms")]
    pub default_move_ms: u64,
    #[serde(default = "default_fire_overshoot_ms")]
    pub fire_overshoot_ms: u64,
    #[serde(default)]
    pub poll_interval_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout_ms: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            default_move_ms: default_move_ms(),
            fire_overshoot_ms: default_fire_overshoot_ms(),
            poll_interval_ms: 0,
            fire_timeout_ms: None,
            read_timeout_ms: None,
        }
    }
}

fn default_move_ms() -> u64 {
    DEFAULT_MOVE_TIME_MS
}

fn default_fire_overshoot_ms() -> u64 {
    FIRE_OVERSHOOT_TIME_MS
}

/// Behaviour of the built-in emulator (`--emulate`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorSettings {
    #[serde(default = "default_pan_range_ms")]
    pub pan_range_ms: u64,
    #[serde(default = "default_tilt_range_ms")]
    pub tilt_range_ms: u64,
    #[serde(default = "default_fire_cycle_polls")]
    pub fire_cycle_polls: u32,
}

impl Default for EmulatorSettings {
    fn default() -> Self {
        Self {
            pan_range_ms: default_pan_range_ms(),
            tilt_range_ms: default_tilt_range_ms(),
            fire_cycle_polls: default_fire_cycle_polls(),
        }
    }
}

fn default_pan_range_ms() -> u64 {
    6000
}

fn default_tilt_range_ms() -> u64 {
    1500
}

fn default_fire_cycle_polls() -> u32 {
    3
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Find and load the configuration file, falling back to defaults
    pub fn load() -> Result<Self> {
        Self::load_with_name(DEFAULT_CONFIG_NAME)
    }

    /// Find and load configuration file with a specific filename
    pub fn load_with_name(filename: &str) -> Result<Self> {
        match Self::find(filename) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// First existing configuration file on the search path
    pub fn find(filename: &str) -> Option<PathBuf> {
        Self::get_config_search_paths(filename)
            .into_iter()
            .find(|path| path.exists())
    }

    fn get_config_search_paths(filename: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(filename)];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("launcher").join(filename));
        }

        paths
    }

    /// Reject values that would be refused later at the device boundary
    pub fn validate(&self) -> Result<()> {
        self.default_move_duration()?;
        if self.emulator.fire_cycle_polls == 0 {
            anyhow::bail!("emulator.fire_cycle_polls must be at least 1");
        }
        // Half of each range is the travel from centre to a limit
        if self.emulator.pan_range_ms < 2 || self.emulator.tilt_range_ms < 2 {
            anyhow::bail!("emulator.pan_range_ms and emulator.tilt_range_ms must be at least 2");
        }
        Ok(())
    }

    pub fn default_move_duration(&self) -> Result<MoveDuration> {
        MoveDuration::from_millis(self.timing.default_move_ms)
            .with_context(|| "Invalid timing.default_move_ms in configuration")
    }

    /// Get device info for HID connection
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            vendor_id: self.device.vendor_id,
            product_id: self.device.product_id,
            serial_number: self.device.serial_number.clone(),
        }
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            fire_overshoot: Duration::from_millis(self.timing.fire_overshoot_ms),
            poll_interval: Duration::from_millis(self.timing.poll_interval_ms),
            fire_timeout: self.timing.fire_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.timing.read_timeout_ms.map(Duration::from_millis)
    }

    pub fn emulator_config(&self) -> EmulatorConfig {
        EmulatorConfig {
            pan_range: Duration::from_millis(self.emulator.pan_range_ms),
            tilt_range: Duration::from_millis(self.emulator.tilt_range_ms),
            fire_cycle_polls: self.emulator.fire_cycle_polls,
        }
    }
}
