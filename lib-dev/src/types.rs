// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

use crate::constants::{DEFAULT_MOVE_TIME_MS, MAX_MOVE_TIME_MS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Rejected user input, caught before anything is sent to the device
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    #[error("Invalid movement: {0} (expected up, down, left or right)")]
    Direction(String),

    #[error("Invalid duration specified: {0} (expected 0 to {max} ms)", max = MAX_MOVE_TIME_MS - 1)]
    Duration(String),
}

/// Direction the turret can travel in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Pan moves are left/right, tilt moves are up/down
    pub fn is_pan(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

impl FromStr for Direction {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(InvalidArgument::Direction(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

/// How long a move command is held before stopping, below 10 seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MoveDuration(Duration);

impl MoveDuration {
    pub fn from_millis(ms: u64) -> Result<Self, InvalidArgument> {
        if ms >= MAX_MOVE_TIME_MS {
            return Err(InvalidArgument::Duration(ms.to_string()));
        }
        Ok(Self(Duration::from_millis(ms)))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_millis(&self) -> u64 {
        self.0.as_millis() as u64
    }
}

impl Default for MoveDuration {
    fn default() -> Self {
        Self(Duration::from_millis(DEFAULT_MOVE_TIME_MS))
    }
}

/// Milliseconds in C integer notation: `0x` hexadecimal, leading-zero
/// octal, otherwise decimal. No sign or surrounding whitespace.
impl FromStr for MoveDuration {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidArgument::Duration(s.to_string());

        let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"));
        let (digits, radix) = if let Some(hex) = hex {
            (hex, 16)
        } else if s.len() > 1 && s.starts_with('0') {
            (&s[1..], 8)
        } else {
            (s, 10)
        };

        // from_str_radix tolerates a leading '+'
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(invalid());
        }

        let ms = u64::from_str_radix(digits, radix).map_err(|_| invalid())?;
        Self::from_millis(ms).map_err(|_| invalid())
    }
}

impl fmt::Display for MoveDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms", self.as_millis())
    }
}
