// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

use crate::constants::*;
use crate::types::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Commands understood by the launcher, one wire byte each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    MoveDown = CMD_MOVE_DOWN,
    MoveUp = CMD_MOVE_UP,
    MoveLeft = CMD_MOVE_LEFT,
    MoveRight = CMD_MOVE_RIGHT,
    Fire = CMD_FIRE,
    Stop = CMD_STOP,
    GetStatus = CMD_GET_STATUS,
}

impl Command {
    /// Move command for the given direction
    pub fn movement(direction: Direction) -> Self {
        match direction {
            Direction::Up => Command::MoveUp,
            Direction::Down => Command::MoveDown,
            Direction::Left => Command::MoveLeft,
            Direction::Right => Command::MoveRight,
        }
    }

    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            CMD_MOVE_DOWN => Some(Command::MoveDown),
            CMD_MOVE_UP => Some(Command::MoveUp),
            CMD_MOVE_LEFT => Some(Command::MoveLeft),
            CMD_MOVE_RIGHT => Some(Command::MoveRight),
            CMD_FIRE => Some(Command::Fire),
            CMD_STOP => Some(Command::Stop),
            CMD_GET_STATUS => Some(Command::GetStatus),
            _ => None,
        }
    }

    pub fn wire_value(self) -> u8 {
        self as u8
    }

    /// Whether the command starts a motor that must be stopped afterwards
    pub fn is_active(self) -> bool {
        !matches!(self, Command::Stop | Command::GetStatus)
    }

    /// Frame the command as an output report
    pub fn encode(self) -> [u8; OUTPUT_REPORT_SIZE] {
        encode(self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::MoveDown => write!(f, "move down"),
            Command::MoveUp => write!(f, "move up"),
            Command::MoveLeft => write!(f, "move left"),
            Command::MoveRight => write!(f, "move right"),
            Command::Fire => write!(f, "fire"),
            Command::Stop => write!(f, "stop"),
            Command::GetStatus => write!(f, "get status"),
        }
    }
}

/// Build the output report for a command: the report number followed by the command byte
pub fn encode(command: Command) -> [u8; OUTPUT_REPORT_SIZE] {
    [HID_REPORT_ID, command.wire_value()]
}

/// Status flags reported by the launcher
///
/// Every byte decodes to some report; physically impossible combinations
/// (both pan limits at once, say) are passed through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub up_limit: bool,
    pub down_limit: bool,
    pub left_limit: bool,
    pub right_limit: bool,
    pub fired: bool,
}

impl StatusReport {
    pub fn decode(byte: u8) -> Self {
        decode(byte)
    }

    pub fn to_byte(&self) -> u8 {
        let mut byte = 0;
        if self.down_limit {
            byte |= STATUS_DOWN_LIMIT;
        }
        if self.up_limit {
            byte |= STATUS_UP_LIMIT;
        }
        if self.left_limit {
            byte |= STATUS_LEFT_LIMIT;
        }
        if self.right_limit {
            byte |= STATUS_RIGHT_LIMIT;
        }
        if self.fired {
            byte |= STATUS_FIRED;
        }
        byte
    }

    pub fn any_limit(&self) -> bool {
        self.up_limit || self.down_limit || self.left_limit || self.right_limit
    }
}

/// Interpret one input report byte
pub fn decode(byte: u8) -> StatusReport {
    StatusReport {
        up_limit: byte & STATUS_UP_LIMIT != 0,
        down_limit: byte & STATUS_DOWN_LIMIT != 0,
        left_limit: byte & STATUS_LEFT_LIMIT != 0,
        right_limit: byte & STATUS_RIGHT_LIMIT != 0,
        fired: byte & STATUS_FIRED != 0,
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tilt up limit:      {}", self.up_limit)?;
        writeln!(f, "Tilt down limit:    {}", self.down_limit)?;
        writeln!(f, "Pan left limit:     {}", self.left_limit)?;
        writeln!(f, "Pan right limit:    {}", self.right_limit)?;
        write!(f, "Fire complete:      {}", self.fired)
    }
}
