// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

/// USB vendor ID of the missile launcher
pub const LAUNCHER_VENDOR_ID: u16 = 0x0a81;

/// USB product ID of the missile launcher
pub const LAUNCHER_PRODUCT_ID: u16 = 0x0701;

/// Report number prefixed to every output report (always 0 for this device)
pub const HID_REPORT_ID: u8 = 0;

/// Size of an output report including the report number
pub const OUTPUT_REPORT_SIZE: usize = 2;

/// Size of an input (status) report
pub const INPUT_REPORT_SIZE: usize = 1;

pub const CMD_MOVE_DOWN: u8 = 0x01;
pub const CMD_MOVE_UP: u8 = 0x02;
pub const CMD_MOVE_LEFT: u8 = 0x04;
pub const CMD_MOVE_RIGHT: u8 = 0x08;
pub const CMD_FIRE: u8 = 0x10;
pub const CMD_STOP: u8 = 0x20;
pub const CMD_GET_STATUS: u8 = 0x40;

pub const STATUS_DOWN_LIMIT: u8 = 0x01;
pub const STATUS_UP_LIMIT: u8 = 0x02;
pub const STATUS_LEFT_LIMIT: u8 = 0x04;
pub const STATUS_RIGHT_LIMIT: u8 = 0x08;
pub const STATUS_FIRED: u8 = 0x10;

/// Default time to move when no duration is given, in milliseconds
pub const DEFAULT_MOVE_TIME_MS: u64 = 100;

/// Exclusive upper bound for a move duration, in milliseconds
pub const MAX_MOVE_TIME_MS: u64 = 10_000;

/// Time to keep firing after the device reports a completed cycle, in milliseconds
pub const FIRE_OVERSHOOT_TIME_MS: u64 = 500;
