// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

#![allow(dead_code)]

use launcher_hid::{Clock, HidError, ManualClock, Transport};
use std::collections::VecDeque;
use std::time::Duration;

/// Route library logs to the test harness output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Transport that records every write and answers reads from a script
pub struct ScriptedTransport<'a> {
    clock: &'a ManualClock,
    /// Every write attempt with the simulated time it happened at
    pub writes: Vec<(Vec<u8>, Duration)>,
    pub read_attempts: usize,
    statuses: VecDeque<u8>,
    fail_write_at: Option<usize>,
    fail_read_at: Option<usize>,
}

impl<'a> ScriptedTransport<'a> {
    pub fn new(clock: &'a ManualClock) -> Self {
        init_logging();
        Self {
            clock,
            writes: Vec::new(),
            read_attempts: 0,
            statuses: VecDeque::new(),
            fail_write_at: None,
            fail_read_at: None,
        }
    }

    /// Status bytes returned by successive reads
    pub fn with_statuses(mut self, statuses: &[u8]) -> Self {
        self.statuses.extend(statuses.iter().copied());
        self
    }

    /// Fail the write attempt with this zero-based index
    pub fn failing_write(mut self, index: usize) -> Self {
        self.fail_write_at = Some(index);
        self
    }

    /// Fail the read attempt with this zero-based index
    pub fn failing_read(mut self, index: usize) -> Self {
        self.fail_read_at = Some(index);
        self
    }

    /// Command bytes of all write attempts
    pub fn commands(&self) -> Vec<u8> {
        self.writes.iter().map(|(report, _)| report[1]).collect()
    }
}

impl Transport for ScriptedTransport<'_> {
    fn write(&mut self, report: &[u8]) -> Result<usize, HidError> {
        let index = self.writes.len();
        self.writes.push((report.to_vec(), self.clock.now()));
        if self.fail_write_at == Some(index) {
            return Err(HidError::WriteFailed("injected write failure".to_string()));
        }
        Ok(report.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, HidError> {
        let index = self.read_attempts;
        self.read_attempts += 1;
        if self.fail_read_at == Some(index) {
            return Err(HidError::ReadFailed("injected read failure".to_string()));
        }
        let status = self
            .statuses
            .pop_front()
            .ok_or_else(|| HidError::ReadFailed("script exhausted".to_string()))?;
        buffer[0] = status;
        Ok(1)
    }
}
