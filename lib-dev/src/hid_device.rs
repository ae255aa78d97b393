// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

use crate::constants::{LAUNCHER_PRODUCT_ID, LAUNCHER_VENDOR_ID};
use hidapi::{HidApi, HidDevice as RawHidDevice};
use log::{debug, info};
use std::time::Duration;

/// Errors that can occur with HID operations
#[derive(Debug, thiserror::Error)]
pub enum HidError {
    #[error("Device {vendor_id:04x}:{product_id:04x} not found")]
    NotFound { vendor_id: u16, product_id: u16 },

    #[error("Failed to write to device: {0}")]
    WriteFailed(String),

    #[error("Failed to read from device: {0}")]
    ReadFailed(String),

    #[error("HID API error: {0}")]
    HidApiError(String),
}

/// Byte-level access to the launcher's report channel
pub trait Transport {
    /// Write one output report, returning the number of bytes written
    fn write(&mut self, report: &[u8]) -> Result<usize, HidError>;

    /// Read one input report into `buffer`, returning the number of bytes read
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, HidError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, report: &[u8]) -> Result<usize, HidError> {
        (**self).write(report)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, HidError> {
        (**self).read(buffer)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, report: &[u8]) -> Result<usize, HidError> {
        (**self).write(report)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, HidError> {
        (**self).read(buffer)
    }
}

/// Device identification information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: Option<String>,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            vendor_id: LAUNCHER_VENDOR_ID,
            product_id: LAUNCHER_PRODUCT_ID,
            serial_number: None,
        }
    }
}

/// An open launcher, closed when dropped
pub struct LauncherDevice {
    device: RawHidDevice,
    info: DeviceInfo,
    read_timeout: Option<Duration>,
}

impl LauncherDevice {
    /// Open the first device matching `info`
    pub fn open(info: &DeviceInfo) -> Result<Self, HidError> {
        let api = HidApi::new().map_err(|e| HidError::HidApiError(e.to_string()))?;

        let present = api.device_list().any(|d| {
            d.vendor_id() == info.vendor_id
                && d.product_id() == info.product_id
                && info
                    .serial_number
                    .as_deref()
                    .map_or(true, |serial| d.serial_number() == Some(serial))
        });
        if !present {
            return Err(HidError::NotFound {
                vendor_id: info.vendor_id,
                product_id: info.product_id,
            });
        }

        let device = match &info.serial_number {
            Some(serial) => api.open_serial(info.vendor_id, info.product_id, serial),
            None => api.open(info.vendor_id, info.product_id),
        }
        .map_err(|e| HidError::HidApiError(e.to_string()))?;

        info!(
            "Opened launcher {:04x}:{:04x} ({})",
            info.vendor_id,
            info.product_id,
            device
                .get_product_string()
                .ok()
                .flatten()
                .unwrap_or_else(|| "unknown product".to_string())
        );

        Ok(Self {
            device,
            info: info.clone(),
            read_timeout: None,
        })
    }

    /// Bound every read; a read that times out yields no data
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl Transport for LauncherDevice {
    fn write(&mut self, report: &[u8]) -> Result<usize, HidError> {
        debug!("HID TX: {:02x?}", report);
        self.device
            .write(report)
            .map_err(|e| HidError::WriteFailed(e.to_string()))
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, HidError> {
        let result = match self.read_timeout {
            Some(timeout) => {
                let ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
                self.device.read_timeout(buffer, ms)
            }
            None => self.device.read(buffer),
        };

        let size = result.map_err(|e| HidError::ReadFailed(e.to_string()))?;
        debug!("HID RX: {:02x?}", &buffer[..size]);
        Ok(size)
    }
}

impl Drop for LauncherDevice {
    fn drop(&mut self) {
        debug!(
            "Closing launcher {:04x}:{:04x}",
            self.info.vendor_id, self.info.product_id
        );
    }
}
