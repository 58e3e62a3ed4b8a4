/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! GPIO access for the netmon status board.
//!
//! The display driver is written once against [`GpioBackend`]; the hardware
//! strategy is chosen at startup:
//!
//! ```text
//! lib.rs
//! ├── error.rs      – GpioError
//! ├── line.rs       – OutputLine (pin + polarity)
//! ├── sysfs.rs      – /sys/class/gpio file interface
//! ├── mmap.rs       – BCM283x registers via /dev/gpiomem
//! └── recording.rs  – in-memory backend that records every call
//! ```

pub mod error;
pub mod line;
pub mod mmap;
pub mod recording;
pub mod sysfs;

pub use error::GpioError;
pub use line::OutputLine;
pub use mmap::MmapGpio;
pub use recording::{GpioEvent, GpioLog, RecordingGpio};
pub use sysfs::SysfsGpio;

// ── Pin primitives ────────────────────────────────────────────────────────────

/// Direction of a GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Electrical level of a GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

// ── Backend contract ──────────────────────────────────────────────────────────

/// Hardware access used by the display driver.
///
/// All implementations share one contract:
///
/// * [`release_pin`](Self::release_pin) on a pin that is not claimed is
///   `Ok(())`, so startup can release every pin to recover from an unclean
///   shutdown.
/// * [`export_pin`](Self::export_pin) on a pin that is already claimed is
///   `Ok(())`.
/// * Every call is independent; a failed call leaves the backend usable.
pub trait GpioBackend: Send {
    /// Claim `pin` for this process.
    fn export_pin(&mut self, pin: u32) -> Result<(), GpioError>;

    /// Release `pin` so other processes may use it.
    fn release_pin(&mut self, pin: u32) -> Result<(), GpioError>;

    fn set_direction(&mut self, pin: u32, direction: Direction) -> Result<(), GpioError>;

    fn write_level(&mut self, pin: u32, level: Level) -> Result<(), GpioError>;
}

impl<B: GpioBackend + ?Sized> GpioBackend for Box<B> {
    fn export_pin(&mut self, pin: u32) -> Result<(), GpioError> {
        (**self).export_pin(pin)
    }

    fn release_pin(&mut self, pin: u32) -> Result<(), GpioError> {
        (**self).release_pin(pin)
    }

    fn set_direction(&mut self, pin: u32, direction: Direction) -> Result<(), GpioError> {
        (**self).set_direction(pin, direction)
    }

    fn write_level(&mut self, pin: u32, level: Level) -> Result<(), GpioError> {
        (**self).write_level(pin, level)
    }
}
