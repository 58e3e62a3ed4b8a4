/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! In-memory backend that records every call.
//!
//! Used by the display and supervisor tests to check write ordering without
//! hardware.  The [`GpioLog`] handle stays with the test after the backend
//! itself has been moved into the display task.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Direction, GpioBackend, GpioError, Level};

/// One recorded backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioEvent {
    Export(u32),
    Release(u32),
    Direction(u32, Direction),
    Write(u32, Level),
}

#[derive(Debug, Default)]
struct LogInner {
    events: Vec<GpioEvent>,
    levels: HashMap<u32, Level>,
    failing: bool,
    failing_pins: HashSet<u32>,
}

/// Shared view of everything a [`RecordingGpio`] has been asked to do.
#[derive(Debug, Clone, Default)]
pub struct GpioLog {
    inner: Arc<Mutex<LogInner>>,
}

impl GpioLog {
    fn lock(&self) -> MutexGuard<'_, LogInner> {
        // A poisoned log only means a test thread panicked; keep the data.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All calls so far, oldest first.
    pub fn events(&self) -> Vec<GpioEvent> {
        self.lock().events.clone()
    }

    /// Only the `write_level` calls, oldest first.
    pub fn writes(&self) -> Vec<(u32, Level)> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match *e {
                GpioEvent::Write(pin, level) => Some((pin, level)),
                _ => None,
            })
            .collect()
    }

    /// Last level written to `pin`, if any.
    pub fn level(&self, pin: u32) -> Option<Level> {
        self.lock().levels.get(&pin).copied()
    }

    pub fn clear(&self) {
        self.lock().events.clear();
    }

    /// Make every subsequent `write_level` fail until called with `false`.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Make `write_level` fail for `pin` only.
    pub fn set_pin_failing(&self, pin: u32, failing: bool) {
        let mut inner = self.lock();
        if failing {
            inner.failing_pins.insert(pin);
        } else {
            inner.failing_pins.remove(&pin);
        }
    }
}

/// Backend that performs no I/O and records each call in a [`GpioLog`].
#[derive(Debug)]
pub struct RecordingGpio {
    log: GpioLog,
}

impl RecordingGpio {
    pub fn new() -> (Self, GpioLog) {
        let log = GpioLog::default();
        (Self { log: log.clone() }, log)
    }

    fn record(&self, event: GpioEvent) {
        self.log.lock().events.push(event);
    }
}

impl GpioBackend for RecordingGpio {
    fn export_pin(&mut self, pin: u32) -> Result<(), GpioError> {
        self.record(GpioEvent::Export(pin));
        Ok(())
    }

    fn release_pin(&mut self, pin: u32) -> Result<(), GpioError> {
        self.record(GpioEvent::Release(pin));
        Ok(())
    }

    fn set_direction(&mut self, pin: u32, direction: Direction) -> Result<(), GpioError> {
        self.record(GpioEvent::Direction(pin, direction));
        Ok(())
    }

    fn write_level(&mut self, pin: u32, level: Level) -> Result<(), GpioError> {
        let mut inner = self.log.lock();
        if inner.failing || inner.failing_pins.contains(&pin) {
            return Err(GpioError::Sysfs {
                pin,
                op: "write value",
                path: PathBuf::from("<recording>"),
                source: io::Error::new(io::ErrorKind::Other, "injected failure"),
            });
        }
        inner.events.push(GpioEvent::Write(pin, level));
        inner.levels.insert(pin, level);
        Ok(())
    }
}
