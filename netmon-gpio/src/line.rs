/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Output lines with wiring polarity.
//!
//! The display driver only ever thinks in terms of "active" / "inactive".
//! Whether active means a high or a low level depends on the board: in the
//! reference wiring the rows drive LED anodes (active high) and the columns
//! sink the cathodes (active low).  [`OutputLine`] folds that difference in
//! at the backend boundary.

use crate::{Direction, GpioBackend, GpioError, Level};

/// One GPIO pin used as an output, together with its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLine {
    pin: u32,
    active_low: bool,
}

impl OutputLine {
    pub fn active_high(pin: u32) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    pub fn active_low(pin: u32) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    pub fn new(pin: u32, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    pub fn pin(&self) -> u32 {
        self.pin
    }

    /// Electrical level that puts this line into the requested logical state.
    pub fn level_for(&self, active: bool) -> Level {
        Level::from(active != self.active_low)
    }

    /// Drive the line active or inactive.
    pub fn drive<B: GpioBackend + ?Sized>(
        &self,
        backend: &mut B,
        active: bool,
    ) -> Result<(), GpioError> {
        backend.write_level(self.pin, self.level_for(active))
    }

    /// Release, export and configure the pin as an output, then leave it
    /// inactive.
    ///
    /// The initial release ignores errors: it only exists to recover a pin
    /// left claimed by a previous unclean shutdown.
    pub fn claim<B: GpioBackend + ?Sized>(&self, backend: &mut B) -> Result<(), GpioError> {
        let _ = backend.release_pin(self.pin);
        backend.export_pin(self.pin)?;
        backend.set_direction(self.pin, Direction::Output)?;
        self.drive(backend, false)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
