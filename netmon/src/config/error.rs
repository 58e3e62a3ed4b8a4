/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured validation errors for the board configuration.
//!
//! All of these are fatal at startup: the grid geometry drives every later
//! index computation, so the process refuses to start monitoring with a
//! configuration that does not match the wiring.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `rows` or `columns` is zero.
    #[error("display grid must have at least one row and one column (got {rows}x{columns})")]
    EmptyGrid { rows: usize, columns: usize },

    /// A pin list does not have one entry per row / column.
    #[error("{list} lists {actual} pin(s) but the grid needs {expected}")]
    PinCountMismatch {
        list: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The same GPIO appears twice across the pin lists.
    #[error("GPIO {pin} is assigned to more than one display line")]
    DuplicatePin { pin: u32 },

    /// A period that must be positive is zero.
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },

    /// A monitored machine has no address to probe.
    #[error("machine '{name}' at LED {led} has no address")]
    MissingAddress { led: usize, name: String },

    /// The number of configured positions differs from the physical LED
    /// count.
    #[error("{configured} machine position(s) configured but the display has {leds} LEDs")]
    LedCountMismatch { configured: usize, leds: usize },
}
