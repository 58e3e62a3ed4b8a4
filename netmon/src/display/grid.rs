/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Grid geometry and the display buffer.
//!
//! LEDs are numbered row-major in physical wiring order:
//!
//! ```text
//!            col 0   col 1   col 2   col 3
//!   row 0      0       1       2       3
//!   row 1      4       5       6       7
//! ```
//!
//! so `row = index / columns` and `column = index % columns`.

use crate::colour::{Colour, DisplayCell};

/// Dimensions of the LED grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub rows: usize,
    pub columns: usize,
}

/// Physical location of one LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedPosition {
    pub row: usize,
    pub column: usize,
}

impl Geometry {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    pub fn led_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Position of LED `index`, or `None` if it is off the grid.
    pub fn position(&self, index: usize) -> Option<LedPosition> {
        if index >= self.led_count() {
            return None;
        }
        Some(LedPosition {
            row: index / self.columns,
            column: index % self.columns,
        })
    }

    pub(crate) fn index(&self, position: LedPosition) -> usize {
        position.row * self.columns + position.column
    }
}

// ── DisplayState ──────────────────────────────────────────────────────────────

/// The in-memory frame plus the column currently being driven.
///
/// Owned by the display driver task; nothing else reads or writes it.
#[derive(Debug, Clone)]
pub struct DisplayState {
    geometry: Geometry,
    cells: Vec<DisplayCell>,
    current_column: usize,
}

impl DisplayState {
    /// All LEDs off.  `current_column` starts on the last column so the first
    /// scan tick drives column 0.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            cells: vec![DisplayCell::default(); geometry.led_count()],
            current_column: geometry.columns.saturating_sub(1),
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn current_column(&self) -> usize {
        self.current_column
    }

    /// Store `colour` for LED `index`.  Returns `false` if the index is off
    /// the grid.
    pub fn set(&mut self, index: usize, colour: Colour) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) => {
                *cell = DisplayCell::from(colour);
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, colour: Colour) {
        self.cells.fill(DisplayCell::from(colour));
    }

    pub fn cell(&self, index: usize) -> Option<DisplayCell> {
        self.cells.get(index).copied()
    }

    pub fn cell_at(&self, row: usize, column: usize) -> DisplayCell {
        self.cells[self.geometry.index(LedPosition { row, column })]
    }

    /// Move to the next column, wrapping after the last one.
    ///
    /// Returns `(previous, next)`.
    pub fn advance_column(&mut self) -> (usize, usize) {
        let previous = self.current_column;
        self.current_column = (previous + 1) % self.geometry.columns;
        (previous, self.current_column)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
