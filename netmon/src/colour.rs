/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! LED colours and their red/green decomposition.
//!
//! Each board position is one bi-colour LED: a red die and a green die in
//! one package.  Yellow (amber) is both dies lit together; the collator never
//! produces it, it is only used by the lamp test and the LED test mode.

use std::fmt;

/// Colour of one bi-colour LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Colour {
    #[default]
    Off,
    Red,
    Yellow,
    Green,
}

impl Colour {
    pub const ALL: [Colour; 4] = [Colour::Off, Colour::Red, Colour::Yellow, Colour::Green];

    pub fn red_on(self) -> bool {
        matches!(self, Colour::Red | Colour::Yellow)
    }

    pub fn green_on(self) -> bool {
        matches!(self, Colour::Green | Colour::Yellow)
    }

    pub fn from_dies(red_on: bool, green_on: bool) -> Self {
        match (red_on, green_on) {
            (false, false) => Colour::Off,
            (true, false) => Colour::Red,
            (true, true) => Colour::Yellow,
            (false, true) => Colour::Green,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Colour::Off => "off",
            Colour::Red => "red",
            Colour::Yellow => "yellow",
            Colour::Green => "green",
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-LED display buffer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayCell {
    pub red_on: bool,
    pub green_on: bool,
}

impl From<Colour> for DisplayCell {
    fn from(colour: Colour) -> Self {
        Self {
            red_on: colour.red_on(),
            green_on: colour.green_on(),
        }
    }
}

impl From<DisplayCell> for Colour {
    fn from(cell: DisplayCell) -> Self {
        Colour::from_dies(cell.red_on, cell.green_on)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposition_table() {
        let cell = |red_on, green_on| DisplayCell { red_on, green_on };
        assert_eq!(DisplayCell::from(Colour::Red), cell(true, false));
        assert_eq!(DisplayCell::from(Colour::Green), cell(false, true));
        assert_eq!(DisplayCell::from(Colour::Yellow), cell(true, true));
        assert_eq!(DisplayCell::from(Colour::Off), cell(false, false));
    }

    #[test]
    fn every_colour_survives_the_buffer() {
        for colour in Colour::ALL {
            assert_eq!(Colour::from(DisplayCell::from(colour)), colour);
        }
    }

    #[test]
    fn names_match_original_wording() {
        assert_eq!(Colour::Off.to_string(), "off");
        assert_eq!(Colour::Yellow.to_string(), "yellow");
    }
}
