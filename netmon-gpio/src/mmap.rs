/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! GPIO through memory-mapped BCM283x registers.
//!
//! `/dev/gpiomem` exposes the GPIO register block of the Raspberry Pi SoC
//! without root access.  The layout used here (32-bit words):
//!
//! | Word | Register | Meaning |
//! |---|---|---|
//! | 0–5 | `GPFSEL0..5` | 3 function-select bits per pin, 10 pins per word |
//! | 7–8 | `GPSET0..1` | write 1 to drive a pin high |
//! | 10–11 | `GPCLR0..1` | write 1 to drive a pin low |
//!
//! There is nothing to claim or release at this level, so
//! [`export_pin`](GpioBackend::export_pin) and
//! [`release_pin`](GpioBackend::release_pin) only validate the pin number.

use std::ffi::c_void;
use std::fs::OpenOptions;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use tracing::{debug, warn};

use crate::{Direction, GpioBackend, GpioError, Level};

/// Device node exposing the GPIO register block.
pub const GPIOMEM_PATH: &str = "/dev/gpiomem";

/// Number of GPIO lines on the BCM283x.
pub const PIN_COUNT: u32 = 54;

const BLOCK_SIZE: NonZeroUsize = match NonZeroUsize::new(4096) {
    Some(n) => n,
    None => panic!("block size must be non-zero"),
};

const GPSET0: usize = 7;
const GPCLR0: usize = 10;

const FSEL_MASK: u32 = 0b111;
const FSEL_INPUT: u32 = 0b000;
const FSEL_OUTPUT: u32 = 0b001;

// ── Register arithmetic ───────────────────────────────────────────────────────

/// Function-select word and bit shift for `pin`.
pub fn function_select(pin: u32) -> (usize, u32) {
    ((pin / 10) as usize, (pin % 10) * 3)
}

/// Word to write and bit mask that drives `pin` to `level`.
pub fn output_register(pin: u32, level: Level) -> (usize, u32) {
    let base = match level {
        Level::High => GPSET0,
        Level::Low => GPCLR0,
    };
    (base + (pin / 32) as usize, 1 << (pin % 32))
}

/// New function-select word value with `pin` switched to `direction`.
pub fn with_direction(word: u32, pin: u32, direction: Direction) -> u32 {
    let (_, shift) = function_select(pin);
    let bits = match direction {
        Direction::Input => FSEL_INPUT,
        Direction::Output => FSEL_OUTPUT,
    };
    (word & !(FSEL_MASK << shift)) | (bits << shift)
}

fn check_pin(pin: u32) -> Result<(), GpioError> {
    if pin < PIN_COUNT {
        Ok(())
    } else {
        Err(GpioError::InvalidPin {
            pin,
            max: PIN_COUNT - 1,
        })
    }
}

// ── MmapGpio ──────────────────────────────────────────────────────────────────

/// Register-level backend over a mapping of `/dev/gpiomem`.
#[derive(Debug)]
pub struct MmapGpio {
    base: NonNull<u32>,
}

// The mapping is owned exclusively by this value and only touched through
// `&mut self`.
unsafe impl Send for MmapGpio {}

impl MmapGpio {
    /// Map the default register window.
    pub fn open() -> Result<Self, GpioError> {
        Self::open_path(GPIOMEM_PATH)
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, GpioError> {
        let path = path.as_ref();
        let map_err = |source: io::Error| GpioError::Map {
            path: PathBuf::from(path),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(map_err)?;

        // SAFETY: a fresh shared mapping of a device file; the kernel picks
        // the address and the mapping outlives `file`.
        let ptr = unsafe {
            mmap(
                None,
                BLOCK_SIZE,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                Some(&file),
                0,
            )
        }
        .map_err(|errno| map_err(io::Error::from(errno)))?;

        let base = NonNull::new(ptr.cast::<u32>())
            .ok_or_else(|| map_err(io::Error::new(io::ErrorKind::Other, "null mapping")))?;

        debug!(path = %path.display(), "mapped GPIO registers");
        Ok(Self { base })
    }

    fn read(&self, word: usize) -> u32 {
        debug_assert!(word * 4 < BLOCK_SIZE.get());
        // SAFETY: `word` is bounded by the register layout, well inside the
        // mapped block.
        unsafe { self.base.as_ptr().add(word).read_volatile() }
    }

    fn write(&mut self, word: usize, value: u32) {
        debug_assert!(word * 4 < BLOCK_SIZE.get());
        // SAFETY: as for `read`.
        unsafe { self.base.as_ptr().add(word).write_volatile(value) }
    }
}

impl Drop for MmapGpio {
    fn drop(&mut self) {
        // SAFETY: `base` came from `mmap` with `BLOCK_SIZE` and is not used
        // after this point.
        if let Err(e) = unsafe { munmap(self.base.as_ptr().cast::<c_void>(), BLOCK_SIZE.get()) } {
            warn!("failed to unmap GPIO registers: {e}");
        }
    }
}

impl GpioBackend for MmapGpio {
    fn export_pin(&mut self, pin: u32) -> Result<(), GpioError> {
        check_pin(pin)
    }

    fn release_pin(&mut self, pin: u32) -> Result<(), GpioError> {
        check_pin(pin)
    }

    fn set_direction(&mut self, pin: u32, direction: Direction) -> Result<(), GpioError> {
        check_pin(pin)?;
        let (word, _) = function_select(pin);
        let value = with_direction(self.read(word), pin, direction);
        self.write(word, value);
        Ok(())
    }

    fn write_level(&mut self, pin: u32, level: Level) -> Result<(), GpioError> {
        check_pin(pin)?;
        let (word, mask) = output_register(pin, level);
        self.write(word, mask);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_select_covers_ten_pins_per_word() {
        assert_eq!(function_select(0), (0, 0));
        assert_eq!(function_select(9), (0, 27));
        assert_eq!(function_select(10), (1, 0));
        assert_eq!(function_select(17), (1, 21));
        assert_eq!(function_select(53), (5, 9));
    }

    #[test]
    fn set_and_clear_registers_split_at_pin_32() {
        assert_eq!(output_register(4, Level::High), (7, 1 << 4));
        assert_eq!(output_register(4, Level::Low), (10, 1 << 4));
        assert_eq!(output_register(31, Level::High), (7, 1 << 31));
        assert_eq!(output_register(32, Level::High), (8, 1));
        assert_eq!(output_register(40, Level::Low), (11, 1 << 8));
    }

    #[test]
    fn direction_only_touches_own_bits() {
        // Every pin in the word set to alt function 5 (0b010).
        let word = 0b010_010_010_010_010_010_010_010_010_010;

        let out = with_direction(word, 13, Direction::Output);
        assert_eq!((out >> 9) & FSEL_MASK, FSEL_OUTPUT);
        assert_eq!(out & !(FSEL_MASK << 9), word & !(FSEL_MASK << 9));

        let back = with_direction(out, 13, Direction::Input);
        assert_eq!((back >> 9) & FSEL_MASK, FSEL_INPUT);
    }

    #[test]
    fn out_of_range_pin_rejected() {
        assert!(check_pin(53).is_ok());
        assert!(matches!(
            check_pin(54),
            Err(GpioError::InvalidPin { pin: 54, max: 53 })
        ));
    }

    #[test]
    fn missing_device_is_a_map_error() {
        let err = MmapGpio::open_path("/nonexistent/gpiomem").unwrap_err();
        assert!(matches!(err, GpioError::Map { .. }));
    }
}
