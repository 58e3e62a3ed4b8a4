/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! GPIO through the kernel's sysfs file interface.
//!
//! ```text
//! /sys/class/gpio/export            ← "17"   claim pin 17
//! /sys/class/gpio/unexport          ← "17"   release pin 17
//! /sys/class/gpio/gpio17/direction  ← "out" | "in"
//! /sys/class/gpio/gpio17/value      ← "1" | "0"
//! ```
//!
//! Every call opens, writes and closes its file.  Nothing is cached, so a
//! failed write never leaves the backend in a bad state.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use tracing::debug;

use crate::{Direction, GpioBackend, GpioError, Level};

/// Default location of the sysfs GPIO class.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: PathBuf,
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsGpio {
    pub fn new() -> Self {
        Self::with_root(SYSFS_GPIO_ROOT)
    }

    /// Use a different sysfs root (a temporary directory in tests).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pin_file(&self, pin: u32, name: &str) -> PathBuf {
        self.root.join(format!("gpio{pin}")).join(name)
    }

    fn write_file(path: &Path, value: &str) -> io::Result<()> {
        let mut f = OpenOptions::new().write(true).truncate(true).open(path)?;
        f.write_all(value.as_bytes())
    }

    fn write(&self, pin: u32, op: &'static str, path: PathBuf, value: &str) -> Result<(), GpioError> {
        Self::write_file(&path, value).map_err(|source| GpioError::Sysfs {
            pin,
            op,
            path,
            source,
        })
    }
}

/// Whether a failed write to the `export` / `unexport` control file means
/// the pin is already in the requested state.
///
/// The kernel answers EBUSY for a pin that is already exported and EINVAL
/// for one that is not exported.
fn tolerated(op: &str, err: &io::Error) -> bool {
    let expected = match op {
        "export" => Errno::EBUSY,
        "unexport" => Errno::EINVAL,
        _ => return false,
    };
    err.raw_os_error() == Some(expected as i32)
}

impl SysfsGpio {
    fn write_control(&self, pin: u32, op: &'static str) -> Result<(), GpioError> {
        let path = self.root.join(op);
        match Self::write_file(&path, &pin.to_string()) {
            Ok(()) => Ok(()),
            Err(e) if tolerated(op, &e) => {
                debug!(pin, op, "GPIO already in requested state");
                Ok(())
            }
            Err(source) => Err(GpioError::Sysfs {
                pin,
                op,
                path,
                source,
            }),
        }
    }
}

impl GpioBackend for SysfsGpio {
    fn export_pin(&mut self, pin: u32) -> Result<(), GpioError> {
        self.write_control(pin, "export")
    }

    fn release_pin(&mut self, pin: u32) -> Result<(), GpioError> {
        self.write_control(pin, "unexport")
    }

    fn set_direction(&mut self, pin: u32, direction: Direction) -> Result<(), GpioError> {
        let value = match direction {
            Direction::Input => "in",
            Direction::Output => "out",
        };
        self.write(pin, "set direction", self.pin_file(pin, "direction"), value)
    }

    fn write_level(&mut self, pin: u32, level: Level) -> Result<(), GpioError> {
        let value = if level.is_high() { "1" } else { "0" };
        self.write(pin, "write value", self.pin_file(pin, "value"), value)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper: a fake sysfs tree with control files and one pin directory.
    fn fake_sysfs(pin: u32) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("export"), "").unwrap();
        fs::write(dir.path().join("unexport"), "").unwrap();
        let pin_dir = dir.path().join(format!("gpio{pin}"));
        fs::create_dir(&pin_dir).unwrap();
        fs::write(pin_dir.join("direction"), "").unwrap();
        fs::write(pin_dir.join("value"), "").unwrap();
        dir
    }

    fn read(dir: &TempDir, rel: &str) -> String {
        fs::read_to_string(dir.path().join(rel)).unwrap()
    }

    #[test]
    fn export_and_release_write_pin_number() {
        let dir = fake_sysfs(17);
        let mut gpio = SysfsGpio::with_root(dir.path());

        gpio.export_pin(17).unwrap();
        assert_eq!(read(&dir, "export"), "17");

        gpio.release_pin(17).unwrap();
        assert_eq!(read(&dir, "unexport"), "17");
    }

    #[test]
    fn direction_and_value_are_written_as_text() {
        let dir = fake_sysfs(4);
        let mut gpio = SysfsGpio::with_root(dir.path());

        gpio.set_direction(4, Direction::Output).unwrap();
        assert_eq!(read(&dir, "gpio4/direction"), "out");

        gpio.write_level(4, Level::High).unwrap();
        assert_eq!(read(&dir, "gpio4/value"), "1");

        gpio.write_level(4, Level::Low).unwrap();
        assert_eq!(read(&dir, "gpio4/value"), "0");

        gpio.set_direction(4, Direction::Input).unwrap();
        assert_eq!(read(&dir, "gpio4/direction"), "in");
    }

    #[test]
    fn write_to_unexported_pin_reports_pin_and_path() {
        let dir = fake_sysfs(4);
        let mut gpio = SysfsGpio::with_root(dir.path());

        let err = gpio.write_level(9, Level::High).unwrap_err();
        match err {
            GpioError::Sysfs { pin, op, path, .. } => {
                assert_eq!(pin, 9);
                assert_eq!(op, "write value");
                assert!(path.ends_with("gpio9/value"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_sysfs_root_is_an_error_not_a_panic() {
        let mut gpio = SysfsGpio::with_root("/nonexistent/gpio/root");
        assert!(gpio.export_pin(1).is_err());
        assert!(gpio.release_pin(1).is_err());
    }

    #[test]
    fn already_exported_and_not_exported_are_tolerated() {
        let errno = |e: Errno| io::Error::from_raw_os_error(e as i32);

        assert!(tolerated("export", &errno(Errno::EBUSY)));
        assert!(tolerated("unexport", &errno(Errno::EINVAL)));

        // Only the errno matching the control file counts.
        assert!(!tolerated("export", &errno(Errno::EINVAL)));
        assert!(!tolerated("unexport", &errno(Errno::EBUSY)));
        assert!(!tolerated("export", &errno(Errno::EACCES)));
        assert!(!tolerated("unexport", &errno(Errno::ENOENT)));
        assert!(!tolerated("write value", &errno(Errno::EBUSY)));
        assert!(!tolerated("export", &io::Error::new(io::ErrorKind::Other, "no errno")));
    }

    #[test]
    fn default_root_is_sys_class_gpio() {
        assert_eq!(SysfsGpio::new().root(), Path::new("/sys/class/gpio"));
    }
}
