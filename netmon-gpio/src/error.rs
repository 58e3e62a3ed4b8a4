/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error type shared by every GPIO backend.
//!
//! Hardware failures are never fatal for the caller: the display driver logs
//! them and retries on the next scan tick.  The variants therefore carry the
//! pin and the operation so a single log line identifies the failing wire.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpioError {
    /// A sysfs control file could not be opened or written.
    #[error("GPIO {pin}: cannot {op} via {}: {source}", .path.display())]
    Sysfs {
        pin: u32,
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The register window could not be opened or mapped.
    #[error("cannot map GPIO registers from {}: {source}", .path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The pin number is outside the range the backend can drive.
    #[error("GPIO {pin} is out of range (max {max})")]
    InvalidPin { pin: u32, max: u32 },
}
