/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Board configuration loading and validation.
//!
//! The expected YAML structure is:
//! ```yaml
//! ping_delay_sec: 5
//! off_red_sec: 30
//! display:
//!   rows: 2
//!   columns: 4
//!   backend: sysfs
//!   red_row_pins: [2, 3]
//!   green_row_pins: [4, 17]
//!   column_pins: [27, 22, 10, 9]
//! machines:
//!   - name: build01
//!     address: 192.168.1.10
//!     off_is_error: true
//!   - name: ""            # unused position
//! ```
//!
//! Machines are listed in LED order: the n-th entry drives LED n.  There must
//! be exactly one entry per LED; unused positions have an empty name.

pub mod error;

pub use error::ConfigError;

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::display::Geometry;

// ── Defaults ──────────────────────────────────────────────────────────────────

fn default_ping_delay_sec() -> u64 {
    5
}

fn default_off_red_sec() -> u64 {
    30
}

fn default_probe_timeout_sec() -> u64 {
    2
}

fn default_lamp_test_ms() -> u64 {
    1000
}

fn default_scan_period_ms() -> u64 {
    5
}

fn default_column_active_low() -> bool {
    true
}

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct BoardConfigFile {
    #[serde(default = "default_ping_delay_sec")]
    ping_delay_sec: u64,
    #[serde(default = "default_off_red_sec")]
    off_red_sec: u64,
    #[serde(default = "default_probe_timeout_sec")]
    probe_timeout_sec: u64,
    #[serde(default = "default_lamp_test_ms")]
    lamp_test_ms: u64,
    display: DisplayConfig,
    #[serde(default)]
    machines: Vec<MachineEntry>,
}

/// One position as it appears in the YAML file.
#[derive(Debug, Deserialize)]
struct MachineEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    off_is_error: bool,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Which GPIO backend drives the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// `/sys/class/gpio` file interface.
    #[default]
    Sysfs,
    /// BCM283x registers mapped from `/dev/gpiomem`.
    Mmap,
}

/// Grid geometry and wiring.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    pub rows: usize,
    pub columns: usize,
    #[serde(default = "default_scan_period_ms")]
    pub scan_period_ms: u64,
    #[serde(default)]
    pub backend: BackendKind,
    /// Row lines drive LED anodes; active high unless set.
    #[serde(default)]
    pub row_active_low: bool,
    /// Column lines sink LED cathodes; active low unless cleared.
    #[serde(default = "default_column_active_low")]
    pub column_active_low: bool,
    /// One GPIO per row for the red dies.
    pub red_row_pins: Vec<u32>,
    /// One GPIO per row for the green dies.
    pub green_row_pins: Vec<u32>,
    /// One GPIO per column.
    pub column_pins: Vec<u32>,
}

impl DisplayConfig {
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.rows, self.columns)
    }

    pub fn scan_period(&self) -> Duration {
        Duration::from_millis(self.scan_period_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.scan_period_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "scan_period_ms",
            });
        }

        let lists = [
            ("red_row_pins", &self.red_row_pins, self.rows),
            ("green_row_pins", &self.green_row_pins, self.rows),
            ("column_pins", &self.column_pins, self.columns),
        ];

        let mut seen = HashSet::new();
        for (list, pins, expected) in lists {
            if pins.len() != expected {
                return Err(ConfigError::PinCountMismatch {
                    list,
                    expected,
                    actual: pins.len(),
                });
            }
            if let Some(&pin) = pins.iter().find(|&&pin| !seen.insert(pin)) {
                return Err(ConfigError::DuplicatePin { pin });
            }
        }

        Ok(())
    }
}

/// One board position.
///
/// Positions with an empty `name` are unused: their LED stays dark and no
/// monitor task is started for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub name: String,
    /// 0-based LED index, equal to the position in the configured list.
    pub led_index: usize,
    pub address: String,
    /// When set, unreachable is always Red; there is no "powered off" grace.
    pub off_is_error: bool,
}

impl MachineConfig {
    pub fn is_monitored(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Complete, validated board configuration.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Pause between two probes of the same machine.
    pub ping_delay: Duration,
    /// How long an unreachable machine stays Red before going dark.
    pub off_red: Duration,
    /// Upper bound on one reachability probe.
    pub probe_timeout: Duration,
    /// How long the startup lamp test keeps every LED lit.
    pub lamp_test: Duration,
    pub display: DisplayConfig,
    pub machines: Vec<MachineConfig>,
}

impl BoardConfig {
    /// Reads and validates the configuration at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, if the YAML is
    /// structurally invalid, or if validation fails (see [`ConfigError`]).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading board configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))?;

        info!(
            rows = config.display.rows,
            columns = config.display.columns,
            backend = ?config.display.backend,
            monitored = config.monitored().count(),
            "Board configuration loaded"
        );
        for machine in config.monitored() {
            debug!(
                "  LED {:>2}: {} ({}){}",
                machine.led_index,
                machine.name,
                machine.address,
                if machine.off_is_error { " [off is error]" } else { "" },
            );
        }

        Ok(config)
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: BoardConfigFile =
            serde_yaml::from_str(content).context("Failed to parse YAML")?;

        let machines = file
            .machines
            .into_iter()
            .enumerate()
            .map(|(led_index, entry)| MachineConfig {
                name: entry.name,
                led_index,
                address: entry.address,
                off_is_error: entry.off_is_error,
            })
            .collect();

        let config = Self {
            ping_delay: Duration::from_secs(file.ping_delay_sec),
            off_red: Duration::from_secs(file.off_red_sec),
            probe_timeout: Duration::from_secs(file.probe_timeout_sec),
            lamp_test: Duration::from_millis(file.lamp_test_ms),
            display: file.display,
            machines,
        };

        config.validate()?;
        Ok(config)
    }

    /// Number of physical LEDs on the board.
    pub fn led_count(&self) -> usize {
        self.display.geometry().led_count()
    }

    /// Positions that have a machine assigned.
    pub fn monitored(&self) -> impl Iterator<Item = &MachineConfig> {
        self.machines.iter().filter(|m| m.is_monitored())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.display.validate()?;

        if self.ping_delay.is_zero() {
            return Err(ConfigError::ZeroInterval {
                field: "ping_delay_sec",
            });
        }

        if self.machines.len() != self.led_count() {
            return Err(ConfigError::LedCountMismatch {
                configured: self.machines.len(),
                leds: self.led_count(),
            });
        }

        if let Some(m) = self
            .monitored()
            .find(|m| m.address.trim().is_empty())
        {
            return Err(ConfigError::MissingAddress {
                led: m.led_index,
                name: m.name.clone(),
            });
        }

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
