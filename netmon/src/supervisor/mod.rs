/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Startup wiring.
//!
//! [`Supervisor::run`] performs, in order:
//!
//! 1. lamp test – every LED yellow for `lamp_test`, then all off;
//! 2. one [`MachineMonitor`] task per monitored position;
//! 3. the [`Collator`] receive loop, which is the runtime of the process.
//!
//! The configuration is checked against the display in
//! [`Supervisor::new`], so a mismatched board never gets as far as spawning
//! a monitor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{info, warn};

use crate::collator::{Collator, Report, REPORT_QUEUE_DEPTH};
use crate::colour::Colour;
use crate::config::{BoardConfig, ConfigError};
use crate::display::{DisplayError, DisplayHandle};
use crate::monitor::{MachineMonitor, Probe};

/// Time each colour is shown per LED in test mode.
pub const LED_TEST_STEP: Duration = Duration::from_millis(500);

pub struct Supervisor<P: Probe> {
    config: BoardConfig,
    display: DisplayHandle,
    probe: Arc<P>,
}

impl<P: Probe> Supervisor<P> {
    /// # Errors
    /// Any [`ConfigError`] from validation, including
    /// [`ConfigError::LedCountMismatch`] when the configuration was written
    /// for a different grid than `display` drives.
    pub fn new(config: BoardConfig, display: DisplayHandle, probe: P) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.machines.len() != display.led_count() {
            return Err(ConfigError::LedCountMismatch {
                configured: config.machines.len(),
                leds: display.led_count(),
            });
        }
        Ok(Self {
            config,
            display,
            probe: Arc::new(probe),
        })
    }

    /// Lights every LED for the configured lamp test time, then clears the
    /// board.
    pub async fn lamp_test(&self) -> Result<(), DisplayError> {
        info!(duration = ?self.config.lamp_test, "Lamp test");
        self.display.fill(Colour::Yellow).await?;
        time::sleep(self.config.lamp_test).await;
        self.display.fill(Colour::Off).await
    }

    /// Starts one monitor per monitored position, each with a clone of
    /// `reports`.
    pub fn spawn_monitors(&self, reports: &mpsc::Sender<Report>) -> Vec<JoinHandle<()>> {
        self.config
            .monitored()
            .map(|machine| {
                MachineMonitor::new(
                    machine,
                    self.config.ping_delay,
                    Arc::clone(&self.probe),
                    reports.clone(),
                )
                .spawn()
            })
            .collect()
    }

    /// Lamp test, monitors, then the collator loop.
    ///
    /// The supervisor holds its own report sender for the whole run, so the
    /// collator keeps the board up even with no monitored machines.  Only
    /// returns if the display goes away.
    pub async fn run(self) -> Result<(), DisplayError> {
        self.lamp_test().await?;

        let (tx, rx) = mpsc::channel(REPORT_QUEUE_DEPTH);
        let monitors = self.spawn_monitors(&tx);
        if monitors.is_empty() {
            warn!("No monitored machines configured, board stays dark");
        }

        info!(
            monitors = monitors.len(),
            ping_delay = ?self.config.ping_delay,
            off_red = ?self.config.off_red,
            "Monitoring started"
        );

        let result = Collator::new(&self.config).run(rx, self.display).await;
        drop(tx);
        for monitor in monitors {
            monitor.abort();
        }
        result
    }
}

/// LED test mode: each LED red, then green, then off, in index order,
/// cycling through the board forever.
pub async fn cycle_leds(handle: &DisplayHandle) -> Result<(), DisplayError> {
    let leds = handle.led_count();
    info!(leds, "LED test mode");
    handle.fill(Colour::Off).await?;
    loop {
        for led in 0..leds {
            handle.set_led(led, Colour::Red).await?;
            time::sleep(LED_TEST_STEP).await;
            handle.set_led(led, Colour::Green).await?;
            time::sleep(LED_TEST_STEP).await;
            handle.set_led(led, Colour::Off).await?;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
