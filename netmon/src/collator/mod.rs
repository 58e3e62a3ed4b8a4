/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Report collation.
//!
//! The [`Collator`] is the single owner of every [`MachineState`].  Monitor
//! tasks fan in through one `mpsc` queue; for each [`Report`] the collator
//! runs the machine's hysteresis step and forwards exactly one colour update
//! to the display.
//!
//! Reports from one machine arrive in probe order because one task produces
//! them.  Reports from different machines are independent and keyed by LED
//! index.

pub mod hysteresis;

pub use hysteresis::{MachineState, OffPolicy};

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::colour::Colour;
use crate::config::BoardConfig;
use crate::display::{DisplayError, DisplayHandle};

/// Depth of the shared report queue (one slot per in-flight report).
pub const REPORT_QUEUE_DEPTH: usize = 100;

/// One probe result from a machine monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub led: usize,
    pub pingable: bool,
}

#[derive(Debug)]
struct TrackedMachine {
    name: String,
    policy: OffPolicy,
    state: MachineState,
    /// Last colour sent, for transition logging.
    shown: Option<Colour>,
}

pub struct Collator {
    /// LED index → machine.  `BTreeMap` for deterministic iteration order.
    machines: BTreeMap<usize, TrackedMachine>,
}

impl Collator {
    /// One entry per monitored position in `config`.
    pub fn new(config: &BoardConfig) -> Self {
        let machines = config
            .monitored()
            .map(|m| {
                (
                    m.led_index,
                    TrackedMachine {
                        name: m.name.clone(),
                        policy: OffPolicy::new(m.off_is_error, config.off_red),
                        state: MachineState::new(),
                        shown: None,
                    },
                )
            })
            .collect();
        Self { machines }
    }

    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    pub fn state(&self, led: usize) -> Option<&MachineState> {
        self.machines.get(&led).map(|m| &m.state)
    }

    /// Applies `report` observed at `now`.
    ///
    /// Returns the colour for `report.led`, or `None` if no machine is
    /// monitored at that position.
    pub fn apply(&mut self, report: Report, now: Instant) -> Option<Colour> {
        let Some(machine) = self.machines.get_mut(&report.led) else {
            warn!(led = report.led, "Report for unmonitored LED dropped");
            return None;
        };

        let colour = machine.state.observe(report.pingable, now, machine.policy);
        trace!(
            led = report.led,
            machine = %machine.name,
            pingable = report.pingable,
            %colour,
            "report"
        );

        if machine.shown != Some(colour) {
            debug!(
                led = report.led,
                machine = %machine.name,
                from = %machine.shown.map_or("-", Colour::name),
                to = %colour,
                "LED colour change"
            );
            machine.shown = Some(colour);
        }

        Some(colour)
    }

    /// Receives reports until every monitor has gone, forwarding colours to
    /// `display`.
    ///
    /// # Errors
    /// [`DisplayError::Closed`] if the display driver stops first.
    pub async fn run(
        mut self,
        mut reports: mpsc::Receiver<Report>,
        display: DisplayHandle,
    ) -> Result<(), DisplayError> {
        info!(machines = self.machines.len(), "Collator running");

        while let Some(report) = reports.recv().await {
            if let Some(colour) = self.apply(report, Instant::now()) {
                display.set_led(report.led, colour).await?;
            }
        }

        info!("All monitors stopped, collator exiting");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
