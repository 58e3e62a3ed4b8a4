/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-machine polling tasks.
//!
//! Each monitored machine gets its own [`MachineMonitor`] task with its own
//! sender on the collator's report queue, so a probe that hangs until its
//! timeout only delays that one machine.

pub mod probe;

pub use probe::{PingProbe, Probe};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, trace};

use crate::collator::Report;
use crate::config::MachineConfig;

pub struct MachineMonitor<P: Probe> {
    led: usize,
    name: String,
    address: String,
    interval: Duration,
    probe: Arc<P>,
    reports: mpsc::Sender<Report>,
}

impl<P: Probe> MachineMonitor<P> {
    pub fn new(
        machine: &MachineConfig,
        interval: Duration,
        probe: Arc<P>,
        reports: mpsc::Sender<Report>,
    ) -> Self {
        Self {
            led: machine.led_index,
            name: machine.name.clone(),
            address: machine.address.clone(),
            interval,
            probe,
            reports,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Probe, report, sleep; forever, or until the collator has gone.
    pub async fn run(self) {
        debug!(led = self.led, machine = %self.name, address = %self.address, "Monitor started");

        loop {
            let pingable = self.probe.is_reachable(&self.address).await;
            trace!(led = self.led, machine = %self.name, pingable, "probe");

            let report = Report {
                led: self.led,
                pingable,
            };
            if self.reports.send(report).await.is_err() {
                debug!(led = self.led, machine = %self.name, "Collator gone, monitor stopping");
                return;
            }

            time::sleep(self.interval).await;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
