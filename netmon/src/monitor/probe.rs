/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Reachability probes.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time;
use tracing::debug;

/// Extra time given to the `ping` process beyond its own `-W` timeout
/// before it is killed.
const PROCESS_GRACE: Duration = Duration::from_secs(1);

/// A reachability check.
///
/// Any failure (no reply, timeout, name resolution, I/O error) is reported
/// as `false`; there is no separate error channel.
pub trait Probe: Send + Sync + 'static {
    fn is_reachable(&self, address: &str) -> impl Future<Output = bool> + Send;
}

/// One ICMP echo through the system `ping` binary.
#[derive(Debug, Clone)]
pub struct PingProbe {
    timeout: Duration,
}

impl PingProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn command(&self, address: &str) -> Command {
        let wait_secs = self.timeout.as_secs().max(1).to_string();
        let mut cmd = Command::new("ping");
        cmd.args(["-c", "1", "-W", wait_secs.as_str(), address])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl Probe for PingProbe {
    async fn is_reachable(&self, address: &str) -> bool {
        let mut cmd = self.command(address);
        match time::timeout(self.timeout + PROCESS_GRACE, cmd.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                debug!(address, "Failed to run ping: {e}");
                false
            }
            Err(_) => {
                debug!(address, timeout = ?self.timeout, "Ping timed out");
                false
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
