/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-machine reachability state machine.
//!
//! ```text
//!              pingable                      !pingable (edge: since = now)
//!   ┌──────────┐ ───────► Green    ┌────────────────────────────┐
//!   │ Pingable │ ◄─────────────────│ Unpingable { since }       │
//!   └──────────┘    pingable       └────────────────────────────┘
//!                                     │ off_is_error        → Red
//!                                     │ now − since < grace → Red
//!                                     │ otherwise           → Off
//! ```
//!
//! `since` is captured once per falling edge.  Repeated unpingable reports
//! leave it untouched, so a machine that stays down always progresses from
//! Red to Off.

use std::time::Duration;

use tokio::time::Instant;

use crate::colour::Colour;

/// What an unreachable machine means for this position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffPolicy {
    /// Machine must always be up; unreachable is always Red.
    AlwaysError,
    /// Red for `grace` after going down, then Off.
    Grace(Duration),
}

impl OffPolicy {
    pub fn new(off_is_error: bool, grace: Duration) -> Self {
        if off_is_error {
            OffPolicy::AlwaysError
        } else {
            OffPolicy::Grace(grace)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reachability {
    Pingable,
    Unpingable { since: Instant },
}

/// Mutable state of one machine, owned by the collator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineState {
    reachability: Reachability,
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineState {
    /// Machines start out as `Pingable`: one that is down at startup gets a
    /// full grace window from its first failed probe.
    pub fn new() -> Self {
        Self {
            reachability: Reachability::Pingable,
        }
    }

    pub fn is_pingable(&self) -> bool {
        self.reachability == Reachability::Pingable
    }

    /// Instant of the last pingable→unpingable edge while unpingable.
    pub fn off_since(&self) -> Option<Instant> {
        match self.reachability {
            Reachability::Pingable => None,
            Reachability::Unpingable { since } => Some(since),
        }
    }

    /// Feed one probe result observed at `now` and return the colour to show.
    pub fn observe(&mut self, pingable: bool, now: Instant, policy: OffPolicy) -> Colour {
        if pingable {
            self.reachability = Reachability::Pingable;
            return Colour::Green;
        }

        let since = match self.reachability {
            Reachability::Pingable => {
                self.reachability = Reachability::Unpingable { since: now };
                now
            }
            Reachability::Unpingable { since } => since,
        };

        match policy {
            OffPolicy::AlwaysError => Colour::Red,
            OffPolicy::Grace(grace) if now.saturating_duration_since(since) < grace => Colour::Red,
            OffPolicy::Grace(_) => Colour::Off,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
