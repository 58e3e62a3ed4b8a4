/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! netmon – network status board
//!
//! Polls a static list of machines and shows each one's health on a
//! bi-colour LED in a multiplexed grid.
//!
//! ```text
//! lib.rs
//! ├── config/      – YAML board configuration + validation
//! ├── colour.rs    – LED colours and red/green decomposition
//! ├── display/     – frame buffer + column-scanning driver task
//! ├── collator/    – per-machine hysteresis, report → colour
//! ├── monitor/     – one polling task per machine, ping probe
//! └── supervisor/  – lamp test and task wiring
//! ```
//!
//! Data flow:
//!
//! ```text
//! MachineMonitor ×N ──Report──► Collator ──DisplayCommand──► DisplayDriver ──► GpioBackend
//! ```

pub mod collator;
pub mod colour;
pub mod config;
pub mod display;
pub mod monitor;
pub mod supervisor;
