/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use netmon::config::{BackendKind, BoardConfig};
use netmon::display::DisplayDriver;
use netmon::monitor::PingProbe;
use netmon::supervisor::{self, Supervisor};
use netmon_gpio::{GpioBackend, MmapGpio, SysfsGpio};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Network status board: machine reachability on a bi-colour LED grid.
///
/// Example:
///   netmon -c /etc/netmon.yaml -v
#[derive(Debug, Parser)]
#[command(name = "netmon", about = "Network status board LED driver", long_about = None)]
struct Cli {
    /// Path to the YAML board configuration file.
    #[arg(short = 'c', long = "config", default_value = "netmon.yaml")]
    config: PathBuf,

    /// LED test mode: light each LED red, then green, in turn, forever.
    #[arg(short = 't', long = "test", default_value_t = false)]
    test: bool,

    /// Log every LED colour transition.
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=trace);
    // without it, --verbose selects debug.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    info!("netmon starting up...");
    info!(config = ?cli.config, test = cli.test, verbose = cli.verbose, "Options");

    // ── Load board configuration ──────────────────────────────────────────────
    let config = match BoardConfig::load_from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load board configuration: {:#}", e);
            process::exit(1);
        }
    };

    // ── GPIO backend ──────────────────────────────────────────────────────────
    let backend: Box<dyn GpioBackend> = match config.display.backend {
        BackendKind::Sysfs => Box::new(SysfsGpio::new()),
        BackendKind::Mmap => match MmapGpio::open() {
            Ok(gpio) => Box::new(gpio),
            Err(e) => {
                error!("Failed to open GPIO registers: {}", e);
                process::exit(1);
            }
        },
    };

    // ── Display driver ────────────────────────────────────────────────────────
    let (driver, display) = DisplayDriver::new(backend, &config.display);
    let driver_task = driver.spawn();

    // ── Monitoring ────────────────────────────────────────────────────────────
    let result = if cli.test {
        supervisor::cycle_leds(&display).await.map_err(anyhow::Error::from)
    } else {
        let probe = PingProbe::new(config.probe_timeout);
        match Supervisor::new(config, display.clone(), probe) {
            Ok(supervisor) => supervisor.run().await.map_err(anyhow::Error::from),
            Err(e) => Err(anyhow::Error::from(e).context("Board configuration does not match display")),
        }
    };

    // Dropping the last handle blanks the board and releases the pins.
    drop(display);
    if let Err(e) = driver_task.await {
        error!("Display driver task failed: {}", e);
    }

    if let Err(e) = result {
        error!("netmon stopped: {:#}", e);
        process::exit(1);
    }
}
