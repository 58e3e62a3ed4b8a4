/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Time-multiplexed LED grid driver.
//!
//! Every LED in a column shares its row wiring with the LEDs in the other
//! columns, so only one column may be energized at a time.  The driver keeps
//! a frame buffer ([`DisplayState`]) and on every scan tick:
//!
//! ```text
//!  1. de-energize the current column
//!  2. advance to the next column (wrapping)
//!  3. write red + green row lines for that column from the buffer
//!  4. energize the new column
//! ```
//!
//! Step 1 must precede step 3; otherwise the new row levels flash onto the
//! old column.
//!
//! The driver runs as one task that owns both the buffer and the GPIO
//! backend.  Other tasks talk to it only through a [`DisplayHandle`], which
//! queues [`DisplayCommand`]s.  Commands update the buffer and never touch
//! hardware.

pub mod grid;

pub use grid::{DisplayState, Geometry, LedPosition};

use std::time::Duration;

use netmon_gpio::{GpioBackend, GpioError, OutputLine};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::colour::Colour;
use crate::config::DisplayConfig;

/// Depth of the command queue between the collator and the driver.
pub const DISPLAY_QUEUE_DEPTH: usize = 100;

// ── Commands & handle ─────────────────────────────────────────────────────────

/// Buffer update sent to the driver task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCommand {
    /// Set one LED.
    Set { led: usize, colour: Colour },
    /// Set every LED.
    Fill(Colour),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("LED {led} is out of range (display has {led_count} LEDs)")]
    InvalidLed { led: usize, led_count: usize },

    #[error("display driver has stopped")]
    Closed,
}

/// Cloneable sender side of the display driver.
#[derive(Debug, Clone)]
pub struct DisplayHandle {
    commands: mpsc::Sender<DisplayCommand>,
    led_count: usize,
}

impl DisplayHandle {
    pub(crate) fn new(commands: mpsc::Sender<DisplayCommand>, led_count: usize) -> Self {
        Self {
            commands,
            led_count,
        }
    }

    pub fn led_count(&self) -> usize {
        self.led_count
    }

    pub async fn set_led(&self, led: usize, colour: Colour) -> Result<(), DisplayError> {
        if led >= self.led_count {
            return Err(DisplayError::InvalidLed {
                led,
                led_count: self.led_count,
            });
        }
        self.send(DisplayCommand::Set { led, colour }).await
    }

    pub async fn fill(&self, colour: Colour) -> Result<(), DisplayError> {
        self.send(DisplayCommand::Fill(colour)).await
    }

    async fn send(&self, command: DisplayCommand) -> Result<(), DisplayError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DisplayError::Closed)
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

/// Output lines of the grid, with polarity applied.
#[derive(Debug, Clone)]
pub struct DisplayPins {
    pub red_rows: Vec<OutputLine>,
    pub green_rows: Vec<OutputLine>,
    pub columns: Vec<OutputLine>,
}

impl DisplayPins {
    pub fn from_config(config: &DisplayConfig) -> Self {
        let lines = |pins: &[u32], active_low: bool| {
            pins.iter()
                .map(|&pin| OutputLine::new(pin, active_low))
                .collect::<Vec<_>>()
        };
        Self {
            red_rows: lines(&config.red_row_pins, config.row_active_low),
            green_rows: lines(&config.green_row_pins, config.row_active_low),
            columns: lines(&config.column_pins, config.column_active_low),
        }
    }

    fn all(&self) -> impl Iterator<Item = &OutputLine> {
        self.columns
            .iter()
            .chain(self.red_rows.iter())
            .chain(self.green_rows.iter())
    }
}

// ── DisplayDriver ─────────────────────────────────────────────────────────────

pub struct DisplayDriver {
    backend: Box<dyn GpioBackend>,
    pins: DisplayPins,
    state: DisplayState,
    scan_period: Duration,
    commands: mpsc::Receiver<DisplayCommand>,
    /// Set while hardware writes are failing, so the failure is logged once.
    failing: bool,
}

impl DisplayDriver {
    /// Claims every display pin and returns the driver together with the
    /// first handle to it.
    ///
    /// `config` is expected to have passed [`DisplayConfig::validate`].
    /// Pin claim failures are logged and the driver still starts.
    pub fn new(backend: Box<dyn GpioBackend>, config: &DisplayConfig) -> (Self, DisplayHandle) {
        let geometry = config.geometry();
        let (tx, rx) = mpsc::channel(DISPLAY_QUEUE_DEPTH);

        let mut driver = Self {
            backend,
            pins: DisplayPins::from_config(config),
            state: DisplayState::new(geometry),
            scan_period: config.scan_period(),
            commands: rx,
            failing: false,
        };
        driver.claim_pins();

        info!(
            rows = geometry.rows,
            columns = geometry.columns,
            scan_period_ms = config.scan_period_ms,
            "Display driver ready"
        );

        (driver, DisplayHandle::new(tx, geometry.led_count()))
    }

    fn claim_pins(&mut self) {
        for line in self.pins.all() {
            if let Err(e) = line.claim(&mut self.backend) {
                warn!(pin = line.pin(), "Failed to claim display pin: {e}");
            }
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Runs [`run`](Self::run) on a thread of the blocking pool.
    ///
    /// Backend calls are synchronous file or register I/O issued every scan
    /// period; this keeps them off the async worker threads.  Must be called
    /// from inside a Tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        let runtime = Handle::current();
        task::spawn_blocking(move || runtime.block_on(self.run()))
    }

    /// Runs until every [`DisplayHandle`] has been dropped, then blanks the
    /// board and releases the pins.
    pub async fn run(mut self) {
        let mut ticker = time::interval(self.scan_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => break,
                },
                _ = ticker.tick() => self.scan_tick(),
            }
        }

        debug!("All display handles dropped, shutting display down");
        self.shutdown();
    }

    /// Buffer-only update.
    pub fn apply(&mut self, command: DisplayCommand) {
        trace!(?command, "display command");
        match command {
            DisplayCommand::Set { led, colour } => {
                if !self.state.set(led, colour) {
                    warn!(led, "Ignoring update for LED outside the grid");
                }
            }
            DisplayCommand::Fill(colour) => self.state.fill(colour),
        }
    }

    /// Drives the next column of the grid.
    ///
    /// If the current column cannot be switched off the tick stops there and
    /// the cursor stays put, so the next tick retries the same column.
    pub fn scan_tick(&mut self) {
        let previous = self.state.current_column();
        if let Err(e) = self.pins.columns[previous].drive(&mut self.backend, false) {
            self.record_health(Some(e));
            return;
        }

        let (_, next) = self.state.advance_column();
        let mut first_error: Option<GpioError> = None;
        let mut note = |result: Result<(), GpioError>| {
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        };

        for row in 0..self.state.geometry().rows {
            let cell = self.state.cell_at(row, next);
            note(self.pins.red_rows[row].drive(&mut self.backend, cell.red_on));
            note(self.pins.green_rows[row].drive(&mut self.backend, cell.green_on));
        }

        note(self.pins.columns[next].drive(&mut self.backend, true));

        self.record_health(first_error);
    }

    fn record_health(&mut self, error: Option<GpioError>) {
        match (error, self.failing) {
            (Some(e), false) => {
                warn!("Display write failed, retrying every scan tick: {e}");
                self.failing = true;
            }
            (None, true) => {
                info!("Display writes recovered");
                self.failing = false;
            }
            _ => {}
        }
    }

    fn shutdown(&mut self) {
        for line in self.pins.all() {
            if let Err(e) = line.drive(&mut self.backend, false) {
                debug!(pin = line.pin(), "Failed to park display pin: {e}");
            }
        }
        for line in self.pins.all() {
            if let Err(e) = self.backend.release_pin(line.pin()) {
                debug!(pin = line.pin(), "Failed to release display pin: {e}");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use netmon_gpio::{GpioEvent, GpioLog, Level, RecordingGpio};
    use std::collections::HashSet;

    const RED: [u32; 2] = [2, 3];
    const GREEN: [u32; 2] = [4, 17];
    const COLUMNS: [u32; 4] = [27, 22, 10, 9];

    /// 2×4 grid, rows active high, columns active low.
    fn config_2x4() -> DisplayConfig {
        DisplayConfig {
            rows: 2,
            columns: 4,
            scan_period_ms: 5,
            backend: Default::default(),
            row_active_low: false,
            column_active_low: true,
            red_row_pins: RED.to_vec(),
            green_row_pins: GREEN.to_vec(),
            column_pins: COLUMNS.to_vec(),
        }
    }

    fn driver_2x4() -> (DisplayDriver, DisplayHandle, GpioLog) {
        let (gpio, log) = RecordingGpio::new();
        let (driver, handle) = DisplayDriver::new(Box::new(gpio), &config_2x4());
        log.clear();
        (driver, handle, log)
    }

    fn column_of(pin: u32) -> Option<usize> {
        COLUMNS.iter().position(|&p| p == pin)
    }

    #[test]
    fn new_claims_every_pin_and_parks_it_inactive() {
        let (gpio, log) = RecordingGpio::new();
        let (_driver, handle) = DisplayDriver::new(Box::new(gpio), &config_2x4());
        assert_eq!(handle.led_count(), 8);

        let exported: HashSet<u32> = log
            .events()
            .into_iter()
            .filter_map(|e| match e {
                GpioEvent::Export(pin) => Some(pin),
                _ => None,
            })
            .collect();
        assert_eq!(exported.len(), 8);

        for pin in COLUMNS {
            assert_eq!(log.level(pin), Some(Level::High), "column {pin} must be off");
        }
        for pin in RED.iter().chain(GREEN.iter()) {
            assert_eq!(log.level(*pin), Some(Level::Low), "row {pin} must be off");
        }
    }

    #[test]
    fn commands_only_touch_the_buffer() {
        let (mut driver, _handle, log) = driver_2x4();

        driver.apply(DisplayCommand::Set {
            led: 5,
            colour: Colour::Green,
        });
        driver.apply(DisplayCommand::Set {
            led: 0,
            colour: Colour::Red,
        });

        assert!(log.events().is_empty());
        assert_eq!(Colour::from(driver.state().cell(5).unwrap()), Colour::Green);
        assert_eq!(Colour::from(driver.state().cell(0).unwrap()), Colour::Red);
    }

    #[test]
    fn out_of_grid_command_is_ignored() {
        let (mut driver, _handle, _log) = driver_2x4();
        driver.apply(DisplayCommand::Set {
            led: 99,
            colour: Colour::Red,
        });
        assert!((0..8).all(|i| Colour::from(driver.state().cell(i).unwrap()) == Colour::Off));
    }

    #[test]
    fn tick_writes_column_off_then_rows_then_column_on() {
        let (mut driver, _handle, log) = driver_2x4();
        // LED 4 = row 1, column 0.
        driver.apply(DisplayCommand::Set {
            led: 4,
            colour: Colour::Yellow,
        });
        driver.apply(DisplayCommand::Set {
            led: 0,
            colour: Colour::Green,
        });

        driver.scan_tick();

        assert_eq!(
            log.writes(),
            vec![
                (COLUMNS[3], Level::High), // previous column off
                (RED[0], Level::Low),
                (GREEN[0], Level::High),
                (RED[1], Level::High),
                (GREEN[1], Level::High),
                (COLUMNS[0], Level::Low), // new column on
            ]
        );
    }

    #[test]
    fn at_most_one_column_energized_and_each_once_per_cycle() {
        let (mut driver, _handle, log) = driver_2x4();
        driver.apply(DisplayCommand::Fill(Colour::Red));

        let mut energized: HashSet<usize> = HashSet::new();
        let mut order = Vec::new();

        for _ in 0..(COLUMNS.len() * 2) {
            log.clear();
            driver.scan_tick();

            let mut rows_written_while_old_on = false;
            for (pin, level) in log.writes() {
                match column_of(pin) {
                    Some(col) if level == Level::Low => {
                        energized.insert(col);
                        order.push(col);
                    }
                    Some(col) => {
                        energized.remove(&col);
                    }
                    None => {
                        if !energized.is_empty() {
                            rows_written_while_old_on = true;
                        }
                    }
                }
                assert!(energized.len() <= 1, "more than one column energized");
            }
            assert!(!rows_written_while_old_on, "rows rewritten before column off");
        }

        assert_eq!(order, vec![0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn write_failure_does_not_stop_scanning() {
        let (mut driver, _handle, log) = driver_2x4();

        log.set_failing(true);
        driver.scan_tick();
        assert!(driver.failing);
        assert_eq!(driver.state().current_column(), 3);

        log.set_failing(false);
        driver.scan_tick();
        assert!(!driver.failing);
        assert_eq!(driver.state().current_column(), 0);
        assert_eq!(log.level(COLUMNS[0]), Some(Level::Low));
    }

    #[test]
    fn stuck_column_blocks_the_next_one() {
        let (mut driver, _handle, log) = driver_2x4();
        driver.apply(DisplayCommand::Fill(Colour::Green));

        driver.scan_tick();
        assert_eq!(log.level(COLUMNS[0]), Some(Level::Low));

        // Column 0 can no longer be switched off.
        log.set_pin_failing(COLUMNS[0], true);
        log.clear();
        driver.scan_tick();

        assert!(driver.failing);
        assert!(log.writes().is_empty(), "nothing may change while column 0 is on");
        assert_eq!(driver.state().current_column(), 0);
        let energized: Vec<u32> = COLUMNS
            .iter()
            .copied()
            .filter(|&pin| log.level(pin) == Some(Level::Low))
            .collect();
        assert_eq!(energized, vec![COLUMNS[0]]);

        // Once the pin responds again scanning resumes with column 1.
        log.set_pin_failing(COLUMNS[0], false);
        log.clear();
        driver.scan_tick();

        assert!(!driver.failing);
        assert_eq!(driver.state().current_column(), 1);
        assert_eq!(log.writes().first(), Some(&(COLUMNS[0], Level::High)));
        assert_eq!(log.writes().last(), Some(&(COLUMNS[1], Level::Low)));
    }

    #[tokio::test]
    async fn handle_rejects_out_of_range_led() {
        let (_driver, handle, _log) = driver_2x4();
        assert_eq!(
            handle.set_led(8, Colour::Red).await,
            Err(DisplayError::InvalidLed {
                led: 8,
                led_count: 8
            })
        );
    }

    #[tokio::test]
    async fn handle_reports_closed_driver() {
        let (driver, handle, _log) = driver_2x4();
        drop(driver);
        assert_eq!(handle.fill(Colour::Off).await, Err(DisplayError::Closed));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn spawned_driver_scans_off_the_worker_threads() {
        let (driver, handle, log) = driver_2x4();
        let task = driver.spawn();

        handle.fill(Colour::Green).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        assert!(log
            .writes()
            .iter()
            .any(|&w| w == (COLUMNS[0], Level::Low)));

        drop(handle);
        task.await.unwrap();
        for pin in COLUMNS {
            assert_eq!(log.level(pin), Some(Level::High));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_renders_updates_and_blanks_on_shutdown() {
        let (driver, handle, log) = driver_2x4();
        let task = tokio::spawn(driver.run());

        // LED 6 = row 1, column 2.
        handle.set_led(6, Colour::Red).await.unwrap();
        time::sleep(Duration::from_millis(50)).await;

        // The row block written just before column 2 was last energized:
        // [red 0, green 0, red 1, green 1].
        let writes = log.writes();
        let on = writes
            .iter()
            .rposition(|&w| w == (COLUMNS[2], Level::Low))
            .expect("column 2 never energized");
        assert_eq!(
            writes[on - 4..on],
            [
                (RED[0], Level::Low),
                (GREEN[0], Level::Low),
                (RED[1], Level::High),
                (GREEN[1], Level::Low),
            ]
        );

        drop(handle);
        task.await.unwrap();

        for pin in COLUMNS {
            assert_eq!(log.level(pin), Some(Level::High));
        }
        for pin in RED.iter().chain(GREEN.iter()) {
            assert_eq!(log.level(*pin), Some(Level::Low));
        }
        let released = log
            .events()
            .iter()
            .filter(|e| matches!(e, GpioEvent::Release(_)))
            .count();
        assert_eq!(released, 8);
    }
}
