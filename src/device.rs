//! The emulated keyboard: matrix, HID keyboard, LEDs and dispatcher wired
//! into one scan cycle.

use crate::dispatch::{KeyswitchHandler, LayoutDispatcher};
use crate::hid::{HidKeyboard, SendOutcome};
use crate::input::LineSource;
use crate::leds::LedStrip;
use crate::matrix::{MatrixEngine, REFERENCE_COLS, REFERENCE_ROWS};
use crate::session::SessionStats;
use log::debug;
use std::io;

/// What the driver should do after a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Continue,
    /// The operator typed `Q`
    Quit,
    /// The line source is exhausted
    EndOfInput,
    /// Reading is disabled, so no cycle can make progress
    Idle,
}

/// One emulated keyboard with an explicit owner and lifetime.
///
/// The matrix size defaults to the reference layout.
pub struct VirtualKeyboard<
    H = LayoutDispatcher,
    const ROWS: usize = REFERENCE_ROWS,
    const COLS: usize = REFERENCE_COLS,
> {
    pub matrix: MatrixEngine<ROWS, COLS>,
    pub keyboard: HidKeyboard,
    pub leds: LedStrip,
    pub handler: H,
    pub stats: SessionStats,
}

impl VirtualKeyboard<LayoutDispatcher> {
    pub fn new(keyboard: HidKeyboard, leds: LedStrip) -> Self {
        Self::with_handler(keyboard, leds, LayoutDispatcher::reference())
    }
}

impl<H: KeyswitchHandler, const ROWS: usize, const COLS: usize> VirtualKeyboard<H, ROWS, COLS> {
    pub const MATRIX_COLS: usize = COLS;

    pub fn with_handler(keyboard: HidKeyboard, leds: LedStrip, handler: H) -> Self {
        Self {
            matrix: MatrixEngine::new(),
            keyboard,
            leds,
            handler,
            stats: SessionStats::default(),
        }
    }

    /// Reset the matrix and start the HID keyboard
    pub fn setup(&mut self) {
        self.matrix.setup();
        self.keyboard.begin();
    }

    /// Release everything on the HID keyboard
    pub fn end(&mut self) {
        self.keyboard.end();
    }

    /// Run one scan cycle: read a line, dispatch its events, flush the report
    pub fn cycle<S: LineSource + ?Sized>(&mut self, source: &mut S) -> io::Result<CycleOutcome> {
        let outcome = self.matrix.scan_matrix(source)?;

        if outcome.end_of_input {
            return Ok(CycleOutcome::EndOfInput);
        }
        self.stats.parse_errors += outcome.errors.len() as u64;
        if outcome.quit_requested {
            return Ok(CycleOutcome::Quit);
        }

        if outcome.skipped {
            self.stats.skipped_cycles += 1;
            self.flush();
            return Ok(CycleOutcome::Idle);
        }

        self.stats.cycles += 1;
        self.handler.begin_cycle(&mut self.keyboard);
        for event in outcome.events {
            self.stats.keyswitch_events += 1;
            if event.state.toggled_on() || event.state.toggled_off() {
                self.stats.transitions += 1;
            }
            self.handler
                .handle_keyswitch_event(event, &mut self.matrix, &mut self.keyboard);
        }

        self.flush();
        debug!("cycle {} done", self.stats.cycles);
        Ok(CycleOutcome::Continue)
    }

    fn flush(&mut self) {
        match self.keyboard.send_report() {
            SendOutcome::Sent => self.stats.reports_sent += 1,
            SendOutcome::Suppressed => self.stats.reports_suppressed += 1,
        }
    }

    /// Publish LED state to telemetry
    pub fn sync_leds(&mut self) -> String {
        self.stats.led_syncs += 1;
        self.leds.sync_leds()
    }

    /// Run cycles until the operator quits, input runs out or reading is
    /// disabled
    pub fn run<S: LineSource + ?Sized>(&mut self, source: &mut S) -> io::Result<CycleOutcome> {
        loop {
            match self.cycle(source)? {
                CycleOutcome::Continue => {
                    self.sync_leds();
                }
                done => return Ok(done),
            }
        }
    }
}
