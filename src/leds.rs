//! Per-key RGB LED state

use crate::telemetry::{TelemetryRecord, TelemetrySender};
use log::warn;
use std::fmt::Write;

/// LEDs on the reference layout, one per matrix cell
pub const LED_COUNT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// LED colors addressed by index or by matrix position
pub struct LedStrip {
    leds: Vec<Rgb>,
    cols: usize,
    telemetry: Option<TelemetrySender>,
}

impl LedStrip {
    /// `count` LEDs, all off. `cols` maps (row, col) to `row * cols + col`.
    pub fn new(count: usize, cols: usize) -> Self {
        Self {
            leds: vec![Rgb::OFF; count],
            cols,
            telemetry: None,
        }
    }

    pub fn with_telemetry(mut self, telemetry: TelemetrySender) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn len(&self) -> usize {
        self.leds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    pub fn set_crgb_at(&mut self, index: usize, color: Rgb) {
        match self.leds.get_mut(index) {
            Some(led) => *led = color,
            None => warn!("ignoring LED {} outside 0..{}", index, self.leds.len()),
        }
    }

    pub fn set_crgb_at_position(&mut self, row: usize, col: usize, color: Rgb) {
        match self.index_of(row, col) {
            Some(index) => self.set_crgb_at(index, color),
            None => warn!("ignoring LED at ({},{})", row, col),
        }
    }

    pub fn crgb_at(&self, index: usize) -> Option<Rgb> {
        self.leds.get(index).copied()
    }

    pub fn crgb_at_position(&self, row: usize, col: usize) -> Option<Rgb> {
        self.crgb_at(self.index_of(row, col)?)
    }

    fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        row.checked_mul(self.cols)?.checked_add(col)
    }

    /// Render the telemetry line: `r.g.b` in hex per LED, each followed by a
    /// space, ending in a newline
    pub fn telemetry_line(&self) -> String {
        let mut line = String::with_capacity(self.leds.len() * 9 + 1);
        for led in &self.leds {
            // writing into a String cannot fail
            let _ = write!(line, "{:x}.{:x}.{:x} ", led.r, led.g, led.b);
        }
        line.push('\n');
        line
    }

    /// Publish the current colors to telemetry and return the logged line
    pub fn sync_leds(&mut self) -> String {
        let line = self.telemetry_line();
        if let Some(telemetry) = &self.telemetry {
            if telemetry.send(TelemetryRecord::LedStates(line.clone())).is_err() {
                warn!("telemetry log is gone, dropping LED states");
            }
        }
        line
    }
}

impl Default for LedStrip {
    fn default() -> Self {
        Self::new(LED_COUNT, crate::matrix::REFERENCE_COLS)
    }
}
