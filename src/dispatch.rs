//! Minimal firmware dispatcher turning keyswitch events into key presses
//!
//! Real firmware brings its own dispatcher; this one lets the emulator run
//! end to end. Like the firmware it stands in for, it rebuilds the report
//! every cycle: everything is released, then every cell that is down this
//! cycle is pressed again. A tap therefore shows up in the report of the
//! cycle it happened in and is gone from the next one.

use crate::hid::HidKeyboard;
use crate::matrix::{KeyswitchEvent, MatrixEngine, REFERENCE_COLS, REFERENCE_ROWS};
use log::trace;

/// Consumer of keyswitch events
pub trait KeyswitchHandler {
    /// Called once per cycle before that cycle's events
    fn begin_cycle(&mut self, _keyboard: &mut HidKeyboard) {}

    fn handle_keyswitch_event<const ROWS: usize, const COLS: usize>(
        &mut self,
        event: KeyswitchEvent,
        matrix: &mut MatrixEngine<ROWS, COLS>,
        keyboard: &mut HidKeyboard,
    );
}

// HID keyboard usages used by the reference layer
const ___: u8 = 0x00;
const A: u8 = 0x04;
const B: u8 = 0x05;
const C: u8 = 0x06;
const D: u8 = 0x07;
const E: u8 = 0x08;
const F: u8 = 0x09;
const G: u8 = 0x0A;
const H: u8 = 0x0B;
const I: u8 = 0x0C;
const J: u8 = 0x0D;
const K: u8 = 0x0E;
const L: u8 = 0x0F;
const M: u8 = 0x10;
const N: u8 = 0x11;
const O: u8 = 0x12;
const P: u8 = 0x13;
const Q: u8 = 0x14;
const R: u8 = 0x15;
const S: u8 = 0x16;
const T: u8 = 0x17;
const U: u8 = 0x18;
const V: u8 = 0x19;
const W: u8 = 0x1A;
const X: u8 = 0x1B;
const Y: u8 = 0x1C;
const Z: u8 = 0x1D;
const N1: u8 = 0x1E;
const N2: u8 = 0x1F;
const N3: u8 = 0x20;
const N4: u8 = 0x21;
const N5: u8 = 0x22;
const N6: u8 = 0x23;
const N7: u8 = 0x24;
const N8: u8 = 0x25;
const N9: u8 = 0x26;
const N0: u8 = 0x27;
const ENTER: u8 = 0x28;
const ESC: u8 = 0x29;
const BKSP: u8 = 0x2A;
const TAB: u8 = 0x2B;
const SPACE: u8 = 0x2C;
const MINUS: u8 = 0x2D;
const EQUAL: u8 = 0x2E;
const SEMI: u8 = 0x33;
const QUOTE: u8 = 0x34;
const GRAVE: u8 = 0x35;
const COMMA: u8 = 0x36;
const DOT: u8 = 0x37;
const SLASH: u8 = 0x38;
const PGUP: u8 = 0x4B;
const PGDN: u8 = 0x4E;
const LCTL: u8 = 0xE0;
const LSFT: u8 = 0xE1;
const LALT: u8 = 0xE2;
const LGUI: u8 = 0xE3;
const RCTL: u8 = 0xE4;
const RSFT: u8 = 0xE5;
const RALT: u8 = 0xE6;

/// Base QWERTY layer of the reference layout in matrix order.
///
/// prog, led, any, num and the two palm keys drive layers and LED effects in
/// real firmware and have no usage here.
#[rustfmt::skip]
pub const REFERENCE_LAYER: [[u8; REFERENCE_COLS]; REFERENCE_ROWS] = [
    [___,   N1, N2, N3, N4, N5, ___, LCTL, RCTL, ___,  N6, N7, N8,    N9,  N0,    ___],
    [GRAVE, Q,  W,  E,  R,  T,  TAB, BKSP, SPACE, ENTER, Y, U,  I,     O,   P,     EQUAL],
    [PGUP,  A,  S,  D,  F,  G,  ESC, LGUI, LALT, RALT, H,  J,  K,     L,   SEMI,  QUOTE],
    [PGDN,  Z,  X,  C,  V,  B,  ___, LSFT, RSFT, ___,  N,  M,  COMMA, DOT, SLASH, MINUS],
];

/// Dispatcher mapping each cell to one HID usage
pub struct LayoutDispatcher {
    layer: Vec<Vec<u8>>,
}

impl LayoutDispatcher {
    /// Build from rows of usages; 0 means "no key"
    pub fn new<Row: AsRef<[u8]>>(layer: &[Row]) -> Self {
        Self {
            layer: layer.iter().map(|row| row.as_ref().to_vec()).collect(),
        }
    }

    /// Dispatcher for the reference layout
    pub fn reference() -> Self {
        Self::new(&REFERENCE_LAYER)
    }

    /// Usage bound to a cell, if any
    pub fn usage_at(&self, row: usize, col: usize) -> Option<u8> {
        self.layer
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .filter(|usage| *usage != ___)
    }
}

impl Default for LayoutDispatcher {
    fn default() -> Self {
        Self::reference()
    }
}

impl KeyswitchHandler for LayoutDispatcher {
    fn begin_cycle(&mut self, keyboard: &mut HidKeyboard) {
        keyboard.release_all();
    }

    /// Masked cells are ignored until they come up, which clears their mask.
    fn handle_keyswitch_event<const ROWS: usize, const COLS: usize>(
        &mut self,
        event: KeyswitchEvent,
        matrix: &mut MatrixEngine<ROWS, COLS>,
        keyboard: &mut HidKeyboard,
    ) {
        if matrix.is_key_masked(event.row, event.col) {
            if event.state.toggled_off() {
                trace!("unmasking ({},{})", event.row, event.col);
                matrix.unmask_key(event.row, event.col);
            }
            return;
        }

        if !event.state.is_pressed() {
            return;
        }
        if let Some(usage) = self.usage_at(event.row, event.col) {
            keyboard.press(usage);
        }
    }
}
