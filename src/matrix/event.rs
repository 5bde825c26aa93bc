//! Key states and keyswitch transition events

/// State of a single matrix cell within a scan cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum KeyState {
    #[default]
    NotPressed,
    Pressed,
    /// Pressed and released within one scan cycle. Never survives the cycle
    /// that produced it.
    Tap,
}

impl KeyState {
    /// True for `Pressed` and `Tap`
    pub fn is_down(self) -> bool {
        self != KeyState::NotPressed
    }
}

/// Two-bit keyswitch transition flags handed to the firmware dispatcher.
///
/// Bit 0 is "was pressed last cycle", bit 1 is "is pressed this cycle".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyswitchState(u8);

impl KeyswitchState {
    pub const WAS_PRESSED: u8 = 0b01;
    pub const IS_PRESSED: u8 = 0b10;

    pub const fn new(was_pressed: bool, is_pressed: bool) -> Self {
        let mut bits = 0;
        if was_pressed {
            bits |= Self::WAS_PRESSED;
        }
        if is_pressed {
            bits |= Self::IS_PRESSED;
        }
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn was_pressed(self) -> bool {
        self.0 & Self::WAS_PRESSED != 0
    }

    pub const fn is_pressed(self) -> bool {
        self.0 & Self::IS_PRESSED != 0
    }

    /// Key went down this cycle
    pub const fn toggled_on(self) -> bool {
        self.is_pressed() && !self.was_pressed()
    }

    /// Key came up this cycle
    pub const fn toggled_off(self) -> bool {
        self.was_pressed() && !self.is_pressed()
    }
}

/// One transition report for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyswitchEvent {
    pub row: usize,
    pub col: usize,
    pub state: KeyswitchState,
}

impl KeyswitchEvent {
    pub fn new(row: usize, col: usize, state: KeyswitchState) -> Self {
        Self { row, col, state }
    }
}
