//! Bitmap keyboard report
//!
//! One modifier byte followed by a bitmap with one bit per key usage, from
//! usage 0x00 up to keypad hexadecimal (0xDD).

/// Last usage carried in the key bitmap (keypad hexadecimal)
pub const LAST_KEY: u8 = 0xDD;
/// Left control
pub const FIRST_MODIFIER: u8 = 0xE0;
/// Right GUI
pub const LAST_MODIFIER: u8 = 0xE7;
/// Bytes in the key bitmap
pub const KEY_BYTES: usize = 28;
/// Bytes in a serialized report
pub const REPORT_LEN: usize = 1 + KEY_BYTES;

/// Where a usage lives inside the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Key { byte: usize, mask: u8 },
    Modifier(u8),
}

impl Slot {
    fn of(usage: u8) -> Option<Slot> {
        match usage {
            0..=LAST_KEY => Some(Slot::Key {
                byte: usize::from(usage / 8),
                mask: 1 << (usage % 8),
            }),
            FIRST_MODIFIER..=LAST_MODIFIER => Some(Slot::Modifier(1 << (usage - FIRST_MODIFIER))),
            _ => None,
        }
    }
}

/// Modifier flag bit for a modifier usage, `None` for anything else
pub(crate) fn modifier_bit(usage: u8) -> Option<u8> {
    match Slot::of(usage) {
        Some(Slot::Modifier(mask)) => Some(mask),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardReport {
    /// LCtrl, LShift, LAlt, LGui, RCtrl, RShift, RAlt, RGui from bit 0 up
    pub modifiers: u8,
    pub keys: [u8; KEY_BYTES],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            keys: [0; KEY_BYTES],
        }
    }

    /// Set or clear the bit for `usage`.
    ///
    /// Returns false when the usage is neither a bitmap key nor a modifier.
    pub fn set_usage(&mut self, usage: u8, pressed: bool) -> bool {
        let (target, mask) = match Slot::of(usage) {
            Some(Slot::Key { byte, mask }) => (&mut self.keys[byte], mask),
            Some(Slot::Modifier(mask)) => (&mut self.modifiers, mask),
            None => return false,
        };
        if pressed {
            *target |= mask;
        } else {
            *target &= !mask;
        }
        true
    }

    /// Whether the bit for `usage` is set
    pub fn contains(&self, usage: u8) -> bool {
        match Slot::of(usage) {
            Some(Slot::Key { byte, mask }) => self.keys[byte] & mask != 0,
            Some(Slot::Modifier(mask)) => self.modifiers & mask != 0,
            None => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers == 0 && self.keys.iter().all(|b| *b == 0)
    }

    /// Wire layout: modifier byte then the key bitmap
    pub fn as_bytes(&self) -> [u8; REPORT_LEN] {
        let mut bytes = [0; REPORT_LEN];
        bytes[0] = self.modifiers;
        bytes[1..].copy_from_slice(&self.keys);
        bytes
    }
}
