//! Human-readable decode of a keyboard report

use super::KeyboardReport;

/// Modifier labels, bit 0 first
pub const MODIFIER_LABELS: [&str; 8] = [
    "lctrl", "lshift", "lalt", "lgui", "rctrl", "rshift", "ralt", "rgui",
];

/// Labels for the first 17 bitmap bytes, usage 0 first.
///
/// Usage 0x87 and every bit of bytes 17 and up have no dedicated label.
pub const KEY_LABELS: [&str; 136] = [
    // 0x00
    "NO_EVENT", "ERROR_ROLLOVER", "POST_FAIL", "ERROR_UNDEFINED", "a", "b", "c", "d",
    "e", "f", "g", "h", "i", "j", "k", "l",
    "m", "n", "o", "p", "q", "r", "s", "t",
    "u", "v", "w", "x", "y", "z", "1/!", "2/@",
    // 0x20
    "3/#", "4/$", "5/%", "6/^", "7/&", "8/*", "9/(", "0/)",
    "enter", "esc", "del/bksp", "tab", "space", "-/_", "=/+", "[/{",
    "]/}", "\\/|", "#/~", ";/:", "'/\"", "`/~", ",/<", "./>",
    "//?", "capslock", "F1", "F2", "F3", "F4", "F5", "F6",
    // 0x40
    "F7", "F8", "F9", "F10", "F11", "F12", "prtscr", "scrolllock",
    "pause", "ins", "home", "pgup", "del", "end", "pgdn", "r_arrow",
    "l_arrow", "d_arrow", "u_arrow", "numlock", "num/", "num*", "num-", "num+",
    "numenter", "num1", "num2", "num3", "num4", "num5", "num6", "num7",
    // 0x60
    "num8", "num9", "num0", "num.", "\\/|", "app", "power", "num=",
    "F13", "F14", "F15", "F16", "F17", "F18", "F19", "F20",
    "F21", "F22", "F23", "F24", "exec", "help", "menu", "sel",
    "stop", "again", "undo", "cut", "copy", "paste", "find", "mute",
    // 0x80
    "volup", "voldn", "capslock_l", "numlock_l", "scrolllock_l", "num,", "num=", OTHER_LABEL,
];

/// Label shared by every key without a dedicated label
pub const OTHER_LABEL: &str = "(other)";

/// Decode every set bit into its label, each followed by a space.
///
/// Returns `none` for an empty report. Bytes past the labelled range
/// contribute one `(other)` per non-zero byte, so a single `(other)` can
/// stand for several pressed keys.
pub fn describe_report(report: &KeyboardReport) -> String {
    if report.is_empty() {
        return "none".to_string();
    }

    let mut out = String::new();
    let mut push = |label: &str| {
        out.push_str(label);
        out.push(' ');
    };

    for (bit, label) in MODIFIER_LABELS.iter().enumerate() {
        if report.modifiers & (1 << bit) != 0 {
            push(*label);
        }
    }

    let labelled_bytes = KEY_LABELS.len() / 8;
    for (byte, bits) in report.keys.iter().take(labelled_bytes).enumerate() {
        for bit in 0..8 {
            if bits & (1 << bit) != 0 {
                push(KEY_LABELS[byte * 8 + bit]);
            }
        }
    }

    for bits in &report.keys[labelled_bytes..] {
        if *bits != 0 {
            push(OTHER_LABEL);
        }
    }

    out
}
