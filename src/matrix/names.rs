//! Key names of the reference split layout and `(row,col)` token parsing
//!
//! The name table is built once on first use and never mutated afterwards,
//! so any number of readers can share it.

use super::ParseError;
use std::collections::HashMap;
use std::sync::LazyLock;

/// A resolved matrix coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPosition {
    pub row: usize,
    pub col: usize,
}

impl KeyPosition {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Static name table for the reference layout
pub static KEY_NAMES: LazyLock<HashMap<&'static str, KeyPosition>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    let mut add = |name: &'static str, row: usize, col: usize| {
        map.insert(name, KeyPosition::new(row, col));
    };

    // Left half, number row
    add("prog", 0, 0);
    add("1", 0, 1);
    add("2", 0, 2);
    add("3", 0, 3);
    add("4", 0, 4);
    add("5", 0, 5);
    add("led", 0, 6);

    // Right half, number row
    add("any", 0, 9);
    add("6", 0, 10);
    add("7", 0, 11);
    add("8", 0, 12);
    add("9", 0, 13);
    add("0", 0, 14);
    add("num", 0, 15);

    // Top letter row
    add("`", 1, 0);
    add("q", 1, 1);
    add("w", 1, 2);
    add("e", 1, 3);
    add("r", 1, 4);
    add("t", 1, 5);
    add("tab", 1, 6);
    add("enter", 1, 9);
    add("y", 1, 10);
    add("u", 1, 11);
    add("i", 1, 12);
    add("o", 1, 13);
    add("p", 1, 14);
    add("=", 1, 15);

    // Home row
    add("pgup", 2, 0);
    add("a", 2, 1);
    add("s", 2, 2);
    add("d", 2, 3);
    add("f", 2, 4);
    add("g", 2, 5);
    add("h", 2, 10);
    add("j", 2, 11);
    add("k", 2, 12);
    add("l", 2, 13);
    add(";", 2, 14);
    add("'", 2, 15);

    // Bottom row. esc and fly sit on row 2 of the matrix.
    add("pgdn", 3, 0);
    add("z", 3, 1);
    add("x", 3, 2);
    add("c", 3, 3);
    add("v", 3, 4);
    add("b", 3, 5);
    add("esc", 2, 6);
    add("fly", 2, 9);
    add("n", 3, 10);
    add("m", 3, 11);
    add(",", 3, 12);
    add(".", 3, 13);
    add("/", 3, 14);
    add("-", 3, 15);

    // Thumb clusters
    add("lctrl", 0, 7);
    add("bksp", 1, 7);
    add("cmd", 2, 7);
    add("lshift", 3, 7);
    add("rshift", 3, 8);
    add("alt", 2, 8);
    add("space", 1, 8);
    add("rctrl", 0, 8);

    // Palm keys
    add("lfn", 3, 6);
    add("rfn", 3, 9);

    map
});

/// Look up a key by name
pub fn lookup(name: &str) -> Option<KeyPosition> {
    KEY_NAMES.get(name).copied()
}

/// Parse a literal `(row,col)` token against a `rows` x `cols` matrix
pub fn parse_coordinates(token: &str, rows: usize, cols: usize) -> Result<KeyPosition, ParseError> {
    let inner = token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| ParseError::BadPair(token.to_string()))?;
    let (row, col) = inner
        .split_once(',')
        .ok_or_else(|| ParseError::BadPair(token.to_string()))?;

    let bad = || ParseError::BadCoordinates(token.to_string());
    let row: usize = row.parse().map_err(|_| bad())?;
    let col: usize = col.parse().map_err(|_| bad())?;
    if row >= rows || col >= cols {
        return Err(bad());
    }
    Ok(KeyPosition::new(row, col))
}

/// Resolve a key token: `(row,col)` literal or a name from the table.
///
/// Names that map outside a smaller matrix are reported as unrecognized.
pub fn resolve(token: &str, rows: usize, cols: usize) -> Result<KeyPosition, ParseError> {
    if token.len() >= 2 && token.starts_with('(') && token.ends_with(')') {
        return parse_coordinates(token, rows, cols);
    }
    lookup(token)
        .filter(|pos| pos.row < rows && pos.col < cols)
        .ok_or_else(|| ParseError::UnrecognizedCommand(token.to_string()))
}
