//! Virtual key matrix: per-cell key state, operator line parsing and
//! press/release transition events.

mod engine;
mod error;
mod event;
mod grid;
pub mod names;

pub use engine::{LineOutcome, MatrixEngine, ReferenceMatrix, ScanOutcome, HELP_TEXT};
pub use error::{MatrixError, ParseError};
pub use event::{KeyState, KeyswitchEvent, KeyswitchState};
pub use grid::Grid;
pub use names::KeyPosition;

/// Rows in the reference split layout.
pub const REFERENCE_ROWS: usize = 4;
/// Columns in the reference split layout (both halves).
pub const REFERENCE_COLS: usize = 16;
