//! Scan-cycle engine
//!
//! Each cycle reads one operator line, applies its tokens to the current
//! grid, then compares the current grid against the previous one to derive
//! one keyswitch event per cell. A cell left in `Tap` by the line produces a
//! second, synthetic release event in the same cycle and is reset, so edge
//! triggered consumers see a complete press and release without waiting for
//! another scan.

use super::{
    names, Grid, KeyState, KeyswitchEvent, KeyswitchState, MatrixError, ParseError,
    REFERENCE_COLS, REFERENCE_ROWS,
};
use crate::input::LineSource;
use log::{debug, error, trace};
use std::io;

/// Usage summary shown for `?` / `help` on an interactive console
pub const HELP_TEXT: &str = "\
Each line is one scan cycle. Tokens are separated by single spaces.
  T        following keys are tapped (pressed and released this cycle; default)
  D        following keys are pressed and held
  U        following keys are released
  C        release every key
  #        ignore the rest of the line
  Q        quit immediately
  ? help   show this help
  <name>   a key name, e.g. a, esc, lshift, space, prog, lfn
  (r,c)    a key by zero-based matrix row and column
Example: D lshift T a   holds shift and taps a
";

/// Key state that subsequent key tokens on a line are set to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Tap,
    Down,
    Up,
}

impl Mode {
    fn key_state(self) -> KeyState {
        match self {
            Mode::Tap => KeyState::Tap,
            Mode::Down => KeyState::Pressed,
            Mode::Up => KeyState::NotPressed,
        }
    }
}

/// Result of parsing one line, before events are derived
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineOutcome {
    /// Tokens that were skipped, in line order
    pub errors: Vec<ParseError>,
    /// A `?` or `help` token was seen
    pub help_requested: bool,
    /// A `Q` token was seen; tokens after it were not processed
    pub quit_requested: bool,
}

/// Result of one full scan cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Keyswitch events in row-major order, taps followed by their release
    pub events: Vec<KeyswitchEvent>,
    pub errors: Vec<ParseError>,
    pub help_requested: bool,
    /// The operator asked to quit. No events were derived for this cycle.
    pub quit_requested: bool,
    /// The line source had nothing more to read
    pub end_of_input: bool,
    /// Reading was disabled, nothing was read or changed
    pub skipped: bool,
}

impl ScanOutcome {
    fn from_line(line: LineOutcome) -> Self {
        Self {
            errors: line.errors,
            help_requested: line.help_requested,
            quit_requested: line.quit_requested,
            ..Self::default()
        }
    }
}

/// Virtual key matrix of fixed `ROWS` x `COLS` dimensions
#[derive(Debug, Clone)]
pub struct MatrixEngine<const ROWS: usize, const COLS: usize> {
    current: Grid<KeyState, ROWS, COLS>,
    /// Only ever holds `Pressed` or `NotPressed`
    previous: Grid<KeyState, ROWS, COLS>,
    /// Advisory metadata for the dispatcher, never consulted here
    mask: Grid<bool, ROWS, COLS>,
    read_enabled: bool,
}

/// Matrix engine sized for the reference split layout
pub type ReferenceMatrix = MatrixEngine<REFERENCE_ROWS, REFERENCE_COLS>;

impl<const ROWS: usize, const COLS: usize> MatrixEngine<ROWS, COLS> {
    pub fn new() -> Self {
        Self {
            current: Grid::default(),
            previous: Grid::default(),
            mask: Grid::default(),
            read_enabled: true,
        }
    }

    /// Reset every grid to its idle state
    pub fn setup(&mut self) {
        self.current.fill(KeyState::NotPressed);
        self.previous.fill(KeyState::NotPressed);
        self.mask.fill(false);
    }

    pub const fn rows(&self) -> usize {
        ROWS
    }

    pub const fn cols(&self) -> usize {
        COLS
    }

    pub fn read_enabled(&self) -> bool {
        self.read_enabled
    }

    /// Enable or disable reading new input lines
    pub fn set_read_enabled(&mut self, enabled: bool) {
        self.read_enabled = enabled;
    }

    /// Whether any cell is held down (`Pressed`; taps do not count)
    pub fn anything_held(&self) -> bool {
        self.current.iter().any(|(_, state)| state == KeyState::Pressed)
    }

    /// Run one scan cycle reading its line from `source`.
    ///
    /// The source receives `anything_held()` so it can pick its prompt.
    /// When reading is disabled the source is not touched.
    pub fn scan_matrix<S: LineSource + ?Sized>(&mut self, source: &mut S) -> io::Result<ScanOutcome> {
        if !self.read_enabled {
            return Ok(ScanOutcome {
                skipped: true,
                ..ScanOutcome::default()
            });
        }

        let Some(line) = source.next_line(self.anything_held())? else {
            return Ok(ScanOutcome {
                end_of_input: true,
                ..ScanOutcome::default()
            });
        };

        let outcome = self.scan_line(&line);
        if outcome.help_requested && source.is_interactive() {
            source.show_help(HELP_TEXT);
        }
        Ok(outcome)
    }

    /// Run one scan cycle on an already read line
    pub fn scan_line(&mut self, line: &str) -> ScanOutcome {
        if !self.read_enabled {
            return ScanOutcome {
                skipped: true,
                ..ScanOutcome::default()
            };
        }

        let parsed = self.read_line(line);
        let quit = parsed.quit_requested;
        let mut outcome = ScanOutcome::from_line(parsed);
        if quit {
            self.drop_taps();
        } else {
            outcome.events = self.derive_events();
        }
        outcome
    }

    /// Reset every `Tap` cell without deriving events for it
    fn drop_taps(&mut self) {
        self.current = self.current.map(|state| match state {
            KeyState::Tap => KeyState::NotPressed,
            other => other,
        });
    }

    /// Apply one line of tokens to the current grid.
    ///
    /// Mutations made by earlier tokens stand even when later tokens fail.
    pub fn read_line(&mut self, line: &str) -> LineOutcome {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut outcome = LineOutcome::default();
        let mut mode = Mode::Tap;

        for token in line.split(' ') {
            match token {
                "" | "#" => break,
                "?" | "help" => outcome.help_requested = true,
                "Q" => {
                    debug!("quit requested");
                    outcome.quit_requested = true;
                    break;
                }
                "T" => mode = Mode::Tap,
                "D" => mode = Mode::Down,
                "U" => mode = Mode::Up,
                "C" => self.current.fill(KeyState::NotPressed),
                _ => match names::resolve(token, ROWS, COLS) {
                    Ok(pos) => {
                        trace!("{} -> ({},{}) {:?}", token, pos.row, pos.col, mode);
                        self.current[(pos.row, pos.col)] = mode.key_state();
                    }
                    Err(err) => {
                        error!("{}", err);
                        outcome.errors.push(err);
                    }
                },
            }
        }

        outcome
    }

    /// Compare current against previous and emit one event per cell.
    ///
    /// A `Tap` cell additionally emits a release event and is reset in both
    /// grids before moving on.
    pub fn derive_events(&mut self) -> Vec<KeyswitchEvent> {
        let mut events = Vec::with_capacity(ROWS * COLS);

        for row in 0..ROWS {
            for col in 0..COLS {
                let was_pressed = match self.previous[(row, col)] {
                    KeyState::Pressed => true,
                    KeyState::NotPressed => false,
                    KeyState::Tap => {
                        error!(
                            "assertion failed: previous state of ({},{}) should never be Tap",
                            row, col
                        );
                        false
                    }
                };
                let current = self.current[(row, col)];

                events.push(KeyswitchEvent::new(
                    row,
                    col,
                    KeyswitchState::new(was_pressed, current.is_down()),
                ));
                self.previous[(row, col)] = current;

                if current == KeyState::Tap {
                    events.push(KeyswitchEvent::new(row, col, KeyswitchState::new(true, false)));
                    self.current[(row, col)] = KeyState::NotPressed;
                    self.previous[(row, col)] = KeyState::NotPressed;
                }
            }
        }

        events
    }

    /// Current state of a cell, `None` outside the matrix
    pub fn keystate(&self, row: usize, col: usize) -> Option<KeyState> {
        self.current.get(row, col)
    }

    /// Force a cell into a state, bypassing the line parser
    pub fn set_keystate(&mut self, row: usize, col: usize, state: KeyState) -> Result<(), MatrixError> {
        if self.current.set(row, col, state) {
            Ok(())
        } else {
            Err(MatrixError::PositionOutOfRange {
                row,
                col,
                rows: ROWS,
                cols: COLS,
            })
        }
    }

    /// True unless the cell is `NotPressed`. Out of range reads as released.
    pub fn is_pressed(&self, row: usize, col: usize) -> bool {
        self.current.get(row, col).is_some_and(KeyState::is_down)
    }

    /// Like `is_pressed`, addressed by a 1-based row-major key index.
    ///
    /// Index 0 is never valid.
    pub fn is_pressed_at_index(&self, index: usize) -> Result<bool, MatrixError> {
        let out_of_range = MatrixError::KeyIndexOutOfRange {
            index,
            max: ROWS * COLS,
        };
        let zero_based = index.checked_sub(1).ok_or(out_of_range)?;
        let (row, col) = self.current.position_of(zero_based).ok_or(out_of_range)?;
        Ok(self.is_pressed(row, col))
    }

    pub fn mask_key(&mut self, row: usize, col: usize) {
        self.mask.set(row, col, true);
    }

    pub fn unmask_key(&mut self, row: usize, col: usize) {
        self.mask.set(row, col, false);
    }

    pub fn is_key_masked(&self, row: usize, col: usize) -> bool {
        self.mask.get(row, col).unwrap_or(false)
    }

    /// Replace the whole mask with "currently `Pressed`" for every cell
    pub fn mask_held_keys(&mut self) {
        self.mask = self.current.map(|state| state == KeyState::Pressed);
    }
}

impl<const ROWS: usize, const COLS: usize> Default for MatrixEngine<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}
