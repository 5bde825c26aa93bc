//! Line transports feeding the matrix engine
//!
//! One line is read per scan cycle. Reading is the only blocking point of a
//! cycle and belongs entirely to the transport.

use crossterm::tty::IsTty;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Source of operator command lines
pub trait LineSource {
    /// Read the next line, without its line terminator.
    ///
    /// `anything_held` only selects the prompt; it has no effect on what is
    /// read. Returns `Ok(None)` once input is exhausted.
    fn next_line(&mut self, anything_held: bool) -> io::Result<Option<String>>;

    /// Whether an operator is typing at a terminal
    fn is_interactive(&self) -> bool {
        false
    }

    /// Show the usage summary to the operator
    fn show_help(&mut self, _help: &str) {}
}

fn strip_terminator(line: &mut String) {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
}

/// Reads lines from stdin, prompting when stdin is a terminal
pub struct ConsoleSource {
    interactive: bool,
}

impl ConsoleSource {
    pub const PROMPT: &'static str = "Enter matrix scan input: ";
    pub const PROMPT_HELD: &'static str = "Enter matrix scan input (keys held): ";

    /// Detect interactivity from stdin
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_tty(),
        }
    }

    /// Force interactive behaviour on or off
    pub fn with_interactive(interactive: bool) -> Self {
        Self { interactive }
    }

    /// Prompt for the given hint
    pub fn prompt(anything_held: bool) -> &'static str {
        if anything_held {
            Self::PROMPT_HELD
        } else {
            Self::PROMPT
        }
    }
}

impl Default for ConsoleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for ConsoleSource {
    fn next_line(&mut self, anything_held: bool) -> io::Result<Option<String>> {
        if self.interactive {
            let mut stdout = io::stdout().lock();
            stdout.write_all(Self::prompt(anything_held).as_bytes())?;
            stdout.flush()?;
        }

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        strip_terminator(&mut line);
        Ok(Some(line))
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn show_help(&mut self, help: &str) {
        if self.interactive {
            print!("{}", help);
        }
    }
}

/// Plays back a script, one line per scan cycle
pub struct ScriptSource<R> {
    reader: R,
    lines_read: usize,
}

impl<R: BufRead> ScriptSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            lines_read: 0,
        }
    }

    /// Number of lines handed out so far
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}

impl ScriptSource<BufReader<File>> {
    /// Open a script file
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> LineSource for ScriptSource<R> {
    fn next_line(&mut self, _anything_held: bool) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.lines_read += 1;
        strip_terminator(&mut line);
        Ok(Some(line))
    }
}
