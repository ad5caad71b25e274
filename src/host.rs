//! The editing environment the converter talks to: selection lookup,
//! per-character confirmation and status messages.

use std::fmt;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::buffer::TextBuffer;

/// Operator answer for one confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Yes,
    No,
    All,
    Quit,
}

impl Decision {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" | "" => Some(Self::Yes),
            "n" | "no" => Some(Self::No),
            "a" | "all" | "!" => Some(Self::All),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// What the operator is asked about: the character, its codes and the
/// proposed replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPrompt<'a> {
    pub code_point: u8,
    pub position: usize,
    pub replacement: &'a str,
}

impl ConfirmPrompt<'_> {
    pub fn printable(&self) -> String {
        printable_glyph(self.code_point)
    }
}

/// Printable form of a code point; C0/C1 controls are shown escaped.
pub fn printable_glyph(code_point: u8) -> String {
    let ch = char::from(code_point);
    if ch.is_control() {
        ch.escape_unicode().to_string()
    } else {
        ch.to_string()
    }
}

impl fmt::Display for ConfirmPrompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Replace {} (\\{:03o}, 0x{:02X}) with {:?}?",
            self.printable(),
            self.code_point,
            self.code_point,
            self.replacement
        )
    }
}

pub trait Host {
    /// The region to use when the caller gives no explicit positions.
    fn current_selection(&self, buffer: &TextBuffer) -> Option<(usize, usize)>;

    /// Blocks until the operator decides about one replacement.
    fn prompt(&mut self, prompt: &ConfirmPrompt<'_>) -> io::Result<Decision>;

    /// Best-effort status message.
    fn notify(&mut self, message: &str);
}

/// Line-oriented host over any reader/writer pair. The selection is the
/// whole buffer unless one was set explicitly.
#[derive(Debug)]
pub struct TerminalHost<R, W> {
    input: R,
    output: W,
    selection: Option<(usize, usize)>,
    whole_buffer: bool,
}

impl TerminalHost<StdinLock<'static>, Stdout> {
    /// Holds the stdin lock for the host's lifetime; build one per session
    /// and reuse it so read-ahead answers are not lost.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalHost<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            selection: None,
            whole_buffer: true,
        }
    }

    pub fn with_selection(mut self, selection: Option<(usize, usize)>) -> Self {
        self.selection = selection;
        self.whole_buffer = false;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Host for TerminalHost<R, W> {
    fn current_selection(&self, buffer: &TextBuffer) -> Option<(usize, usize)> {
        if self.whole_buffer {
            return Some((0, buffer.char_len()));
        }
        self.selection
    }

    fn prompt(&mut self, prompt: &ConfirmPrompt<'_>) -> io::Result<Decision> {
        loop {
            write!(
                self.output,
                "[{}] {prompt} [y]es/[n]o/[a]ll/[q]uit: ",
                prompt.position
            )?;
            self.output.flush()?;
            let mut input = String::new();
            if self.input.read_line(&mut input)? == 0 {
                writeln!(self.output)?;
                return Ok(Decision::Quit);
            }
            if let Some(decision) = Decision::parse(&input) {
                return Ok(decision);
            }
            writeln!(self.output, "Please enter y, n, a, or q.")?;
        }
    }

    fn notify(&mut self, message: &str) {
        let _ = writeln!(self.output, "{message}");
    }
}
