//! Serial command interface.
//!
//! Bytes arrive one at a time from the receive interrupt; on firmware they
//! cross into the control context through a bounded SPSC channel before being
//! fed to [`CommandSession::ingest`]. The session assembles a bounded line,
//! recognizes CR/LF termination and backspace editing, and hands completed
//! lines to the grammar. [`dispatch`] then applies the command to the live
//! configuration or requests the sleep transition.

use core::fmt::Write as _;
use core::str;

use heapless::{String, Vec};

use crate::config::{BackupStore, ConfigStore, INTERVAL_MAX_S, INTERVAL_MIN_S, PersistentConfig};
use crate::console::Console;

pub mod grammar;

pub use grammar::Command;

/// Maximum number of bytes accepted on a single command line (excluding the
/// terminator).
pub const MAX_LINE_LEN: usize = 32;

/// Outcome of feeding one byte into the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineEvent {
    /// A complete line parsed into a command.
    Command(Command),
    /// The line exceeded [`MAX_LINE_LEN`] before its terminator.
    Overflow,
    /// The buffered line was not valid UTF-8.
    Invalid,
}

/// Assembles command lines from an interrupt-fed byte stream.
///
/// Single consumer: only the control context calls [`ingest`](Self::ingest).
/// Overflow is non-silent: the poisoned line produces one explicit
/// [`LineEvent::Overflow`] at its terminator and the buffer resets.
pub struct CommandSession {
    buffer: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl CommandSession {
    /// Creates an empty session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Feeds a single byte; a terminator may complete a line.
    ///
    /// Empty lines are ignored. Backspace/DEL drops the last buffered byte.
    pub fn ingest(&mut self, byte: u8) -> Option<LineEvent> {
        match byte {
            b'\r' | b'\n' => self.finish_line(),
            0x08 | 0x7f => {
                self.buffer.pop();
                None
            }
            value => {
                if !self.overflowed && self.buffer.push(value).is_err() {
                    self.overflowed = true;
                }
                None
            }
        }
    }

    fn finish_line(&mut self) -> Option<LineEvent> {
        if self.overflowed {
            self.buffer.clear();
            self.overflowed = false;
            return Some(LineEvent::Overflow);
        }
        if self.buffer.is_empty() {
            return None;
        }

        let event = match str::from_utf8(self.buffer.as_slice()) {
            Ok(line) => LineEvent::Command(grammar::parse(line)),
            Err(_) => LineEvent::Invalid,
        };
        self.buffer.clear();
        Some(event)
    }
}

impl Default for CommandSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Follow-up action requested by a dispatched command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CommandEffect {
    /// Nothing beyond the console reply.
    None,
    /// The controller must run the WAKE to SLEEP transition now.
    EnterSleep,
}

/// Executes one completed line against the live configuration.
///
/// Replies go to the operator console; configuration is only touched by a
/// valid `stime:` value. Interval changes take effect from the next
/// transition; the occupancy in progress keeps its deadline.
pub fn dispatch<S, C>(
    event: &LineEvent,
    config: &mut ConfigStore<S>,
    console: &mut C,
) -> CommandEffect
where
    S: BackupStore,
    C: Console,
{
    match event {
        LineEvent::Command(Command::Sleep) => {
            console.write_line("SERIAL COMMAND: entering sleep immediately.");
            CommandEffect::EnterSleep
        }
        LineEvent::Command(Command::SetInterval(seconds)) => {
            let mut line: String<80> = String::new();
            if PersistentConfig::interval_in_range(*seconds) {
                config.set_intervals(*seconds);
                let _ = write!(
                    line,
                    "SERIAL COMMAND: cycle interval set to {seconds} seconds (saved)."
                );
            } else {
                let _ = write!(
                    line,
                    "SERIAL ERROR: invalid interval {seconds}; range is {INTERVAL_MIN_S}-{INTERVAL_MAX_S} seconds."
                );
            }
            console.write_line(&line);
            CommandEffect::None
        }
        LineEvent::Command(Command::Unknown(text)) => {
            let mut line: String<80> = String::new();
            let _ = write!(line, "SERIAL ERROR: unknown command '{text}'.");
            console.write_line(&line);
            CommandEffect::None
        }
        LineEvent::Overflow => {
            console.write_line("SERIAL ERROR: command line too long.");
            CommandEffect::None
        }
        LineEvent::Invalid => {
            console.write_line("SERIAL ERROR: command line is not valid text.");
            CommandEffect::None
        }
    }
}
