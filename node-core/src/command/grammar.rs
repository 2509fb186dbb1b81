//! Parser for the serial command protocol.
//!
//! Two commands exist: `sleep` and `stime:<uint>`. The grammar is small
//! enough for a pair of `winnow` combinators over the raw line; anything the
//! parser does not consume in full becomes [`Command::Unknown`], carrying a
//! bounded copy of the input for the echoing error reply.

use heapless::String;
use winnow::ascii::dec_uint;
use winnow::combinator::{alt, preceded};
use winnow::error::ContextError;
use winnow::prelude::*;

use super::MAX_LINE_LEN;

/// Parsed command variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Enter the sleep phase immediately.
    Sleep,
    /// Set both cycle intervals to the given number of seconds.
    ///
    /// Range checking happens at dispatch; the parser only requires a
    /// well-formed unsigned decimal.
    SetInterval(u32),
    /// Anything else, echoed back to the operator.
    Unknown(String<MAX_LINE_LEN>),
}

fn command<'a>() -> impl Parser<&'a str, Command, ContextError> {
    alt((
        "sleep".value(Command::Sleep),
        preceded("stime:", dec_uint).map(Command::SetInterval),
    ))
}

/// Parses one complete line into a [`Command`].
///
/// Total: malformed input (including `stime:` payloads that are not a valid
/// `u32`) yields `Unknown` rather than an error, matching the protocol's
/// echo-bearing rejection.
pub fn parse(line: &str) -> Command {
    match command().parse(line) {
        Ok(parsed) => parsed,
        Err(_) => {
            let mut echo = String::new();
            // The session bounds lines to MAX_LINE_LEN, so this never truncates.
            let _ = echo.push_str(line);
            Command::Unknown(echo)
        }
    }
}
