//! Operator console abstraction.
//!
//! Wake reports and command replies are plain ASCII lines. On hardware the
//! console is a USART; the emulator collects lines for stdout. The core never
//! touches the transport directly.

/// Line-oriented text output towards the operator.
pub trait Console {
    /// Writes one line of output; the transport appends the line terminator.
    fn write_line(&mut self, line: &str);
}
