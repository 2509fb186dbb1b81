//! USART2 operator console.

use embassy_stm32::mode::Async;
use embassy_stm32::usart::UartTx;
use node_core::console::Console;

/// Transmit half of the operator USART.
pub struct SerialConsole {
    tx: UartTx<'static, Async>,
}

impl SerialConsole {
    /// Wraps the transmit half.
    pub fn new(tx: UartTx<'static, Async>) -> Self {
        Self { tx }
    }
}

impl Console for SerialConsole {
    fn write_line(&mut self, line: &str) {
        // Console output stays blocking; report lines are short and the
        // control loop has no deadline tighter than the blink period.
        let _ = self.tx.blocking_write(line.as_bytes());
        let _ = self.tx.blocking_write(b"\r\n");
        let _ = self.tx.blocking_flush();
    }
}
