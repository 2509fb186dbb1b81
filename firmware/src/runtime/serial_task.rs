use embassy_stm32::usart::RingBufferedUartRx;
use embedded_io_async::Read;

use super::RX_BYTES;

/// Forwards received bytes into the bounded command channel.
///
/// Producer side of the SPSC hand-off; the control task is the only
/// consumer. When the channel is full the send awaits, applying
/// backpressure to the DMA ring instead of corrupting a shared buffer.
#[embassy_executor::task]
pub async fn run(mut rx: RingBufferedUartRx<'static>) -> ! {
    let mut chunk = [0_u8; 16];
    loop {
        match rx.read(&mut chunk).await {
            Ok(received) => {
                for byte in &chunk[..received] {
                    RX_BYTES.send(*byte).await;
                }
            }
            // Overrun or framing noise: drop and keep listening.
            Err(_) => {}
        }
    }
}
