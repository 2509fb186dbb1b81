use embassy_futures::select::{Either, select};
use embassy_time::Timer;
use node_core::command::CommandSession;

use super::{Controller, NodeBoard, RX_BYTES};

/// Drives the WAKE loop: every iteration feeds pending serial bytes into the
/// session and polls the controller. The sleep transition blocks inside
/// `poll` until the wakeup interrupt fires; no other task runs during
/// retention.
#[embassy_executor::task]
pub async fn run(mut controller: Controller, mut board: NodeBoard) -> ! {
    let mut session = CommandSession::new();

    loop {
        match select(RX_BYTES.receive(), Timer::after_millis(10)).await {
            Either::First(byte) => {
                if let Some(event) = session.ingest(byte) {
                    controller.poll(&mut board, Some(&event));
                }
            }
            Either::Second(()) => controller.poll(&mut board, None),
        }
    }
}
