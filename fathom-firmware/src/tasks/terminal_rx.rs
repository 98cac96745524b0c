//! Terminal UART receive task

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use crate::channels::{Chunk, CHUNK_LEN, DOWNLINK};

/// Forward terminal input to the bridge task
#[embassy_executor::task]
pub async fn terminal_rx_task(mut rx: BufferedUartRx) {
    info!("Terminal RX task started");

    let mut buf = [0u8; CHUNK_LEN];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);
                match Chunk::from_slice(&buf[..n]) {
                    // Waits while the bridge task catches up
                    Ok(chunk) => DOWNLINK.send(chunk).await,
                    Err(()) => warn!("Terminal chunk too large, dropping {} bytes", n),
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
