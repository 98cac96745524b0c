//! Terminal UART transmit task

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::UPLINK;

/// Write bytes received on the bridge ports to the terminal
#[embassy_executor::task]
pub async fn terminal_tx_task(mut tx: BufferedUartTx) {
    info!("Terminal TX task started");

    loop {
        let chunk = UPLINK.receive().await;
        if let Err(e) = tx.write_all(&chunk).await {
            warn!("UART write error: {:?}", e);
        }
    }
}
