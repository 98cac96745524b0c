//! Bridge relay task
//!
//! Owns the bridge set, so every SPI transfer happens here. Each tick it
//! writes pending terminal bytes to the relay port, then drains the receive
//! FIFO of every ready port towards the terminal.

use defmt::*;
use embassy_rp::peripherals::SPI0;
use embassy_time::{Delay, Duration, Ticker};

use fathom_core::bridge::{BridgeId, ChannelIndex};
use fathom_drivers::bridge::{BridgeError, Bridges};
use fathom_hal_rp2040::{ChipSelect, RpSpi};

use crate::channels::{Chunk, DOWNLINK, UPLINK};
use crate::node::{RELAY_BRIDGE, RELAY_CHANNEL, RELAY_POLL_MS};

/// The board's bridge set
pub type NodeBridges = Bridges<RpSpi<'static, SPI0>, ChipSelect<'static>, Delay>;

type Error = BridgeError<embassy_rp::spi::Error>;

/// How long to wait for TX FIFO space before giving up on a byte (µs)
const TX_TIMEOUT_US: u32 = 20_000;

/// Bridge task - relays between the terminal and the bridge ports
#[embassy_executor::task]
pub async fn bridge_task(mut bridges: NodeBridges) {
    info!("Bridge task started");

    if !bridges.is_ready(RELAY_BRIDGE) {
        warn!(
            "Relay port {}:{} is not available, terminal input will be dropped",
            RELAY_BRIDGE,
            RELAY_CHANNEL.get()
        );
    }

    let mut ticker = Ticker::every(Duration::from_millis(RELAY_POLL_MS));

    loop {
        ticker.next().await;

        while let Ok(chunk) = DOWNLINK.try_receive() {
            if let Err(e) = send_chunk(&mut bridges, &chunk) {
                warn!("Relay send failed: {:?}", e);
            }
        }

        for device in BridgeId::ALL {
            if !bridges.is_ready(device) {
                continue;
            }
            for channel in ChannelIndex::ALL {
                if let Err(e) = poll_port(&mut bridges, device, channel) {
                    warn!("Bridge {} channel {}: {:?}", device, channel.get(), e);
                }
            }
        }
    }
}

/// Write terminal bytes to the relay port, pacing on TX FIFO space
fn send_chunk(bridges: &mut NodeBridges, chunk: &[u8]) -> Result<(), Error> {
    let mut port = bridges.port(RELAY_BRIDGE, RELAY_CHANNEL)?;
    let mut delay = Delay;
    for &byte in chunk {
        port.send_char_blocking(&mut delay, byte, TX_TIMEOUT_US)?;
    }
    Ok(())
}

/// Report line errors and forward received bytes of one port
fn poll_port(
    bridges: &mut NodeBridges,
    device: BridgeId,
    channel: ChannelIndex,
) -> Result<(), Error> {
    let mut port = bridges.port(device, channel)?;

    let status = port.errors()?;
    if status.has_error() {
        warn!(
            "Bridge {} channel {}: line error {=u8:#x}",
            device,
            channel.get(),
            status.bits()
        );
    }

    let mut chunk = Chunk::new();
    while !chunk.is_full() {
        match port.receive_char()? {
            Some(byte) => {
                // Cannot fail, the loop stops when full
                let _ = chunk.push(byte);
            }
            None => break,
        }
    }

    if !chunk.is_empty() && UPLINK.try_send(chunk).is_err() {
        warn!("Uplink full, dropping bytes from {}:{}", device, channel.get());
    }
    Ok(())
}
