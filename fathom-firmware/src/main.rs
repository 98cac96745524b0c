//! Fathom - ROV Node Controller Firmware
//!
//! Brings up the three MAX14830 SPI-UART bridges of the node and relays the
//! command terminal (UART0) to the bridge serial ports. Bus settings come
//! from node.toml, validated and compiled in by build.rs.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::Spi;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use fathom_core::bridge::BridgeId;
use fathom_drivers::bridge::Bridges;
use fathom_hal::spi::SpiConfig;
use fathom_hal_rp2040::spi::to_rp_config;
use fathom_hal_rp2040::{ChipSelect, RpSpi};

mod channels;
mod tasks;

/// Configuration generated from node.toml
mod node {
    include!(concat!(env!("OUT_DIR"), "/node_config.rs"));
}

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Fathom node firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = node::node_config();
    info!(
        "Node config: I2C target {=u8:#x} register {=u8:#x}",
        config.i2c.address, config.i2c.register
    );

    // Terminal UART (115200 baud default)
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("Terminal UART initialized");

    // Bridge bus: SPI0 on GPIO16-19, chip-selects on GPIO17/20/21
    let spi_config = SpiConfig {
        frequency: node::SPI_FREQUENCY,
        ..SpiConfig::default()
    };
    let spi = Spi::new_blocking(
        p.SPI0,
        p.PIN_18,
        p.PIN_19,
        p.PIN_16,
        to_rp_config(&spi_config),
    );
    let cs = [
        ChipSelect::new(Output::new(p.PIN_17, ChipSelect::idle_level())),
        ChipSelect::new(Output::new(p.PIN_20, ChipSelect::idle_level())),
        ChipSelect::new(Output::new(p.PIN_21, ChipSelect::idle_level())),
    ];

    let mut bridges = Bridges::new(RpSpi::new(spi), cs, Delay, &config);

    for (device, result) in BridgeId::ALL.iter().zip(bridges.init_all()) {
        match result {
            Ok(()) => info!("Bridge {} ready", device),
            Err(e) => error!("Bridge {} bring-up failed: {:?}", device, e),
        }
    }

    // Spawn tasks
    spawner.spawn(tasks::terminal_rx_task(rx)).unwrap();
    spawner.spawn(tasks::terminal_tx_task(tx)).unwrap();
    spawner.spawn(tasks::bridge_task(bridges)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
