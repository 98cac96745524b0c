//! MAX14830 SPI-to-UART bridge logic
//!
//! Three quad-UART bridge devices share one SPI bus, each behind its own
//! chip-select line, giving the node twelve serial ports. This module holds
//! the hardware-independent parts:
//!
//! - Device and channel identity ([`BridgeId`], [`ChannelIndex`])
//! - The one-byte SPI command frame ([`CommandFrame`])
//! - The register map ([`registers`])
//! - Baud divisor lookup for the 4 MHz crystal ([`Divisor`])
//! - Line format, FIFO triggers and line status decoding
//! - The per-device bring-up plan ([`plan::device_plan`])

pub mod baud;
pub mod frame;
pub mod line;
pub mod plan;
pub mod registers;

pub use baud::{Divisor, UnsupportedBaudRate};
pub use frame::{
    BridgeId, ChannelIndex, CommandFrame, Direction, InvalidChannel, BRIDGE_COUNT,
    CHANNELS_PER_BRIDGE,
};
pub use line::{FifoTriggers, LineFormat, LineStatus, Parity, StopBits, WordLength};
pub use plan::{device_plan, Plan, PlanStep};
