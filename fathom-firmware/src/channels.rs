//! Inter-task communication channels
//!
//! The terminal UART and the bridge set live in different tasks; bytes move
//! between them in small chunks over these channels.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Largest chunk moved in one message
pub const CHUNK_LEN: usize = 32;

/// Bytes in transit between the terminal and a bridge port
pub type Chunk = heapless::Vec<u8, CHUNK_LEN>;

/// Channel capacity for terminal input
const DOWNLINK_SIZE: usize = 4;

/// Channel capacity for bridge output
const UPLINK_SIZE: usize = 8;

/// Terminal bytes waiting to be written to the relay port
pub static DOWNLINK: Channel<CriticalSectionRawMutex, Chunk, DOWNLINK_SIZE> = Channel::new();

/// Bytes received on the bridge ports, waiting for the terminal
pub static UPLINK: Channel<CriticalSectionRawMutex, Chunk, UPLINK_SIZE> = Channel::new();
