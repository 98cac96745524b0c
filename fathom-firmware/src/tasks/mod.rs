//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod bridge;
pub mod terminal_rx;
pub mod terminal_tx;

pub use bridge::{bridge_task, NodeBridges};
pub use terminal_rx::terminal_rx_task;
pub use terminal_tx::terminal_tx_task;
