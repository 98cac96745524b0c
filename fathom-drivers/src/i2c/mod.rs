//! I2C master engine
//!
//! One register read at a time, driven from the controller interrupt.

pub mod master;

pub use master::{I2cError, I2cMaster};
