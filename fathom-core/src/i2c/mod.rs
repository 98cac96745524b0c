//! I2C register-read transaction
//!
//! The engine performs exactly one transaction shape: write a register
//! address, repeated start, read a single byte, terminate with nack+stop.
//! Everything here is pure: bus events go in, controller commands come out.
//! Binding to a peripheral and interrupt context lives in `fathom-drivers`.

pub mod events;
pub mod machine;

pub use events::{BusEvent, I2cCommand, MAX_ADDRESS};
pub use machine::{Commands, I2cOutcome, I2cState, Transaction};
