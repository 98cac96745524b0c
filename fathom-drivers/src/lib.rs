//! Bus drivers for the Fathom node controller
//!
//! This crate binds the pure logic of `fathom-core` to the traits of
//! `fathom-hal`:
//!
//! - MAX14830 bridges: chip-select arbiter, register access, bring-up and
//!   the twelve logical serial ports
//! - Interrupt-driven I2C master engine
//! - Timeout-bounded polling shared by all blocking calls

#![no_std]
#![deny(unsafe_code)]

pub mod bridge;
pub mod i2c;
pub mod wait;

#[cfg(test)]
mod mock;
