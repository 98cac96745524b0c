//! Board-agnostic core logic for the Fathom node controller
//!
//! This crate contains the parts of the peripheral bus layer that do not
//! touch hardware:
//!
//! - I2C master transaction state machine
//! - MAX14830 bridge command frames, register map and bring-up plan
//! - Baud divisor table and line status decoding
//! - Node configuration types

#![no_std]
#![deny(unsafe_code)]

pub mod bridge;
pub mod config;
pub mod i2c;
