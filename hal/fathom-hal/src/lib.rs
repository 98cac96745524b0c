//! Fathom Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the peripheral bus
//! layer is written against. Chip-specific HALs implement them, and the
//! drivers in `fathom-drivers` only ever see these traits, so the whole bus
//! layer can be exercised on the host against test doubles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  fathom-firmware                        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  fathom-drivers (bridges, I2C engine)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  fathom-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  fathom-hal-rp2040                      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital outputs (chip-select lines)
//! - [`spi::SpiBus`] - Synchronous single-byte SPI exchange
//! - [`i2c::I2cController`] - Event-level I2C master peripheral
//!
//! Blocking delays are not redefined here: drivers take any
//! `embedded_hal::delay::DelayNs`.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use i2c::{I2cController, I2cFlags};
pub use spi::SpiBus;
