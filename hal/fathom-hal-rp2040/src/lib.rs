//! RP2040 HAL for the Fathom node controller
//!
//! Implements the `fathom-hal` traits over `embassy-rp`:
//!
//! - [`spi::RpSpi`] - blocking SPI master as [`fathom_hal::SpiBus`]
//! - [`gpio::ChipSelect`] - push-pull output as [`fathom_hal::OutputPin`]
//!
//! Delays come from `embassy_time::Delay`, which already implements
//! `embedded_hal::delay::DelayNs`.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod spi;

pub use gpio::ChipSelect;
pub use spi::RpSpi;
