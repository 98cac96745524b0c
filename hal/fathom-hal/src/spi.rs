//! SPI bus abstractions
//!
//! The bridge devices are driven one byte at a time with manual chip-select,
//! so the only primitive a chip HAL has to provide is a synchronous
//! full-duplex single-byte exchange.

/// SPI bus master
///
/// Chip-select is not part of this trait; it is driven separately through
/// [`crate::gpio::OutputPin`].
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Exchange one byte (simultaneous write/read)
    ///
    /// Blocks until the byte has been shifted out and the reply shifted in.
    fn transfer_byte(&mut self, byte: u8) -> Result<u8, Self::Error>;

    /// Send a byte, ignoring the response
    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.transfer_byte(byte)?;
        Ok(())
    }

    /// Read a byte, sending 0x00
    #[inline]
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        self.transfer_byte(0x00)
    }

    /// Transfer a byte buffer in place
    fn transfer_in_place(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        for b in buf.iter_mut() {
            *b = self.transfer_byte(*b)?;
        }
        Ok(())
    }
}

/// SPI configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity and phase
    pub mode: Mode,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz
            mode: Mode::Mode0,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}
