//! Line format, FIFO triggers and line status decoding

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use bitflags::bitflags;

use super::registers::{lcr, lsr};

/// Data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WordLength {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

impl WordLength {
    const fn bits(self) -> u8 {
        match self {
            WordLength::Five => 0b00,
            WordLength::Six => 0b01,
            WordLength::Seven => 0b10,
            WordLength::Eight => 0b11,
        }
    }
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

/// Stop bits per character
///
/// `Two` means 1.5 stop bits with five data bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopBits {
    #[default]
    One,
    Two,
}

/// Character framing of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineFormat {
    pub word_length: WordLength,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl LineFormat {
    /// 8 data bits, no parity, 1 stop bit
    pub const EIGHT_N_ONE: Self = Self {
        word_length: WordLength::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
    };

    /// Value for the LCR register
    pub const fn lcr(&self) -> u8 {
        let mut value = self.word_length.bits();
        if let StopBits::Two = self.stop_bits {
            value |= lcr::STOP_BITS;
        }
        match self.parity {
            Parity::None => {}
            Parity::Odd => value |= lcr::PARITY_EN,
            Parity::Even => value |= lcr::PARITY_EN | lcr::EVEN_PARITY,
        }
        value
    }
}

/// FIFO interrupt trigger levels
///
/// Each level is a 4-bit field in units of eight characters. Interrupts stay
/// disabled on this node, but the levels are still programmed so a channel
/// reports data as soon as a single character arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FifoTriggers {
    pub rx: u8,
    pub tx: u8,
}

impl FifoTriggers {
    /// Largest value a trigger field holds
    pub const MAX_LEVEL: u8 = 0x0F;

    /// Check that both levels fit their 4-bit fields
    pub const fn is_valid(&self) -> bool {
        self.rx <= Self::MAX_LEVEL && self.tx <= Self::MAX_LEVEL
    }

    /// Value for the FIFOTRGLVL register
    pub const fn register(&self) -> u8 {
        ((self.rx & Self::MAX_LEVEL) << 4) | (self.tx & Self::MAX_LEVEL)
    }
}

impl Default for FifoTriggers {
    fn default() -> Self {
        Self { rx: 1, tx: 1 }
    }
}

bitflags! {
    /// Decoded error bits of the line status register
    ///
    /// Only the error bits are kept. Reading LSR on the device clears them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LineStatus: u8 {
        const OVERRUN = lsr::RX_OVERRUN;
        const PARITY = lsr::RX_PARITY_ERR;
        const FRAMING = lsr::FRAME_ERR;
        const BREAK = lsr::RX_BREAK;
    }
}

impl LineStatus {
    /// Decode a raw LSR value
    pub const fn from_lsr(raw: u8) -> Self {
        Self::from_bits_truncate(raw)
    }

    /// Check if any error bit is set
    pub const fn has_error(self) -> bool {
        !self.is_empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LineStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "LineStatus({=u8:#x})", self.bits());
    }
}
