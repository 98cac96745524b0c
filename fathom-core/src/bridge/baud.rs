//! Baud rate divisor lookup
//!
//! The bridges run from a 4 MHz crystal multiplied by the PLL. Only the
//! standard rates below are supported; the fractional part of the baud rate
//! generator is always zero.

use super::registers::CRYSTAL_HZ;

/// Requested baud rate has no divisor entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnsupportedBaudRate(pub u32);

/// Supported rates and their integer divisors
const DIVISORS: [(u32, u16); 8] = [
    (1_200, 208),
    (2_400, 104),
    (4_800, 52),
    (9_600, 26),
    (19_200, 13),
    (38_400, 6),
    (57_600, 4),
    (115_200, 2),
];

/// 16-bit baud rate generator divisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Divisor(u16);

impl Divisor {
    /// Look up the divisor for `baud`
    pub fn for_baud(baud: u32) -> Result<Self, UnsupportedBaudRate> {
        DIVISORS
            .iter()
            .find(|(rate, _)| *rate == baud)
            .map(|&(_, div)| Self(div))
            .ok_or(UnsupportedBaudRate(baud))
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// Value for DIVLSB
    pub const fn low(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Value for DIVMSB
    pub const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }
}

/// Check whether `baud` has a divisor entry
pub fn is_supported(baud: u32) -> bool {
    Divisor::for_baud(baud).is_ok()
}

/// Narrow a rate read from a configuration file
///
/// Values that do not fit `u32` are rejected, not wrapped.
pub fn from_setting(raw: i64) -> Option<u32> {
    u32::try_from(raw).ok().filter(|&rate| is_supported(rate))
}

/// Every supported baud rate, ascending
pub fn supported_rates() -> impl Iterator<Item = u32> {
    DIVISORS.iter().map(|&(rate, _)| rate)
}

/// Crystal the table was computed for
pub const fn crystal_hz() -> u32 {
    CRYSTAL_HZ
}
