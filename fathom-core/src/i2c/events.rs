//! Bus events and controller commands

/// Asynchronous events raised by the I2C master peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// Slave acknowledged the last byte
    Ack,
    /// Slave did not acknowledge the last byte
    Nack,
    /// Transmit buffer drained
    TxBufferEmpty,
    /// A byte was received
    RxDataValid(u8),
    /// The stop condition has been sent
    StopDetected,
}

impl BusEvent {
    /// Check if this event signals a failed transfer
    pub fn is_failure(&self) -> bool {
        matches!(self, BusEvent::Nack)
    }
}

/// Commands the state machine asks the peripheral to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cCommand {
    /// Abort whatever the peripheral was doing
    Abort,
    /// Clear every pending interrupt flag
    ClearAll,
    /// Issue a start (or repeated start) condition
    Start,
    /// Load a byte into the transmit buffer
    WriteData(u8),
    /// Not-acknowledge the received byte and stop
    NackStop,
    /// Issue a stop condition
    Stop,
}

/// Highest 7-bit slave address
pub const MAX_ADDRESS: u8 = 0x7F;

/// Address byte for a write to a 7-bit `address`
#[inline]
pub const fn write_address(address: u8) -> u8 {
    (address & 0x7F) << 1
}

/// Address byte for a read from a 7-bit `address`
#[inline]
pub const fn read_address(address: u8) -> u8 {
    ((address & 0x7F) << 1) | 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_bytes() {
        // Compass at 0x19
        assert_eq!(write_address(0x19), 0x32);
        assert_eq!(read_address(0x19), 0x33);
        // 8th bit is dropped, never leaks into the R/W bit
        assert_eq!(write_address(0x80 | 0x19), 0x32);
    }

    #[test]
    fn test_failure_events() {
        assert!(BusEvent::Nack.is_failure());
        assert!(!BusEvent::Ack.is_failure());
        assert!(!BusEvent::RxDataValid(0).is_failure());
    }
}
