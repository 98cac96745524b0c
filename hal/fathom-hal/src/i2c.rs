//! I2C controller abstractions
//!
//! Unlike a transaction-level I2C trait, this is the event-level view of an
//! I2C master peripheral: the interrupt handler reads pending flags, issues
//! bus commands and moves single bytes. Transaction sequencing lives in the
//! state machine in `fathom-core`.

use bitflags::bitflags;

bitflags! {
    /// Pending interrupt flags of an I2C master peripheral
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct I2cFlags: u8 {
        /// Slave acknowledged the last byte
        const ACK = 1 << 0;
        /// Slave did not acknowledge the last byte
        const NACK = 1 << 1;
        /// Transmit buffer empty, ready for the next byte
        const TX_BUFFER_EMPTY = 1 << 2;
        /// Receive data valid
        const RX_DATA_VALID = 1 << 3;
        /// Master stop condition completed
        const STOP_DETECTED = 1 << 4;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for I2cFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "I2cFlags({=u8:#x})", self.bits());
    }
}

/// Event-level I2C master peripheral
///
/// All methods are called from interrupt context (or with the engine lock
/// held) and must not block. Addresses passed to [`I2cController::write_data`]
/// are already shifted and carry the R/W bit.
pub trait I2cController {
    /// Read the pending interrupt flags
    fn pending(&self) -> I2cFlags;

    /// Clear the given interrupt flags
    fn clear(&mut self, flags: I2cFlags);

    /// Abort any ongoing transfer and reset the bus state machine
    fn abort(&mut self);

    /// Issue a (repeated) start condition
    fn start(&mut self);

    /// Issue a stop condition
    fn stop(&mut self);

    /// Not-acknowledge the received byte and issue a stop condition
    fn nack_stop(&mut self);

    /// Load a byte into the transmit buffer
    fn write_data(&mut self, byte: u8);

    /// Take the byte from the receive buffer
    fn read_data(&mut self) -> u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_contains() {
        let flags = I2cFlags::ACK | I2cFlags::TX_BUFFER_EMPTY;
        assert!(flags.contains(I2cFlags::ACK));
        assert!(flags.contains(I2cFlags::TX_BUFFER_EMPTY));
        assert!(!flags.contains(I2cFlags::NACK));
        assert!(!flags.intersects(I2cFlags::NACK | I2cFlags::STOP_DETECTED));
    }

    #[test]
    fn test_from_bits_truncate() {
        let flags = I2cFlags::from_bits_truncate(0xFF);
        assert_eq!(flags, I2cFlags::all());
        assert_eq!(flags.bits(), 0x1F);
        assert!(I2cFlags::from_bits_truncate(0).is_empty());
    }

    #[test]
    fn test_remove_clears_only_given_flags() {
        let mut flags = I2cFlags::all();
        flags.remove(I2cFlags::ACK | I2cFlags::RX_DATA_VALID);
        assert_eq!(flags, I2cFlags::NACK | I2cFlags::TX_BUFFER_EMPTY | I2cFlags::STOP_DETECTED);
    }
}
