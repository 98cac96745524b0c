//! GPIO pin abstractions
//!
//! The bus layer only drives outputs: the three bridge chip-select lines.
//! Power-rail and reset sequencing live outside this workspace.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip. Setting a pin cannot fail on any supported part.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Logic level at which a line is considered asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Asserted when driven low (chip selects, resets)
    Low,
    /// Asserted when driven high
    High,
}

impl ActiveLevel {
    /// Pin state that asserts the line
    pub const fn asserted_high(self) -> bool {
        matches!(self, ActiveLevel::High)
    }

    /// Drive `pin` to the asserted or released state
    pub fn drive<P: OutputPin + ?Sized>(self, pin: &mut P, asserted: bool) {
        pin.set_state(asserted == self.asserted_high());
    }

    /// Check whether `pin` is currently asserted
    pub fn is_asserted<P: OutputPin + ?Sized>(self, pin: &P) -> bool {
        pin.is_set_high() == self.asserted_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pin(bool);

    impl OutputPin for Pin {
        fn set_high(&mut self) {
            self.0 = true;
        }

        fn set_low(&mut self) {
            self.0 = false;
        }

        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_active_low_drive() {
        let mut pin = Pin(true);

        ActiveLevel::Low.drive(&mut pin, true);
        assert!(pin.is_set_low());
        assert!(ActiveLevel::Low.is_asserted(&pin));

        ActiveLevel::Low.drive(&mut pin, false);
        assert!(pin.is_set_high());
        assert!(!ActiveLevel::Low.is_asserted(&pin));
    }

    #[test]
    fn test_active_high_drive() {
        let mut pin = Pin(false);

        ActiveLevel::High.drive(&mut pin, true);
        assert!(pin.is_set_high());
        assert!(ActiveLevel::High.is_asserted(&pin));
    }
}
