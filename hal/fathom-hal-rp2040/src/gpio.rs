//! GPIO outputs

use embassy_rp::gpio::{Level, Output};
use fathom_hal::gpio::OutputPin;

/// Chip-select line driven from a push-pull output
///
/// Created high so the device starts deselected.
pub struct ChipSelect<'d> {
    pin: Output<'d>,
}

impl<'d> ChipSelect<'d> {
    /// Wrap an output that was created high
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }

    /// Level an output should be created at to leave the device deselected
    pub const fn idle_level() -> Level {
        Level::High
    }
}

impl OutputPin for ChipSelect<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
