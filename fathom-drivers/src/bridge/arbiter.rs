//! Chip-select arbiter
//!
//! Owns the three active-low chip-select lines of the bridge devices and
//! guarantees that at most one of them is asserted at any instant.

use fathom_core::bridge::{BridgeId, BRIDGE_COUNT};
use fathom_hal::gpio::{ActiveLevel, OutputPin};

/// Chip-select discipline violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArbiterError {
    /// Another device (or the same one) is already selected
    Busy(BridgeId),
    /// The device was not the selected one
    NotSelected(BridgeId),
}

/// Exclusive owner of the bridge chip-select lines
pub struct Arbiter<P> {
    pins: [P; BRIDGE_COUNT],
    selected: Option<BridgeId>,
}

impl<P: OutputPin> Arbiter<P> {
    const LEVEL: ActiveLevel = ActiveLevel::Low;

    /// Take ownership of the chip-select pins, indexed by [`BridgeId::index`]
    ///
    /// Every line is released before this returns.
    pub fn new(mut pins: [P; BRIDGE_COUNT]) -> Self {
        for pin in pins.iter_mut() {
            Self::LEVEL.drive(pin, false);
        }
        Self {
            pins,
            selected: None,
        }
    }

    /// Assert the chip-select of `device`
    ///
    /// Fails without touching any pin if a device is already selected;
    /// selection is not reentrant.
    pub fn select(&mut self, device: BridgeId) -> Result<(), ArbiterError> {
        if let Some(current) = self.selected {
            #[cfg(feature = "defmt")]
            defmt::warn!("CS: select {} while {} selected", device, current);
            return Err(ArbiterError::Busy(current));
        }
        Self::LEVEL.drive(&mut self.pins[device.index()], true);
        self.selected = Some(device);
        Ok(())
    }

    /// Release the chip-select of `device`
    pub fn deselect(&mut self, device: BridgeId) -> Result<(), ArbiterError> {
        if self.selected != Some(device) {
            return Err(ArbiterError::NotSelected(device));
        }
        Self::LEVEL.drive(&mut self.pins[device.index()], false);
        self.selected = None;
        Ok(())
    }

    /// Device currently selected, if any
    pub fn selected(&self) -> Option<BridgeId> {
        self.selected
    }

    /// Check whether the line of `device` is asserted
    pub fn is_asserted(&self, device: BridgeId) -> bool {
        Self::LEVEL.is_asserted(&self.pins[device.index()])
    }
}
