//! MAX14830 bridge set
//!
//! Three quad-UART bridges share one SPI bus. [`Bridges`] owns the bus, the
//! chip-select lines and the delay; every operation takes `&mut self`, so at
//! most one transfer is ever in progress.
//!
//! # Usage
//!
//! ```ignore
//! let mut bridges = Bridges::new(spi, [cs_a, cs_b, cs_c], delay, &config);
//! for (id, result) in BridgeId::ALL.iter().zip(bridges.init_all()) {
//!     if let Err(e) = result {
//!         // device `id` stays unusable
//!     }
//! }
//! bridges.port(BridgeId::A, ChannelIndex::CH0)?.send_str("hello\r\n")?;
//! ```

pub mod access;
pub mod arbiter;
pub mod configurator;
pub mod port;

pub use access::RegisterAccess;
pub use arbiter::{Arbiter, ArbiterError};
pub use port::SerialPort;

use embedded_hal::delay::DelayNs;
use fathom_core::bridge::{BridgeId, ChannelIndex, UnsupportedBaudRate, BRIDGE_COUNT};
use fathom_core::config::{BridgeConfig, BringUpTiming, NodeConfig};
use fathom_hal::gpio::OutputPin;
use fathom_hal::spi::SpiBus;

use crate::wait::Timeout;

/// Bridge operation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError<E> {
    /// SPI transfer failed
    Spi(E),
    /// Chip-select discipline violated
    Arbiter(ArbiterError),
    /// Baud rate has no divisor; nothing was written
    UnsupportedBaudRate(u32),
    /// Device has not been brought up
    NotInitialized(BridgeId),
    /// A blocking operation ran out of time
    Timeout,
}

impl<E> From<ArbiterError> for BridgeError<E> {
    fn from(e: ArbiterError) -> Self {
        BridgeError::Arbiter(e)
    }
}

impl<E> From<UnsupportedBaudRate> for BridgeError<E> {
    fn from(e: UnsupportedBaudRate) -> Self {
        BridgeError::UnsupportedBaudRate(e.0)
    }
}

impl<E> From<Timeout> for BridgeError<E> {
    fn from(_: Timeout) -> Self {
        BridgeError::Timeout
    }
}

/// The three bridge devices and their twelve serial ports
pub struct Bridges<S, P, D> {
    access: RegisterAccess<S, P, D>,
    configs: [BridgeConfig; BRIDGE_COUNT],
    timing: BringUpTiming,
    ready: [bool; BRIDGE_COUNT],
}

impl<S, P, D> Bridges<S, P, D>
where
    S: SpiBus,
    P: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the bus
    ///
    /// `cs` is indexed by [`BridgeId::index`]. All lines are released here;
    /// no device is usable until it has been brought up.
    pub fn new(spi: S, cs: [P; BRIDGE_COUNT], delay: D, config: &NodeConfig) -> Self {
        Self {
            access: RegisterAccess::new(spi, Arbiter::new(cs), delay, config.spi),
            configs: config.bridges,
            timing: config.bring_up,
            ready: [false; BRIDGE_COUNT],
        }
    }

    /// Run the full bring-up sequence on `device`
    ///
    /// The device is unusable while this runs and stays unusable if it fails.
    pub fn init_device(&mut self, device: BridgeId) -> Result<(), BridgeError<S::Error>> {
        self.ready[device.index()] = false;
        configurator::init_device(
            &mut self.access,
            device,
            &self.configs[device.index()],
            &self.timing,
        )?;
        self.ready[device.index()] = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("Bridge {}: ready", device);

        Ok(())
    }

    /// Bring up A, B and C in order
    ///
    /// A failing device does not stop the others.
    pub fn init_all(&mut self) -> [Result<(), BridgeError<S::Error>>; BRIDGE_COUNT] {
        BridgeId::ALL.map(|device| self.init_device(device))
    }

    /// Replace the settings of `device`
    ///
    /// Takes effect on the next [`Self::init_device`]; the device is marked
    /// not ready until then.
    pub fn reconfigure(&mut self, device: BridgeId, config: BridgeConfig) {
        self.configs[device.index()] = config;
        self.ready[device.index()] = false;
    }

    /// Check whether `device` has completed bring-up
    pub fn is_ready(&self, device: BridgeId) -> bool {
        self.ready[device.index()]
    }

    /// Serial port for `channel` of `device`
    pub fn port(
        &mut self,
        device: BridgeId,
        channel: ChannelIndex,
    ) -> Result<SerialPort<'_, S, P, D>, BridgeError<S::Error>> {
        if !self.is_ready(device) {
            return Err(BridgeError::NotInitialized(device));
        }
        Ok(SerialPort::new(&mut self.access, device, channel))
    }

    /// Raw register write, for diagnostics
    pub fn write_register(
        &mut self,
        device: BridgeId,
        channel: ChannelIndex,
        register: u8,
        value: u8,
    ) -> Result<(), BridgeError<S::Error>> {
        self.access.write_register(device, channel, register, value)
    }

    /// Raw register read, for diagnostics
    pub fn read_register(
        &mut self,
        device: BridgeId,
        channel: ChannelIndex,
        register: u8,
    ) -> Result<u8, BridgeError<S::Error>> {
        self.access.read_register(device, channel, register)
    }
}
