//! Blocking SPI master

use embassy_rp::spi::{self, Blocking, Instance, Spi};
use fathom_hal::spi::{Phase, Polarity, SpiBus, SpiConfig};

/// Translate a bus configuration into the embassy-rp one
pub fn to_rp_config(config: &SpiConfig) -> spi::Config {
    let (polarity, phase) = config.mode.into();

    let mut rp = spi::Config::default();
    rp.frequency = config.frequency;
    rp.polarity = match polarity {
        Polarity::IdleLow => spi::Polarity::IdleLow,
        Polarity::IdleHigh => spi::Polarity::IdleHigh,
    };
    rp.phase = match phase {
        Phase::CaptureOnFirstTransition => spi::Phase::CaptureOnFirstTransition,
        Phase::CaptureOnSecondTransition => spi::Phase::CaptureOnSecondTransition,
    };
    rp
}

/// RP2040 SPI peripheral in blocking mode
pub struct RpSpi<'d, T: Instance> {
    spi: Spi<'d, T, Blocking>,
}

impl<'d, T: Instance> RpSpi<'d, T> {
    pub fn new(spi: Spi<'d, T, Blocking>) -> Self {
        Self { spi }
    }
}

impl<T: Instance> SpiBus for RpSpi<'_, T> {
    type Error = spi::Error;

    fn transfer_byte(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut buf = [byte];
        self.spi.blocking_transfer_in_place(&mut buf)?;
        Ok(buf[0])
    }

    fn transfer_in_place(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.spi.blocking_transfer_in_place(buf)
    }
}
