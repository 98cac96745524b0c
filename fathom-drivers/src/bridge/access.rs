//! Register access over the shared SPI bus
//!
//! A register transfer is two bytes inside one chip-select window: the
//! command frame, then the data (write) or a dummy byte that clocks the
//! reply out (read).

use embedded_hal::delay::DelayNs;
use fathom_core::bridge::{BridgeId, ChannelIndex, CommandFrame};
use fathom_core::config::SpiTiming;
use fathom_hal::gpio::OutputPin;
use fathom_hal::spi::SpiBus;

use super::arbiter::Arbiter;
use super::BridgeError;

/// SPI bus, chip-select lines and delay of the bridge devices
pub struct RegisterAccess<S, P, D> {
    spi: S,
    arbiter: Arbiter<P>,
    delay: D,
    timing: SpiTiming,
}

impl<S, P, D> RegisterAccess<S, P, D>
where
    S: SpiBus,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: S, arbiter: Arbiter<P>, delay: D, timing: SpiTiming) -> Self {
        Self {
            spi,
            arbiter,
            delay,
            timing,
        }
    }

    /// Write `value` to `register` of `channel` on `device`
    pub fn write_register(
        &mut self,
        device: BridgeId,
        channel: ChannelIndex,
        register: u8,
        value: u8,
    ) -> Result<(), BridgeError<S::Error>> {
        let frame = CommandFrame::write(channel, register);
        let setup = self.timing.write_setup_us;

        self.transaction(device, setup, |spi| {
            spi.write_byte(frame.encode())?;
            spi.write_byte(value)
        })
    }

    /// Read `register` of `channel` on `device`
    pub fn read_register(
        &mut self,
        device: BridgeId,
        channel: ChannelIndex,
        register: u8,
    ) -> Result<u8, BridgeError<S::Error>> {
        let frame = CommandFrame::read(channel, register);
        let setup = self.timing.read_setup_us;

        self.transaction(device, setup, |spi| {
            spi.write_byte(frame.encode())?;
            spi.read_byte()
        })
    }

    /// Run `transfer` inside a chip-select window of `device`
    ///
    /// The device is deselected even when the transfer fails.
    fn transaction<T>(
        &mut self,
        device: BridgeId,
        setup_us: u32,
        transfer: impl FnOnce(&mut S) -> Result<T, S::Error>,
    ) -> Result<T, BridgeError<S::Error>> {
        self.arbiter.select(device)?;
        self.delay.delay_us(setup_us);

        let result = transfer(&mut self.spi);

        self.delay.delay_us(self.timing.hold_us);
        self.arbiter.deselect(device)?;

        result.map_err(BridgeError::Spi)
    }

    /// Blocking wait in milliseconds
    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Device currently selected, if any
    pub fn selected(&self) -> Option<BridgeId> {
        self.arbiter.selected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{cs_pins, BusOp, MockDelay, MockSpi, Sim};
    use core::cell::RefCell;
    use fathom_core::bridge::registers::reg;

    fn access<'a>(
        sim: &'a RefCell<Sim>,
        delay: &'a mut MockDelay,
    ) -> RegisterAccess<MockSpi<'a>, crate::mock::MockCs<'a>, &'a mut MockDelay> {
        RegisterAccess::new(
            MockSpi::new(sim),
            Arbiter::new(cs_pins(sim)),
            delay,
            SpiTiming::default(),
        )
    }

    #[test]
    fn test_write_then_read_divisor() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        let mut bus = access(&sim, &mut delay);

        bus.write_register(BridgeId::A, ChannelIndex::CH1, reg::DIVLSB, 156)
            .unwrap();
        let value = bus
            .read_register(BridgeId::A, ChannelIndex::CH1, reg::DIVLSB)
            .unwrap();
        assert_eq!(value, 156);
        // Other devices untouched
        assert_eq!(sim.borrow().register(BridgeId::B, ChannelIndex::CH1, reg::DIVLSB), 0);
    }

    #[test]
    fn test_wire_bytes() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        let mut bus = access(&sim, &mut delay);

        bus.write_register(BridgeId::C, ChannelIndex::CH2, reg::LCR, 0x03)
            .unwrap();

        let sim = sim.borrow();
        assert_eq!(sim.raw_bytes(), &[0x80 | (2 << 5) | 0x0B, 0x03]);
        assert_eq!(
            sim.ops(),
            &[
                BusOp::Select(BridgeId::C),
                BusOp::Write {
                    device: BridgeId::C,
                    channel: ChannelIndex::CH2,
                    register: reg::LCR,
                    value: 0x03,
                },
                BusOp::Deselect(BridgeId::C),
            ]
        );
    }

    #[test]
    fn test_setup_and_hold_delays() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        {
            let mut bus = access(&sim, &mut delay);
            bus.write_register(BridgeId::A, ChannelIndex::CH0, reg::MODE1, 0)
                .unwrap();
            bus.read_register(BridgeId::A, ChannelIndex::CH0, reg::MODE1)
                .unwrap();
        }
        // write: 1 + 1, read: 2 + 1
        assert_eq!(delay.us_calls(), &[1, 1, 2, 1]);
    }

    #[test]
    fn test_spi_error_still_deselects() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        let mut bus = access(&sim, &mut delay);

        sim.borrow_mut().fail_spi(true);
        let result = bus.write_register(BridgeId::B, ChannelIndex::CH0, reg::THR, b'x');
        assert!(matches!(result, Err(BridgeError::Spi(_))));
        assert_eq!(bus.selected(), None);
        assert_eq!(sim.borrow().selected_count(), 0);

        // Bus usable again afterwards
        sim.borrow_mut().fail_spi(false);
        bus.write_register(BridgeId::B, ChannelIndex::CH0, reg::MODE1, 0)
            .unwrap();
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn bridge() -> impl Strategy<Value = BridgeId> {
            prop_oneof![Just(BridgeId::A), Just(BridgeId::B), Just(BridgeId::C)]
        }

        // Plain storage registers: no FIFO or clear-on-read side effects
        static STORAGE: [u8; 13] = [
            reg::IRQEN,
            reg::LSRINTEN,
            reg::MODE1,
            reg::MODE2,
            reg::LCR,
            reg::RXTIMEOUT,
            reg::FIFOTRGLVL,
            reg::FLOWCTRL,
            reg::PLLCONFIG,
            reg::BRGCONFIG,
            reg::DIVLSB,
            reg::DIVMSB,
            reg::CLKSOURCE,
        ];

        fn storage_register() -> impl Strategy<Value = u8> {
            prop::sample::select(&STORAGE[..])
        }

        proptest! {
            #[test]
            fn write_then_read_returns_value(
                device in bridge(),
                ch in 0u8..4,
                register in storage_register(),
                value in any::<u8>(),
            ) {
                let sim = RefCell::new(Sim::new());
                let mut delay = MockDelay::new();
                let mut bus = access(&sim, &mut delay);
                let channel = ChannelIndex::new(ch).unwrap();

                bus.write_register(device, channel, register, value).unwrap();
                prop_assert_eq!(bus.read_register(device, channel, register).unwrap(), value);
                prop_assert!(sim.borrow().max_selected() <= 1);
            }
        }
    }
}
