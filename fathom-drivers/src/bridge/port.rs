//! Logical serial ports
//!
//! One of the twelve bridge channels, seen as a polled UART. Handles are
//! short-lived borrows of the bridge set, obtained through
//! [`super::Bridges::port`] once the owning device has been brought up.

use embedded_hal::delay::DelayNs;
use fathom_core::bridge::registers::{reg, FIFO_DEPTH};
use fathom_core::bridge::{BridgeId, ChannelIndex, LineStatus};
use fathom_hal::gpio::OutputPin;
use fathom_hal::spi::SpiBus;

use super::access::RegisterAccess;
use super::BridgeError;
use crate::wait::try_wait_until;

/// Handle to one bridge channel
pub struct SerialPort<'a, S, P, D> {
    access: &'a mut RegisterAccess<S, P, D>,
    device: BridgeId,
    channel: ChannelIndex,
}

impl<'a, S, P, D> SerialPort<'a, S, P, D>
where
    S: SpiBus,
    P: OutputPin,
    D: DelayNs,
{
    pub(super) fn new(
        access: &'a mut RegisterAccess<S, P, D>,
        device: BridgeId,
        channel: ChannelIndex,
    ) -> Self {
        Self {
            access,
            device,
            channel,
        }
    }

    pub fn device(&self) -> BridgeId {
        self.device
    }

    pub fn channel(&self) -> ChannelIndex {
        self.channel
    }

    fn read(&mut self, register: u8) -> Result<u8, BridgeError<S::Error>> {
        self.access.read_register(self.device, self.channel, register)
    }

    /// Write one byte to the transmit FIFO
    ///
    /// FIFO occupancy is not checked; a byte written to a full FIFO is lost.
    /// Use [`Self::send_char_blocking`] when that matters.
    pub fn send_char(&mut self, byte: u8) -> Result<(), BridgeError<S::Error>> {
        self.access
            .write_register(self.device, self.channel, reg::THR, byte)
    }

    /// Write every byte of `bytes`, without pacing
    pub fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), BridgeError<S::Error>> {
        for &b in bytes {
            self.send_char(b)?;
        }
        Ok(())
    }

    /// Write a string, without pacing
    pub fn send_str(&mut self, s: &str) -> Result<(), BridgeError<S::Error>> {
        self.send_bytes(s.as_bytes())
    }

    /// Bytes waiting in the receive FIFO
    pub fn rx_fifo_level(&mut self) -> Result<u8, BridgeError<S::Error>> {
        self.read(reg::RXFIFOLVL)
    }

    /// Bytes waiting in the transmit FIFO
    pub fn tx_fifo_level(&mut self) -> Result<u8, BridgeError<S::Error>> {
        self.read(reg::TXFIFOLVL)
    }

    /// Check whether at least one byte can be received
    pub fn data_available(&mut self) -> Result<bool, BridgeError<S::Error>> {
        Ok(self.rx_fifo_level()? > 0)
    }

    /// Take the next received byte, or `None` if the FIFO is empty
    pub fn receive_char(&mut self) -> Result<Option<u8>, BridgeError<S::Error>> {
        if self.data_available()? {
            self.read(reg::RHR).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Receive errors since the last check
    ///
    /// Reading LSR clears the error bits on the device.
    pub fn errors(&mut self) -> Result<LineStatus, BridgeError<S::Error>> {
        self.read(reg::LSR).map(LineStatus::from_lsr)
    }

    /// Clear latched line errors and pending interrupt status
    pub fn clear_errors(&mut self) -> Result<(), BridgeError<S::Error>> {
        self.read(reg::LSR)?;
        self.read(reg::ISR)?;
        Ok(())
    }

    /// Wait for space in the transmit FIFO, then write `byte`
    pub fn send_char_blocking<W: DelayNs>(
        &mut self,
        delay: &mut W,
        byte: u8,
        timeout_us: u32,
    ) -> Result<(), BridgeError<S::Error>> {
        try_wait_until(delay, timeout_us, || {
            let level = self.tx_fifo_level()?;
            Ok::<_, BridgeError<S::Error>>(if level < FIFO_DEPTH { Some(()) } else { None })
        })?;
        self.send_char(byte)
    }

    /// Wait for a byte to arrive
    pub fn receive_char_blocking<W: DelayNs>(
        &mut self,
        delay: &mut W,
        timeout_us: u32,
    ) -> Result<u8, BridgeError<S::Error>> {
        try_wait_until(delay, timeout_us, || self.receive_char())
    }
}

#[cfg(test)]
mod tests {
    use crate::bridge::{BridgeError, Bridges};
    use crate::mock::{cs_pins, BusOp, MockDelay, MockSpi, Sim};
    use core::cell::RefCell;
    use fathom_core::bridge::registers::reg;
    use fathom_core::bridge::{BridgeId, ChannelIndex, LineStatus};
    use fathom_core::config::NodeConfig;

    fn ready_bridges<'a>(
        sim: &'a RefCell<Sim>,
        delay: &'a mut MockDelay,
    ) -> Bridges<MockSpi<'a>, crate::mock::MockCs<'a>, &'a mut MockDelay> {
        let mut bridges = Bridges::new(MockSpi::new(sim), cs_pins(sim), delay, &NodeConfig::default());
        for result in bridges.init_all() {
            result.unwrap();
        }
        sim.borrow_mut().clear_log();
        bridges
    }

    #[test]
    fn test_send_str_writes_thr() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        let mut bridges = ready_bridges(&sim, &mut delay);

        let mut port = bridges.port(BridgeId::C, ChannelIndex::CH2).unwrap();
        port.send_str("$PING\r\n").unwrap();

        assert_eq!(sim.borrow().sent(BridgeId::C, ChannelIndex::CH2), b"$PING\r\n");
        assert!(sim.borrow().sent(BridgeId::C, ChannelIndex::CH1).is_empty());
    }

    #[test]
    fn test_send_char_does_not_poll_fifo() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        let mut bridges = ready_bridges(&sim, &mut delay);
        sim.borrow_mut().set_tx_level(BridgeId::A, ChannelIndex::CH0, 128);

        bridges
            .port(BridgeId::A, ChannelIndex::CH0)
            .unwrap()
            .send_char(b'x')
            .unwrap();

        let sim = sim.borrow();
        assert!(!sim.ops().iter().any(|op| matches!(op, BusOp::Read { .. })));
        assert_eq!(sim.sent(BridgeId::A, ChannelIndex::CH0), b"x");
    }

    #[test]
    fn test_receive_char() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        let mut bridges = ready_bridges(&sim, &mut delay);
        sim.borrow_mut()
            .push_rx(BridgeId::B, ChannelIndex::CH3, &[0x00, b'A']);

        let mut port = bridges.port(BridgeId::B, ChannelIndex::CH3).unwrap();
        assert!(port.data_available().unwrap());
        assert_eq!(port.rx_fifo_level().unwrap(), 2);
        // A received zero byte is distinguishable from "nothing there"
        assert_eq!(port.receive_char().unwrap(), Some(0x00));
        assert_eq!(port.receive_char().unwrap(), Some(b'A'));
        assert_eq!(port.receive_char().unwrap(), None);
        assert!(!port.data_available().unwrap());
    }

    #[test]
    fn test_errors_masked_and_cleared_on_read() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        let mut bridges = ready_bridges(&sim, &mut delay);
        // Framing error, overrun, CTS
        sim.borrow_mut()
            .set_lsr(BridgeId::A, ChannelIndex::CH1, 0x08 | 0x02 | 0x80);

        let mut port = bridges.port(BridgeId::A, ChannelIndex::CH1).unwrap();
        let status = port.errors().unwrap();
        assert!(status.contains(LineStatus::FRAMING));
        assert!(status.contains(LineStatus::OVERRUN));
        assert_eq!(status.bits(), 0x0A);

        assert!(!port.errors().unwrap().has_error());
    }

    #[test]
    fn test_clear_errors_reads_lsr_then_isr() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        let mut bridges = ready_bridges(&sim, &mut delay);
        sim.borrow_mut().set_lsr(BridgeId::B, ChannelIndex::CH0, 0x10);
        sim.borrow_mut().set_isr(BridgeId::B, ChannelIndex::CH0, 0x01);

        bridges
            .port(BridgeId::B, ChannelIndex::CH0)
            .unwrap()
            .clear_errors()
            .unwrap();

        let sim = sim.borrow();
        let reads: heapless::Vec<u8, 4> = sim
            .ops()
            .iter()
            .filter_map(|op| match op {
                BusOp::Read { register, .. } => Some(*register),
                _ => None,
            })
            .collect();
        assert_eq!(reads.as_slice(), &[reg::LSR, reg::ISR]);
    }

    #[test]
    fn test_send_blocking_waits_for_space() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        let mut bridges = ready_bridges(&sim, &mut delay);
        sim.borrow_mut().set_tx_level(BridgeId::C, ChannelIndex::CH0, 128);

        let mut wait = MockDelay::new();
        let mut port = bridges.port(BridgeId::C, ChannelIndex::CH0).unwrap();
        let result = port.send_char_blocking(&mut wait, b'z', 100);
        assert!(matches!(result, Err(BridgeError::Timeout)));
        assert_eq!(wait.total_us(), 100);
        assert!(sim.borrow().sent(BridgeId::C, ChannelIndex::CH0).is_empty());

        sim.borrow_mut().set_tx_level(BridgeId::C, ChannelIndex::CH0, 127);
        port.send_char_blocking(&mut wait, b'z', 100).unwrap();
        assert_eq!(sim.borrow().sent(BridgeId::C, ChannelIndex::CH0), b"z");
    }

    #[test]
    fn test_receive_blocking() {
        let sim = RefCell::new(Sim::new());
        let mut delay = MockDelay::new();
        let mut bridges = ready_bridges(&sim, &mut delay);

        let mut wait = MockDelay::new();
        let mut port = bridges.port(BridgeId::A, ChannelIndex::CH2).unwrap();
        assert!(matches!(
            port.receive_char_blocking(&mut wait, 50),
            Err(BridgeError::Timeout)
        ));

        sim.borrow_mut()
            .push_rx(BridgeId::A, ChannelIndex::CH2, b"k");
        assert_eq!(port.receive_char_blocking(&mut wait, 50).unwrap(), b'k');
    }
}
