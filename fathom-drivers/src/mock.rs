//! Test doubles
//!
//! A simulated set of three MAX14830 devices sits behind [`MockSpi`] and the
//! three [`MockCs`] lines. All of them share one [`Sim`] through a `RefCell`,
//! so the simulator sees chip-select edges and SPI bytes in bus order and
//! can log them as register-level operations.

use core::cell::RefCell;

use embedded_hal::delay::DelayNs;
use fathom_core::bridge::registers::{reg, FIFO_DEPTH};
use fathom_core::bridge::{
    BridgeId, ChannelIndex, CommandFrame, Direction, BRIDGE_COUNT, CHANNELS_PER_BRIDGE,
};
use fathom_hal::gpio::OutputPin;
use fathom_hal::i2c::{I2cController, I2cFlags};
use fathom_hal::spi::SpiBus;
use heapless::{Deque, Vec};

const LOG_LEN: usize = 1024;
const TX_CAPTURE: usize = 256;

/// Register-level view of the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Select(BridgeId),
    Deselect(BridgeId),
    Write {
        device: BridgeId,
        channel: ChannelIndex,
        register: u8,
        value: u8,
    },
    Read {
        device: BridgeId,
        channel: ChannelIndex,
        register: u8,
        value: u8,
    },
}

type PerChannel<T> = [[T; CHANNELS_PER_BRIDGE]; BRIDGE_COUNT];

fn per_channel<T>(mut make: impl FnMut() -> T) -> PerChannel<T> {
    core::array::from_fn(|_| core::array::from_fn(|_| make()))
}

/// Simulated bridge devices plus bus recorder
pub struct Sim {
    regs: PerChannel<[u8; 32]>,
    rx: PerChannel<Deque<u8, 128>>,
    tx: PerChannel<Vec<u8, TX_CAPTURE>>,
    lsr: PerChannel<u8>,
    isr: PerChannel<u8>,
    tx_level: PerChannel<u8>,
    cs_low: [bool; BRIDGE_COUNT],
    command: Option<u8>,
    ops: Vec<BusOp, LOG_LEN>,
    raw: Vec<u8, LOG_LEN>,
    max_selected: usize,
    violations: usize,
    fail_spi: bool,
    fail_after: Option<usize>,
}

impl Sim {
    pub fn new() -> Self {
        Self {
            regs: per_channel(|| [0; 32]),
            rx: per_channel(Deque::new),
            tx: per_channel(Vec::new),
            lsr: per_channel(|| 0),
            isr: per_channel(|| 0),
            tx_level: per_channel(|| 0),
            cs_low: [false; BRIDGE_COUNT],
            command: None,
            ops: Vec::new(),
            raw: Vec::new(),
            max_selected: 0,
            violations: 0,
            fail_spi: false,
            fail_after: None,
        }
    }

    /// Number of chip-select lines currently low
    pub fn selected_count(&self) -> usize {
        self.cs_low.iter().filter(|low| **low).count()
    }

    /// The selected device, if exactly one line is low
    pub fn selected(&self) -> Option<BridgeId> {
        if self.selected_count() != 1 {
            return None;
        }
        self.cs_low
            .iter()
            .position(|low| *low)
            .and_then(BridgeId::from_index)
    }

    /// Highest number of lines ever low at the same time
    pub fn max_selected(&self) -> usize {
        self.max_selected
    }

    /// Bytes exchanged with no (or more than one) device selected
    pub fn violations(&self) -> usize {
        self.violations
    }

    pub fn ops(&self) -> &[BusOp] {
        &self.ops
    }

    /// Bytes written on MOSI, in order
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn clear_log(&mut self) {
        self.ops.clear();
        self.raw.clear();
    }

    /// Register writes logged so far
    pub fn write_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, BusOp::Write { .. }))
            .count()
    }

    pub fn register(&self, device: BridgeId, channel: ChannelIndex, register: u8) -> u8 {
        self.regs[device.index()][channel.index()][register as usize & 0x1F]
    }

    pub fn fail_spi(&mut self, fail: bool) {
        self.fail_spi = fail;
        self.fail_after = None;
    }

    /// Let `bytes` more transfers through, then fail every one after
    pub fn fail_spi_after(&mut self, bytes: usize) {
        self.fail_after = Some(bytes);
    }

    /// Queue bytes as if they arrived on the channel's RX pin
    pub fn push_rx(&mut self, device: BridgeId, channel: ChannelIndex, bytes: &[u8]) {
        let fifo = &mut self.rx[device.index()][channel.index()];
        for &b in bytes {
            let _ = fifo.push_back(b);
        }
    }

    /// Bytes written to the channel's THR
    pub fn sent(&self, device: BridgeId, channel: ChannelIndex) -> &[u8] {
        &self.tx[device.index()][channel.index()]
    }

    pub fn set_lsr(&mut self, device: BridgeId, channel: ChannelIndex, value: u8) {
        self.lsr[device.index()][channel.index()] = value;
    }

    pub fn set_isr(&mut self, device: BridgeId, channel: ChannelIndex, value: u8) {
        self.isr[device.index()][channel.index()] = value;
    }

    /// Pretend the TX FIFO holds `level` bytes
    pub fn set_tx_level(&mut self, device: BridgeId, channel: ChannelIndex, level: u8) {
        self.tx_level[device.index()][channel.index()] = level.min(FIFO_DEPTH);
    }

    fn set_cs(&mut self, device: BridgeId, low: bool) {
        let line = &mut self.cs_low[device.index()];
        if *line == low {
            return;
        }
        *line = low;
        // A new chip-select window starts a new frame
        self.command = None;
        let op = if low {
            BusOp::Select(device)
        } else {
            BusOp::Deselect(device)
        };
        let _ = self.ops.push(op);
        self.max_selected = self.max_selected.max(self.selected_count());
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        let _ = self.raw.push(byte);
        let Some(device) = self.selected() else {
            self.violations += 1;
            return 0xFF;
        };

        let Some(command) = self.command.take() else {
            self.command = Some(byte);
            return 0x00;
        };

        let frame = CommandFrame::decode(command);
        let (channel, register) = (frame.channel(), frame.register());
        match frame.direction() {
            Direction::Write => {
                self.write(device, channel, register, byte);
                let _ = self.ops.push(BusOp::Write {
                    device,
                    channel,
                    register,
                    value: byte,
                });
                0x00
            }
            Direction::Read => {
                let value = self.read(device, channel, register);
                let _ = self.ops.push(BusOp::Read {
                    device,
                    channel,
                    register,
                    value,
                });
                value
            }
        }
    }

    fn write(&mut self, device: BridgeId, channel: ChannelIndex, register: u8, value: u8) {
        let (d, c) = (device.index(), channel.index());
        if register == reg::THR {
            let _ = self.tx[d][c].push(value);
        } else {
            self.regs[d][c][register as usize] = value;
        }
    }

    fn read(&mut self, device: BridgeId, channel: ChannelIndex, register: u8) -> u8 {
        let (d, c) = (device.index(), channel.index());
        match register {
            reg::RHR => self.rx[d][c].pop_front().unwrap_or(0),
            reg::RXFIFOLVL => self.rx[d][c].len() as u8,
            reg::TXFIFOLVL => self.tx_level[d][c],
            reg::LSR => core::mem::take(&mut self.lsr[d][c]),
            reg::ISR => core::mem::take(&mut self.isr[d][c]),
            _ => self.regs[d][c][register as usize],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSpiError;

/// SPI bus wired to a [`Sim`]
pub struct MockSpi<'a> {
    sim: &'a RefCell<Sim>,
}

impl<'a> MockSpi<'a> {
    pub fn new(sim: &'a RefCell<Sim>) -> Self {
        Self { sim }
    }
}

impl SpiBus for MockSpi<'_> {
    type Error = MockSpiError;

    fn transfer_byte(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut sim = self.sim.borrow_mut();
        match sim.fail_after {
            Some(0) => sim.fail_spi = true,
            Some(n) => sim.fail_after = Some(n - 1),
            None => {}
        }
        if sim.fail_spi {
            return Err(MockSpiError);
        }
        Ok(sim.transfer(byte))
    }
}

/// Chip-select line of one simulated device
pub struct MockCs<'a> {
    sim: &'a RefCell<Sim>,
    device: BridgeId,
    high: bool,
}

impl OutputPin for MockCs<'_> {
    fn set_high(&mut self) {
        self.high = true;
        self.sim.borrow_mut().set_cs(self.device, false);
    }

    fn set_low(&mut self) {
        self.high = false;
        self.sim.borrow_mut().set_cs(self.device, true);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Chip-select lines for devices A, B and C
pub fn cs_pins(sim: &RefCell<Sim>) -> [MockCs<'_>; BRIDGE_COUNT] {
    BridgeId::ALL.map(|device| MockCs {
        sim,
        device,
        high: true,
    })
}

/// Delay that only records what it was asked to do
pub struct MockDelay {
    total_us: u32,
    us: Vec<u32, 2048>,
    ms: Vec<u32, 64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self {
            total_us: 0,
            us: Vec::new(),
            ms: Vec::new(),
        }
    }

    /// Total time waited
    pub fn total_us(&self) -> u32 {
        self.total_us
    }

    /// Every `delay_us` argument, in order
    pub fn us_calls(&self) -> &[u32] {
        &self.us
    }

    /// Every `delay_ms` argument, in order
    pub fn ms_calls(&self) -> &[u32] {
        &self.ms
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_us += ns.div_ceil(1_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.total_us += us;
        let _ = self.us.push(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_us += ms * 1_000;
        let _ = self.ms.push(ms);
    }
}

/// Controller-level operation issued to [`MockI2c`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cOp {
    Abort,
    Clear(I2cFlags),
    Start,
    Stop,
    NackStop,
    Write(u8),
    Read,
}

/// Scripted I2C master peripheral state
pub struct I2cSim {
    pending: I2cFlags,
    rx: u8,
    ops: Vec<I2cOp, 128>,
}

impl I2cSim {
    pub fn new() -> Self {
        Self {
            pending: I2cFlags::empty(),
            rx: 0,
            ops: Vec::new(),
        }
    }

    /// Raise interrupt flags as the peripheral would
    pub fn raise(&mut self, flags: I2cFlags) {
        self.pending |= flags;
    }

    /// Byte returned by the next `read_data`
    pub fn set_rx(&mut self, byte: u8) {
        self.rx = byte;
    }

    pub fn pending(&self) -> I2cFlags {
        self.pending
    }

    pub fn ops(&self) -> &[I2cOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn log(&mut self, op: I2cOp) {
        let _ = self.ops.push(op);
    }
}

/// I2C controller wired to an [`I2cSim`]
pub struct MockI2c<'a> {
    sim: &'a RefCell<I2cSim>,
}

impl<'a> MockI2c<'a> {
    pub fn new(sim: &'a RefCell<I2cSim>) -> Self {
        Self { sim }
    }
}

impl I2cController for MockI2c<'_> {
    fn pending(&self) -> I2cFlags {
        self.sim.borrow().pending
    }

    fn clear(&mut self, flags: I2cFlags) {
        let mut sim = self.sim.borrow_mut();
        sim.pending.remove(flags);
        sim.log(I2cOp::Clear(flags));
    }

    fn abort(&mut self) {
        self.sim.borrow_mut().log(I2cOp::Abort);
    }

    fn start(&mut self) {
        self.sim.borrow_mut().log(I2cOp::Start);
    }

    fn stop(&mut self) {
        self.sim.borrow_mut().log(I2cOp::Stop);
    }

    fn nack_stop(&mut self) {
        self.sim.borrow_mut().log(I2cOp::NackStop);
    }

    fn write_data(&mut self, byte: u8) {
        self.sim.borrow_mut().log(I2cOp::Write(byte));
    }

    fn read_data(&mut self) -> u8 {
        let mut sim = self.sim.borrow_mut();
        sim.log(I2cOp::Read);
        sim.rx
    }
}
