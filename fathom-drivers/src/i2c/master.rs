//! Interrupt-driven I2C master engine
//!
//! Binds the transaction state machine from `fathom-core` to an
//! [`I2cController`]. The interrupt handler calls [`I2cMaster::on_interrupt`];
//! foreground code starts reads and polls for completion. The controller and
//! the transaction live behind a blocking mutex, while completion and the
//! captured byte are published through atomics so polling never takes the
//! lock.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::delay::DelayNs;
use fathom_core::config::I2cTargetConfig;
use fathom_core::i2c::{BusEvent, I2cCommand, I2cOutcome, I2cState, Transaction, MAX_ADDRESS};
use fathom_hal::i2c::{I2cController, I2cFlags};
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::wait::wait_until;

/// I2C read error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// Another transaction is in flight
    Busy,
    /// The slave did not acknowledge
    Nack,
    /// No completion before the deadline; the engine is still busy
    Timeout,
    /// The transaction was aborted before completing
    Aborted,
    /// Slave address does not fit 7 bits
    InvalidAddress,
}

struct Inner<C> {
    controller: C,
    txn: Transaction,
}

/// Single-transaction I2C master
pub struct I2cMaster<M: RawMutex, C> {
    inner: Mutex<M, RefCell<Inner<C>>>,
    done: AtomicBool,
    last_byte: AtomicU8,
}

impl<M: RawMutex, C: I2cController> I2cMaster<M, C> {
    /// Wrap a controller
    ///
    /// The controller should already be configured (pins, clock) with its
    /// interrupt enabled for ACK, NACK, RXDATAV and MSTOP.
    pub const fn new(controller: C) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                controller,
                txn: Transaction::new(),
            })),
            done: AtomicBool::new(false),
            last_byte: AtomicU8::new(0),
        }
    }

    /// Start reading `register` from the slave at 7-bit `address`
    ///
    /// Returns `false` and does nothing if a transaction is in flight or if
    /// `address` does not fit 7 bits.
    pub fn start_read(&self, address: u8, register: u8) -> bool {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let Inner { controller, txn } = &mut *inner;

            match txn.begin(address, register) {
                Some(cmds) => {
                    self.done.store(false, Ordering::Release);
                    apply(controller, &cmds);
                    true
                }
                None => false,
            }
        })
    }

    /// Check whether the last transaction finished (successfully or not)
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Byte captured by the last completed transaction
    ///
    /// Only meaningful after [`Self::is_done`] returned true for a
    /// transaction that was not nacked.
    pub fn last_byte(&self) -> u8 {
        self.last_byte.load(Ordering::Relaxed)
    }

    /// Outcome of the current or last transaction
    pub fn outcome(&self) -> I2cOutcome {
        self.inner.lock(|inner| inner.borrow().txn.outcome())
    }

    /// Protocol state
    pub fn state(&self) -> I2cState {
        self.inner.lock(|inner| inner.borrow().txn.state())
    }

    /// Service the controller interrupt
    ///
    /// Returns the event the pending flags were decoded into, if any.
    /// Flags that were pending on entry are cleared either way.
    pub fn on_interrupt(&self) -> Option<BusEvent> {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let Inner { controller, txn } = &mut *inner;

            let pending = controller.pending();
            let event = decode(controller, txn.state(), pending);

            if let Some(event) = event {
                if let Some(cmds) = txn.handle(event) {
                    apply(controller, &cmds);
                }
                if event.is_failure() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("I2C: nack from {=u8:#x}", txn.address());
                }
            }
            if !pending.is_empty() {
                controller.clear(pending);
            }

            self.publish(txn);
            event
        })
    }

    /// Force the engine back to idle
    ///
    /// For callers that gave up waiting on an unresponsive slave. An idle
    /// engine is left as it is.
    pub fn abort(&self) {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let Inner { controller, txn } = &mut *inner;

            let cmds = txn.abort();
            apply(controller, &cmds);
            self.publish(txn);
        })
    }

    /// Read one register and wait for the result
    ///
    /// On timeout the transaction is left in flight; call [`Self::abort`]
    /// before starting another.
    pub fn read_register<D: DelayNs>(
        &self,
        delay: &mut D,
        address: u8,
        register: u8,
        timeout_us: u32,
    ) -> Result<u8, I2cError> {
        if address > MAX_ADDRESS {
            return Err(I2cError::InvalidAddress);
        }
        if !self.start_read(address, register) {
            return Err(I2cError::Busy);
        }

        wait_until(delay, timeout_us, || self.is_done()).map_err(|_| I2cError::Timeout)?;

        match self.outcome() {
            I2cOutcome::Complete(byte) => Ok(byte),
            I2cOutcome::Nacked => Err(I2cError::Nack),
            I2cOutcome::Aborted => Err(I2cError::Aborted),
            I2cOutcome::Pending => Err(I2cError::Timeout),
        }
    }

    /// Read the configured register of a configured target
    pub fn read_target<D: DelayNs>(&self, delay: &mut D, target: &I2cTargetConfig) -> Result<u8, I2cError> {
        let timeout_us = target.timeout_ms.saturating_mul(1_000);
        self.read_register(delay, target.address, target.register, timeout_us)
    }

    fn publish(&self, txn: &Transaction) {
        // Byte first, then the flag that makes it visible
        if let I2cOutcome::Complete(byte) = txn.outcome() {
            self.last_byte.store(byte, Ordering::Relaxed);
        }
        self.done.store(txn.is_done(), Ordering::Release);
    }
}

/// Turn pending flags into the event the current state waits for
///
/// A nack always wins. In idle nothing is decoded; the caller clears the
/// flags.
fn decode<C: I2cController>(controller: &mut C, state: I2cState, pending: I2cFlags) -> Option<BusEvent> {
    if pending.contains(I2cFlags::NACK) {
        return Some(BusEvent::Nack);
    }

    match state {
        I2cState::Idle => None,
        I2cState::SendAddr => pending.contains(I2cFlags::ACK).then_some(BusEvent::Ack),
        I2cState::SendReg => {
            if pending.contains(I2cFlags::TX_BUFFER_EMPTY) {
                Some(BusEvent::TxBufferEmpty)
            } else if pending.contains(I2cFlags::ACK) {
                Some(BusEvent::Ack)
            } else {
                None
            }
        }
        I2cState::Read => pending
            .contains(I2cFlags::RX_DATA_VALID)
            .then(|| BusEvent::RxDataValid(controller.read_data())),
        I2cState::WaitStop => pending
            .contains(I2cFlags::STOP_DETECTED)
            .then_some(BusEvent::StopDetected),
    }
}

fn apply<C: I2cController>(controller: &mut C, cmds: &[I2cCommand]) {
    for cmd in cmds {
        match *cmd {
            I2cCommand::Abort => controller.abort(),
            I2cCommand::ClearAll => controller.clear(I2cFlags::all()),
            I2cCommand::Start => controller.start(),
            I2cCommand::WriteData(byte) => controller.write_data(byte),
            I2cCommand::NackStop => controller.nack_stop(),
            I2cCommand::Stop => controller.stop(),
        }
    }
}
