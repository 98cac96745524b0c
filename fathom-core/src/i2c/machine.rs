//! I2C transaction state machine
//!
//! ```text
//! Idle ──begin──▶ SendAddr ──ack──▶ SendReg ──ack/txbl──▶ Read
//!  ▲                                                       │
//!  │                                                   rx-data
//!  └──────────── stop ──────────── WaitStop ◀──────────────┘
//!
//!  any state ──nack──▶ Idle (outcome: Nacked)
//! ```
//!
//! A nack is the only failure the bus reports. There is no timeout here: a
//! slave that never answers leaves the machine in flight, and the caller
//! decides when to give up (see [`Transaction::abort`]).

use heapless::Vec;

use super::events::{read_address, write_address, BusEvent, I2cCommand, MAX_ADDRESS};

/// Most commands a single step can issue
pub const MAX_COMMANDS: usize = 4;

/// Commands produced by one step of the machine, in issue order
pub type Commands = Vec<I2cCommand, MAX_COMMANDS>;

/// Protocol states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cState {
    /// No transaction in flight
    Idle,
    /// Start + write address sent, waiting for the slave to ack
    SendAddr,
    /// Register address written, waiting for it to drain
    SendReg,
    /// Repeated start + read address sent, waiting for the data byte
    Read,
    /// Nack+stop issued, waiting for the stop to complete
    WaitStop,
}

impl I2cState {
    /// Check if a transaction is in flight
    pub fn in_flight(&self) -> bool {
        !matches!(self, I2cState::Idle)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: BusEvent) -> Self {
        use BusEvent::*;
        use I2cState::*;

        match (self, event) {
            // A nack ends the transaction from anywhere
            (_, Nack) => Idle,

            (SendAddr, Ack) => SendReg,
            // Controllers raise ack and tx-empty for the same byte; either
            // one means the register address is out
            (SendReg, Ack | TxBufferEmpty) => Read,
            (Read, RxDataValid(_)) => WaitStop,
            (WaitStop, StopDetected) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

/// How the last transaction ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cOutcome {
    /// Not finished (or never started)
    Pending,
    /// Read completed with this byte
    Complete(u8),
    /// The slave did not acknowledge
    Nacked,
    /// The caller abandoned the transaction
    Aborted,
}

impl I2cOutcome {
    /// Check if the transaction has finished, successfully or not
    pub fn is_done(&self) -> bool {
        !matches!(self, I2cOutcome::Pending)
    }

    /// The byte read, if the transaction succeeded
    pub fn byte(&self) -> Option<u8> {
        match self {
            I2cOutcome::Complete(byte) => Some(*byte),
            _ => None,
        }
    }
}

/// The single register-read transaction of an engine
#[derive(Debug, Clone)]
pub struct Transaction {
    address: u8,
    register: u8,
    state: I2cState,
    last_byte: u8,
    outcome: I2cOutcome,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// Create an idle transaction
    pub const fn new() -> Self {
        Self {
            address: 0,
            register: 0,
            state: I2cState::Idle,
            last_byte: 0,
            outcome: I2cOutcome::Pending,
        }
    }

    /// Current protocol state
    pub fn state(&self) -> I2cState {
        self.state
    }

    /// Target 7-bit address of the current (or last) transaction
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Register being read
    pub fn register(&self) -> u8 {
        self.register
    }

    /// Outcome of the current (or last) transaction
    pub fn outcome(&self) -> I2cOutcome {
        self.outcome
    }

    /// Check if the transaction has finished
    pub fn is_done(&self) -> bool {
        self.outcome.is_done()
    }

    /// Last byte captured from the bus
    ///
    /// Only meaningful when the outcome is [`I2cOutcome::Complete`].
    pub fn last_byte(&self) -> u8 {
        self.last_byte
    }

    /// Start reading `register` from the slave at 7-bit `address`
    ///
    /// Returns `None` without touching anything if a transaction is already
    /// in flight (there is no queuing) or if `address` does not fit 7 bits.
    pub fn begin(&mut self, address: u8, register: u8) -> Option<Commands> {
        if self.state.in_flight() || address > MAX_ADDRESS {
            return None;
        }

        self.address = address;
        self.register = register;
        self.outcome = I2cOutcome::Pending;
        self.state = I2cState::SendAddr;

        let mut cmds = Commands::new();
        let _ = cmds.push(I2cCommand::Abort);
        let _ = cmds.push(I2cCommand::ClearAll);
        let _ = cmds.push(I2cCommand::Start);
        let _ = cmds.push(I2cCommand::WriteData(write_address(self.address)));
        Some(cmds)
    }

    /// Feed one bus event
    ///
    /// Returns the commands to issue, or `None` if the event means nothing
    /// in the current state (the state is then unchanged).
    pub fn handle(&mut self, event: BusEvent) -> Option<Commands> {
        use BusEvent::*;
        use I2cState::*;

        let mut cmds = Commands::new();

        match (self.state, event) {
            (_, Nack) => {
                self.outcome = I2cOutcome::Nacked;
                let _ = cmds.push(I2cCommand::Stop);
            }
            (SendAddr, Ack) => {
                let _ = cmds.push(I2cCommand::WriteData(self.register));
            }
            (SendReg, Ack | TxBufferEmpty) => {
                let _ = cmds.push(I2cCommand::Start);
                let _ = cmds.push(I2cCommand::WriteData(read_address(self.address)));
            }
            (Read, RxDataValid(byte)) => {
                self.last_byte = byte;
                let _ = cmds.push(I2cCommand::NackStop);
            }
            (WaitStop, StopDetected) => {
                self.outcome = I2cOutcome::Complete(self.last_byte);
            }
            (Idle, _) => {
                // Stray event between transactions
                let _ = cmds.push(I2cCommand::ClearAll);
            }
            _ => return None,
        }

        self.state = self.state.transition(event);
        Some(cmds)
    }

    /// Abandon the transaction and return to idle
    ///
    /// Used by callers that timed out waiting for a slave. An idle
    /// transaction keeps its outcome.
    pub fn abort(&mut self) -> Commands {
        if self.state.in_flight() {
            self.outcome = I2cOutcome::Aborted;
        }
        self.state = I2cState::Idle;

        let mut cmds = Commands::new();
        let _ = cmds.push(I2cCommand::Abort);
        let _ = cmds.push(I2cCommand::ClearAll);
        cmds
    }
}
