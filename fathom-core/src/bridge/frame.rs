//! Device identity and the SPI command frame
//!
//! Every transfer to a bridge starts with one command byte:
//!
//! ```text
//!   7     6  5    4  3  2  1  0
//! ┌─────┬──────┬───────────────┐
//! │ W/R │ U1U0 │   A4 .. A0    │
//! └─────┴──────┴───────────────┘
//! ```
//!
//! followed by one payload byte (data for a write, a dummy for a read).

use super::registers::MAX_REGISTER;

/// Number of bridge devices on the bus
pub const BRIDGE_COUNT: usize = 3;

/// Number of UART channels per bridge device
pub const CHANNELS_PER_BRIDGE: usize = 4;

/// Write bit of the command byte
const WRITE_BIT: u8 = 0x80;

/// One of the three bridge devices sharing the SPI bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeId {
    A,
    B,
    C,
}

impl BridgeId {
    /// All devices, in bring-up order
    pub const ALL: [BridgeId; BRIDGE_COUNT] = [BridgeId::A, BridgeId::B, BridgeId::C];

    /// Position in per-device tables
    pub const fn index(self) -> usize {
        match self {
            BridgeId::A => 0,
            BridgeId::B => 1,
            BridgeId::C => 2,
        }
    }

    /// Device at table position `index`
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(BridgeId::A),
            1 => Some(BridgeId::B),
            2 => Some(BridgeId::C),
            _ => None,
        }
    }
}

/// Channel index outside 0-3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidChannel(pub u8);

/// UART channel (0-3) within a bridge device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelIndex(u8);

impl ChannelIndex {
    pub const CH0: Self = Self(0);
    pub const CH1: Self = Self(1);
    pub const CH2: Self = Self(2);
    pub const CH3: Self = Self(3);

    /// All channels, in bring-up order
    pub const ALL: [ChannelIndex; CHANNELS_PER_BRIDGE] =
        [Self::CH0, Self::CH1, Self::CH2, Self::CH3];

    /// Validate a raw channel number
    pub const fn new(channel: u8) -> Result<Self, InvalidChannel> {
        if (channel as usize) < CHANNELS_PER_BRIDGE {
            Ok(Self(channel))
        } else {
            Err(InvalidChannel(channel))
        }
    }

    /// Raw channel number
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Position in per-channel tables
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for ChannelIndex {
    type Error = InvalidChannel;

    fn try_from(channel: u8) -> Result<Self, Self::Error> {
        Self::new(channel)
    }
}

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Read,
    Write,
}

/// Command byte of a bridge register transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame {
    direction: Direction,
    channel: ChannelIndex,
    register: u8,
}

impl CommandFrame {
    /// Frame for writing `register` of `channel`
    ///
    /// Only the low five bits of `register` are addressable.
    pub const fn write(channel: ChannelIndex, register: u8) -> Self {
        Self {
            direction: Direction::Write,
            channel,
            register: register & MAX_REGISTER,
        }
    }

    /// Frame for reading `register` of `channel`
    pub const fn read(channel: ChannelIndex, register: u8) -> Self {
        Self {
            direction: Direction::Read,
            channel,
            register: register & MAX_REGISTER,
        }
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    pub const fn channel(&self) -> ChannelIndex {
        self.channel
    }

    pub const fn register(&self) -> u8 {
        self.register
    }

    /// Encode to the on-wire command byte
    pub const fn encode(&self) -> u8 {
        let dir = match self.direction {
            Direction::Write => WRITE_BIT,
            Direction::Read => 0,
        };
        dir | (self.channel.get() << 5) | self.register
    }

    /// Decode an on-wire command byte
    ///
    /// Every byte is a valid frame.
    pub const fn decode(byte: u8) -> Self {
        let direction = if byte & WRITE_BIT != 0 {
            Direction::Write
        } else {
            Direction::Read
        };
        Self {
            direction,
            channel: ChannelIndex((byte >> 5) & 0x03),
            register: byte & MAX_REGISTER,
        }
    }
}
