//! Node configuration types
//!
//! Everything the bus layer needs to bring up the bridges and talk to the
//! I2C target. `Default` reproduces the board's factory settings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bridge::{
    BridgeId, ChannelIndex, Divisor, FifoTriggers, LineFormat, BRIDGE_COUNT, CHANNELS_PER_BRIDGE,
};

/// Magic number identifying a stored node configuration ("FTHM")
pub const CONFIG_MAGIC: u32 = 0x4654_484D;

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Buffer size that always fits an encoded [`NodeConfig`]
pub const CONFIG_BUF_LEN: usize = 256;

/// Per-channel UART settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelConfig {
    /// Baud rate, must be in the divisor table
    pub baud_rate: u32,
    /// Character framing
    pub line: LineFormat,
    /// FIFO trigger levels
    pub fifo: FifoTriggers,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9_600,
            line: LineFormat::EIGHT_N_ONE,
            fifo: FifoTriggers::default(),
        }
    }
}

/// Settings for the four channels of one bridge device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeConfig {
    pub channels: [ChannelConfig; CHANNELS_PER_BRIDGE],
}

impl BridgeConfig {
    /// Same settings on every channel
    pub const fn uniform(channel: ChannelConfig) -> Self {
        Self {
            channels: [channel; CHANNELS_PER_BRIDGE],
        }
    }

    pub fn channel(&self, channel: ChannelIndex) -> &ChannelConfig {
        &self.channels[channel.index()]
    }
}

/// Chip-select setup and hold times around SPI transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiTiming {
    /// Delay after asserting chip-select before a write (µs)
    pub write_setup_us: u32,
    /// Delay after asserting chip-select before a read (µs)
    pub read_setup_us: u32,
    /// Delay before deasserting chip-select (µs)
    pub hold_us: u32,
}

impl Default for SpiTiming {
    fn default() -> Self {
        Self {
            write_setup_us: 1,
            read_setup_us: 2,
            hold_us: 1,
        }
    }
}

/// Settle times of the bring-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BringUpTiming {
    /// Wait after resetting a channel (ms)
    pub reset_settle_ms: u32,
    /// Wait for the PLL to lock (ms)
    pub pll_lock_ms: u32,
    /// Wait after the last channel of a device (ms)
    pub final_settle_ms: u32,
}

impl Default for BringUpTiming {
    fn default() -> Self {
        Self {
            reset_settle_ms: 2,
            pll_lock_ms: 5,
            final_settle_ms: 2,
        }
    }
}

/// I2C sensor polled by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct I2cTargetConfig {
    /// 7-bit slave address
    pub address: u8,
    /// Register read on each poll
    pub register: u8,
    /// How long a read may take before it is abandoned (ms)
    pub timeout_ms: u32,
}

impl Default for I2cTargetConfig {
    fn default() -> Self {
        Self {
            address: 0x19,
            register: 0x00,
            timeout_ms: 10,
        }
    }
}

/// Reason a configuration was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigFault {
    /// Magic number or version mismatch
    BadHeader,
    /// Channel baud rate has no divisor
    UnsupportedBaudRate {
        bridge: BridgeId,
        channel: ChannelIndex,
        baud: u32,
    },
    /// FIFO trigger level does not fit its field
    FifoTrigger {
        bridge: BridgeId,
        channel: ChannelIndex,
    },
    /// I2C address outside the 7-bit range
    I2cAddress(u8),
}

/// Configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialization failed (buffer too small)
    Encode,
    /// Stored bytes could not be decoded
    Decode,
    /// Decoded or supplied values are not usable
    Invalid(ConfigFault),
}

impl From<ConfigFault> for ConfigError {
    fn from(fault: ConfigFault) -> Self {
        ConfigError::Invalid(fault)
    }
}

/// Complete bus layer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeConfig {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Channel settings, indexed by [`BridgeId::index`]
    pub bridges: [BridgeConfig; BRIDGE_COUNT],
    /// SPI chip-select timing
    pub spi: SpiTiming,
    /// Bring-up settle times
    pub bring_up: BringUpTiming,
    /// I2C target
    pub i2c: I2cTargetConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            magic: CONFIG_MAGIC,
            version: CONFIG_VERSION,
            bridges: [BridgeConfig::default(); BRIDGE_COUNT],
            spi: SpiTiming::default(),
            bring_up: BringUpTiming::default(),
            i2c: I2cTargetConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Settings of one bridge device
    pub fn bridge(&self, id: BridgeId) -> &BridgeConfig {
        &self.bridges[id.index()]
    }

    /// Mutable settings of one bridge device
    pub fn bridge_mut(&mut self, id: BridgeId) -> &mut BridgeConfig {
        &mut self.bridges[id.index()]
    }

    /// Check if the header matches this firmware
    pub fn has_valid_header(&self) -> bool {
        self.magic == CONFIG_MAGIC && self.version == CONFIG_VERSION
    }

    /// Check every value the bus layer depends on
    ///
    /// Reports the first problem found, in bridge then channel order.
    pub fn validate(&self) -> Result<(), ConfigFault> {
        if !self.has_valid_header() {
            return Err(ConfigFault::BadHeader);
        }

        for bridge in BridgeId::ALL {
            let config = self.bridge(bridge);
            for channel in ChannelIndex::ALL {
                let ch = config.channel(channel);
                if Divisor::for_baud(ch.baud_rate).is_err() {
                    return Err(ConfigFault::UnsupportedBaudRate {
                        bridge,
                        channel,
                        baud: ch.baud_rate,
                    });
                }
                if !ch.fifo.is_valid() {
                    return Err(ConfigFault::FifoTrigger { bridge, channel });
                }
            }
        }

        if self.i2c.address > crate::i2c::MAX_ADDRESS {
            return Err(ConfigFault::I2cAddress(self.i2c.address));
        }

        Ok(())
    }

    /// Serialize into `buf`, returning the number of bytes written
    #[cfg(feature = "serde")]
    pub fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ConfigError> {
        let used = postcard::to_slice(self, buf).map_err(|_| ConfigError::Encode)?;
        Ok(used.len())
    }

    /// Deserialize and validate a stored configuration
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: NodeConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }
}
