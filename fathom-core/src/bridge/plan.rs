//! Bring-up register plan
//!
//! The full sequence of register writes and settle delays for one bridge
//! device is computed up front. Building the plan is where configuration
//! errors surface, so a device with a bad channel never sees a single write.

use heapless::Vec;

use super::baud::{Divisor, UnsupportedBaudRate};
use super::frame::{ChannelIndex, CHANNELS_PER_BRIDGE};
use super::registers::{clksource, mode2, reg, PLL_CONFIG_4MHZ};
use crate::config::{BridgeConfig, BringUpTiming, ChannelConfig};

/// Steps emitted for each channel
pub const STEPS_PER_CHANNEL: usize = 18;

/// Steps in a complete device plan (four channels plus the final settle)
pub const MAX_PLAN_STEPS: usize = STEPS_PER_CHANNEL * CHANNELS_PER_BRIDGE + 1;

/// One step of the bring-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanStep {
    /// Write `value` to `register` of `channel`
    Write {
        channel: ChannelIndex,
        register: u8,
        value: u8,
    },
    /// Wait before the next step
    Settle { ms: u32 },
}

/// Ordered bring-up steps for one device
pub type Plan = Vec<PlanStep, MAX_PLAN_STEPS>;

/// Build the bring-up plan for all four channels of a device
pub fn device_plan(
    config: &BridgeConfig,
    timing: &BringUpTiming,
) -> Result<Plan, UnsupportedBaudRate> {
    // Resolve every divisor first
    let mut divisors = [Divisor::for_baud(config.channels[0].baud_rate)?; CHANNELS_PER_BRIDGE];
    for channel in ChannelIndex::ALL {
        divisors[channel.index()] = Divisor::for_baud(config.channel(channel).baud_rate)?;
    }

    let mut plan = Plan::new();
    for channel in ChannelIndex::ALL {
        push_channel(
            &mut plan,
            channel,
            config.channel(channel),
            divisors[channel.index()],
            timing,
        );
    }
    push(
        &mut plan,
        PlanStep::Settle {
            ms: timing.final_settle_ms,
        },
    );

    Ok(plan)
}

fn push_channel(
    plan: &mut Plan,
    channel: ChannelIndex,
    config: &ChannelConfig,
    divisor: Divisor,
    timing: &BringUpTiming,
) {
    let write = |register, value| PlanStep::Write {
        channel,
        register,
        value,
    };

    let steps = [
        // Reset, then bring up the crystal and PLL
        write(reg::MODE2, mode2::RST),
        PlanStep::Settle {
            ms: timing.reset_settle_ms,
        },
        write(reg::CLKSOURCE, clksource::CRYSTAL_EN | clksource::PLL_EN),
        write(reg::PLLCONFIG, PLL_CONFIG_4MHZ),
        PlanStep::Settle {
            ms: timing.pll_lock_ms,
        },
        // Baud rate, integer divisor only
        write(reg::DIVLSB, divisor.low()),
        write(reg::DIVMSB, divisor.high()),
        write(reg::BRGCONFIG, 0x00),
        // Framing and FIFOs
        write(reg::LCR, config.line.lcr()),
        write(reg::FIFOTRGLVL, config.fifo.register()),
        // Normal operation, no flow control, no RX timeout
        write(reg::MODE1, 0x00),
        write(reg::MODE2, 0x00),
        write(reg::FLOWCTRL, 0x00),
        write(reg::RXTIMEOUT, 0x00),
        // Polled operation: every interrupt source off
        write(reg::IRQEN, 0x00),
        write(reg::LSRINTEN, 0x00),
        write(reg::SPCLCHRINTEN, 0x00),
        write(reg::STSINTEN, 0x00),
    ];

    for step in steps {
        push(plan, step);
    }
}

fn push(plan: &mut Plan, step: PlanStep) {
    // Capacity is sized for exactly four channels plus one settle
    let _ = plan.push(step);
}

/// Number of register writes in a plan
pub fn write_count(plan: &Plan) -> usize {
    plan.iter()
        .filter(|step| matches!(step, PlanStep::Write { .. }))
        .count()
}
