//! Bridge bring-up
//!
//! Executes the register plan from `fathom-core` against one device. The
//! plan is built, and therefore validated, before the first SPI transfer.

use embedded_hal::delay::DelayNs;
use fathom_core::bridge::{device_plan, BridgeId, PlanStep};
use fathom_core::config::{BridgeConfig, BringUpTiming};
use fathom_hal::gpio::OutputPin;
use fathom_hal::spi::SpiBus;

use super::access::RegisterAccess;
use super::BridgeError;

/// Bring up all four channels of `device`
///
/// An unsupported baud rate on any channel fails before anything is written.
pub fn init_device<S, P, D>(
    access: &mut RegisterAccess<S, P, D>,
    device: BridgeId,
    config: &BridgeConfig,
    timing: &BringUpTiming,
) -> Result<(), BridgeError<S::Error>>
where
    S: SpiBus,
    P: OutputPin,
    D: DelayNs,
{
    let plan = device_plan(config, timing).map_err(|e| {
        #[cfg(feature = "defmt")]
        defmt::warn!("Bridge {}: unsupported baud rate {}", device, e.0);
        BridgeError::from(e)
    })?;

    #[cfg(feature = "defmt")]
    defmt::debug!("Bridge {}: bring-up, {} steps", device, plan.len());

    for step in plan {
        match step {
            PlanStep::Write {
                channel,
                register,
                value,
            } => access.write_register(device, channel, register, value)?,
            PlanStep::Settle { ms } => access.delay_ms(ms),
        }
    }

    Ok(())
}
