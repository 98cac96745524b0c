//! Timeout-bounded polling
//!
//! Every busy-wait in the bus layer goes through here, so no caller can spin
//! forever on a device that stopped answering. Time is measured by summing
//! the delays handed to the [`DelayNs`] implementation, which is accurate
//! enough when polls are cheap compared to the interval.

use embedded_hal::delay::DelayNs;

/// Interval between polls
pub const POLL_INTERVAL_US: u32 = 10;

/// Condition did not hold before the deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeout;

/// Poll `ready` until it returns true or `timeout_us` elapses
///
/// The condition is always checked at least once, and once more after the
/// last delay, so a zero timeout still succeeds if it already holds.
pub fn wait_until<D, F>(delay: &mut D, timeout_us: u32, mut ready: F) -> Result<(), Timeout>
where
    D: DelayNs,
    F: FnMut() -> bool,
{
    try_wait_until(delay, timeout_us, || {
        Ok::<_, Timeout>(if ready() { Some(()) } else { None })
    })
}

/// Poll a fallible `attempt` until it yields a value or `timeout_us` elapses
///
/// Errors from `attempt` end the wait immediately. Expiry is reported as
/// `E::from(Timeout)`.
pub fn try_wait_until<D, T, E, F>(delay: &mut D, timeout_us: u32, mut attempt: F) -> Result<T, E>
where
    D: DelayNs,
    E: From<Timeout>,
    F: FnMut() -> Result<Option<T>, E>,
{
    let mut elapsed_us: u32 = 0;

    loop {
        if let Some(value) = attempt()? {
            return Ok(value);
        }
        if elapsed_us >= timeout_us {
            return Err(Timeout.into());
        }

        let step = POLL_INTERVAL_US.min(timeout_us - elapsed_us);
        delay.delay_us(step);
        elapsed_us += step;
    }
}
