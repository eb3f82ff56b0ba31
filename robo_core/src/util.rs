//! Common time/period helpers for robo_core.

use std::time::Duration;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Compute the period in microseconds for a given rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Loop period for a given rate in Hz, with the same clamping as `period_us`.
#[inline]
pub fn period(hz: u32) -> Duration {
    robo_traits::clock::period_for_hz(hz)
}

/// Time left in the current period after `spent`, zero when the period overran.
#[inline]
pub fn remaining(period: Duration, spent: Duration) -> Duration {
    period.saturating_sub(spent)
}
