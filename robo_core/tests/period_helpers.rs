// Focused tests for period helpers.
use robo_core::util::{period, period_us, remaining};
use std::time::Duration;

#[test]
fn period_us_clamps_and_floors() {
    // hz=1 → 1s
    assert_eq!(period_us(1), 1_000_000);
    // default publish rate
    assert_eq!(period_us(10), 100_000);
    // hz=0 is treated as 1 Hz
    assert_eq!(period_us(0), 1_000_000);
    // Very high hz floors to 1µs minimum
    assert_eq!(period_us(u32::MAX), 1);
}

#[test]
fn period_matches_period_us() {
    assert_eq!(period(10), Duration::from_millis(100));
    assert_eq!(period(4), Duration::from_millis(250));
}

#[test]
fn remaining_saturates_on_overrun() {
    let p = Duration::from_millis(100);
    assert_eq!(remaining(p, Duration::from_millis(30)), Duration::from_millis(70));
    assert_eq!(remaining(p, Duration::from_millis(150)), Duration::ZERO);
}
