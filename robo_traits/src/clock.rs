use std::thread;
use std::time::{Duration, Instant, SystemTime};

/// Time source for the periodic tasks and publish timestamps.
///
/// - now(): monotonic instant used for pacing
/// - sleep(): waits for the provided duration (implementations may simulate)
/// - stamp(): wall-clock time attached to published joint states
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    fn stamp(&self) -> SystemTime {
        SystemTime::now()
    }

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Loop period for a rate in Hz. `hz = 0` is treated as 1 Hz and the result
/// never drops below one microsecond.
#[inline]
pub fn period_for_hz(hz: u32) -> Duration {
    Duration::from_micros((1_000_000 / u64::from(hz.max(1))).max(1))
}

/// Real-time clock backed by `std::time`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Deterministic clock for tests and replays.
///
/// `now() = origin + offset`, `stamp() = UNIX_EPOCH + offset`. `sleep(d)` advances
/// the offset by `d` and yields the thread instead of blocking, so periodic tasks
/// driven by it run as fast as the scheduler allows.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: std::sync::Arc<std::sync::Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: std::sync::Arc::new(std::sync::Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    /// Current offset from the clock's origin.
    pub fn elapsed(&self) -> Duration {
        self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
        thread::yield_now();
    }

    fn stamp(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_on_sleep() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.sleep(Duration::from_millis(100));
        clock.sleep(Duration::from_millis(50));
        assert_eq!(clock.ms_since(start), 150);
        assert_eq!(
            clock.stamp(),
            SystemTime::UNIX_EPOCH + Duration::from_millis(150)
        );
    }

    #[test]
    fn period_for_hz_clamps() {
        assert_eq!(period_for_hz(10), Duration::from_millis(100));
        assert_eq!(period_for_hz(0), Duration::from_secs(1));
        assert_eq!(period_for_hz(u32::MAX), Duration::from_micros(1));
    }

    #[test]
    fn monotonic_zero_sleep_returns_immediately() {
        let clock = MonotonicClock::new();
        let start = clock.now();
        clock.sleep(Duration::ZERO);
        assert!(clock.ms_since(start) < 50);
    }
}
