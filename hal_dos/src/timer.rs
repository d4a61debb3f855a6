//! # DOS Timer Services
//!
//! Millisecond ticks and delays on top of the C library's `clock()`.
//!
//! ## Design Notes
//!
//! - Ticks are measured from `start_ticks`, not from boot
//! - Callback timers are not available under DOS; `start_timer` reports it
//! - `StdProcessClock` stands in for `clock()` on hosted targets

use hal::timer::{ProcessClock, TimerError};
use std::time::{Duration, Instant};

/// Message reported by `start_timer`
pub const TIMERS_UNSUPPORTED: &str = "Timers not implemented for DOS";

/// Converts clock counts at `clocks_per_sec` to milliseconds.
///
/// Rates that do not divide 1000 evenly lose precision the same way the
/// DOS C library does.
pub fn ticks_to_ms(clocks: u64, clocks_per_sec: u64) -> u64 {
    match clocks_per_sec {
        1000 => clocks,
        100 => clocks.wrapping_mul(10),
        0 => 0,
        rate => clocks.wrapping_mul(1000 / rate),
    }
}

/// Millisecond tick counter and delay
#[derive(Debug)]
pub struct DosTimer<C: ProcessClock> {
    clock: C,
    start: u64,
}

impl<C: ProcessClock> DosTimer<C> {
    /// Creates a timer; ticks count from now
    pub fn new(clock: C) -> Self {
        let start = clock.clock();
        Self { clock, start }
    }

    /// Resets the tick baseline
    pub fn start_ticks(&mut self) {
        self.start = self.clock.clock();
    }

    /// Milliseconds since the baseline, wrapping at `u32::MAX`
    pub fn ticks(&self) -> u32 {
        let elapsed = self.clock.clock().wrapping_sub(self.start);
        ticks_to_ms(elapsed, self.clock.clocks_per_sec()) as u32
    }

    pub fn delay(&self, ms: u32) {
        self.clock.delay(ms);
    }

    /// Initializes the timer subsystem. Nothing to do under DOS.
    pub fn sys_timer_init(&mut self) -> Result<(), TimerError> {
        tracing::debug!(rate = self.clock.clocks_per_sec(), "DOS timer initialized");
        Ok(())
    }

    pub fn sys_timer_quit(&mut self) {}

    /// Callback timers are not available
    pub fn start_timer(&mut self) -> Result<(), TimerError> {
        Err(TimerError::Unsupported(TIMERS_UNSUPPORTED))
    }

    pub fn stop_timer(&mut self) {}

    /// Returns the underlying clock
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// Process clock backed by `std::time::Instant`, at 1000 clocks per second
#[derive(Debug, Clone, Copy)]
pub struct StdProcessClock {
    origin: Instant,
}

impl StdProcessClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdProcessClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessClock for StdProcessClock {
    fn clock(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn clocks_per_sec(&self) -> u64 {
        1000
    }

    fn delay(&self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::timer::ManualClock;

    #[test]
    fn test_ticks_to_ms_rates() {
        assert_eq!(ticks_to_ms(1234, 1000), 1234);
        assert_eq!(ticks_to_ms(50, 100), 500);
        assert_eq!(ticks_to_ms(91, 91), 910);
        assert_eq!(ticks_to_ms(3, 18), 165);
        assert_eq!(ticks_to_ms(5, 0), 0);
    }

    #[test]
    fn test_ticks_to_ms_wraps_large_counts() {
        assert_eq!(ticks_to_ms(u64::MAX, 100), u64::MAX.wrapping_mul(10));
        assert_eq!(ticks_to_ms(u64::MAX / 2, 18), (u64::MAX / 2).wrapping_mul(55));
    }

    #[test]
    fn test_ticks_since_start() {
        let clock = ManualClock::new(100);
        clock.advance(40);
        let mut timer = DosTimer::new(clock);
        assert_eq!(timer.ticks(), 0);

        timer.clock().advance(25);
        assert_eq!(timer.ticks(), 250);

        timer.start_ticks();
        assert_eq!(timer.ticks(), 0);
    }

    #[test]
    fn test_ticks_wrap_to_u32() {
        let timer = DosTimer::new(ManualClock::new(1000));
        timer.clock().advance(u64::from(u32::MAX) + 6);
        assert_eq!(timer.ticks(), 5);
    }

    #[test]
    fn test_delay_uses_clock() {
        let timer = DosTimer::new(ManualClock::new(1000));
        timer.delay(30);
        assert_eq!(timer.ticks(), 30);
    }

    #[test]
    fn test_timer_lifecycle() {
        let mut timer = DosTimer::new(ManualClock::new(1000));
        assert!(timer.sys_timer_init().is_ok());
        let err = timer.start_timer().unwrap_err();
        assert_eq!(err.to_string(), "Timers not implemented for DOS");
        timer.stop_timer();
        timer.sys_timer_quit();
    }

    #[test]
    fn test_std_clock_monotonic() {
        let clock = StdProcessClock::new();
        let a = clock.clock();
        clock.delay(2);
        assert!(clock.clock() >= a + 2);
    }
}
