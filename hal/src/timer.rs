//! # Process Clock
//!
//! Hardware abstraction for the processor-time clock a platform exposes.
//!
//! ## Philosophy
//!
//! **Time is a service, not a global variable.**
//!
//! This trait provides access to a cumulative clock counter running at a
//! fixed, platform-defined rate. It does NOT:
//! - Provide wall-clock time (no UTC, no timezones)
//! - Implement callback timers (platforms without them report an error)
//!
//! ## Design Principles
//!
//! 1. **Monotonic**: Clock values never go backwards
//! 2. **Rate-explicit**: `clocks_per_sec` states the unit of `clock`
//! 3. **Testable**: `ManualClock` is advanced by hand

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Timer errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("{0}")]
    Unsupported(&'static str),
}

/// Processor clock trait
///
/// # Implementation Notes
///
/// - Must be monotonic (never return a smaller value)
/// - `clock` must not block; `delay` blocks for at least `ms` milliseconds
pub trait ProcessClock: Send + Sync {
    /// Returns the current clock count
    fn clock(&self) -> u64;

    /// Returns how many clock counts make one second
    fn clocks_per_sec(&self) -> u64;

    /// Blocks the caller for `ms` milliseconds
    fn delay(&self, ms: u32);
}

/// Clock advanced explicitly, for tests and simulation
///
/// `delay` advances the clock by the requested time instead of sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
    rate: u64,
}

impl ManualClock {
    /// Creates a clock at zero counting `rate` clocks per second
    pub fn new(rate: u64) -> Self {
        Self {
            now: AtomicU64::new(0),
            rate,
        }
    }

    /// Advances the clock by `clocks`
    pub fn advance(&self, clocks: u64) {
        self.now.fetch_add(clocks, Ordering::SeqCst);
    }
}

impl ProcessClock for ManualClock {
    fn clock(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn clocks_per_sec(&self) -> u64 {
        self.rate
    }

    fn delay(&self, ms: u32) {
        self.advance(u64::from(ms) * self.rate / 1000);
    }
}
