//! Time sources for the harness
//!
//! The harness only needs "monotonic, subtractable to nanoseconds". The
//! clock is picked once at startup and injected, so the timed loop never
//! branches on the host environment.

use std::cell::Cell;
use std::time::Instant;

use tracing::debug;

use crate::error::{Error, Result};

/// Coarsest clock tick the harness accepts
pub const MAX_RESOLUTION_NS: u64 = 1_000;

/// Reads taken while probing a clock for its resolution
const PROBE_SAMPLES: usize = 16;

/// Spins allowed per sample before a clock is declared stuck
const PROBE_SPIN_LIMIT: usize = 1_000_000;

/// Monotonic time source
pub trait Clock {
    /// Nanoseconds since an arbitrary fixed origin. Never decreases.
    fn now_ns(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

/// `Instant`-backed clock
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Open the platform monotonic clock, failing if it cannot deliver
    /// microsecond resolution.
    pub fn new() -> Result<Self> {
        let clock = Self {
            origin: Instant::now(),
        };
        let resolution = probe_resolution(&clock)?;
        debug!(resolution_ns = resolution, "monotonic clock ready");
        Ok(clock)
    }
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Smallest observed tick of `clock`, or `ClockUnavailable` when the clock
/// is stuck or coarser than [`MAX_RESOLUTION_NS`].
pub fn probe_resolution(clock: &impl Clock) -> Result<u64> {
    let mut best = u64::MAX;

    for _ in 0..PROBE_SAMPLES {
        let start = clock.now_ns();
        let mut now = start;
        let mut spins = 0;
        while now == start {
            if spins == PROBE_SPIN_LIMIT {
                return Err(Error::ClockUnavailable(format!(
                    "clock did not advance after {PROBE_SPIN_LIMIT} reads"
                )));
            }
            now = clock.now_ns();
            spins += 1;
        }
        if now < start {
            return Err(Error::ClockUnavailable(format!(
                "clock went backwards: {start}ns -> {now}ns"
            )));
        }
        best = best.min(now - start);
    }

    if best > MAX_RESOLUTION_NS {
        return Err(Error::ClockUnavailable(format!(
            "resolution {best}ns is coarser than {MAX_RESOLUTION_NS}ns"
        )));
    }
    Ok(best)
}

/// Deterministic clock for tests: every read returns the current value and
/// then advances it by `step_ns`.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<u64>,
    step_ns: u64,
}

impl ManualClock {
    pub fn new(start_ns: u64, step_ns: u64) -> Self {
        Self {
            now: Cell::new(start_ns),
            step_ns,
        }
    }

    /// A clock that never advances
    pub fn frozen(at_ns: u64) -> Self {
        Self::new(at_ns, 0)
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now.saturating_add(self.step_ns));
        now
    }
}
