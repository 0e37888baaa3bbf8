//! Simulation clock.
//!
//! The clock counts ticks and the simulated milliseconds they cover. It is
//! the single source of the tick number stamped on ledger entries and
//! events.
//!
//! All arithmetic is checked; the clock refuses to advance rather than
//! wrap.

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Elapsed-time counter would overflow.
    #[error("elapsed time overflow after {elapsed_ms} ms")]
    ElapsedOverflow {
        /// Milliseconds elapsed before the failing advance.
        elapsed_ms: u64,
    },
}

/// Tick counter plus simulated elapsed time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationClock {
    /// Ticks completed so far.
    tick: u64,
    /// Simulated milliseconds covered by those ticks.
    elapsed_ms: u64,
}

impl SimulationClock {
    /// A clock at tick zero.
    pub const fn new() -> Self {
        Self {
            tick: 0,
            elapsed_ms: 0,
        }
    }

    /// The current tick. Tick 0 is the setup phase before the first advance.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated milliseconds since the start.
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Start the next tick covering `delta_ms`, returning its number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if either counter would overflow. The clock is
    /// left unchanged in that case.
    pub fn advance(&mut self, delta_ms: u64) -> Result<u64, ClockError> {
        let tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        let elapsed_ms =
            self.elapsed_ms
                .checked_add(delta_ms)
                .ok_or(ClockError::ElapsedOverflow {
                    elapsed_ms: self.elapsed_ms,
                })?;
        self.tick = tick;
        self.elapsed_ms = elapsed_ms;
        Ok(tick)
    }
}
