//! Tick reporting for the headless host.
//!
//! [`LogReporter`] is the engine's [`TickCallback`]: a debug line per tick,
//! the tick's kernel events as JSON and the legacy leaderboard at a fixed
//! cadence. The event lines give a renderer or log shipper the same change
//! stream a presentation layer would consume.

use dynasty_core::{KernelEvent, SimulationContext, TickCallback, TickReport};
use tracing::{debug, info, warn};

/// Logs tick summaries and the periodic leaderboard.
pub struct LogReporter {
    leaderboard_every: u64,
    leaderboard_size: usize,
}

impl LogReporter {
    /// A reporter that prints `leaderboard_size` entries every
    /// `leaderboard_every` ticks (never when zero).
    pub const fn new(leaderboard_every: u64, leaderboard_size: usize) -> Self {
        Self {
            leaderboard_every,
            leaderboard_size,
        }
    }

    /// Whether the leaderboard is due on `tick`.
    const fn leaderboard_due(&self, tick: u64) -> bool {
        self.leaderboard_every != 0 && tick % self.leaderboard_every == 0
    }

    /// Log the current leaderboard.
    pub fn log_leaderboard(&self, context: &SimulationContext) {
        for entry in context.top_n(self.leaderboard_size) {
            info!(
                rank = entry.rank,
                name = entry.name,
                legacy = entry.legacy,
                "Leaderboard"
            );
        }
    }
}

impl TickCallback for LogReporter {
    fn on_tick(
        &mut self,
        report: &TickReport,
        events: &[KernelEvent],
        context: &SimulationContext,
    ) {
        log_events(report.tick, events);
        debug!(
            tick = report.tick,
            elapsed_ms = report.elapsed_ms,
            fired = report.actions.fired,
            intents = report.intents,
            alive = report.alive,
            pending_actions = report.pending_actions,
            "Tick complete"
        );
        if self.leaderboard_due(report.tick) {
            info!(tick = report.tick, alive = report.alive, "Leaderboard update");
            self.log_leaderboard(context);
        }
    }
}

/// Log the kernel events raised during `tick`.
///
/// Deaths, successor arrivals and legacy transfers are logged at info;
/// everything else at debug. Each line carries the event as JSON.
fn log_events(tick: u64, events: &[KernelEvent]) {
    for event in events {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(error) => {
                warn!(tick, %error, "failed to serialize kernel event");
                continue;
            }
        };
        match event {
            KernelEvent::Died { .. }
            | KernelEvent::SuccessorSpawned { .. }
            | KernelEvent::LegacyTransferred { .. } => info!(tick, event = json, "Kernel event"),
            _ => debug!(tick, event = json, "Kernel event"),
        }
    }
}
