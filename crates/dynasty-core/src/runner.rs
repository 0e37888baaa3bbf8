//! Bounded headless runs.
//!
//! [`step`] advances a [`SimulationContext`] by one tick, drains the events
//! that tick raised and hands both to a [`TickCallback`]. [`run_ticks`]
//! repeats it for a fixed number of ticks and stops early when the world
//! goes extinct (nobody alive and nothing scheduled that could bring anyone
//! back). The engine binary paces its own loop around [`step`]; the runner
//! is what tests and batch tools use.

use tracing::{info, warn};

use crate::context::{SimulationContext, TickReport};
use crate::error::KernelError;
use crate::events::KernelEvent;

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick failed.
    #[error("tick error: {source}")]
    Kernel {
        /// The underlying kernel error.
        #[from]
        source: KernelError,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// The requested number of ticks ran.
    TickLimit,
    /// No character is alive and no action is pending.
    Extinction,
    /// The host stopped the run (for example on Ctrl-C).
    Interrupted,
}

/// Result of a run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the run ended.
    pub end_reason: SimulationEndReason,
    /// The last tick report, if any tick completed.
    pub final_summary: Option<TickReport>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    ///
    /// `events` is everything the tick raised, already drained from the
    /// context's queue.
    fn on_tick(
        &mut self,
        report: &TickReport,
        events: &[KernelEvent],
        context: &SimulationContext,
    );
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(
        &mut self,
        _report: &TickReport,
        _events: &[KernelEvent],
        _context: &SimulationContext,
    ) {
    }
}

/// Advance `context` by `delta_ms` once and report the tick to `callback`.
///
/// The event queue is empty when this returns.
///
/// # Errors
///
/// Returns [`RunnerError::Kernel`] if the tick fails.
pub fn step(
    context: &mut SimulationContext,
    delta_ms: u64,
    callback: &mut dyn TickCallback,
) -> Result<TickReport, RunnerError> {
    let report = context.advance(delta_ms)?;
    let events = context.drain_events();
    callback.on_tick(&report, &events, context);
    if report.is_extinct() {
        info!(tick = report.tick, "Extinction");
    }
    Ok(report)
}

/// Advance `context` by `delta_ms` up to `ticks` times.
///
/// # Errors
///
/// Returns [`RunnerError::Kernel`] if a tick fails; ticks already run are
/// not rolled back.
pub fn run_ticks(
    context: &mut SimulationContext,
    ticks: u64,
    delta_ms: u64,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickReport> = None;
    let mut total_ticks: u64 = 0;

    info!(ticks, delta_ms, alive = context.alive_count(), "Run starting");

    while total_ticks < ticks {
        let report = step(context, delta_ms, callback)?;
        total_ticks = total_ticks.saturating_add(1);
        last_summary = Some(report);

        if report.is_extinct() {
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Extinction,
                final_summary: last_summary,
                total_ticks,
            });
        }
    }

    Ok(SimulationResult {
        end_reason: SimulationEndReason::TickLimit,
        final_summary: last_summary,
        total_ticks,
    })
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_alive = result.final_summary.as_ref().map(|s| s.alive),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            elapsed_ms = summary.elapsed_ms,
            alive = summary.alive,
            pending_actions = summary.pending_actions,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use dynasty_agents::Class;
    use dynasty_types::{AiPolicy, BaseSettings, Position};
    use dynasty_world::GridMap;

    use super::*;
    use crate::context::KernelSettings;
    use crate::spawn::{ArchetypeKind, SpawnRequest};

    struct Counter(u64);

    impl TickCallback for Counter {
        fn on_tick(
            &mut self,
            report: &TickReport,
            _events: &[KernelEvent],
            _context: &SimulationContext,
        ) {
            self.0 = report.tick;
        }
    }

    /// Keeps every event it is handed.
    #[derive(Default)]
    struct Collector(Vec<KernelEvent>);

    impl TickCallback for Collector {
        fn on_tick(
            &mut self,
            _report: &TickReport,
            events: &[KernelEvent],
            _context: &SimulationContext,
        ) {
            self.0.extend_from_slice(events);
        }
    }

    fn context() -> SimulationContext {
        let world = GridMap::new("runner", 6, 6).unwrap();
        SimulationContext::new(Box::new(world), KernelSettings::default())
    }

    #[test]
    fn empty_world_is_extinct_after_one_tick() {
        let mut ctx = context();
        let result = run_ticks(&mut ctx, 50, 100, &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::Extinction);
        assert_eq!(result.total_ticks, 1);
    }

    #[test]
    fn wanderer_runs_to_the_limit() {
        let mut ctx = context();
        let settings = BaseSettings {
            ai: AiPolicy::Wander,
            ..BaseSettings::default()
        };
        ctx.spawn(SpawnRequest::new(
            "Moth",
            ArchetypeKind::Beast,
            settings,
            Arc::new(Class::new("None")),
        ))
        .unwrap();

        let mut counter = Counter(0);
        let result = run_ticks(&mut ctx, 10, 250, &mut counter).unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::TickLimit);
        assert_eq!(result.total_ticks, 10);
        assert_eq!(counter.0, 10);
        assert_eq!(result.final_summary.map(|s| s.elapsed_ms), Some(2500));
    }

    #[test]
    fn callback_receives_each_ticks_events_and_the_queue_stays_empty() {
        let mut ctx = context();
        let wolf = ctx
            .spawn(
                SpawnRequest::new(
                    "Wolf",
                    ArchetypeKind::Beast,
                    BaseSettings {
                        ai: AiPolicy::Controlled,
                        ..BaseSettings::default()
                    },
                    Arc::new(Class::new("None")),
                )
                .at(Position::new(0, 0)),
            )
            .unwrap();
        let hare = ctx
            .spawn(
                SpawnRequest::new(
                    "Hare",
                    ArchetypeKind::Beast,
                    BaseSettings {
                        max_health: 1.0,
                        starting_legacy: 3,
                        ai: AiPolicy::Controlled,
                        ..BaseSettings::default()
                    },
                    Arc::new(Class::new("None")),
                )
                .at(Position::new(0, 1)),
            )
            .unwrap();
        ctx.drain_events();
        ctx.toggle_attack_mode(wolf).unwrap();
        assert!(ctx.perform_standard_attack(wolf, hare).unwrap());

        let mut collector = Collector::default();
        let result = run_ticks(&mut ctx, 60, 100, &mut collector).unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::TickLimit);

        assert!(ctx.drain_events().is_empty());
        assert!(collector.0.contains(&KernelEvent::Died {
            character: hare,
            killer: Some(wolf),
        }));
        assert!(collector.0.iter().any(|event| matches!(
            event,
            KernelEvent::CorpseRemoved { character, .. } if *character == hare
        )));
    }

    #[test]
    fn step_drains_what_the_tick_raised() {
        let mut ctx = context();
        ctx.spawn(SpawnRequest::new(
            "Moth",
            ArchetypeKind::Beast,
            BaseSettings::default(),
            Arc::new(Class::new("None")),
        ))
        .unwrap();
        let mut collector = Collector::default();
        let report = step(&mut ctx, 100, &mut collector).unwrap();
        assert_eq!(report.tick, 1);
        assert!(!report.is_extinct());
        assert!(ctx.drain_events().is_empty());
    }

    #[test]
    fn zero_ticks_runs_nothing() {
        let mut ctx = context();
        let result = run_ticks(&mut ctx, 0, 100, &mut NoOpCallback).unwrap();
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
        log_simulation_end(&result);
    }
}
