//! The action scheduler through its public API, plus the scheduling rules
//! the simulation context builds on (one primary action per character,
//! repeated movement).

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::sync::Arc;

use dynasty_agents::Class;
use dynasty_core::{
    ActionHost, ActionScheduler, ActionSpec, ArchetypeKind, KernelSettings, SimulationContext,
    SpawnRequest,
};
use dynasty_types::{ActionHandle, Activity, AiPolicy, BaseSettings, CharacterId, Direction, Position};
use dynasty_world::GridMap;

// ---------------------------------------------------------------------------
// Generic scheduler
// ---------------------------------------------------------------------------

/// Counts fires per label.
#[derive(Default)]
struct Tally {
    fires: Vec<&'static str>,
}

impl ActionHost<&'static str, ()> for Tally {
    type Error = std::convert::Infallible;

    fn is_valid(&self, _check: &()) -> bool {
        true
    }

    fn fire(
        &mut self,
        _scheduler: &mut ActionScheduler<&'static str, ()>,
        _handle: ActionHandle,
        effect: &&'static str,
    ) -> Result<(), Self::Error> {
        self.fires.push(*effect);
        Ok(())
    }
}

#[test]
fn repeating_action_fires_floor_delta_over_period_times() {
    for (period, delta) in [(100_u64, 0_u64), (100, 99), (100, 100), (100, 350), (7, 1000), (1, 5)] {
        let mut scheduler: ActionScheduler<&'static str, ()> = ActionScheduler::new();
        let mut tally = Tally::default();
        scheduler
            .schedule(ActionSpec::once(period, "tick").repeating())
            .unwrap();

        let report = scheduler.advance(delta, &mut tally).unwrap();
        let expected = delta / period;
        assert_eq!(u64::try_from(tally.fires.len()).unwrap(), expected, "P={period} delta={delta}");
        assert_eq!(u64::from(report.fired), expected);
        // The remainder is carried.
        let handle = scheduler.iter().next().map(|(handle, _)| handle).unwrap();
        assert_eq!(scheduler.elapsed_of(handle), Some(delta % period));
    }
}

#[test]
fn actions_fire_in_registration_order() {
    let mut scheduler: ActionScheduler<&'static str, ()> = ActionScheduler::new();
    let mut tally = Tally::default();
    scheduler.schedule(ActionSpec::once(30, "slow")).unwrap();
    scheduler.schedule(ActionSpec::once(10, "fast")).unwrap();
    scheduler.schedule(ActionSpec::once(20, "middle")).unwrap();

    scheduler.advance(50, &mut tally).unwrap();
    assert_eq!(tally.fires, ["slow", "fast", "middle"]);
    assert!(scheduler.is_empty());
}

#[test]
fn rescheduling_an_owner_keeps_only_the_latest() {
    let owner = CharacterId::new();
    let mut scheduler: ActionScheduler<&'static str, ()> = ActionScheduler::new();
    let first = scheduler
        .schedule(ActionSpec::once(10, "first").owned_by(owner))
        .unwrap();
    let second = scheduler
        .schedule(ActionSpec::once(10, "second").owned_by(owner))
        .unwrap();
    let third = scheduler
        .schedule(ActionSpec::once(10, "third").owned_by(owner))
        .unwrap();

    assert!(!scheduler.contains(first));
    assert!(!scheduler.contains(second));
    assert!(scheduler.contains(third));
    assert_eq!(scheduler.primary_of(owner), Some(third));
    assert_eq!(scheduler.len(), 1);
}

// ---------------------------------------------------------------------------
// Through the context
// ---------------------------------------------------------------------------

fn walker(ctx: &mut SimulationContext, at: Position) -> CharacterId {
    ctx.spawn(
        SpawnRequest::new(
            "Walker",
            ArchetypeKind::Beast,
            BaseSettings {
                move_delay_ms: 500.0,
                ai: AiPolicy::Controlled,
                ..BaseSettings::default()
            },
            Arc::new(Class::new("Walker")),
        )
        .at(at),
    )
    .unwrap()
}

fn corridor() -> SimulationContext {
    let world = GridMap::from_ascii("corridor", "......#").unwrap();
    SimulationContext::new(Box::new(world), KernelSettings::default())
}

#[test]
fn single_step_completes_after_the_move_delay() {
    let mut ctx = corridor();
    let id = walker(&mut ctx, Position::new(0, 0));
    assert!(ctx.move_in_direction(id, Direction::East, false).unwrap());
    assert_eq!(ctx.character(id).unwrap().activity, Activity::Moving);

    ctx.advance(499).unwrap();
    assert_eq!(ctx.character(id).unwrap().position, Position::new(0, 0));
    ctx.advance(1).unwrap();
    assert_eq!(ctx.character(id).unwrap().position, Position::new(0, 1));
    assert_eq!(ctx.character(id).unwrap().activity, Activity::Idle);
}

#[test]
fn repeated_movement_stops_at_the_wall() {
    let mut ctx = corridor();
    let id = walker(&mut ctx, Position::new(0, 0));
    assert!(ctx.move_in_direction(id, Direction::East, true).unwrap());

    // Ten steps' worth of time, but the wall is six tiles away.
    ctx.advance(5000).unwrap();
    assert_eq!(ctx.character(id).unwrap().position, Position::new(0, 5));
    assert!(ctx.scheduler().primary_of(id).is_none());
}

#[test]
fn a_new_trigger_replaces_the_pending_action() {
    let mut ctx = corridor();
    let id = walker(&mut ctx, Position::new(0, 3));
    assert!(ctx.move_in_direction(id, Direction::East, true).unwrap());
    assert!(ctx.move_in_direction(id, Direction::West, false).unwrap());
    assert_eq!(ctx.scheduler().len(), 1);

    ctx.advance(2000).unwrap();
    assert_eq!(ctx.character(id).unwrap().position, Position::new(0, 2));
}

#[test]
fn blocked_moves_are_refused() {
    let mut ctx = corridor();
    let id = walker(&mut ctx, Position::new(0, 5));
    assert!(!ctx.move_in_direction(id, Direction::East, false).unwrap());
    assert!(!ctx.move_in_direction(id, Direction::North, false).unwrap());
    assert!(ctx.scheduler().is_empty());
}

#[test]
fn cancel_action_stops_movement() {
    let mut ctx = corridor();
    let id = walker(&mut ctx, Position::new(0, 0));
    ctx.move_in_direction(id, Direction::East, true).unwrap();
    assert!(ctx.cancel_action(id).unwrap());
    assert!(!ctx.cancel_action(id).unwrap());

    ctx.advance(2000).unwrap();
    assert_eq!(ctx.character(id).unwrap().position, Position::new(0, 0));
    assert_eq!(ctx.character(id).unwrap().activity, Activity::Idle);
}
