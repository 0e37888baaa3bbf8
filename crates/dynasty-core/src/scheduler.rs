//! Cooperative, tick-driven action scheduler.
//!
//! The [`ActionScheduler`] owns every pending timed action. Each tick the
//! host calls [`ActionScheduler::advance`] with the elapsed milliseconds;
//! due actions fire their effect through an [`ActionHost`], repeating
//! actions catch up on large deltas, and actions whose validity check fails
//! are silently cancelled.
//!
//! # Ordering
//!
//! Actions are keyed by [`ActionHandle`], which is issued in strictly
//! increasing order, so iterating the map visits actions in registration
//! order. `advance` snapshots the next handle before it starts and never
//! visits a handle at or beyond that cutoff: anything scheduled while an
//! advance is in progress waits for the next call.
//!
//! # Primary actions
//!
//! An action may name an owner. An owner has at most one outstanding
//! action; scheduling another one for the same owner cancels the previous
//! one first.
//!
//! # Effects as data
//!
//! Effects and checks are plain values interpreted by the host. The host
//! receives `&mut ActionScheduler` when an effect fires so it can schedule
//! or cancel further actions from inside the callback.

use std::collections::BTreeMap;
use std::ops::Bound;

use dynasty_types::{ActionHandle, CharacterId};
use tracing::{debug, trace};

/// Errors raised when registering an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// A repeating action must have a non-zero period.
    #[error("repeating action requires a non-zero period")]
    ZeroPeriod,

    /// The handle counter is exhausted.
    #[error("action handle counter overflow")]
    HandleOverflow,
}

// ---------------------------------------------------------------------------
// Action specification
// ---------------------------------------------------------------------------

/// Everything needed to register an action.
///
/// ```
/// use dynasty_core::scheduler::ActionSpec;
///
/// let spec: ActionSpec<&str, ()> = ActionSpec::once(500, "step").repeating();
/// assert!(spec.repeats);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpec<E, C> {
    /// Milliseconds of accumulated time before the effect fires.
    pub required_ms: u64,
    /// Effect interpreted by the host when the action fires.
    pub effect: E,
    /// Condition re-checked every tick; failure cancels the action.
    pub check: Option<C>,
    /// Whether the action re-arms after firing.
    pub repeats: bool,
    /// Actor whose primary action this is.
    pub owner: Option<CharacterId>,
}

impl<E, C> ActionSpec<E, C> {
    /// A non-repeating, unowned action with no validity check.
    pub const fn once(required_ms: u64, effect: E) -> Self {
        Self {
            required_ms,
            effect,
            check: None,
            repeats: false,
            owner: None,
        }
    }

    /// Make the action repeat every `required_ms`.
    #[must_use]
    pub const fn repeating(mut self) -> Self {
        self.repeats = true;
        self
    }

    /// Cancel the action as soon as `check` stops holding.
    #[must_use]
    pub fn valid_while(mut self, check: C) -> Self {
        self.check = Some(check);
        self
    }

    /// Register the action as `owner`'s primary action.
    #[must_use]
    pub const fn owned_by(mut self, owner: CharacterId) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// A registered action.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledAction<E, C> {
    /// Accumulated milliseconds since registration or the last fire.
    pub elapsed_ms: u64,
    /// Milliseconds required before the effect fires.
    pub required_ms: u64,
    /// Effect payload.
    pub effect: E,
    /// Validity check payload.
    pub check: Option<C>,
    /// Whether the action re-arms after firing.
    pub repeats: bool,
    /// Owning actor.
    pub owner: Option<CharacterId>,
}

// ---------------------------------------------------------------------------
// Host trait
// ---------------------------------------------------------------------------

/// Interprets effects and validity checks on behalf of the scheduler.
pub trait ActionHost<E, C> {
    /// Error returned by a failing effect. An error aborts the advance.
    type Error;

    /// Whether an action guarded by `check` may continue.
    fn is_valid(&self, check: &C) -> bool;

    /// Run `effect`. The action identified by `handle` has already been
    /// removed if it does not repeat.
    ///
    /// # Errors
    ///
    /// Any error the host reports; it is propagated out of
    /// [`ActionScheduler::advance`] unchanged.
    fn fire(
        &mut self,
        scheduler: &mut ActionScheduler<E, C>,
        handle: ActionHandle,
        effect: &E,
    ) -> Result<(), Self::Error>;
}

/// What happened during one [`ActionScheduler::advance`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Actions visited.
    pub visited: u32,
    /// Effects fired, catch-up fires included.
    pub fired: u32,
    /// Non-repeating actions that completed and were removed.
    pub completed: u32,
    /// Actions cancelled by a failing validity check.
    pub cancelled: u32,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Registry of pending timed actions.
#[derive(Debug, Clone)]
pub struct ActionScheduler<E, C> {
    actions: BTreeMap<ActionHandle, ScheduledAction<E, C>>,
    primary: BTreeMap<CharacterId, ActionHandle>,
    next_handle: u64,
}

impl<E, C> Default for ActionScheduler<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C> ActionScheduler<E, C> {
    /// Create an empty scheduler.
    pub const fn new() -> Self {
        Self {
            actions: BTreeMap::new(),
            primary: BTreeMap::new(),
            next_handle: 0,
        }
    }

    /// Register an action and return its handle.
    ///
    /// If the action has an owner, the owner's previous primary action is
    /// cancelled first. The new action is first visited by the next
    /// [`advance`](Self::advance) call, never by one already in progress.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::ZeroPeriod`] for a repeating action with a zero
    /// period, [`SchedulerError::HandleOverflow`] if handles are exhausted.
    pub fn schedule(&mut self, spec: ActionSpec<E, C>) -> Result<ActionHandle, SchedulerError> {
        if spec.repeats && spec.required_ms == 0 {
            return Err(SchedulerError::ZeroPeriod);
        }
        let handle = ActionHandle(self.next_handle);
        self.next_handle = self
            .next_handle
            .checked_add(1)
            .ok_or(SchedulerError::HandleOverflow)?;

        if let Some(owner) = spec.owner {
            if let Some(previous) = self.primary.insert(owner, handle) {
                self.actions.remove(&previous);
                trace!(%owner, %previous, "primary action replaced");
            }
        }

        self.actions.insert(
            handle,
            ScheduledAction {
                elapsed_ms: 0,
                required_ms: spec.required_ms,
                effect: spec.effect,
                check: spec.check,
                repeats: spec.repeats,
                owner: spec.owner,
            },
        );
        Ok(handle)
    }

    /// Remove an action without firing it.
    pub fn cancel(&mut self, handle: ActionHandle) -> Option<ScheduledAction<E, C>> {
        let action = self.actions.remove(&handle)?;
        if let Some(owner) = action.owner {
            if self.primary.get(&owner) == Some(&handle) {
                self.primary.remove(&owner);
            }
        }
        Some(action)
    }

    /// Cancel `owner`'s primary action, if any.
    pub fn cancel_owned(&mut self, owner: CharacterId) -> Option<ScheduledAction<E, C>> {
        let handle = self.primary.get(&owner).copied()?;
        self.cancel(handle)
    }

    /// The primary action registered for `owner`.
    pub fn primary_of(&self, owner: CharacterId) -> Option<ActionHandle> {
        self.primary.get(&owner).copied()
    }

    /// Whether `handle` is still registered.
    pub fn contains(&self, handle: ActionHandle) -> bool {
        self.actions.contains_key(&handle)
    }

    /// A registered action.
    pub fn get(&self, handle: ActionHandle) -> Option<&ScheduledAction<E, C>> {
        self.actions.get(&handle)
    }

    /// Accumulated time of a registered action.
    pub fn elapsed_of(&self, handle: ActionHandle) -> Option<u64> {
        self.actions.get(&handle).map(|action| action.elapsed_ms)
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered actions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ActionHandle, &ScheduledAction<E, C>)> {
        self.actions.iter().map(|(handle, action)| (*handle, action))
    }
}

impl<E: Clone, C> ActionScheduler<E, C> {
    /// Advance every registered action by `delta_ms`.
    ///
    /// Actions are visited in registration order. For each: a failing
    /// validity check cancels it; otherwise `delta_ms` is accumulated and
    /// the effect fires once the required time is reached. A repeating
    /// action fires `floor(elapsed / required)` times, re-checking validity
    /// before each catch-up fire.
    ///
    /// # Errors
    ///
    /// The first error returned by [`ActionHost::fire`]; actions not yet
    /// visited keep their accumulated time.
    pub fn advance<H>(&mut self, delta_ms: u64, host: &mut H) -> Result<AdvanceReport, H::Error>
    where
        H: ActionHost<E, C>,
    {
        let cutoff = ActionHandle(self.next_handle);
        let mut report = AdvanceReport::default();
        let mut cursor: Option<ActionHandle> = None;

        loop {
            // Re-query each step: effects may have cancelled or added actions.
            let lower = cursor.map_or(Bound::Unbounded, Bound::Excluded);
            let Some(handle) = self
                .actions
                .range((lower, Bound::Excluded(cutoff)))
                .next()
                .map(|(handle, _)| *handle)
            else {
                break;
            };
            cursor = Some(handle);
            report.visited = report.visited.saturating_add(1);
            self.step(handle, delta_ms, host, &mut report)?;
        }

        if report.fired > 0 || report.cancelled > 0 {
            debug!(
                delta_ms,
                visited = report.visited,
                fired = report.fired,
                completed = report.completed,
                cancelled = report.cancelled,
                pending = self.actions.len(),
                "scheduler advanced"
            );
        }
        Ok(report)
    }

    fn step<H>(
        &mut self,
        handle: ActionHandle,
        delta_ms: u64,
        host: &mut H,
        report: &mut AdvanceReport,
    ) -> Result<(), H::Error>
    where
        H: ActionHost<E, C>,
    {
        if !self.still_valid(handle, host) {
            self.cancel(handle);
            report.cancelled = report.cancelled.saturating_add(1);
            return Ok(());
        }
        if let Some(action) = self.actions.get_mut(&handle) {
            action.elapsed_ms = action.elapsed_ms.saturating_add(delta_ms);
        }

        loop {
            let Some(action) = self.actions.get_mut(&handle) else {
                return Ok(());
            };
            if action.elapsed_ms < action.required_ms {
                return Ok(());
            }
            let effect = action.effect.clone();
            let repeats = action.repeats;
            if repeats {
                action.elapsed_ms = action.elapsed_ms.saturating_sub(action.required_ms);
            } else {
                self.cancel(handle);
            }

            host.fire(self, handle, &effect)?;
            report.fired = report.fired.saturating_add(1);

            if !repeats {
                report.completed = report.completed.saturating_add(1);
                return Ok(());
            }
            let due_again = self
                .actions
                .get(&handle)
                .is_some_and(|action| action.elapsed_ms >= action.required_ms);
            if due_again && !self.still_valid(handle, host) {
                self.cancel(handle);
                report.cancelled = report.cancelled.saturating_add(1);
                return Ok(());
            }
        }
    }

    fn still_valid<H>(&self, handle: ActionHandle, host: &H) -> bool
    where
        H: ActionHost<E, C>,
    {
        self.actions
            .get(&handle)
            .and_then(|action| action.check.as_ref())
            .is_none_or(|check| host.is_valid(check))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Effects used by the test host.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Probe {
        Count(&'static str),
        Spawn(&'static str),
        CancelSelf,
    }

    #[derive(Default)]
    struct Recorder {
        fired: Vec<&'static str>,
        allowed: bool,
        fires_before_invalid: Option<u32>,
    }

    impl ActionHost<Probe, ()> for Recorder {
        type Error = SchedulerError;

        fn is_valid(&self, _check: &()) -> bool {
            self.allowed
                && self
                    .fires_before_invalid
                    .is_none_or(|limit| u32::try_from(self.fired.len()).unwrap() < limit)
        }

        fn fire(
            &mut self,
            scheduler: &mut ActionScheduler<Probe, ()>,
            handle: ActionHandle,
            effect: &Probe,
        ) -> Result<(), SchedulerError> {
            match effect {
                Probe::Count(name) => self.fired.push(name),
                Probe::Spawn(name) => {
                    self.fired.push(name);
                    scheduler.schedule(ActionSpec::once(0, Probe::Count("child")))?;
                }
                Probe::CancelSelf => {
                    self.fired.push("cancel-self");
                    scheduler.cancel(handle);
                }
            }
            Ok(())
        }
    }

    fn host() -> Recorder {
        Recorder {
            allowed: true,
            ..Recorder::default()
        }
    }

    // -----------------------------------------------------------------------
    // Firing
    // -----------------------------------------------------------------------

    #[test]
    fn one_shot_fires_once_then_is_removed() {
        let mut scheduler = ActionScheduler::new();
        let mut host = host();
        let handle = scheduler
            .schedule(ActionSpec::once(1000, Probe::Count("a")))
            .unwrap();

        let report = scheduler.advance(600, &mut host).unwrap();
        assert_eq!(report.fired, 0);
        assert_eq!(scheduler.elapsed_of(handle), Some(600));

        let report = scheduler.advance(5000, &mut host).unwrap();
        assert_eq!(report.fired, 1);
        assert_eq!(report.completed, 1);
        assert!(!scheduler.contains(handle));
        assert_eq!(host.fired, vec!["a"]);
    }

    #[test]
    fn repeating_fires_k_times_for_k_periods() {
        // delta = k*P + r with P = 3000, k = 3, r = 1200.
        let mut scheduler = ActionScheduler::new();
        let mut host = host();
        let handle = scheduler
            .schedule(ActionSpec::once(3000, Probe::Count("tick")).repeating())
            .unwrap();

        let report = scheduler.advance(3 * 3000 + 1200, &mut host).unwrap();
        assert_eq!(report.fired, 3);
        assert_eq!(host.fired.len(), 3);
        assert_eq!(scheduler.elapsed_of(handle), Some(1200));

        // The remainder carries into the next call.
        let report = scheduler.advance(1800, &mut host).unwrap();
        assert_eq!(report.fired, 1);
        assert_eq!(scheduler.elapsed_of(handle), Some(0));
    }

    #[test]
    fn zero_period_repeating_is_rejected() {
        let mut scheduler: ActionScheduler<Probe, ()> = ActionScheduler::new();
        let result = scheduler.schedule(ActionSpec::once(0, Probe::Count("x")).repeating());
        assert_eq!(result, Err(SchedulerError::ZeroPeriod));
        assert!(scheduler.is_empty());
    }

    // -----------------------------------------------------------------------
    // Ordering and re-entrancy
    // -----------------------------------------------------------------------

    #[test]
    fn visits_in_registration_order() {
        let mut scheduler = ActionScheduler::new();
        let mut host = host();
        scheduler
            .schedule(ActionSpec::once(0, Probe::Count("first")))
            .unwrap();
        scheduler
            .schedule(ActionSpec::once(0, Probe::Count("second")))
            .unwrap();
        scheduler.advance(1, &mut host).unwrap();
        assert_eq!(host.fired, vec!["first", "second"]);
    }

    #[test]
    fn actions_scheduled_mid_advance_wait_for_next_call() {
        let mut scheduler = ActionScheduler::new();
        let mut host = host();
        scheduler
            .schedule(ActionSpec::once(0, Probe::Spawn("parent")))
            .unwrap();

        let report = scheduler.advance(10, &mut host).unwrap();
        assert_eq!(report.visited, 1);
        assert_eq!(host.fired, vec!["parent"]);
        assert_eq!(scheduler.len(), 1);

        scheduler.advance(10, &mut host).unwrap();
        assert_eq!(host.fired, vec!["parent", "child"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn effect_can_cancel_its_own_repeating_action() {
        let mut scheduler = ActionScheduler::new();
        let mut host = host();
        let handle = scheduler
            .schedule(ActionSpec::once(100, Probe::CancelSelf).repeating())
            .unwrap();
        let report = scheduler.advance(1000, &mut host).unwrap();
        assert_eq!(report.fired, 1);
        assert!(!scheduler.contains(handle));
    }

    // -----------------------------------------------------------------------
    // Validity and ownership
    // -----------------------------------------------------------------------

    #[test]
    fn failing_check_cancels_without_firing() {
        let mut scheduler = ActionScheduler::new();
        let mut host = Recorder::default();
        scheduler
            .schedule(ActionSpec::once(0, Probe::Count("never")).valid_while(()))
            .unwrap();
        let report = scheduler.advance(100, &mut host).unwrap();
        assert_eq!(report.cancelled, 1);
        assert_eq!(report.fired, 0);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn catch_up_stops_when_check_fails() {
        let mut scheduler = ActionScheduler::new();
        let mut host = host();
        host.fires_before_invalid = Some(2);
        scheduler
            .schedule(
                ActionSpec::once(100, Probe::Count("swing"))
                    .repeating()
                    .valid_while(()),
            )
            .unwrap();
        let report = scheduler.advance(1000, &mut host).unwrap();
        assert_eq!(report.fired, 2);
        assert_eq!(report.cancelled, 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn one_primary_action_per_owner() {
        let owner = CharacterId::new();
        let mut scheduler: ActionScheduler<Probe, ()> = ActionScheduler::new();
        let first = scheduler
            .schedule(ActionSpec::once(100, Probe::Count("a")).owned_by(owner))
            .unwrap();
        let second = scheduler
            .schedule(ActionSpec::once(100, Probe::Count("b")).owned_by(owner))
            .unwrap();
        let third = scheduler
            .schedule(ActionSpec::once(100, Probe::Count("c")).owned_by(owner))
            .unwrap();

        assert!(!scheduler.contains(first));
        assert!(!scheduler.contains(second));
        assert!(scheduler.contains(third));
        assert_eq!(scheduler.primary_of(owner), Some(third));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn completed_primary_clears_owner_index() {
        let owner = CharacterId::new();
        let mut scheduler = ActionScheduler::new();
        let mut host = host();
        scheduler
            .schedule(ActionSpec::once(10, Probe::Count("done")).owned_by(owner))
            .unwrap();
        scheduler.advance(10, &mut host).unwrap();
        assert_eq!(scheduler.primary_of(owner), None);
        assert!(scheduler.cancel_owned(owner).is_none());
    }

    #[test]
    fn cancel_removes_without_firing() {
        let mut scheduler = ActionScheduler::new();
        let mut host = host();
        let handle = scheduler
            .schedule(ActionSpec::once(0, Probe::Count("x")))
            .unwrap();
        assert!(scheduler.cancel(handle).is_some());
        assert!(scheduler.cancel(handle).is_none());
        scheduler.advance(100, &mut host).unwrap();
        assert!(host.fired.is_empty());
    }
}
