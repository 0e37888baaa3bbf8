//! The simulation context.
//!
//! [`SimulationContext`] owns everything a running simulation needs: the
//! action scheduler, the characters and their occupancy, the lineages, the
//! ranked registry, the legacy ledger, the event queue, the clock and the
//! random source. Independent contexts share nothing, so tests can run any
//! number of simulations side by side.
//!
//! # Tick cycle
//!
//! [`SimulationContext::advance`] runs one tick:
//!
//! 1. Advance the clock.
//! 2. Let idle NPCs pick an action ([`crate::policy`]).
//! 3. Advance the scheduler; due actions fire into the kernel state.
//! 4. Settle displayed activities of characters left without an action.
//! 5. Verify legacy conservation for the tick.
//!
//! The scheduler and the rest of the state are separate fields so that an
//! effect firing inside the scheduler can borrow the state mutably and
//! still schedule follow-up actions.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use dynasty_agents::{Attribute, Character, CombatConfig};
use dynasty_ledger::{ConservationResult, Ledger};
use dynasty_types::{
    ActionHandle, Activity, CharacterId, CharacterSnapshot, CombatMode, Direction, LegacyHolder,
    LineageId, Position, RankedEntry, TalentId,
};
use dynasty_world::WorldQuery;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::actions::{KernelCheck, KernelEffect, KernelScheduler};
use crate::clock::SimulationClock;
use crate::config::LineageConfig;
use crate::error::KernelError;
use crate::events::{EventQueue, KernelEvent};
use crate::lineage::{HeirTemplate, Lineage, LineageTracker};
use crate::registry::RankedRegistry;
use crate::scheduler::{ActionHost, ActionSpec, AdvanceReport};
use crate::spawn::SpawnRequest;

// ---------------------------------------------------------------------------
// Settings and reports
// ---------------------------------------------------------------------------

/// Tunables a context is created with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KernelSettings {
    /// Seed for the context's random source.
    pub seed: u64,
    /// Combat timing and skill discounts.
    pub combat: CombatConfig,
    /// Successor spawning.
    pub lineage: LineageConfig,
}

/// Summary of one [`SimulationContext::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Tick that just ran.
    pub tick: u64,
    /// Simulated milliseconds since the start, this tick included.
    pub elapsed_ms: u64,
    /// Scheduler activity during the tick.
    pub actions: AdvanceReport,
    /// Actions started by NPC policies.
    pub intents: u32,
    /// Living characters after the tick.
    pub alive: usize,
    /// Actions still pending.
    pub pending_actions: usize,
}

impl TickReport {
    /// Nobody is alive and nothing is scheduled that could bring anyone back.
    pub const fn is_extinct(&self) -> bool {
        self.alive == 0 && self.pending_actions == 0
    }
}

/// Convert a resolved duration to whole milliseconds.
///
/// Negative and NaN durations become zero; values beyond `u64::MAX` saturate.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn duration_ms(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    let rounded = value.round();
    if rounded >= u64::MAX as f64 {
        u64::MAX
    } else {
        rounded as u64
    }
}

// ---------------------------------------------------------------------------
// Kernel state
// ---------------------------------------------------------------------------

/// Everything except the scheduler. Implements [`ActionHost`].
pub(crate) struct KernelState {
    pub(crate) world: Box<dyn WorldQuery>,
    pub(crate) characters: BTreeMap<CharacterId, Character>,
    pub(crate) occupancy: BTreeMap<Position, CharacterId>,
    pub(crate) lineages: LineageTracker,
    pub(crate) registry: RankedRegistry,
    pub(crate) ledger: Ledger,
    pub(crate) events: EventQueue,
    pub(crate) rng: StdRng,
    pub(crate) clock: SimulationClock,
    pub(crate) combat: CombatConfig,
    pub(crate) lineage_config: LineageConfig,
}

impl KernelState {
    pub(crate) fn character(&self, id: CharacterId) -> Result<&Character, KernelError> {
        self.characters
            .get(&id)
            .ok_or(KernelError::UnknownCharacter(id))
    }

    pub(crate) fn character_mut(&mut self, id: CharacterId) -> Result<&mut Character, KernelError> {
        self.characters
            .get_mut(&id)
            .ok_or(KernelError::UnknownCharacter(id))
    }

    /// Tiles held by a character, corpses included.
    pub(crate) fn occupied(&self) -> BTreeSet<Position> {
        self.occupancy.keys().copied().collect()
    }

    /// Passable and not held by anyone.
    pub(crate) fn is_open(&self, position: Position) -> bool {
        self.world.is_passable(position) && !self.occupancy.contains_key(&position)
    }

    /// Legacy attributed to `character`: its lineage's if lineal.
    pub(crate) fn legacy_of(&self, character: &Character) -> u64 {
        match character.lineage() {
            Some(lineage) => self.lineages.get(lineage).map_or(0, Lineage::legacy),
            None => character.combat.legacy,
        }
    }

    pub(crate) fn set_activity(&mut self, id: CharacterId, activity: Activity) {
        if let Some(character) = self.characters.get_mut(&id) {
            if character.activity != activity {
                character.activity = activity;
                self.events.push(KernelEvent::ActivityChanged {
                    character: id,
                    activity,
                });
            }
        }
    }

    /// Put a new character on the map and rank it.
    fn admit(&mut self, character: Character, legacy: u64) {
        let id = character.id;
        self.occupancy.insert(character.position, id);
        self.registry.insert(id, character.name.clone(), legacy);
        self.events.push(KernelEvent::Spawned {
            character: id,
            name: character.name.clone(),
            position: character.position,
            lineage: character.lineage(),
        });
        info!(
            character = %id,
            name = character.name,
            archetype = character.archetype.label(),
            position = %character.position,
            legacy,
            "character spawned"
        );
        self.characters.insert(id, character);
    }

    /// Pick the spawn tile for a request.
    fn claim_tile(&mut self, requested: Option<Position>) -> Result<Position, KernelError> {
        match requested {
            Some(position) if self.is_open(position) => Ok(position),
            Some(position) => Err(KernelError::SpawnBlocked(position)),
            None => {
                let occupied = self.occupied();
                self.world
                    .random_passable(&mut self.rng, &occupied)
                    .ok_or(KernelError::NoFreeTile)
            }
        }
    }

    /// Re-rank every registered character of `lineage` at its current legacy.
    pub(crate) fn rerank_lineage(&mut self, lineage: LineageId) {
        let legacy = self.lineages.get(lineage).map_or(0, Lineage::legacy);
        for character in self.characters.values() {
            if character.lineage() == Some(lineage) {
                self.registry.update_legacy(character.id, legacy);
            }
        }
    }

    /// Living characters whose displayed action ended get `Idle` back.
    fn settle_activities(&mut self, scheduler: &KernelScheduler) {
        for character in self.characters.values_mut() {
            let busy = matches!(
                character.activity,
                Activity::Moving | Activity::Attacking | Activity::Casting
            );
            if busy && character.is_alive() && scheduler.primary_of(character.id).is_none() {
                character.activity = Activity::Idle;
                self.events.push(KernelEvent::ActivityChanged {
                    character: character.id,
                    activity: Activity::Idle,
                });
            }
        }
    }

    /// Actual legacy per holder, for the ledger audit.
    fn holdings(&self) -> BTreeMap<LegacyHolder, u64> {
        let mut holdings = BTreeMap::new();
        for character in self.characters.values() {
            if character.lineage().is_none() {
                holdings.insert(character.legacy_holder(), character.combat.legacy);
            }
        }
        for lineage in self.lineages.iter() {
            holdings.insert(LegacyHolder::Lineage(lineage.id()), lineage.legacy());
        }
        holdings
    }

    // -- Effects -----------------------------------------------------------

    fn can_step(&self, actor: CharacterId, direction: Direction) -> bool {
        self.characters
            .get(&actor)
            .filter(|character| character.is_alive())
            .and_then(|character| character.position.step(direction))
            .is_some_and(|next| self.is_open(next))
    }

    fn attack_engaged(&self, attacker: CharacterId, target: CharacterId) -> bool {
        let (Some(attacker), Some(target)) =
            (self.characters.get(&attacker), self.characters.get(&target))
        else {
            return false;
        };
        attacker.is_alive()
            && attacker.combat.mode == CombatMode::Attack
            && attacker.combat.target == Some(target.id)
            && target.is_alive()
            && attacker.position.is_adjacent(target.position)
    }

    fn step(&mut self, actor: CharacterId, direction: Direction) {
        let Some(from) = self.characters.get(&actor).map(|c| c.position) else {
            return;
        };
        let Some(to) = from.step(direction) else {
            return;
        };
        if !self.is_open(to) {
            return;
        }
        if let Some(character) = self.characters.get_mut(&actor) {
            character.position = to;
            self.occupancy.remove(&from);
            self.occupancy.insert(to, actor);
            self.events.push(KernelEvent::Moved {
                character: actor,
                from,
                to,
            });
        }
    }

    fn end_cooldown(&mut self, actor: CharacterId) {
        let Some(character) = self.characters.get_mut(&actor) else {
            return;
        };
        character.combat.cooling_down = false;
        let recovering = character.is_alive() && character.activity == Activity::Recovering;
        self.events
            .push(KernelEvent::CooldownEnded { character: actor });
        if recovering {
            self.set_activity(actor, Activity::Idle);
        }
    }

    fn remove_corpse(&mut self, actor: CharacterId) {
        let Some(corpse) = self.characters.remove(&actor) else {
            return;
        };
        if self.occupancy.get(&corpse.position) == Some(&actor) {
            self.occupancy.remove(&corpse.position);
        }
        self.registry.remove(actor);
        self.events.push(KernelEvent::CorpseRemoved {
            character: actor,
            position: corpse.position,
        });
        info!(character = %actor, name = corpse.name, "corpse removed");
    }

    fn spawn_heir(
        &mut self,
        scheduler: &mut KernelScheduler,
        lineage_id: LineageId,
        skill_points: u32,
    ) -> Result<(), KernelError> {
        let occupied = self.occupied();
        let Some(position) = self.world.random_passable(&mut self.rng, &occupied) else {
            let delay_ms = self.lineage_config.spawn_delay_ms;
            warn!(lineage = %lineage_id, delay_ms, "no free tile for successor, retrying");
            scheduler.schedule(ActionSpec::once(
                delay_ms,
                KernelEffect::SpawnSuccessor {
                    lineage: lineage_id,
                    skill_points,
                },
            ))?;
            return Ok(());
        };

        let base_points = self.lineage_config.base_skill_points;
        let lineage = self.lineages.get_mut(lineage_id)?;
        let heir = lineage.heir().clone();
        let mut character = Character::new(
            lineage.successor_name(),
            heir.kind.archetype(heir.settings, Some(lineage_id)),
            heir.class,
            position,
        );
        character.combat.skill_points = f64::from(base_points.saturating_add(skill_points));
        lineage.update(character.id)?;
        let generation = lineage.generation();
        let legacy = lineage.legacy();
        let id = character.id;

        self.admit(character, legacy);
        self.events.push(KernelEvent::SuccessorSpawned {
            lineage: lineage_id,
            character: id,
            generation,
        });
        Ok(())
    }
}

impl ActionHost<KernelEffect, KernelCheck> for KernelState {
    type Error = KernelError;

    fn is_valid(&self, check: &KernelCheck) -> bool {
        match *check {
            KernelCheck::CanStep { actor, direction } => self.can_step(actor, direction),
            KernelCheck::AttackEngaged { attacker, target } => {
                self.attack_engaged(attacker, target)
            }
            KernelCheck::Alive { actor } => self
                .characters
                .get(&actor)
                .is_some_and(Character::is_alive),
        }
    }

    fn fire(
        &mut self,
        scheduler: &mut KernelScheduler,
        _handle: ActionHandle,
        effect: &KernelEffect,
    ) -> Result<(), KernelError> {
        match effect {
            KernelEffect::Step { actor, direction } => {
                self.step(*actor, *direction);
                Ok(())
            }
            KernelEffect::StandardAttack { attacker, target } => {
                self.standard_attack(scheduler, *attacker, *target)
            }
            KernelEffect::CastSkill { caster, skill } => self.cast_skill(scheduler, *caster, skill),
            KernelEffect::EndCooldown { actor } => {
                self.end_cooldown(*actor);
                Ok(())
            }
            KernelEffect::RemoveCorpse { actor } => {
                self.remove_corpse(*actor);
                Ok(())
            }
            KernelEffect::SpawnSuccessor {
                lineage,
                skill_points,
            } => self.spawn_heir(scheduler, *lineage, *skill_points),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation context
// ---------------------------------------------------------------------------

/// One independent simulation.
pub struct SimulationContext {
    pub(crate) scheduler: KernelScheduler,
    pub(crate) state: KernelState,
}

impl core::fmt::Debug for SimulationContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulationContext")
            .field("world", &self.state.world.name())
            .field("tick", &self.state.clock.tick())
            .field("characters", &self.state.characters.len())
            .field("lineages", &self.state.lineages.len())
            .field("pending_actions", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}

impl SimulationContext {
    /// A context over `world` with no characters.
    pub fn new(world: Box<dyn WorldQuery>, settings: KernelSettings) -> Self {
        Self {
            scheduler: KernelScheduler::new(),
            state: KernelState {
                world,
                characters: BTreeMap::new(),
                occupancy: BTreeMap::new(),
                lineages: LineageTracker::new(),
                registry: RankedRegistry::new(),
                ledger: Ledger::new(),
                events: EventQueue::new(),
                rng: StdRng::seed_from_u64(settings.seed),
                clock: SimulationClock::new(),
                combat: settings.combat,
                lineage_config: settings.lineage,
            },
        }
    }

    // -- Spawning ----------------------------------------------------------

    /// Bring a character into the world.
    ///
    /// Lineal kinds found a new lineage named after the character. Starting
    /// legacy is seeded from the world into the character (beasts) or its
    /// lineage, and recorded in the ledger.
    ///
    /// # Errors
    ///
    /// [`KernelError::SpawnBlocked`] for a taken or impassable tile,
    /// [`KernelError::NoFreeTile`] when the map is full, or a ledger error.
    pub fn spawn(&mut self, request: SpawnRequest) -> Result<CharacterId, KernelError> {
        let position = self.state.claim_tile(request.position)?;
        let tick = self.state.clock.tick();
        let legacy = request.settings.starting_legacy;

        if !request.kind.is_lineal() {
            let archetype = request.kind.archetype(request.settings, None);
            let mut character = Character::new(request.name, archetype, request.class, position);
            character.combat.legacy = legacy;
            let id = character.id;
            if legacy > 0 {
                self.state
                    .ledger
                    .record_seed(tick, LegacyHolder::Character(id), legacy, id)?;
            }
            self.state.admit(character, legacy);
            return Ok(id);
        }

        let lineage = Lineage::new(
            request.name.clone(),
            HeirTemplate {
                kind: request.kind,
                settings: request.settings.clone(),
                class: Arc::clone(&request.class),
            },
        );
        let lineage_id = self.state.lineages.found(lineage);
        let archetype = request.kind.archetype(request.settings, Some(lineage_id));
        let character = Character::new(request.name, archetype, request.class, position);
        let id = character.id;

        let founded = self.state.lineages.get_mut(lineage_id)?;
        founded.update(id)?;
        founded.credit(legacy)?;
        if legacy > 0 {
            self.state
                .ledger
                .record_seed(tick, LegacyHolder::Lineage(lineage_id), legacy, id)?;
        }
        self.state.admit(character, legacy);
        Ok(id)
    }

    /// Schedule the next holder of `lineage` if its holder is dead.
    ///
    /// Returns `false` while the holder lives or a spawn is already pending.
    ///
    /// # Errors
    ///
    /// Unknown lineage or a scheduler error.
    pub fn spawn_successor(&mut self, lineage: LineageId) -> Result<bool, KernelError> {
        self.state.schedule_successor(&mut self.scheduler, lineage)
    }

    // -- Tick --------------------------------------------------------------

    /// Run one tick covering `delta_ms` simulated milliseconds.
    ///
    /// # Errors
    ///
    /// Any invariant violation raised while actions fire, or
    /// [`KernelError::Conservation`] if the tick's ledger entries do not
    /// balance.
    pub fn advance(&mut self, delta_ms: u64) -> Result<TickReport, KernelError> {
        let ledger_mark = self.state.ledger.len();
        let tick = self.state.clock.advance(delta_ms)?;
        let intents = self.apply_policies()?;
        let actions = self.scheduler.advance(delta_ms, &mut self.state)?;
        self.state.settle_activities(&self.scheduler);

        if let ConservationResult::Anomaly(anomaly) = self
            .state
            .ledger
            .verify_conservation_since(tick, ledger_mark)
        {
            warn!(tick, message = anomaly.message, "ledger anomaly");
            return Err(KernelError::Conservation(anomaly));
        }

        Ok(TickReport {
            tick,
            elapsed_ms: self.state.clock.elapsed_ms(),
            actions,
            intents,
            alive: self.alive_count(),
            pending_actions: self.scheduler.len(),
        })
    }

    // -- Triggers ----------------------------------------------------------

    /// Start walking `id` one step, or repeatedly while the path is clear.
    ///
    /// Returns `false` when the character is dead or the next tile is not
    /// open. Replaces the character's current action.
    ///
    /// # Errors
    ///
    /// Unknown character or an attribute resolution failure.
    pub fn move_in_direction(
        &mut self,
        id: CharacterId,
        direction: Direction,
        repeat: bool,
    ) -> Result<bool, KernelError> {
        let character = self.state.character(id)?;
        if !character.is_alive() {
            return Ok(false);
        }
        let open = character
            .position
            .step(direction)
            .is_some_and(|next| self.state.is_open(next));
        if !open {
            return Ok(false);
        }
        let delay_ms = duration_ms(character.move_delay_ms()?).max(1);

        let mut spec = ActionSpec::once(
            delay_ms,
            KernelEffect::Step {
                actor: id,
                direction,
            },
        )
        .valid_while(KernelCheck::CanStep {
            actor: id,
            direction,
        })
        .owned_by(id);
        if repeat {
            spec = spec.repeating();
        }
        self.scheduler.schedule(spec)?;
        self.state.set_activity(id, Activity::Moving);
        Ok(true)
    }

    /// Cancel `id`'s current action; returns whether one was pending.
    ///
    /// # Errors
    ///
    /// Unknown character.
    pub fn cancel_action(&mut self, id: CharacterId) -> Result<bool, KernelError> {
        self.state.character(id)?;
        let cancelled = self.scheduler.cancel_owned(id).is_some();
        self.state.settle_activities(&self.scheduler);
        Ok(cancelled)
    }

    /// Alternate `id` between Attack and Passive (Defend switches to Attack).
    ///
    /// # Errors
    ///
    /// Unknown or dead character.
    pub fn toggle_attack_mode(&mut self, id: CharacterId) -> Result<CombatMode, KernelError> {
        let character = self.living_mut(id)?;
        let mode = character.toggle_attack_mode();
        self.state.events.push(KernelEvent::ModeChanged {
            character: id,
            mode,
        });
        Ok(mode)
    }

    /// Enter Defend, or return to Passive.
    ///
    /// # Errors
    ///
    /// Unknown or dead character.
    pub fn enable_defense(
        &mut self,
        id: CharacterId,
        enabled: bool,
    ) -> Result<CombatMode, KernelError> {
        let character = self.living_mut(id)?;
        let mode = character.enable_defense(enabled);
        self.state.events.push(KernelEvent::ModeChanged {
            character: id,
            mode,
        });
        Ok(mode)
    }

    /// Invest up to `amount` skill points; returns the amount spent.
    ///
    /// Points spent on a passive talent by a lineal character also accrue
    /// successor points for its lineage.
    ///
    /// # Errors
    ///
    /// Unknown or dead character, or a talent the class does not define.
    pub fn invest_in_talent(
        &mut self,
        id: CharacterId,
        talent: &TalentId,
        amount: u32,
    ) -> Result<u32, KernelError> {
        let character = self.state.character_mut(id)?;
        let spent = character.invest_in_talent(talent, amount)?;
        if spent == 0 {
            return Ok(0);
        }
        let passive = character.class.talent(talent)?.is_passive();
        if let (true, Some(lineage)) = (passive, character.lineage()) {
            self.state
                .lineages
                .get_mut(lineage)?
                .increase_successor_points(spent);
        }
        self.state.events.push(KernelEvent::TalentInvested {
            character: id,
            talent: talent.clone(),
            amount: spent,
        });
        Ok(spent)
    }

    /// Points `id` has invested in `talent`.
    ///
    /// # Errors
    ///
    /// Unknown character.
    pub fn get_investment(&self, id: CharacterId, talent: &TalentId) -> Result<u32, KernelError> {
        Ok(self.state.character(id)?.get_investment(talent))
    }

    /// Effective value of `attribute` for `id`.
    ///
    /// # Errors
    ///
    /// Unknown character or an attribute resolution failure.
    pub fn get_affect(&self, id: CharacterId, attribute: &Attribute) -> Result<f64, KernelError> {
        Ok(self.state.character(id)?.get_affect(attribute)?)
    }

    /// Value of `attribute` for `id` after `extra` more points in `talent`.
    ///
    /// # Errors
    ///
    /// Unknown character or an attribute resolution failure.
    pub fn project_affect(
        &self,
        id: CharacterId,
        attribute: &Attribute,
        talent: &TalentId,
        extra: u32,
    ) -> Result<f64, KernelError> {
        Ok(self
            .state
            .character(id)?
            .project_affect(attribute, talent, extra)?)
    }

    // -- Appearance --------------------------------------------------------

    /// Change `id`'s glyph; returns whether it changed.
    ///
    /// # Errors
    ///
    /// Unknown character.
    pub fn set_glyph(&mut self, id: CharacterId, glyph: char) -> Result<bool, KernelError> {
        let changed = self.state.character_mut(id)?.set_glyph(glyph);
        self.publish_appearance(id, changed)
    }

    /// Change `id`'s colour; returns whether it changed.
    ///
    /// # Errors
    ///
    /// Unknown character.
    pub fn set_color(&mut self, id: CharacterId, color: &str) -> Result<bool, KernelError> {
        let changed = self.state.character_mut(id)?.set_color(color);
        self.publish_appearance(id, changed)
    }

    /// Highlight or un-highlight `id`; returns whether it changed.
    ///
    /// # Errors
    ///
    /// Unknown character.
    pub fn set_highlighted(
        &mut self,
        id: CharacterId,
        highlighted: bool,
    ) -> Result<bool, KernelError> {
        let changed = self.state.character_mut(id)?.set_highlighted(highlighted);
        self.publish_appearance(id, changed)
    }

    fn publish_appearance(&mut self, id: CharacterId, changed: bool) -> Result<bool, KernelError> {
        if changed {
            let appearance = self.state.character(id)?.appearance().clone();
            self.state.events.push(KernelEvent::AppearanceChanged {
                character: id,
                appearance,
            });
        }
        Ok(changed)
    }

    fn living_mut(&mut self, id: CharacterId) -> Result<&mut Character, KernelError> {
        let character = self.state.character_mut(id)?;
        if character.is_alive() {
            Ok(character)
        } else {
            Err(dynasty_agents::AgentError::Dead(id).into())
        }
    }

    // -- Observation -------------------------------------------------------

    /// A character, alive or a corpse awaiting removal.
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.state.characters.get(&id)
    }

    /// Every character on the map in identifier order.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.state.characters.values()
    }

    /// The character holding `position`, corpses included.
    pub fn character_at(&self, position: Position) -> Option<CharacterId> {
        self.state.occupancy.get(&position).copied()
    }

    /// Number of living characters.
    pub fn alive_count(&self) -> usize {
        self.state
            .characters
            .values()
            .filter(|character| character.is_alive())
            .count()
    }

    /// Legacy attributed to `id`.
    pub fn legacy_of(&self, id: CharacterId) -> Option<u64> {
        self.state
            .characters
            .get(&id)
            .map(|character| self.state.legacy_of(character))
    }

    /// Read-only view of `id`.
    ///
    /// # Errors
    ///
    /// Unknown character or an attribute resolution failure.
    pub fn snapshot(&self, id: CharacterId) -> Result<CharacterSnapshot, KernelError> {
        let character = self.state.character(id)?;
        Ok(character.snapshot(self.state.legacy_of(character))?)
    }

    /// Read-only views of every character in identifier order.
    ///
    /// # Errors
    ///
    /// An attribute resolution failure.
    pub fn snapshots(&self) -> Result<Vec<CharacterSnapshot>, KernelError> {
        self.state
            .characters
            .values()
            .map(|character| {
                character
                    .snapshot(self.state.legacy_of(character))
                    .map_err(KernelError::from)
            })
            .collect()
    }

    /// A lineage.
    pub fn lineage(&self, id: LineageId) -> Option<&Lineage> {
        self.state.lineages.get(id)
    }

    /// Every lineage.
    pub fn lineages(&self) -> impl Iterator<Item = &Lineage> {
        self.state.lineages.iter()
    }

    /// The leaderboard's first `n` rows.
    pub fn top_n(&self, n: usize) -> Vec<RankedEntry> {
        self.state.registry.top_n(n)
    }

    /// The ranked registry.
    pub const fn registry(&self) -> &RankedRegistry {
        &self.state.registry
    }

    /// The legacy ledger.
    pub const fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    /// The action scheduler.
    pub const fn scheduler(&self) -> &KernelScheduler {
        &self.scheduler
    }

    /// The world map.
    pub fn world(&self) -> &dyn WorldQuery {
        self.state.world.as_ref()
    }

    /// Ticks completed.
    pub const fn tick(&self) -> u64 {
        self.state.clock.tick()
    }

    /// Simulated milliseconds elapsed.
    pub const fn elapsed_ms(&self) -> u64 {
        self.state.clock.elapsed_ms()
    }

    /// Take every pending change notification.
    pub fn drain_events(&mut self) -> Vec<KernelEvent> {
        self.state.events.drain()
    }

    /// Actual legacy per holder right now.
    pub fn holdings(&self) -> BTreeMap<LegacyHolder, u64> {
        self.state.holdings()
    }

    /// Replay the ledger and compare it with live holdings.
    pub fn audit_legacy(&self) -> ConservationResult {
        self.state.ledger.audit(&self.state.holdings())
    }
}
