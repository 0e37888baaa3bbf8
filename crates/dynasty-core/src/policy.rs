//! Automated behaviour for non-player characters.
//!
//! Once per tick, before the scheduler advances, every living character
//! whose [`AiPolicy`] is not `Controlled` and that has no action pending
//! picks one:
//!
//! - `Wander` steps to a random open neighbouring tile.
//! - `Aggressive` attacks an adjacent living character (its current target
//!   first), entering Attack mode if needed, and wanders otherwise.
//!
//! Characters are visited in identifier order and every random choice
//! draws from the context's seeded generator, so a run is reproducible.

use dynasty_types::{AiPolicy, CharacterId, CombatMode, Direction};
use rand::seq::IndexedRandom;
use tracing::trace;

use crate::context::SimulationContext;
use crate::error::KernelError;
use crate::events::KernelEvent;

impl SimulationContext {
    /// Let idle NPCs choose actions; returns how many started one.
    pub(crate) fn apply_policies(&mut self) -> Result<u32, KernelError> {
        let idle: Vec<(CharacterId, AiPolicy)> = self
            .state
            .characters
            .values()
            .filter(|character| {
                character.is_alive()
                    && character.ai != AiPolicy::Controlled
                    && self.scheduler.primary_of(character.id).is_none()
            })
            .map(|character| (character.id, character.ai))
            .collect();

        let mut intents: u32 = 0;
        for (id, policy) in idle {
            let acted = match policy {
                AiPolicy::Controlled => false,
                AiPolicy::Wander => self.wander(id)?,
                AiPolicy::Aggressive => self.engage(id)? || self.wander(id)?,
            };
            if acted {
                intents = intents.saturating_add(1);
            }
        }
        Ok(intents)
    }

    /// Take a single step in a random open direction.
    fn wander(&mut self, id: CharacterId) -> Result<bool, KernelError> {
        let origin = self.state.character(id)?.position;
        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| {
                origin
                    .step(*direction)
                    .is_some_and(|next| self.state.is_open(next))
            })
            .collect();
        let Some(direction) = open.choose(&mut self.state.rng).copied() else {
            return Ok(false);
        };
        trace!(character = %id, ?direction, "wandering");
        self.move_in_direction(id, direction, false)
    }

    /// Attack an adjacent living character, preferring the current target.
    fn engage(&mut self, id: CharacterId) -> Result<bool, KernelError> {
        let character = self.state.character(id)?;
        if character.combat.cooling_down {
            return Ok(false);
        }
        let origin = character.position;
        let current = character.combat.target;
        let adjacent: Vec<CharacterId> = Direction::ALL
            .into_iter()
            .filter_map(|direction| origin.step(direction))
            .filter_map(|tile| self.state.occupancy.get(&tile).copied())
            .filter(|other| {
                self.state
                    .characters
                    .get(other)
                    .is_some_and(|other| other.is_alive())
            })
            .collect();
        let Some(target) = current
            .filter(|target| adjacent.contains(target))
            .or_else(|| adjacent.first().copied())
        else {
            return Ok(false);
        };

        let character = self.state.character_mut(id)?;
        if character.combat.mode != CombatMode::Attack {
            character.combat.mode = CombatMode::Attack;
            self.state.events.push(KernelEvent::ModeChanged {
                character: id,
                mode: CombatMode::Attack,
            });
        }
        trace!(character = %id, %target, "engaging");
        self.perform_standard_attack(id, target)
    }
}
