//! Effect and validity payloads the kernel schedules.
//!
//! Every timed thing in the simulation is one of these values sitting in
//! the [`KernelScheduler`]; [`SimulationContext`](crate::SimulationContext)
//! interprets them when they fire.

use dynasty_types::{CharacterId, Direction, LineageId};

use crate::scheduler::ActionScheduler;

/// The scheduler instantiated with kernel payloads.
pub type KernelScheduler = ActionScheduler<KernelEffect, KernelCheck>;

/// Work performed when an action fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelEffect {
    /// Move `actor` one tile in `direction`.
    Step {
        /// Moving character.
        actor: CharacterId,
        /// Direction of travel.
        direction: Direction,
    },
    /// One standard attack swing.
    StandardAttack {
        /// Attacking character.
        attacker: CharacterId,
        /// Attacked character.
        target: CharacterId,
    },
    /// Realize a skill whose activation has completed.
    CastSkill {
        /// Casting character.
        caster: CharacterId,
        /// Skill name within the caster's class.
        skill: String,
    },
    /// Lift a post-cast lockout.
    EndCooldown {
        /// Character in cooldown.
        actor: CharacterId,
    },
    /// Clear a corpse from the map.
    RemoveCorpse {
        /// Dead character.
        actor: CharacterId,
    },
    /// Bring a lineage's next holder into the world.
    SpawnSuccessor {
        /// Lineage to continue.
        lineage: LineageId,
        /// Skill points carried over from the predecessor's passive investments.
        skill_points: u32,
    },
}

/// Conditions re-checked every tick while an action is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelCheck {
    /// Actor alive and the next tile in `direction` open.
    CanStep {
        /// Moving character.
        actor: CharacterId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Attacker alive in Attack mode, still targeting a living, adjacent target.
    AttackEngaged {
        /// Attacking character.
        attacker: CharacterId,
        /// Attacked character.
        target: CharacterId,
    },
    /// The character is alive.
    Alive {
        /// Character that must stay alive.
        actor: CharacterId,
    },
}
