//! Change notifications for the presentation layer.
//!
//! The kernel never calls into a renderer. State changes that a display
//! cares about are pushed onto an [`EventQueue`] as [`KernelEvent`]s, and
//! the host drains the queue after each tick.

use std::collections::VecDeque;

use dynasty_types::{
    Activity, Appearance, CharacterId, CombatMode, LegacyEntryType, LegacyHolder, LineageId,
    Position, TalentId,
};
use serde::Serialize;

/// Something observable that happened inside the kernel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum KernelEvent {
    /// A character entered the world.
    Spawned {
        /// New character.
        character: CharacterId,
        /// Display name.
        name: String,
        /// Spawn tile.
        position: Position,
        /// Lineage the character holds, if lineal.
        lineage: Option<LineageId>,
    },
    /// A character stepped to a neighbouring tile.
    Moved {
        /// Moving character.
        character: CharacterId,
        /// Previous tile.
        from: Position,
        /// New tile.
        to: Position,
    },
    /// A character's displayed activity changed.
    ActivityChanged {
        /// Affected character.
        character: CharacterId,
        /// New activity.
        activity: Activity,
    },
    /// A character changed combat stance.
    ModeChanged {
        /// Affected character.
        character: CharacterId,
        /// New stance.
        mode: CombatMode,
    },
    /// Damage landed on a character.
    Hit {
        /// Character dealing the damage.
        attacker: CharacterId,
        /// Character receiving it.
        target: CharacterId,
        /// Damage before any reduction.
        damage: f64,
        /// Damage removed by the target's defense.
        reduced: f64,
        /// Target health after the hit.
        remaining_health: f64,
    },
    /// A skill's activation completed and its effects were realized.
    SkillCast {
        /// Casting character.
        caster: CharacterId,
        /// Skill name.
        skill: String,
    },
    /// Health was restored.
    Healed {
        /// Healed character.
        character: CharacterId,
        /// Health actually restored.
        amount: f64,
    },
    /// A post-cast lockout ended.
    CooldownEnded {
        /// Character leaving cooldown.
        character: CharacterId,
    },
    /// Skill points were invested in a talent.
    TalentInvested {
        /// Investing character.
        character: CharacterId,
        /// Talent invested in.
        talent: TalentId,
        /// Points actually spent.
        amount: u32,
    },
    /// A character's health reached zero.
    Died {
        /// Dead character.
        character: CharacterId,
        /// Character whose damage killed it.
        killer: Option<CharacterId>,
    },
    /// Legacy moved between holders.
    LegacyTransferred {
        /// Debited holder.
        from: LegacyHolder,
        /// Credited holder.
        to: LegacyHolder,
        /// Points moved.
        amount: u64,
        /// Category of movement.
        entry_type: LegacyEntryType,
    },
    /// A corpse was removed from the map.
    CorpseRemoved {
        /// Removed character.
        character: CharacterId,
        /// Tile it freed.
        position: Position,
    },
    /// A lineage scheduled the spawn of its next holder.
    SuccessorScheduled {
        /// Lineage.
        lineage: LineageId,
        /// Milliseconds until the spawn.
        delay_ms: u64,
        /// Skill points the successor will receive from the lineage.
        skill_points: u32,
    },
    /// A lineage's new holder entered the world.
    SuccessorSpawned {
        /// Lineage.
        lineage: LineageId,
        /// New holder.
        character: CharacterId,
        /// Generation of the new holder (founder is 1).
        generation: u32,
    },
    /// A character's display attributes changed.
    AppearanceChanged {
        /// Affected character.
        character: CharacterId,
        /// New appearance.
        appearance: Appearance,
    },
}

/// FIFO buffer of [`KernelEvent`]s awaiting the host.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    pending: VecDeque<KernelEvent>,
}

impl EventQueue {
    /// An empty queue.
    pub const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Append an event.
    pub fn push(&mut self, event: KernelEvent) {
        self.pending.push_back(event);
    }

    /// Number of undelivered events.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<KernelEvent> {
        self.pending.drain(..).collect()
    }
}
