//! Enumeration types for the Dynasty kernel.
//!
//! Every enumeration here is exhaustive: dispatch over these types is done
//! with `match` and no wildcard arm, so adding a variant is a compile error
//! everywhere it is not yet handled.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Attribute engine
// ---------------------------------------------------------------------------

/// Tag identifying *what* a numeric effect modifies.
///
/// An attribute declares the set of aspects it is subject to; a talent
/// declares the single aspect it influences. The resolver joins the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Aspect {
    // --- Vitals ---
    /// Maximum health.
    MaxHealth,

    // --- Standard attack ---
    /// Damage dealt by a standard attack.
    AttackDamage,
    /// Milliseconds between standard attacks.
    AttackInterval,
    /// Fraction of incoming damage removed while defending.
    DefenseDamageReduction,

    // --- Movement ---
    /// Milliseconds needed to step onto an adjacent tile.
    MoveDelay,

    // --- Skills ---
    /// Pre-cast delay of every skill.
    Activation,
    /// Post-cast lockout of every skill.
    Cooldown,
    /// Reach of area skills, in tiles.
    AreaRadius,
    /// Reach of targeted skills, in tiles.
    Range,
    /// Healing done by restorative skills.
    Healing,

    // --- Elemental damage ---
    /// Lightning skill damage.
    LightningDamage,
    /// Fire skill damage.
    FireDamage,
    /// Frost skill damage.
    FrostDamage,
}

impl Aspect {
    /// Every aspect, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::MaxHealth,
        Self::AttackDamage,
        Self::AttackInterval,
        Self::DefenseDamageReduction,
        Self::MoveDelay,
        Self::Activation,
        Self::Cooldown,
        Self::AreaRadius,
        Self::Range,
        Self::Healing,
        Self::LightningDamage,
        Self::FireDamage,
        Self::FrostDamage,
    ];

    /// Canonical name, as authored in configuration.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MaxHealth => "MaxHealth",
            Self::AttackDamage => "AttackDamage",
            Self::AttackInterval => "AttackInterval",
            Self::DefenseDamageReduction => "DefenseDamageReduction",
            Self::MoveDelay => "MoveDelay",
            Self::Activation => "Activation",
            Self::Cooldown => "Cooldown",
            Self::AreaRadius => "AreaRadius",
            Self::Range => "Range",
            Self::Healing => "Healing",
            Self::LightningDamage => "LightningDamage",
            Self::FireDamage => "FireDamage",
            Self::FrostDamage => "FrostDamage",
        }
    }
}

/// How a talent's computed effect is folded into an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Purpose {
    /// Added to the additive total.
    Add,
    /// Added to the scale total.
    ScaleUp,
    /// Subtracted from the scale total.
    ScaleDown,
    /// Subtracted from the additive total.
    Subtract,
}

/// The two talent variants a class can define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TalentKind {
    /// An active concept (e.g. a school of magic).
    Concept,
    /// A passive trait. Investing in passives accrues successor points.
    Passive,
}

// ---------------------------------------------------------------------------
// Movement and combat
// ---------------------------------------------------------------------------

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// Row minus one.
    North,
    /// Column plus one.
    East,
    /// Row plus one.
    South,
    /// Column minus one.
    West,
}

impl Direction {
    /// Every direction, clockwise from north.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// `(row, col)` offset of one step in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::East => (0, 1),
            Self::South => (1, 0),
            Self::West => (0, -1),
        }
    }
}

/// A character's combat stance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CombatMode {
    /// Neither attacking nor defending.
    #[default]
    Passive,
    /// Standard attacks are allowed to run.
    Attack,
    /// Incoming standard-attack damage is reduced.
    Defend,
}

/// Automated behaviour for non-player characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AiPolicy {
    /// Driven by input; the kernel never acts on its behalf.
    #[default]
    Controlled,
    /// Takes a random single step whenever idle.
    Wander,
    /// Attacks an adjacent living character when idle, otherwise wanders.
    Aggressive,
}

/// What a character is currently doing, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Activity {
    /// No action outstanding.
    #[default]
    Idle,
    /// Walking.
    Moving,
    /// Running standard attacks against a target.
    Attacking,
    /// Channelling a skill.
    Casting,
    /// Locked out after a cast.
    Recovering,
    /// Health reached zero.
    Dead,
}

impl core::fmt::Display for Activity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Moving => write!(f, "moving"),
            Self::Attacking => write!(f, "attacking"),
            Self::Casting => write!(f, "casting"),
            Self::Recovering => write!(f, "recovering"),
            Self::Dead => write!(f, "dead"),
        }
    }
}

// ---------------------------------------------------------------------------
// Legacy ledger
// ---------------------------------------------------------------------------

/// Category of a legacy ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LegacyEntryType {
    /// Starting legacy entering the simulation when a character spawns.
    Seed,
    /// The entire legacy of a slain non-lineal character.
    Bounty,
    /// Half of the legacy of a slain lineal character.
    Tribute,
}

/// The kind of party that can hold legacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum HolderType {
    /// The world itself (source of seeded legacy).
    World,
    /// A non-lineal character holding legacy directly.
    Character,
    /// A lineage holding legacy on behalf of its characters.
    Lineage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_offsets_are_unit_steps() {
        for direction in Direction::ALL {
            let (dr, dc) = direction.offset();
            assert_eq!(dr.abs() + dc.abs(), 1, "{direction:?}");
        }
    }

    #[test]
    fn aspect_names_are_unique() {
        let mut names: Vec<&str> = Aspect::ALL.iter().map(|a| a.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Aspect::ALL.len());
    }

    #[test]
    fn default_mode_is_passive() {
        assert_eq!(CombatMode::default(), CombatMode::Passive);
        assert_eq!(Activity::default().to_string(), "idle");
    }
}
