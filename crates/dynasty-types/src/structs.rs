//! Core data structs shared across the kernel and its collaborators.
//!
//! Archetype settings, grid positions, legacy holders and ledger entries,
//! plus the read-only snapshot types the presentation layer polls each tick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Activity, AiPolicy, CombatMode, Direction, HolderType, LegacyEntryType};
use crate::ids::{CharacterId, LedgerEntryId, LineageId};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A tile coordinate on the world grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Row index (north is smaller).
    pub row: i32,
    /// Column index (west is smaller).
    pub col: i32,
}

impl Position {
    /// Create a position from a row and column.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The tile one step away in `direction`, or `None` on coordinate overflow.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dr, dc) = direction.offset();
        Some(Self {
            row: self.row.checked_add(dr)?,
            col: self.col.checked_add(dc)?,
        })
    }

    /// Whether `other` is exactly one orthogonal step away.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }

    /// Manhattan distance between two tiles.
    pub fn manhattan(self, other: Self) -> u32 {
        self.row
            .abs_diff(other.row)
            .saturating_add(self.col.abs_diff(other.col))
    }

    /// Chebyshev (king-move) distance between two tiles.
    pub fn chebyshev(self, other: Self) -> u32 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Archetype settings
// ---------------------------------------------------------------------------

/// Initial stats, glyphs and AI of a character archetype.
///
/// Supplied by the configuration loader; the kernel only reads it. Each
/// numeric stat becomes the base value of the matching derived attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BaseSettings {
    /// Base maximum health.
    #[serde(default = "default_max_health")]
    pub max_health: f64,
    /// Base standard-attack damage.
    #[serde(default = "default_attack_damage")]
    pub attack_damage: f64,
    /// Base milliseconds between standard attacks.
    #[serde(default = "default_attack_interval_ms")]
    pub attack_interval_ms: f64,
    /// Base fraction of damage removed while defending (0.0 to 1.0).
    #[serde(default = "default_defense_damage_reduction")]
    pub defense_damage_reduction: f64,
    /// Base milliseconds per step.
    #[serde(default = "default_move_delay_ms")]
    pub move_delay_ms: f64,
    /// Legacy the character enters the world with.
    #[serde(default)]
    pub starting_legacy: u64,
    /// Skill points the character enters the world with.
    #[serde(default)]
    pub starting_skill_points: u32,
    /// Display glyph.
    #[serde(default = "default_glyph")]
    pub glyph: char,
    /// Display colour name.
    #[serde(default = "default_color")]
    pub color: String,
    /// Automated behaviour.
    #[serde(default)]
    pub ai: AiPolicy,
}

impl Default for BaseSettings {
    fn default() -> Self {
        Self {
            max_health: default_max_health(),
            attack_damage: default_attack_damage(),
            attack_interval_ms: default_attack_interval_ms(),
            defense_damage_reduction: default_defense_damage_reduction(),
            move_delay_ms: default_move_delay_ms(),
            starting_legacy: 0,
            starting_skill_points: 0,
            glyph: default_glyph(),
            color: default_color(),
            ai: AiPolicy::default(),
        }
    }
}

const fn default_max_health() -> f64 {
    20.0
}

const fn default_attack_damage() -> f64 {
    4.0
}

const fn default_attack_interval_ms() -> f64 {
    3000.0
}

const fn default_defense_damage_reduction() -> f64 {
    0.2
}

const fn default_move_delay_ms() -> f64 {
    500.0
}

const fn default_glyph() -> char {
    '@'
}

fn default_color() -> String {
    String::from("white")
}

/// Display attributes of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Appearance {
    /// Display glyph.
    pub glyph: char,
    /// Display colour name.
    pub color: String,
    /// Whether the character is highlighted (e.g. selected).
    pub highlighted: bool,
}

// ---------------------------------------------------------------------------
// Legacy
// ---------------------------------------------------------------------------

/// The party that owns a legacy balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LegacyHolder {
    /// The world, source of seeded legacy.
    World,
    /// A non-lineal character.
    Character(CharacterId),
    /// A lineage.
    Lineage(LineageId),
}

impl LegacyHolder {
    /// The kind of this holder.
    pub const fn holder_type(self) -> HolderType {
        match self {
            Self::World => HolderType::World,
            Self::Character(_) => HolderType::Character,
            Self::Lineage(_) => HolderType::Lineage,
        }
    }
}

/// A single recorded legacy movement (double-entry: debit `from`, credit `to`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LegacyEntry {
    /// Entry identifier.
    pub id: LedgerEntryId,
    /// Tick during which the movement happened.
    pub tick: u64,
    /// Category of movement.
    pub entry_type: LegacyEntryType,
    /// Debited holder.
    pub from: LegacyHolder,
    /// Credited holder.
    pub to: LegacyHolder,
    /// Points moved (always positive).
    pub amount: u64,
    /// Human-readable reason (e.g. `"SPAWN"`, `"KILL"`).
    pub reason: String,
    /// Character whose death or spawn caused the movement, if any.
    pub subject: Option<CharacterId>,
    /// Wall-clock time the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Observable state
// ---------------------------------------------------------------------------

/// Read-only view of a character for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CharacterSnapshot {
    /// Character identifier.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Current tile.
    pub position: Position,
    /// Current health.
    pub current_health: f64,
    /// Resolved maximum health.
    pub max_health: f64,
    /// Legacy attributed to the character (its lineage's, if lineal).
    pub legacy: u64,
    /// Unspent skill points.
    pub skill_points: f64,
    /// Combat stance.
    pub mode: CombatMode,
    /// Current activity.
    pub activity: Activity,
    /// Whether the character is alive.
    pub alive: bool,
    /// Display attributes.
    pub appearance: Appearance,
    /// Lineage the character belongs to, if lineal.
    pub lineage: Option<LineageId>,
}

/// One row of the legacy leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RankedEntry {
    /// One-based rank.
    pub rank: u32,
    /// Character identifier.
    pub character: CharacterId,
    /// Display name.
    pub name: String,
    /// Legacy points.
    pub legacy: u64,
}

/// Read-only view of a lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LineageSnapshot {
    /// Lineage identifier.
    pub id: LineageId,
    /// Family name.
    pub name: String,
    /// Current legacy.
    pub legacy: u64,
    /// All-time legacy high-water mark.
    pub record: u64,
    /// Number of holders so far (1 for the founder).
    pub generation: u32,
    /// Current holder, alive or dead.
    pub holder: Option<CharacterId>,
    /// Whether a successor spawn is scheduled.
    pub successor_pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_four_directional() {
        let origin = Position::new(5, 5);
        assert!(origin.is_adjacent(Position::new(4, 5)));
        assert!(origin.is_adjacent(Position::new(5, 6)));
        assert!(!origin.is_adjacent(Position::new(6, 6)));
        assert!(!origin.is_adjacent(origin));
    }

    #[test]
    fn step_follows_direction_offsets() {
        let origin = Position::new(2, 2);
        assert_eq!(origin.step(Direction::North), Some(Position::new(1, 2)));
        assert_eq!(origin.step(Direction::West), Some(Position::new(2, 1)));
        assert_eq!(Position::new(i32::MAX, 0).step(Direction::South), None);
    }

    #[test]
    fn chebyshev_counts_diagonals_once() {
        assert_eq!(Position::new(0, 0).chebyshev(Position::new(2, 3)), 3);
        assert_eq!(Position::new(0, 0).manhattan(Position::new(2, 3)), 5);
    }

    #[test]
    fn base_settings_defaults_from_empty_json() {
        let parsed: Result<BaseSettings, _> = serde_json::from_str("{}");
        assert_eq!(parsed.ok(), Some(BaseSettings::default()));
    }

    #[test]
    fn holder_types() {
        assert_eq!(LegacyHolder::World.holder_type(), HolderType::World);
        assert_eq!(
            LegacyHolder::Lineage(LineageId::new()).holder_type(),
            HolderType::Lineage
        );
    }
}
