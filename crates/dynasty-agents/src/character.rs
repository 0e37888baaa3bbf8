//! Characters: actors with position, investments and combat state.
//!
//! A [`Character`] is built from an [`Archetype`], a data description that
//! pairs the archetype tag (`Beast`, `ItemUser`, `Player`) with its
//! [`BaseSettings`]. Every base stat becomes a derived [`Attribute`] subject
//! to the matching [`Aspect`], so talents modify health, attack damage and
//! timing through the same resolver that skills use.
//!
//! Health is the only combat quantity stored directly; everything else is
//! resolved on read. The invariant `current_health <= max_health` is
//! re-established whenever an investment could lower max health.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dynasty_types::{
    Activity, AiPolicy, Appearance, Aspect, BaseSettings, CharacterId, CharacterSnapshot,
    CombatMode, LegacyHolder, LineageId, Position, TalentId,
};

use crate::attributes::Attribute;
use crate::class::Class;
use crate::error::AgentError;
use crate::investments::Investments;
use crate::resolver::AttributeResolver;

// ---------------------------------------------------------------------------
// Archetype
// ---------------------------------------------------------------------------

/// Data description of what kind of character this is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Archetype {
    /// A non-lineal creature. Owns its legacy directly.
    Beast(BaseSettings),
    /// A lineal NPC. Its legacy belongs to its lineage.
    ItemUser {
        /// Lineage the character holds.
        lineage: LineageId,
        /// Initial stats.
        settings: BaseSettings,
    },
    /// A lineal, player-controlled character.
    Player {
        /// Lineage the character holds.
        lineage: LineageId,
        /// Initial stats.
        settings: BaseSettings,
    },
}

impl Archetype {
    /// The archetype's initial stats.
    pub const fn settings(&self) -> &BaseSettings {
        match self {
            Self::Beast(settings)
            | Self::ItemUser { settings, .. }
            | Self::Player { settings, .. } => settings,
        }
    }

    /// The lineage this archetype is bound to, if any.
    pub const fn lineage(&self) -> Option<LineageId> {
        match self {
            Self::Beast(_) => None,
            Self::ItemUser { lineage, .. } | Self::Player { lineage, .. } => Some(*lineage),
        }
    }

    /// Short tag for logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Beast(_) => "beast",
            Self::ItemUser { .. } => "item_user",
            Self::Player { .. } => "player",
        }
    }
}

// ---------------------------------------------------------------------------
// Derived attributes
// ---------------------------------------------------------------------------

/// The base-stat attributes every character declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedAttributes {
    /// Maximum health.
    pub max_health: Attribute,
    /// Standard attack damage.
    pub attack_damage: Attribute,
    /// Milliseconds between standard attacks.
    pub attack_interval: Attribute,
    /// Fraction of incoming damage removed while defending.
    pub defense_damage_reduction: Attribute,
    /// Milliseconds per step.
    pub move_delay: Attribute,
}

impl DerivedAttributes {
    /// Declare the derived attributes from archetype settings.
    pub fn from_settings(settings: &BaseSettings) -> Self {
        Self {
            max_health: Attribute::new("Max Health", settings.max_health)
                .with_aspect(Aspect::MaxHealth),
            attack_damage: Attribute::new("Attack Damage", settings.attack_damage)
                .with_aspect(Aspect::AttackDamage),
            attack_interval: Attribute::new("Attack Interval", settings.attack_interval_ms)
                .with_aspect(Aspect::AttackInterval),
            defense_damage_reduction: Attribute::new(
                "Defense",
                settings.defense_damage_reduction,
            )
            .with_aspect(Aspect::DefenseDamageReduction),
            move_delay: Attribute::new("Move Delay", settings.move_delay_ms)
                .with_aspect(Aspect::MoveDelay),
        }
    }
}

// ---------------------------------------------------------------------------
// Combat state
// ---------------------------------------------------------------------------

/// Mutable combat bookkeeping for one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    /// Current health. At or below zero the character is dead.
    pub current_health: f64,
    /// Legacy owned directly (non-lineal characters only).
    pub legacy: u64,
    /// Unspent skill points.
    pub skill_points: f64,
    /// Combat stance.
    pub mode: CombatMode,
    /// Character currently being attacked.
    pub target: Option<CharacterId>,
    /// Standard attacks landed since the last skill cast.
    pub consecutive_attacks: u32,
    /// Whether a post-cast lockout is running.
    pub cooling_down: bool,
    /// Whether the character is alive.
    pub alive: bool,
}

// ---------------------------------------------------------------------------
// Character
// ---------------------------------------------------------------------------

/// An actor in the simulation.
#[derive(Debug, Clone)]
pub struct Character {
    /// Unique identifier.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Archetype description.
    pub archetype: Archetype,
    /// Talent and skill catalogue.
    pub class: Arc<Class>,
    /// Current tile.
    pub position: Position,
    /// Combat bookkeeping.
    pub combat: CombatState,
    /// Current activity, for display.
    pub activity: Activity,
    /// Automated behaviour.
    pub ai: AiPolicy,
    appearance: Appearance,
    investments: Investments,
    attributes: DerivedAttributes,
}

impl Character {
    /// Create a living character at full base health.
    pub fn new(
        name: impl Into<String>,
        archetype: Archetype,
        class: Arc<Class>,
        position: Position,
    ) -> Self {
        let settings = archetype.settings();
        let attributes = DerivedAttributes::from_settings(settings);
        let combat = CombatState {
            current_health: settings.max_health,
            legacy: 0,
            skill_points: f64::from(settings.starting_skill_points),
            mode: CombatMode::Passive,
            target: None,
            consecutive_attacks: 0,
            cooling_down: false,
            alive: true,
        };
        let appearance = Appearance {
            glyph: settings.glyph,
            color: settings.color.clone(),
            highlighted: false,
        };
        let ai = settings.ai;
        Self {
            id: CharacterId::new(),
            name: name.into(),
            archetype,
            class,
            position,
            combat,
            activity: Activity::Idle,
            ai,
            appearance,
            investments: Investments::new(),
            attributes,
        }
    }

    /// Whether the character is alive.
    pub const fn is_alive(&self) -> bool {
        self.combat.alive
    }

    /// The lineage this character holds, if lineal.
    pub const fn lineage(&self) -> Option<LineageId> {
        self.archetype.lineage()
    }

    /// The party that owns this character's legacy.
    pub const fn legacy_holder(&self) -> LegacyHolder {
        match self.archetype.lineage() {
            Some(lineage) => LegacyHolder::Lineage(lineage),
            None => LegacyHolder::Character(self.id),
        }
    }

    /// Display attributes.
    pub const fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    /// Declared base-stat attributes.
    pub const fn attributes(&self) -> &DerivedAttributes {
        &self.attributes
    }

    /// Current investments.
    pub const fn investments(&self) -> &Investments {
        &self.investments
    }

    // -- Talent investment -------------------------------------------------

    /// Invest up to `amount` skill points in `talent`.
    ///
    /// The amount is clamped to the whole skill points available; the
    /// actual amount spent is returned. Investing in a talent that can lower
    /// max health re-clamps current health.
    ///
    /// # Errors
    ///
    /// [`AgentError::Dead`] for a dead character, [`AgentError::UnknownTalent`]
    /// if the class does not define `talent`.
    pub fn invest_in_talent(&mut self, talent: &TalentId, amount: u32) -> Result<u32, AgentError> {
        if !self.is_alive() {
            return Err(AgentError::Dead(self.id));
        }
        let class = Arc::clone(&self.class);
        let definition = class.talent(talent)?;
        let spent = amount.min(whole_points(self.combat.skill_points));
        if spent == 0 {
            return Ok(0);
        }
        self.investments.invest(definition, spent)?;
        self.combat.skill_points -= f64::from(spent);
        if definition.aspect() == Aspect::MaxHealth {
            self.clamp_health()?;
        }
        debug!(
            character = %self.id,
            talent = %talent,
            spent,
            remaining = self.combat.skill_points,
            "talent investment"
        );
        Ok(spent)
    }

    /// Points invested in `talent`.
    pub fn get_investment(&self, talent: &TalentId) -> u32 {
        self.investments.investment(talent)
    }

    /// Effective value of `attribute` under this character's investments.
    pub fn get_affect(&self, attribute: &Attribute) -> Result<f64, AgentError> {
        AttributeResolver::new(&self.class).resolve(attribute, &self.investments)
    }

    /// Value of `attribute` after a hypothetical extra investment.
    pub fn project_affect(
        &self,
        attribute: &Attribute,
        talent: &TalentId,
        extra: u32,
    ) -> Result<f64, AgentError> {
        AttributeResolver::new(&self.class).project(attribute, &self.investments, talent, extra)
    }

    /// Add skill points (awarded for dealing or taking damage).
    pub fn grant_skill_points(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.combat.skill_points += amount;
        }
    }

    // -- Resolved stats ----------------------------------------------------

    /// Resolved maximum health.
    pub fn max_health(&self) -> Result<f64, AgentError> {
        self.get_affect(&self.attributes.max_health)
    }

    /// Resolved standard attack damage.
    pub fn attack_damage(&self) -> Result<f64, AgentError> {
        self.get_affect(&self.attributes.attack_damage)
    }

    /// Resolved attack interval in milliseconds.
    pub fn attack_interval_ms(&self) -> Result<f64, AgentError> {
        self.get_affect(&self.attributes.attack_interval)
    }

    /// Resolved defense reduction, clamped to `0.0..=1.0`.
    pub fn defense_damage_reduction(&self) -> Result<f64, AgentError> {
        Ok(self
            .get_affect(&self.attributes.defense_damage_reduction)?
            .clamp(0.0, 1.0))
    }

    /// Resolved step delay in milliseconds.
    pub fn move_delay_ms(&self) -> Result<f64, AgentError> {
        self.get_affect(&self.attributes.move_delay)
    }

    // -- Health ------------------------------------------------------------

    /// Subtract `amount` from current health.
    ///
    /// Returns `true` if this hit killed the character. Hits on a dead
    /// character are ignored.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.combat.current_health -= amount.max(0.0);
        if self.combat.current_health <= 0.0 {
            self.combat.alive = false;
            self.combat.target = None;
            self.combat.cooling_down = false;
            self.activity = Activity::Dead;
            return true;
        }
        false
    }

    /// Restore up to `amount` health, returning the health actually restored.
    pub fn heal(&mut self, amount: f64) -> Result<f64, AgentError> {
        if !self.is_alive() || amount <= 0.0 {
            return Ok(0.0);
        }
        let max = self.max_health()?;
        let before = self.combat.current_health;
        self.combat.current_health = (before + amount).min(max).max(before);
        Ok(self.combat.current_health - before)
    }

    fn clamp_health(&mut self) -> Result<(), AgentError> {
        let max = self.max_health()?;
        if self.combat.current_health > max {
            self.combat.current_health = max;
        }
        Ok(())
    }

    // -- Stance ------------------------------------------------------------

    /// Toggle between `Attack` and `Passive`; `Defend` switches to `Attack`.
    pub const fn toggle_attack_mode(&mut self) -> CombatMode {
        self.combat.mode = match self.combat.mode {
            CombatMode::Attack => CombatMode::Passive,
            CombatMode::Passive | CombatMode::Defend => CombatMode::Attack,
        };
        self.combat.mode
    }

    /// Enter `Defend`, or return to `Passive` when disabling.
    pub const fn enable_defense(&mut self, enabled: bool) -> CombatMode {
        self.combat.mode = if enabled {
            CombatMode::Defend
        } else {
            CombatMode::Passive
        };
        self.combat.mode
    }

    // -- Appearance --------------------------------------------------------

    /// Change the glyph; returns whether it changed.
    pub fn set_glyph(&mut self, glyph: char) -> bool {
        let changed = self.appearance.glyph != glyph;
        self.appearance.glyph = glyph;
        changed
    }

    /// Change the colour; returns whether it changed.
    pub fn set_color(&mut self, color: &str) -> bool {
        if self.appearance.color == color {
            return false;
        }
        color.clone_into(&mut self.appearance.color);
        true
    }

    /// Change highlighting; returns whether it changed.
    pub const fn set_highlighted(&mut self, highlighted: bool) -> bool {
        let changed = self.appearance.highlighted != highlighted;
        self.appearance.highlighted = highlighted;
        changed
    }

    // -- Observation -------------------------------------------------------

    /// Read-only view for the presentation layer. `legacy` is supplied by
    /// the caller because lineal legacy lives on the lineage.
    pub fn snapshot(&self, legacy: u64) -> Result<CharacterSnapshot, AgentError> {
        Ok(CharacterSnapshot {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            current_health: self.combat.current_health,
            max_health: self.max_health()?,
            legacy,
            skill_points: self.combat.skill_points,
            mode: self.combat.mode,
            activity: self.activity,
            alive: self.is_alive(),
            appearance: self.appearance.clone(),
            lineage: self.lineage(),
        })
    }
}

/// Whole points in a non-negative fractional balance.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_points(balance: f64) -> u32 {
    if balance.is_finite() && balance > 0.0 {
        balance.floor().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dynasty_types::{Purpose, TalentKind};

    use super::*;
    use crate::attributes::Influence;
    use crate::talents::{Algorithm, Talent};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn class() -> Arc<Class> {
        let mut class = Class::new("Warden");
        class
            .add_talent(Talent::new(
                "Vigor",
                TalentKind::Passive,
                Algorithm::Linear { per_point: 0.1 },
                Influence::new(Aspect::MaxHealth, Purpose::Add),
            ))
            .unwrap();
        class
            .add_talent(Talent::new(
                "Gaunt",
                TalentKind::Concept,
                Algorithm::Linear { per_point: 1.0 },
                Influence::new(Aspect::MaxHealth, Purpose::Subtract),
            ))
            .unwrap();
        Arc::new(class)
    }

    fn beast(skill_points: u32) -> Character {
        let settings = BaseSettings {
            starting_skill_points: skill_points,
            ..BaseSettings::default()
        };
        Character::new("Wolf", Archetype::Beast(settings), class(), Position::new(0, 0))
    }

    #[test]
    fn new_character_starts_at_base_health() {
        let wolf = beast(0);
        assert!(wolf.is_alive());
        assert!(approx(wolf.combat.current_health, 20.0));
        assert!(approx(wolf.max_health().unwrap(), 20.0));
        assert_eq!(wolf.legacy_holder(), LegacyHolder::Character(wolf.id));
        assert_eq!(wolf.appearance().glyph, '@');
    }

    #[test]
    fn investment_is_clamped_to_available_points() {
        let mut wolf = beast(12);
        let spent = wolf.invest_in_talent(&TalentId::new("Vigor"), 20).unwrap();
        assert_eq!(spent, 12);
        assert_eq!(wolf.get_investment(&TalentId::new("Vigor")), 12);
        assert!(approx(wolf.combat.skill_points, 0.0));
        assert_eq!(wolf.invest_in_talent(&TalentId::new("Vigor"), 5).unwrap(), 0);
    }

    #[test]
    fn fractional_points_only_spend_whole_units() {
        let mut wolf = beast(0);
        wolf.grant_skill_points(3.2);
        assert_eq!(wolf.invest_in_talent(&TalentId::new("Vigor"), 10).unwrap(), 3);
        assert!(approx(wolf.combat.skill_points, 0.2));
    }

    #[test]
    fn lowering_max_health_clamps_current() {
        let mut wolf = beast(5);
        wolf.invest_in_talent(&TalentId::new("Gaunt"), 5).unwrap();
        assert!(approx(wolf.max_health().unwrap(), 15.0));
        assert!(approx(wolf.combat.current_health, 15.0));
    }

    #[test]
    fn damage_kills_at_zero() {
        let mut wolf = beast(0);
        assert!(!wolf.take_damage(19.0));
        assert!(wolf.take_damage(1.0));
        assert!(!wolf.is_alive());
        assert_eq!(wolf.activity, Activity::Dead);
        // Further hits are ignored.
        assert!(!wolf.take_damage(5.0));
        assert!(matches!(
            wolf.invest_in_talent(&TalentId::new("Vigor"), 1),
            Err(AgentError::Dead(_))
        ));
    }

    #[test]
    fn healing_clamps_to_max() {
        let mut wolf = beast(0);
        wolf.take_damage(5.0);
        assert!(approx(wolf.heal(3.0).unwrap(), 3.0));
        assert!(approx(wolf.heal(10.0).unwrap(), 2.0));
        assert!(approx(wolf.combat.current_health, 20.0));
    }

    #[test]
    fn archetype_deserializes_from_partial_settings() {
        let json = r#"{"ItemUser":{"lineage":"0190a0b2-0000-7000-8000-000000000001","settings":{"max_health":30.0}}}"#;
        let archetype: Archetype = serde_json::from_str(json).unwrap();
        assert!(archetype.lineage().is_some());
        assert!(approx(archetype.settings().max_health, 30.0));
        assert!(approx(archetype.settings().attack_damage, 4.0));
    }

    #[test]
    fn stance_transitions() {
        let mut wolf = beast(0);
        assert_eq!(wolf.toggle_attack_mode(), CombatMode::Attack);
        assert_eq!(wolf.toggle_attack_mode(), CombatMode::Passive);
        assert_eq!(wolf.enable_defense(true), CombatMode::Defend);
        assert_eq!(wolf.toggle_attack_mode(), CombatMode::Attack);
        assert_eq!(wolf.enable_defense(false), CombatMode::Passive);
    }

    #[test]
    fn appearance_setters_report_changes() {
        let mut wolf = beast(0);
        assert!(wolf.set_glyph('w'));
        assert!(!wolf.set_glyph('w'));
        assert!(wolf.set_color("grey"));
        assert!(!wolf.set_color("grey"));
        assert!(wolf.set_highlighted(true));
        assert!(!wolf.set_highlighted(true));
    }

    #[test]
    fn lineal_archetype_credits_lineage() {
        let lineage = LineageId::new();
        let hero = Character::new(
            "Aldric",
            Archetype::Player {
                lineage,
                settings: BaseSettings::default(),
            },
            class(),
            Position::new(1, 1),
        );
        assert_eq!(hero.lineage(), Some(lineage));
        assert_eq!(hero.legacy_holder(), LegacyHolder::Lineage(lineage));
        assert_eq!(hero.archetype.label(), "player");
        let snapshot = hero.snapshot(7).unwrap();
        assert_eq!(snapshot.legacy, 7);
        assert_eq!(snapshot.lineage, Some(lineage));
    }
}
