//! Configuration loading and typed config structures for the Dynasty kernel.
//!
//! The canonical configuration lives in `dynasty-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//!
//! Class definitions are authored as strings (`purpose: scale_up`,
//! `aspect: lightning_damage`). [`SimulationConfig::build_classes`] converts
//! them into kernel types, failing with
//! [`UnsupportedOperationError`] on anything the kernel does not know.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use dynasty_agents::{
    Affinity, AgentError, Attribute, Class, CombatConfig, EffectKind, Influence, SkillEffect,
    Talent, UnsupportedOperationError, parse_algorithm, parse_aspect, parse_effect_kind,
    parse_purpose, parse_talent_kind,
};
use dynasty_types::{Aspect, BaseSettings, Position};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::KernelSettings;
use crate::spawn::{SpawnRequest, parse_archetype_kind};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A class definition names an unsupported purpose, aspect, algorithm,
    /// talent kind, skill effect or archetype.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperationError),

    /// A class definition is inconsistent (duplicate names).
    #[error("invalid class definition: {0}")]
    Agent(#[from] AgentError),

    /// A value is out of range or a reference does not resolve.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// Top-level simulation configuration.
///
/// Mirrors the structure of `dynasty-config.yaml`. Every field has a
/// default, so an empty document is a valid (if uneventful) configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, grid, pacing).
    #[serde(default)]
    pub world: WorldConfig,

    /// Combat timing and skill discounts.
    #[serde(default)]
    pub combat: CombatSection,

    /// Successor spawning.
    #[serde(default)]
    pub lineage: LineageConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBounds,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Named archetype settings, referenced by spawns.
    #[serde(default)]
    pub archetypes: BTreeMap<String, ArchetypeConfig>,

    /// Named classes, referenced by spawns.
    #[serde(default)]
    pub classes: BTreeMap<String, ClassConfig>,

    /// Seed population.
    #[serde(default)]
    pub spawns: Vec<SpawnConfig>,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `DYNASTY_SEED` overrides `world.seed` when set to an integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DYNASTY_SEED") {
            match val.parse() {
                Ok(seed) => self.world.seed = seed,
                Err(_) => warn!(value = %val, "ignoring non-numeric DYNASTY_SEED"),
            }
        }
    }

    /// Check ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.combat.max_activation_discount) {
            return Err(invalid("combat.max_activation_discount must be within [0, 1]"));
        }
        if self.combat.activation_discount_per_attack < 0.0 {
            return Err(invalid(
                "combat.activation_discount_per_attack must not be negative",
            ));
        }
        if !(0.0..1.0).contains(&self.world.blocked_density) {
            return Err(invalid("world.blocked_density must be within [0, 1)"));
        }
        Ok(())
    }

    /// Convert every authored class into a shared [`Class`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::Unsupported`] for an unknown purpose, aspect,
    /// algorithm, talent kind or effect kind, and [`ConfigError::Agent`]
    /// for duplicate talent or skill names within a class.
    pub fn build_classes(&self) -> Result<BTreeMap<String, Arc<Class>>, ConfigError> {
        self.classes
            .iter()
            .map(|(name, authored)| Ok((name.clone(), Arc::new(authored.build(name)?))))
            .collect()
    }

    /// Expand the `spawns` section into spawn requests.
    ///
    /// Spawns with `count > 1` are suffixed with their index
    /// (`"Wolf 1"`, `"Wolf 2"`, ...).
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if a spawn references an unknown archetype
    /// or class, or pins several characters to one tile;
    /// [`ConfigError::Unsupported`] for an unknown archetype kind.
    pub fn spawn_requests(
        &self,
        classes: &BTreeMap<String, Arc<Class>>,
    ) -> Result<Vec<SpawnRequest>, ConfigError> {
        let mut requests = Vec::new();
        for spawn in &self.spawns {
            let archetype = self.archetypes.get(&spawn.archetype).ok_or_else(|| {
                invalid(format!(
                    "spawn {:?} references unknown archetype {:?}",
                    spawn.name, spawn.archetype
                ))
            })?;
            let class = classes.get(&spawn.class).ok_or_else(|| {
                invalid(format!(
                    "spawn {:?} references unknown class {:?}",
                    spawn.name, spawn.class
                ))
            })?;
            let kind = parse_archetype_kind(&archetype.kind)?;
            let position = match (spawn.row, spawn.col) {
                (Some(row), Some(col)) => Some(Position::new(row, col)),
                (None, None) => None,
                _ => {
                    return Err(invalid(format!(
                        "spawn {:?} must set both row and col, or neither",
                        spawn.name
                    )));
                }
            };
            if position.is_some() && spawn.count > 1 {
                return Err(invalid(format!(
                    "spawn {:?} pins {} characters to one tile",
                    spawn.name, spawn.count
                )));
            }

            for index in 1..=spawn.count {
                let name = if spawn.count > 1 {
                    format!("{} {index}", spawn.name)
                } else {
                    spawn.name.clone()
                };
                let mut request =
                    SpawnRequest::new(name, kind, archetype.settings.clone(), Arc::clone(class));
                if let Some(position) = position {
                    request = request.at(position);
                }
                requests.push(request);
            }
        }
        Ok(requests)
    }

    /// Settings for a [`SimulationContext`](crate::SimulationContext).
    pub fn kernel_settings(&self) -> KernelSettings {
        KernelSettings {
            seed: self.world.seed,
            combat: self.combat.to_combat_config(),
            lineage: self.lineage.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable world name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Grid height in tiles.
    #[serde(default = "default_rows")]
    pub rows: u32,

    /// Grid width in tiles.
    #[serde(default = "default_cols")]
    pub cols: u32,

    /// Probability that a tile is generated blocked.
    #[serde(default = "default_blocked_density")]
    pub blocked_density: f64,

    /// Real-time milliseconds between ticks (0 = run unpaced).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Simulated milliseconds each tick advances.
    #[serde(default = "default_tick_delta_ms")]
    pub tick_delta_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            rows: default_rows(),
            cols: default_cols(),
            blocked_density: default_blocked_density(),
            tick_interval_ms: default_tick_interval_ms(),
            tick_delta_ms: default_tick_delta_ms(),
        }
    }
}

/// Combat section as authored; see [`CombatConfig`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CombatSection {
    /// Milliseconds a corpse keeps occupying its tile.
    #[serde(default = "default_corpse_grace_ms")]
    pub corpse_grace_ms: u64,

    /// Fraction of activation time removed per consecutive standard attack.
    #[serde(default = "default_activation_discount_per_attack")]
    pub activation_discount_per_attack: f64,

    /// Upper bound on the activation discount.
    #[serde(default = "default_max_activation_discount")]
    pub max_activation_discount: f64,
}

impl CombatSection {
    /// The kernel's combat tunables.
    pub const fn to_combat_config(&self) -> CombatConfig {
        CombatConfig {
            corpse_grace_ms: self.corpse_grace_ms,
            activation_discount_per_attack: self.activation_discount_per_attack,
            max_activation_discount: self.max_activation_discount,
        }
    }
}

impl Default for CombatSection {
    fn default() -> Self {
        Self {
            corpse_grace_ms: default_corpse_grace_ms(),
            activation_discount_per_attack: default_activation_discount_per_attack(),
            max_activation_discount: default_max_activation_discount(),
        }
    }
}

/// Successor spawning configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageConfig {
    /// Milliseconds between a holder's death and the successor's arrival.
    #[serde(default = "default_spawn_delay_ms")]
    pub spawn_delay_ms: u64,

    /// Skill points every successor starts with, before successor points.
    #[serde(default = "default_base_skill_points")]
    pub base_skill_points: u32,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            spawn_delay_ms: default_spawn_delay_ms(),
            base_skill_points: default_base_skill_points(),
        }
    }
}

/// Simulation boundary parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBounds {
    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Log the leaderboard every N ticks (0 = never).
    #[serde(default = "default_leaderboard_every")]
    pub leaderboard_every: u64,

    /// Entries shown in each leaderboard.
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

impl Default for SimulationBounds {
    fn default() -> Self {
        Self {
            max_ticks: 0,
            leaderboard_every: default_leaderboard_every(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

/// Output format of the engine's log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Authored archetypes, classes and spawns
// ---------------------------------------------------------------------------

/// A named archetype: its kind plus base settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchetypeConfig {
    /// `beast`, `item_user` or `player`.
    #[serde(default = "default_archetype_kind")]
    pub kind: String,

    /// Base settings, written inline next to `kind`.
    #[serde(flatten)]
    pub settings: BaseSettings,
}

/// A class as authored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClassConfig {
    /// Talents the class offers.
    #[serde(default)]
    pub talents: Vec<TalentConfig>,

    /// Skills the class offers.
    #[serde(default)]
    pub skills: Vec<SkillConfig>,
}

impl ClassConfig {
    fn build(&self, name: &str) -> Result<Class, ConfigError> {
        let mut class = Class::new(name);
        for talent in &self.talents {
            class.add_talent(talent.build()?)?;
        }
        for skill in &self.skills {
            class.add_affinity(skill.build()?)?;
        }
        Ok(class)
    }
}

/// A talent as authored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TalentConfig {
    /// Talent name, unique within the class.
    pub name: String,

    /// Player-facing description.
    #[serde(default)]
    pub description: String,

    /// `concept` or `passive`.
    #[serde(default = "default_talent_kind")]
    pub kind: String,

    /// `linear`, `diminishing` or `capped`.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Per-point rate or coefficient, depending on the algorithm.
    #[serde(default = "default_talent_value")]
    pub value: f64,

    /// Ceiling for `capped`.
    #[serde(default)]
    pub cap: Option<f64>,

    /// Aspect the talent influences.
    pub aspect: String,

    /// `add`, `subtract`, `scale_up` or `scale_down`.
    #[serde(default = "default_purpose")]
    pub purpose: String,
}

impl TalentConfig {
    fn build(&self) -> Result<Talent, UnsupportedOperationError> {
        let influence = Influence::new(parse_aspect(&self.aspect)?, parse_purpose(&self.purpose)?);
        Ok(Talent::new(
            self.name.as_str(),
            parse_talent_kind(&self.kind)?,
            parse_algorithm(&self.algorithm, self.value, self.cap)?,
            influence,
        )
        .described(self.description.clone()))
    }
}

/// A numeric skill quantity as authored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttributeConfig {
    /// Value before any influence.
    #[serde(default)]
    pub base: f64,

    /// Multiplier before any influence.
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Extra aspects the quantity answers to.
    #[serde(default)]
    pub aspects: Vec<String>,
}

impl AttributeConfig {
    fn build(&self, name: &str, implicit: Aspect) -> Result<Attribute, UnsupportedOperationError> {
        let mut attribute = Attribute::new(name, self.base)
            .with_scale(self.scale)
            .with_aspect(implicit);
        for aspect in &self.aspects {
            attribute = attribute.with_aspect(parse_aspect(aspect)?);
        }
        Ok(attribute)
    }
}

/// A skill as authored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SkillConfig {
    /// Skill name, unique within the class.
    pub name: String,

    /// Player-facing description.
    #[serde(default)]
    pub description: String,

    /// Pre-cast delay in milliseconds; always subject to `Activation`.
    pub activation: AttributeConfig,

    /// Post-cast lockout in milliseconds; always subject to `Cooldown`.
    pub cooldown: AttributeConfig,

    /// Effects realized in order.
    #[serde(default)]
    pub effects: Vec<EffectConfig>,
}

impl SkillConfig {
    fn build(&self) -> Result<Affinity, UnsupportedOperationError> {
        Ok(Affinity {
            name: self.name.clone(),
            description: self.description.clone(),
            activation: self.activation.build("Activation", Aspect::Activation)?,
            cooldown: self.cooldown.build("Cooldown", Aspect::Cooldown)?,
            effects: self
                .effects
                .iter()
                .map(EffectConfig::build)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// A skill effect as authored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EffectConfig {
    /// `strike`, `burst` or `mend`.
    pub kind: String,

    /// Damage, or healing for `mend`.
    pub magnitude: AttributeConfig,

    /// Range for `strike`, radius for `burst`; one tile when omitted.
    #[serde(default)]
    pub reach: Option<AttributeConfig>,
}

impl EffectConfig {
    fn build(&self) -> Result<SkillEffect, UnsupportedOperationError> {
        let reach = |name: &str, aspect: Aspect| match &self.reach {
            Some(reach) => reach.build(name, aspect),
            None => Ok(Attribute::new(name, 1.0).with_aspect(aspect)),
        };
        Ok(match parse_effect_kind(&self.kind)? {
            EffectKind::Strike => SkillEffect::Strike {
                damage: self.magnitude.build("Damage", Aspect::AttackDamage)?,
                range: reach("Range", Aspect::Range)?,
            },
            EffectKind::Burst => SkillEffect::Burst {
                damage: self.magnitude.build("Damage", Aspect::AttackDamage)?,
                radius: reach("Radius", Aspect::AreaRadius)?,
            },
            EffectKind::Mend => SkillEffect::Mend {
                amount: self.magnitude.build("Healing", Aspect::Healing)?,
            },
        })
    }
}

/// One entry of the seed population.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpawnConfig {
    /// Display name (and lineage name for lineal archetypes).
    pub name: String,

    /// Key into `archetypes`.
    pub archetype: String,

    /// Key into `classes`.
    pub class: String,

    /// Fixed spawn row; random when omitted.
    #[serde(default)]
    pub row: Option<i32>,

    /// Fixed spawn column; random when omitted.
    #[serde(default)]
    pub col: Option<i32>,

    /// How many characters to spawn from this entry.
    #[serde(default = "default_spawn_count")]
    pub count: u32,
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Dynasty")
}

const fn default_seed() -> u64 {
    42
}

const fn default_rows() -> u32 {
    24
}

const fn default_cols() -> u32 {
    48
}

const fn default_blocked_density() -> f64 {
    0.1
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_tick_delta_ms() -> u64 {
    100
}

const fn default_corpse_grace_ms() -> u64 {
    2000
}

const fn default_activation_discount_per_attack() -> f64 {
    0.1
}

const fn default_max_activation_discount() -> f64 {
    0.5
}

const fn default_spawn_delay_ms() -> u64 {
    5000
}

const fn default_base_skill_points() -> u32 {
    5
}

const fn default_leaderboard_every() -> u64 {
    100
}

const fn default_leaderboard_size() -> usize {
    5
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_archetype_kind() -> String {
    String::from("beast")
}

fn default_talent_kind() -> String {
    String::from("concept")
}

fn default_algorithm() -> String {
    String::from("linear")
}

const fn default_talent_value() -> f64 {
    1.0
}

fn default_purpose() -> String {
    String::from("add")
}

const fn default_scale() -> f64 {
    1.0
}

const fn default_spawn_count() -> u32 {
    1
}
