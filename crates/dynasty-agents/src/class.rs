//! Classes: the talent and skill catalogue a character draws from.
//!
//! A [`Class`] owns its [`Talent`]s and [`Affinity`] (skill) definitions.
//! Characters share a class through an `Arc` and reference talents by
//! [`TalentId`]; the class is never mutated once the simulation starts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dynasty_types::TalentId;

use crate::attributes::Attribute;
use crate::error::AgentError;
use crate::talents::Talent;

// ---------------------------------------------------------------------------
// Skill effects
// ---------------------------------------------------------------------------

/// Kinds of effect a skill can realize on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Damage the caster's current target.
    Strike,
    /// Damage every other living character around the caster.
    Burst,
    /// Heal the caster.
    Mend,
}

/// One effect realized when a skill's activation completes.
///
/// Every magnitude is an [`Attribute`], so talents can influence damage,
/// reach and healing the same way they influence base stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillEffect {
    /// Damage the current target if it is within `range` tiles (Chebyshev).
    Strike {
        /// Damage dealt.
        damage: Attribute,
        /// Maximum reach in tiles.
        range: Attribute,
    },
    /// Damage every other living character within `radius` tiles (Chebyshev).
    Burst {
        /// Damage dealt to each character hit.
        damage: Attribute,
        /// Area radius in tiles.
        radius: Attribute,
    },
    /// Heal the caster, clamped to its maximum health.
    Mend {
        /// Health restored.
        amount: Attribute,
    },
}

impl SkillEffect {
    /// The kind of this effect.
    pub const fn kind(&self) -> EffectKind {
        match self {
            Self::Strike { .. } => EffectKind::Strike,
            Self::Burst { .. } => EffectKind::Burst,
            Self::Mend { .. } => EffectKind::Mend,
        }
    }
}

// ---------------------------------------------------------------------------
// Affinity
// ---------------------------------------------------------------------------

/// A named skill with activation and cooldown attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affinity {
    /// Skill name, unique within its class.
    pub name: String,
    /// Player-facing description.
    pub description: String,
    /// Pre-cast delay in milliseconds.
    pub activation: Attribute,
    /// Post-cast lockout in milliseconds.
    pub cooldown: Attribute,
    /// Effects realized in order when the cast completes.
    pub effects: Vec<SkillEffect>,
}

// ---------------------------------------------------------------------------
// Class
// ---------------------------------------------------------------------------

/// A named catalogue of talents and skills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Class {
    /// Class name.
    pub name: String,
    talents: BTreeMap<TalentId, Talent>,
    affinities: BTreeMap<String, Affinity>,
}

impl Class {
    /// An empty class.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            talents: BTreeMap::new(),
            affinities: BTreeMap::new(),
        }
    }

    /// Register a talent; names must be unique within the class.
    pub fn add_talent(&mut self, talent: Talent) -> Result<(), AgentError> {
        if self.talents.contains_key(&talent.id) {
            return Err(AgentError::DuplicateDefinition {
                name: talent.id.to_string(),
                class: self.name.clone(),
            });
        }
        self.talents.insert(talent.id.clone(), talent);
        Ok(())
    }

    /// Register a skill; names must be unique within the class.
    pub fn add_affinity(&mut self, affinity: Affinity) -> Result<(), AgentError> {
        if self.affinities.contains_key(&affinity.name) {
            return Err(AgentError::DuplicateDefinition {
                name: affinity.name,
                class: self.name.clone(),
            });
        }
        self.affinities.insert(affinity.name.clone(), affinity);
        Ok(())
    }

    /// Look up a talent by id.
    pub fn talent(&self, id: &TalentId) -> Result<&Talent, AgentError> {
        self.talents.get(id).ok_or_else(|| AgentError::UnknownTalent {
            talent: id.clone(),
            class: self.name.clone(),
        })
    }

    /// Look up a skill by name.
    pub fn affinity(&self, name: &str) -> Result<&Affinity, AgentError> {
        self.affinities
            .get(name)
            .ok_or_else(|| AgentError::UnknownSkill {
                skill: name.to_owned(),
                class: self.name.clone(),
            })
    }

    /// All talents, in name order.
    pub fn talents(&self) -> impl Iterator<Item = &Talent> {
        self.talents.values()
    }

    /// All skills, in name order.
    pub fn affinities(&self) -> impl Iterator<Item = &Affinity> {
        self.affinities.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dynasty_types::{Aspect, Purpose, TalentKind};

    use super::*;
    use crate::attributes::Influence;
    use crate::talents::Algorithm;

    fn bolt() -> Affinity {
        Affinity {
            name: String::from("Bolt"),
            description: String::from("A crackling strike"),
            activation: Attribute::new("Activation", 1000.0).with_aspect(Aspect::Activation),
            cooldown: Attribute::new("Cooldown", 2000.0).with_aspect(Aspect::Cooldown),
            effects: vec![SkillEffect::Strike {
                damage: Attribute::new("Damage", 6.0).with_aspect(Aspect::LightningDamage),
                range: Attribute::new("Range", 3.0).with_aspect(Aspect::Range),
            }],
        }
    }

    #[test]
    fn duplicate_talent_is_rejected() {
        let mut class = Class::new("Sorcerer");
        let talent = Talent::new(
            "Spark",
            TalentKind::Concept,
            Algorithm::Linear { per_point: 1.0 },
            Influence::new(Aspect::LightningDamage, Purpose::Add),
        );
        class.add_talent(talent.clone()).unwrap();
        let err = class.add_talent(talent).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateDefinition { .. }));
    }

    #[test]
    fn lookups_report_missing_definitions() {
        let mut class = Class::new("Sorcerer");
        class.add_affinity(bolt()).unwrap();
        assert!(class.affinity("Bolt").is_ok());
        assert!(matches!(
            class.affinity("Nova"),
            Err(AgentError::UnknownSkill { .. })
        ));
        assert!(matches!(
            class.talent(&TalentId::new("Spark")),
            Err(AgentError::UnknownTalent { .. })
        ));
    }

    #[test]
    fn effect_kinds() {
        let affinity = bolt();
        let kinds: Vec<_> = affinity.effects.iter().map(SkillEffect::kind).collect();
        assert_eq!(kinds, vec![EffectKind::Strike]);
    }
}
