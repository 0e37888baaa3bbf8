//! Character state and the attribute engine for the Dynasty kernel.
//!
//! This crate contains the logic layer for characters -- everything that
//! operates on a single character's numbers without touching the scheduler
//! or the world. It sits between `dynasty-types` (plain data) and
//! `dynasty-core` (which owns the simulation context and combat).
//!
//! # Modules
//!
//! - [`attributes`] -- Attributes, influences, and influence folding
//! - [`talents`] -- Talents and their investment-to-effect algorithms
//! - [`investments`] -- Sparse per-character investments with an aspect index
//! - [`resolver`] -- [`AttributeResolver`]: resolve, project, breakdown
//! - [`class`] -- Classes, skills ([`Affinity`]) and skill effects
//! - [`character`] -- [`Character`], [`Archetype`], combat state
//! - [`config`] -- Combat tuning ([`CombatConfig`])
//! - [`parse`] -- Authored strings to kernel enums
//! - [`error`] -- [`AgentError`] and [`UnsupportedOperationError`]

pub mod attributes;
pub mod character;
pub mod class;
pub mod config;
pub mod error;
pub mod investments;
pub mod parse;
pub mod resolver;
pub mod talents;

// Re-export primary types at crate root for convenience.
pub use attributes::{Attribute, Influence, InfluenceTotals};
pub use character::{Archetype, Character, CombatState, DerivedAttributes};
pub use class::{Affinity, Class, EffectKind, SkillEffect};
pub use config::CombatConfig;
pub use error::{AgentError, UnsupportedOperationError};
pub use investments::Investments;
pub use parse::{
    parse_algorithm, parse_aspect, parse_direction, parse_effect_kind, parse_purpose,
    parse_talent_kind,
};
pub use resolver::AttributeResolver;
pub use talents::{Algorithm, Talent};
