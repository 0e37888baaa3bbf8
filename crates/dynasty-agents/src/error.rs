//! Error types for the dynasty-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Expected outcomes (clamped investments, a dead character refusing to act)
//! are not errors; these variants indicate a logic or data-authoring defect
//! that must be surfaced to the host.

use dynasty_types::{CharacterId, TalentId};

/// A configuration or dispatch value the kernel has no behaviour for.
///
/// Produced when authored data names a purpose, aspect, algorithm, talent
/// kind or skill effect that is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {category}: {value:?}")]
pub struct UnsupportedOperationError {
    /// The kind of value being dispatched on (e.g. `"purpose"`).
    pub category: &'static str,
    /// The offending value as authored.
    pub value: String,
}

impl UnsupportedOperationError {
    /// Build an error for `value` in `category`.
    pub fn new(category: &'static str, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }
}

/// Errors that can occur during character and attribute operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A talent referenced by an investment is not defined by the class.
    #[error("talent {talent} is not defined by class {class}")]
    UnknownTalent {
        /// The missing talent.
        talent: TalentId,
        /// The class that was searched.
        class: String,
    },

    /// A skill referenced by name is not defined by the class.
    #[error("skill {skill:?} is not defined by class {class}")]
    UnknownSkill {
        /// The missing skill name.
        skill: String,
        /// The class that was searched.
        class: String,
    },

    /// Two definitions share a name within one class.
    #[error("duplicate definition {name:?} in class {class}")]
    DuplicateDefinition {
        /// The repeated name.
        name: String,
        /// The class being built.
        class: String,
    },

    /// Authored data named something the kernel does not support.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperationError),

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// The character is dead and cannot perform the operation.
    #[error("character {0} is dead")]
    Dead(CharacterId),
}
