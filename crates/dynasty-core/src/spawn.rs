//! Archetype kinds and spawn requests.
//!
//! Archetypes are data: a [`ArchetypeKind`] tag plus a [`BaseSettings`]
//! value. Lineal kinds found a lineage when spawned; a beast carries its
//! legacy on itself.

use std::sync::Arc;

use dynasty_agents::{Archetype, Class, UnsupportedOperationError};
use dynasty_types::{BaseSettings, LineageId, Position};
use serde::{Deserialize, Serialize};

/// Which archetype a character is spawned as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchetypeKind {
    /// Non-lineal creature.
    Beast,
    /// Lineage-bound character.
    ItemUser,
    /// Lineage-bound, input-driven character.
    Player,
}

impl ArchetypeKind {
    /// Whether characters of this kind belong to a lineage.
    pub const fn is_lineal(self) -> bool {
        matches!(self, Self::ItemUser | Self::Player)
    }

    /// Build the archetype for a character of this kind.
    ///
    /// `lineage` is ignored for beasts. A lineal kind without a lineage
    /// degrades to a beast.
    pub fn archetype(self, settings: BaseSettings, lineage: Option<LineageId>) -> Archetype {
        match (self, lineage) {
            (Self::ItemUser, Some(lineage)) => Archetype::ItemUser { lineage, settings },
            (Self::Player, Some(lineage)) => Archetype::Player { lineage, settings },
            _ => Archetype::Beast(settings),
        }
    }
}

/// Parse an archetype kind from configuration.
///
/// # Errors
///
/// [`UnsupportedOperationError`] for an unknown kind.
pub fn parse_archetype_kind(s: &str) -> Result<ArchetypeKind, UnsupportedOperationError> {
    let normalized: String = s
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    match normalized.as_str() {
        "beast" | "creature" => Ok(ArchetypeKind::Beast),
        "itemuser" => Ok(ArchetypeKind::ItemUser),
        "player" => Ok(ArchetypeKind::Player),
        _ => Err(UnsupportedOperationError::new("archetype", s)),
    }
}

/// Everything needed to bring a character into the world.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    /// Display name; for lineal kinds, also the lineage's name.
    pub name: String,
    /// Archetype kind.
    pub kind: ArchetypeKind,
    /// Archetype settings.
    pub settings: BaseSettings,
    /// Class providing talents and skills.
    pub class: Arc<Class>,
    /// Spawn tile; a random free passable tile when `None`.
    pub position: Option<Position>,
}

impl SpawnRequest {
    /// A request placed on a random free tile.
    pub fn new(
        name: impl Into<String>,
        kind: ArchetypeKind,
        settings: BaseSettings,
        class: Arc<Class>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            settings,
            class,
            position: None,
        }
    }

    /// Place the character on `position`.
    #[must_use]
    pub const fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kinds_loosely() {
        assert_eq!(parse_archetype_kind("Beast").ok(), Some(ArchetypeKind::Beast));
        assert_eq!(
            parse_archetype_kind("item_user").ok(),
            Some(ArchetypeKind::ItemUser)
        );
        assert_eq!(parse_archetype_kind("PLAYER").ok(), Some(ArchetypeKind::Player));
        let err = parse_archetype_kind("dragon").err();
        assert_eq!(err.map(|e| e.category), Some("archetype"));
    }

    #[test]
    fn lineal_kinds_need_a_lineage() {
        let lineage = LineageId::new();
        let settings = BaseSettings::default();
        assert_eq!(
            ArchetypeKind::ItemUser
                .archetype(settings.clone(), Some(lineage))
                .lineage(),
            Some(lineage)
        );
        assert_eq!(
            ArchetypeKind::Beast
                .archetype(settings, Some(lineage))
                .lineage(),
            None
        );
        assert!(ArchetypeKind::Player.is_lineal());
        assert!(!ArchetypeKind::Beast.is_lineal());
    }
}
