//! Shared type definitions for the Dynasty simulation kernel.
//!
//! This crate is the single source of truth for the identifiers, enums and
//! plain data structs used across the workspace. Types that the
//! presentation layer polls flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers (characters, lineages, ledger entries, actions, talents)
//! - [`enums`] -- Aspects, purposes, directions, combat modes, policies, ledger categories
//! - [`structs`] -- Positions, archetype settings, legacy entries, observable snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Activity, AiPolicy, Aspect, CombatMode, Direction, HolderType, LegacyEntryType, Purpose,
    TalentKind,
};
pub use ids::{ActionHandle, CharacterId, LedgerEntryId, LineageId, TalentId};
pub use structs::{
    Appearance, BaseSettings, CharacterSnapshot, LegacyEntry, LegacyHolder, LineageSnapshot,
    Position, RankedEntry,
};

#[cfg(test)]
mod tests {
    //! Binding generation for the presentation layer.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. The files are written to the `bindings/`
        // directory relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::CharacterId::export_all();
        let _ = crate::ids::LineageId::export_all();
        let _ = crate::ids::LedgerEntryId::export_all();
        let _ = crate::ids::ActionHandle::export_all();
        let _ = crate::ids::TalentId::export_all();

        // Enums
        let _ = crate::enums::Aspect::export_all();
        let _ = crate::enums::Purpose::export_all();
        let _ = crate::enums::TalentKind::export_all();
        let _ = crate::enums::Direction::export_all();
        let _ = crate::enums::CombatMode::export_all();
        let _ = crate::enums::AiPolicy::export_all();
        let _ = crate::enums::Activity::export_all();
        let _ = crate::enums::LegacyEntryType::export_all();
        let _ = crate::enums::HolderType::export_all();

        // Structs
        let _ = crate::structs::Position::export_all();
        let _ = crate::structs::BaseSettings::export_all();
        let _ = crate::structs::Appearance::export_all();
        let _ = crate::structs::LegacyHolder::export_all();
        let _ = crate::structs::LegacyEntry::export_all();
        let _ = crate::structs::CharacterSnapshot::export_all();
        let _ = crate::structs::RankedEntry::export_all();
        let _ = crate::structs::LineageSnapshot::export_all();
    }
}
