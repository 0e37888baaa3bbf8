//! Type-safe identifier wrappers.
//!
//! Every long-lived entity in the kernel has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. Characters, lineages and
//! ledger entries use UUID v7 (time-ordered). Scheduled actions use a
//! monotonically increasing sequence number instead, because the scheduler
//! relies on handle order being registration order.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a character (beast, item user or player).
    CharacterId
}

define_id! {
    /// Unique identifier for a lineage (generational identity record).
    LineageId
}

define_id! {
    /// Unique identifier for a legacy ledger entry.
    LedgerEntryId
}

/// Handle to an action registered with the scheduler.
///
/// Handles are issued in strictly increasing order, so comparing two
/// handles compares their registration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct ActionHandle(pub u64);

impl core::fmt::Display for ActionHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "action#{}", self.0)
    }
}

/// Name-keyed identifier for a talent within a class.
///
/// Talents are authored in configuration and referenced by name, so the
/// identifier is the talent's canonical name.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct TalentId(pub String);

impl TalentId {
    /// Create a talent identifier from its canonical name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the canonical name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TalentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TalentId {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for TalentId {
    fn from(name: String) -> Self {
        Self(name)
    }
}
