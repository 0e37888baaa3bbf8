//! Legacy ledger and double-entry bookkeeping for the Dynasty kernel.
//!
//! Every legacy point in the simulation is tracked through this ledger.
//! Legacy enters the simulation only when the world seeds a newly spawned
//! holder, and afterwards only moves between holders when a character is
//! killed. It is never destroyed.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`] struct: append-only log with recording methods.
//! - [`transaction`] -- The [`TransactionBuilder`] for validated entry construction.
//! - [`conservation`] -- Per-tick flow checks and the full holdings audit.
//!
//! # Conservation Law
//!
//! For every tick T:
//!
//! ```text
//! sum(credits to holders in T) - sum(debits from holders in T) == sum(seeds in T)
//! ```
//!
//! and at any point the live holdings equal the ledger replay. A violation
//! produces a [`LedgerAnomaly`]. The ledger never panics; it returns errors.
//!
//! # Double-Entry Bookkeeping
//!
//! | Type | From (debit) | To (credit) |
//! |------|-------------|-------------|
//! | Seed | World | Character or Lineage |
//! | Bounty | Character | Character or Lineage |
//! | Tribute | Lineage | Character or Lineage |
//!
//! # Usage
//!
//! ```
//! use dynasty_ledger::Ledger;
//! use dynasty_ledger::conservation::ConservationResult;
//! use dynasty_types::{CharacterId, LegacyHolder, LineageId};
//!
//! let mut ledger = Ledger::new();
//! let wolf = CharacterId::new();
//! let house = LineageId::new();
//!
//! ledger.record_seed(1, LegacyHolder::Character(wolf), 40, wolf).ok();
//! ledger.record_bounty(1, wolf, LegacyHolder::Lineage(house), 40).ok();
//!
//! assert_eq!(ledger.verify_conservation(1), ConservationResult::Balanced);
//! ```

pub mod conservation;
pub mod ledger;
pub mod transaction;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use ledger::{Ledger, TransferParams};
pub use transaction::TransactionBuilder;

use std::collections::BTreeMap;

use dynasty_types::{LegacyEntryType, LegacyHolder};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording ledger entries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount must be strictly positive.
    #[error("ledger entry amount must be non-zero")]
    ZeroAmount,

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A holder cannot transfer legacy to itself.
    #[error("ledger entry debits and credits the same holder {0:?}")]
    SelfTransfer(LegacyHolder),

    /// The from/to holder types do not match the expected types for the
    /// entry type.
    #[error("invalid holder type for {entry_type:?} {side}: expected {expected}, got {actual}")]
    InvalidHolderType {
        /// The entry type being validated.
        entry_type: LegacyEntryType,
        /// Which side of the entry ("from" or "to").
        side: &'static str,
        /// The expected holder type(s).
        expected: String,
        /// The actual holder type.
        actual: String,
    },

    /// Replaying the ledger debited a holder below zero.
    #[error("holder {holder:?} overdrawn by entry at tick {tick}")]
    Overdrawn {
        /// The holder that went negative.
        holder: LegacyHolder,
        /// Tick of the offending entry.
        tick: u64,
    },

    /// An arithmetic overflow occurred while summing amounts.
    #[error("arithmetic overflow while summing legacy")]
    Overflow,
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation violation detected by a flow check or a holdings audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// The tick being verified, or `None` for a whole-ledger audit.
    pub tick: Option<u64>,
    /// Per-holder mismatch: (`expected`, `actual`). For a per-tick flow
    /// check the single key is [`LegacyHolder::World`] with
    /// (`seeded`, `net holder change`).
    pub imbalances: BTreeMap<LegacyHolder, (u64, u64)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
