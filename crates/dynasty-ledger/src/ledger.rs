//! The legacy ledger: an append-only log of all legacy movements.
//!
//! The [`Ledger`] struct is the in-memory record of every legacy point
//! seeded or transferred during a run. It provides methods for recording
//! movements, replaying balances, and verifying conservation.
//!
//! # Design
//!
//! - **Append-only**: entries are never modified or deleted.
//! - **Double-entry**: every movement has a debit (from) and credit (to).
//! - **Conservation**: the only source is the world; there is no sink.
//! - **Precision**: legacy is a whole number of points (`u64`).

use std::collections::BTreeMap;

use dynasty_types::{CharacterId, LegacyEntry, LegacyEntryType, LegacyHolder, LineageId};

use crate::conservation::{ConservationResult, audit, verify_conservation};
use crate::{LedgerError, TransactionBuilder};

// ---------------------------------------------------------------------------
// Transfer parameters
// ---------------------------------------------------------------------------

/// Parameters for recording a general legacy movement.
#[derive(Debug, Clone)]
pub struct TransferParams {
    /// The tick number.
    pub tick: u64,
    /// The category of movement.
    pub entry_type: LegacyEntryType,
    /// Points moved.
    pub amount: u64,
    /// Debited holder.
    pub from: LegacyHolder,
    /// Credited holder.
    pub to: LegacyHolder,
    /// Human-readable reason.
    pub reason: String,
    /// Character whose spawn or death caused the movement.
    pub subject: Option<CharacterId>,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The ledger tracking every legacy movement in the simulation.
#[derive(Debug, Default)]
pub struct Ledger {
    /// All entries, in insertion order.
    entries: Vec<LegacyEntry>,
}

impl Ledger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Return the number of entries in the ledger.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the ledger has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[LegacyEntry] {
        &self.entries
    }

    /// Entries recorded during `tick`.
    pub fn entries_for_tick(&self, tick: u64) -> impl Iterator<Item = &LegacyEntry> {
        self.entries.iter().filter(move |entry| entry.tick == tick)
    }

    /// Append a pre-built [`LegacyEntry`].
    pub fn append(&mut self, entry: LegacyEntry) {
        self.entries.push(entry);
    }

    /// Record a legacy movement between two holders.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_transfer(&mut self, params: TransferParams) -> Result<&LegacyEntry, LedgerError> {
        let mut builder = TransactionBuilder::new(params.tick, params.entry_type)
            .from(params.from)
            .to(params.to)
            .amount(params.amount)
            .reason(params.reason);

        if let Some(subject) = params.subject {
            builder = builder.subject(subject);
        }

        let entry = builder.build()?;
        self.entries.push(entry);
        self.entries.last().ok_or(LedgerError::MissingField("entry"))
    }

    /// Record the world seeding a newly spawned holder with legacy.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_seed(
        &mut self,
        tick: u64,
        to: LegacyHolder,
        amount: u64,
        spawned: CharacterId,
    ) -> Result<&LegacyEntry, LedgerError> {
        self.record_transfer(TransferParams {
            tick,
            entry_type: LegacyEntryType::Seed,
            amount,
            from: LegacyHolder::World,
            to,
            reason: "SPAWN".to_owned(),
            subject: Some(spawned),
        })
    }

    /// Record a non-lineal victim's whole legacy passing to its killer.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_bounty(
        &mut self,
        tick: u64,
        victim: CharacterId,
        to: LegacyHolder,
        amount: u64,
    ) -> Result<&LegacyEntry, LedgerError> {
        self.record_transfer(TransferParams {
            tick,
            entry_type: LegacyEntryType::Bounty,
            amount,
            from: LegacyHolder::Character(victim),
            to,
            reason: "KILL".to_owned(),
            subject: Some(victim),
        })
    }

    /// Record half of a lineal victim's legacy passing to its killer.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_tribute(
        &mut self,
        tick: u64,
        lineage: LineageId,
        victim: CharacterId,
        to: LegacyHolder,
        amount: u64,
    ) -> Result<&LegacyEntry, LedgerError> {
        self.record_transfer(TransferParams {
            tick,
            entry_type: LegacyEntryType::Tribute,
            amount,
            from: LegacyHolder::Lineage(lineage),
            to,
            reason: "KILL".to_owned(),
            subject: Some(victim),
        })
    }

    /// Replay every entry into per-holder balances (the world excluded).
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overdrawn`] if an entry debits more than the holder
    /// had, [`LedgerError::Overflow`] on arithmetic overflow.
    pub fn balances(&self) -> Result<BTreeMap<LegacyHolder, u64>, LedgerError> {
        let mut balances: BTreeMap<LegacyHolder, u64> = BTreeMap::new();
        for entry in &self.entries {
            if entry.from != LegacyHolder::World {
                let balance = balances.entry(entry.from).or_insert(0);
                *balance = balance
                    .checked_sub(entry.amount)
                    .ok_or(LedgerError::Overdrawn {
                        holder: entry.from,
                        tick: entry.tick,
                    })?;
            }
            let balance = balances.entry(entry.to).or_insert(0);
            *balance = balance
                .checked_add(entry.amount)
                .ok_or(LedgerError::Overflow)?;
        }
        Ok(balances)
    }

    /// Balance of one holder after replaying the ledger.
    ///
    /// # Errors
    ///
    /// Propagates replay errors from [`balances`](Self::balances).
    pub fn balance_of(&self, holder: LegacyHolder) -> Result<u64, LedgerError> {
        Ok(self.balances()?.get(&holder).copied().unwrap_or(0))
    }

    /// Total legacy the world has seeded into the simulation.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`] on arithmetic overflow.
    pub fn total_seeded(&self) -> Result<u64, LedgerError> {
        self.entries
            .iter()
            .filter(|entry| entry.entry_type == LegacyEntryType::Seed)
            .try_fold(0_u64, |total, entry| {
                total.checked_add(entry.amount).ok_or(LedgerError::Overflow)
            })
    }

    /// Verify the per-tick flow law for `tick`.
    pub fn verify_conservation(&self, tick: u64) -> ConservationResult {
        verify_conservation(tick, &self.entries)
    }

    /// Verify the flow law for `tick` over the entries at index `start`
    /// onwards.
    ///
    /// Capture [`len`](Self::len) before a tick runs and pass it here to
    /// scan only what that tick appended. A `start` past the end checks
    /// nothing.
    pub fn verify_conservation_since(&self, tick: u64, start: usize) -> ConservationResult {
        verify_conservation(tick, self.entries.get(start..).unwrap_or_default())
    }

    /// Compare the ledger replay with actual `holdings`.
    ///
    /// Holders absent from `holdings` are treated as holding zero.
    pub fn audit(&self, holdings: &BTreeMap<LegacyHolder, u64>) -> ConservationResult {
        audit(&self.entries, holdings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert_eq!(ledger.total_seeded().unwrap(), 0);
    }

    #[test]
    fn bounty_moves_whole_balance() {
        let mut ledger = Ledger::new();
        let wolf = CharacterId::new();
        let bear = CharacterId::new();
        ledger
            .record_seed(0, LegacyHolder::Character(wolf), 30, wolf)
            .unwrap();
        ledger
            .record_seed(0, LegacyHolder::Character(bear), 5, bear)
            .unwrap();
        ledger
            .record_bounty(4, wolf, LegacyHolder::Character(bear), 30)
            .unwrap();

        assert_eq!(ledger.balance_of(LegacyHolder::Character(wolf)).unwrap(), 0);
        assert_eq!(ledger.balance_of(LegacyHolder::Character(bear)).unwrap(), 35);
        assert_eq!(ledger.total_seeded().unwrap(), 35);
        assert_eq!(ledger.entries_for_tick(4).count(), 1);
    }

    #[test]
    fn tribute_leaves_remainder_with_lineage() {
        let mut ledger = Ledger::new();
        let house = LineageId::new();
        let heir = CharacterId::new();
        let killer = CharacterId::new();
        ledger
            .record_seed(0, LegacyHolder::Lineage(house), 11, heir)
            .unwrap();
        ledger
            .record_tribute(2, house, heir, LegacyHolder::Character(killer), 5)
            .unwrap();

        let balances = ledger.balances().unwrap();
        assert_eq!(balances.get(&LegacyHolder::Lineage(house)), Some(&6));
        assert_eq!(balances.get(&LegacyHolder::Character(killer)), Some(&5));
    }

    #[test]
    fn verification_from_a_mark_skips_earlier_entries() {
        let mut ledger = Ledger::new();
        let wolf = CharacterId::new();
        ledger.append(LegacyEntry {
            id: dynasty_types::LedgerEntryId::new(),
            tick: 5,
            entry_type: LegacyEntryType::Bounty,
            from: LegacyHolder::World,
            to: LegacyHolder::Character(wolf),
            amount: 2,
            reason: "FORGED".to_owned(),
            subject: None,
            recorded_at: chrono::Utc::now(),
        });
        let mark = ledger.len();
        ledger
            .record_seed(5, LegacyHolder::Character(wolf), 4, wolf)
            .unwrap();

        assert!(!ledger.verify_conservation(5).is_balanced());
        assert!(ledger.verify_conservation_since(5, mark).is_balanced());
        assert!(!ledger.verify_conservation_since(5, 0).is_balanced());
        assert!(ledger.verify_conservation_since(5, 99).is_balanced());
    }

    #[test]
    fn overdraft_detected_on_replay() {
        let mut ledger = Ledger::new();
        let wolf = CharacterId::new();
        ledger
            .record_bounty(1, wolf, LegacyHolder::Character(CharacterId::new()), 3)
            .unwrap();
        assert!(matches!(
            ledger.balances(),
            Err(LedgerError::Overdrawn { tick: 1, .. })
        ));
    }

    #[test]
    fn invalid_transfer_not_appended() {
        let mut ledger = Ledger::new();
        let result = ledger.record_seed(0, LegacyHolder::World, 5, CharacterId::new());
        assert!(result.is_err());
        assert!(ledger.is_empty());
    }
}
