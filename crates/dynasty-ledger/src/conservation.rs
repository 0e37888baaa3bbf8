//! Conservation checks for the legacy ledger.
//!
//! Legacy enters the simulation only through `Seed` entries and is never
//! destroyed. Two checks follow from that:
//!
//! - **Per-tick flow**: for every tick T, credits to holders minus debits
//!   from holders equals the amount seeded in T. Every well-formed entry
//!   satisfies this by construction; the check guards against entries
//!   appended from outside the builder.
//! - **Holdings audit**: replaying the whole ledger reproduces exactly the
//!   legacy each live holder actually carries, and the sum of all holdings
//!   equals the total seeded.
//!
//! A violation produces a [`LedgerAnomaly`].

use std::collections::{BTreeMap, BTreeSet};

use dynasty_types::{LegacyEntry, LegacyEntryType, LegacyHolder};

use crate::LedgerAnomaly;
use crate::transaction::validate_holder_types;

/// The result of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Everything balances.
    Balanced,
    /// At least one imbalance was found.
    Anomaly(LedgerAnomaly),
}

impl ConservationResult {
    /// Whether the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Verify the flow law for all entries in a single tick.
pub fn verify_conservation(tick: u64, entries: &[LegacyEntry]) -> ConservationResult {
    let mut seeded: u64 = 0;
    let mut credited: u64 = 0;
    let mut debited: u64 = 0;

    for entry in entries.iter().filter(|entry| entry.tick == tick) {
        if validate_holder_types(entry.entry_type, entry.from, entry.to).is_err() {
            return anomaly(
                Some(tick),
                BTreeMap::new(),
                format!(
                    "LEDGER_ANOMALY at tick {tick}: malformed {:?} entry {}",
                    entry.entry_type, entry.id
                ),
            );
        }

        let sums = match entry.entry_type {
            LegacyEntryType::Seed => seeded
                .checked_add(entry.amount)
                .map(|s| (s, credited.checked_add(entry.amount), Some(debited))),
            LegacyEntryType::Bounty | LegacyEntryType::Tribute => Some((
                seeded,
                credited.checked_add(entry.amount),
                debited.checked_add(entry.amount),
            )),
        };
        match sums {
            Some((s, Some(c), Some(d))) => {
                seeded = s;
                credited = c;
                debited = d;
            }
            _ => return overflow_anomaly(tick),
        }
    }

    let net = credited.checked_sub(debited);
    if net == Some(seeded) {
        return ConservationResult::Balanced;
    }

    let mut imbalances = BTreeMap::new();
    imbalances.insert(LegacyHolder::World, (seeded, net.unwrap_or(0)));
    anomaly(
        Some(tick),
        imbalances,
        format!("LEDGER_ANOMALY at tick {tick}: legacy created or destroyed outside a seed"),
    )
}

/// Compare the ledger replay with actual per-holder `holdings`.
///
/// Holders that appear in only one of the two maps are compared against
/// zero. The world is ignored on the holdings side.
pub fn audit(entries: &[LegacyEntry], holdings: &BTreeMap<LegacyHolder, u64>) -> ConservationResult {
    let mut replayed: BTreeMap<LegacyHolder, u64> = BTreeMap::new();
    let mut seeded: u64 = 0;

    for entry in entries {
        if entry.entry_type == LegacyEntryType::Seed {
            seeded = match seeded.checked_add(entry.amount) {
                Some(total) => total,
                None => return overflow_audit(),
            };
        } else {
            let balance = replayed.entry(entry.from).or_insert(0);
            *balance = match balance.checked_sub(entry.amount) {
                Some(rest) => rest,
                None => {
                    let mut imbalances = BTreeMap::new();
                    imbalances.insert(entry.from, (0, entry.amount));
                    return anomaly(
                        None,
                        imbalances,
                        format!(
                            "LEDGER_ANOMALY: {:?} debited {} it never held at tick {}",
                            entry.from, entry.amount, entry.tick
                        ),
                    );
                }
            };
        }
        let balance = replayed.entry(entry.to).or_insert(0);
        *balance = match balance.checked_add(entry.amount) {
            Some(total) => total,
            None => return overflow_audit(),
        };
    }

    let holders: BTreeSet<LegacyHolder> = replayed
        .keys()
        .chain(holdings.keys())
        .copied()
        .filter(|holder| *holder != LegacyHolder::World)
        .collect();

    let mut imbalances = BTreeMap::new();
    let mut held_total: u64 = 0;
    for holder in holders {
        let expected = replayed.get(&holder).copied().unwrap_or(0);
        let actual = holdings.get(&holder).copied().unwrap_or(0);
        held_total = match held_total.checked_add(actual) {
            Some(total) => total,
            None => return overflow_audit(),
        };
        if expected != actual {
            imbalances.insert(holder, (expected, actual));
        }
    }

    if imbalances.is_empty() && held_total == seeded {
        return ConservationResult::Balanced;
    }
    if imbalances.is_empty() {
        imbalances.insert(LegacyHolder::World, (seeded, held_total));
    }
    let count = imbalances.len();
    anomaly(
        None,
        imbalances,
        format!("LEDGER_ANOMALY: holdings disagree with ledger replay for {count} holder(s)"),
    )
}

fn anomaly(
    tick: Option<u64>,
    imbalances: BTreeMap<LegacyHolder, (u64, u64)>,
    message: String,
) -> ConservationResult {
    ConservationResult::Anomaly(LedgerAnomaly {
        tick,
        imbalances,
        message,
    })
}

fn overflow_anomaly(tick: u64) -> ConservationResult {
    anomaly(
        Some(tick),
        BTreeMap::new(),
        format!("LEDGER_ANOMALY at tick {tick}: arithmetic overflow while summing legacy"),
    )
}

fn overflow_audit() -> ConservationResult {
    anomaly(
        None,
        BTreeMap::new(),
        String::from("LEDGER_ANOMALY: arithmetic overflow while replaying legacy"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use chrono::Utc;
    use dynasty_types::{CharacterId, LedgerEntryId, LineageId};

    use super::*;
    use crate::Ledger;

    #[test]
    fn empty_tick_is_balanced() {
        assert!(verify_conservation(7, &[]).is_balanced());
    }

    #[test]
    fn seeds_and_transfers_balance() {
        let mut ledger = Ledger::new();
        let wolf = CharacterId::new();
        let house = LineageId::new();
        ledger
            .record_seed(1, LegacyHolder::Character(wolf), 20, wolf)
            .unwrap();
        ledger
            .record_bounty(1, wolf, LegacyHolder::Lineage(house), 20)
            .unwrap();
        assert!(ledger.verify_conservation(1).is_balanced());
    }

    #[test]
    fn malformed_appended_entry_is_flagged() {
        let mut ledger = Ledger::new();
        ledger.append(LegacyEntry {
            id: LedgerEntryId::new(),
            tick: 3,
            entry_type: LegacyEntryType::Bounty,
            from: LegacyHolder::World,
            to: LegacyHolder::Character(CharacterId::new()),
            amount: 9,
            reason: "FORGED".to_owned(),
            subject: None,
            recorded_at: Utc::now(),
        });
        assert!(matches!(
            ledger.verify_conservation(3),
            ConservationResult::Anomaly(LedgerAnomaly { tick: Some(3), .. })
        ));
    }

    #[test]
    fn audit_matches_live_holdings() {
        let mut ledger = Ledger::new();
        let wolf = CharacterId::new();
        let house = LineageId::new();
        let heir = CharacterId::new();
        ledger
            .record_seed(0, LegacyHolder::Character(wolf), 8, wolf)
            .unwrap();
        ledger
            .record_seed(0, LegacyHolder::Lineage(house), 3, heir)
            .unwrap();
        ledger
            .record_bounty(2, wolf, LegacyHolder::Lineage(house), 8)
            .unwrap();

        // The dead wolf is no longer held by anyone.
        let mut holdings = BTreeMap::new();
        holdings.insert(LegacyHolder::Lineage(house), 11);
        assert!(ledger.audit(&holdings).is_balanced());

        holdings.insert(LegacyHolder::Lineage(house), 12);
        let ConservationResult::Anomaly(found) = ledger.audit(&holdings) else {
            panic!("expected an anomaly");
        };
        assert_eq!(
            found.imbalances.get(&LegacyHolder::Lineage(house)),
            Some(&(11, 12))
        );
        assert_eq!(found.tick, None);
    }
}
