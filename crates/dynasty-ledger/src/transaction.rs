//! Transaction builders and validation for the legacy ledger.
//!
//! Provides a [`TransactionBuilder`] that enforces the double-entry
//! invariant: every legacy movement names a debited holder and a credited
//! holder whose types fit the entry type. Builders validate inputs before
//! producing a [`LegacyEntry`].

use chrono::Utc;

use dynasty_types::{
    CharacterId, HolderType, LedgerEntryId, LegacyEntry, LegacyEntryType, LegacyHolder,
};

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Transaction builder
// ---------------------------------------------------------------------------

/// Builder for constructing validated [`LegacyEntry`] values.
///
/// # Examples
///
/// ```
/// use dynasty_ledger::TransactionBuilder;
/// use dynasty_types::{CharacterId, LegacyEntryType, LegacyHolder, LineageId};
///
/// let victim = CharacterId::new();
/// let entry = TransactionBuilder::new(3, LegacyEntryType::Bounty)
///     .from(LegacyHolder::Character(victim))
///     .to(LegacyHolder::Lineage(LineageId::new()))
///     .amount(25)
///     .reason("KILL".to_owned())
///     .subject(victim)
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    tick: u64,
    entry_type: LegacyEntryType,
    from: Option<LegacyHolder>,
    to: Option<LegacyHolder>,
    amount: Option<u64>,
    reason: Option<String>,
    subject: Option<CharacterId>,
}

impl TransactionBuilder {
    /// Start building a ledger entry for the given tick and entry type.
    pub const fn new(tick: u64, entry_type: LegacyEntryType) -> Self {
        Self {
            tick,
            entry_type,
            from: None,
            to: None,
            amount: None,
            reason: None,
            subject: None,
        }
    }

    /// Set the debited holder.
    #[must_use]
    pub const fn from(mut self, holder: LegacyHolder) -> Self {
        self.from = Some(holder);
        self
    }

    /// Set the credited holder.
    #[must_use]
    pub const fn to(mut self, holder: LegacyHolder) -> Self {
        self.to = Some(holder);
        self
    }

    /// Set the number of legacy points moved.
    #[must_use]
    pub const fn amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the human-readable reason for the movement.
    #[must_use]
    pub fn reason(mut self, reason: String) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Set the character whose spawn or death caused the movement.
    #[must_use]
    pub const fn subject(mut self, character: CharacterId) -> Self {
        self.subject = Some(character);
        self
    }

    /// Validate inputs and produce a [`LegacyEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroAmount`] if the amount is zero,
    /// [`LedgerError::MissingField`] if required fields are not set,
    /// [`LedgerError::SelfTransfer`] if both sides are the same holder, and
    /// [`LedgerError::InvalidHolderType`] if a side has the wrong holder type.
    pub fn build(self) -> Result<LegacyEntry, LedgerError> {
        let from = self.from.ok_or(LedgerError::MissingField("from"))?;
        let to = self.to.ok_or(LedgerError::MissingField("to"))?;
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;
        let reason = self.reason.ok_or(LedgerError::MissingField("reason"))?;

        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if from == to {
            return Err(LedgerError::SelfTransfer(from));
        }
        validate_holder_types(self.entry_type, from, to)?;

        Ok(LegacyEntry {
            id: LedgerEntryId::new(),
            tick: self.tick,
            entry_type: self.entry_type,
            from,
            to,
            amount,
            reason,
            subject: self.subject,
            recorded_at: Utc::now(),
        })
    }
}

/// Validate that the from/to holder types match the contract for the
/// given [`LegacyEntryType`].
pub fn validate_holder_types(
    entry_type: LegacyEntryType,
    from: LegacyHolder,
    to: LegacyHolder,
) -> Result<(), LedgerError> {
    let expected_from = expected_from_type(entry_type);
    if from.holder_type() != expected_from {
        return Err(LedgerError::InvalidHolderType {
            entry_type,
            side: "from",
            expected: format!("{expected_from:?}"),
            actual: format!("{:?}", from.holder_type()),
        });
    }

    // Every entry type credits a character or a lineage; legacy never
    // flows back to the world.
    if to.holder_type() == HolderType::World {
        return Err(LedgerError::InvalidHolderType {
            entry_type,
            side: "to",
            expected: String::from("Character or Lineage"),
            actual: format!("{:?}", to.holder_type()),
        });
    }

    Ok(())
}

/// The debited holder type for each [`LegacyEntryType`].
const fn expected_from_type(entry_type: LegacyEntryType) -> HolderType {
    match entry_type {
        LegacyEntryType::Seed => HolderType::World,
        LegacyEntryType::Bounty => HolderType::Character,
        LegacyEntryType::Tribute => HolderType::Lineage,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dynasty_types::LineageId;

    use super::*;

    fn beast() -> LegacyHolder {
        LegacyHolder::Character(CharacterId::new())
    }

    fn house() -> LegacyHolder {
        LegacyHolder::Lineage(LineageId::new())
    }

    #[test]
    fn seed_from_world_is_valid() {
        let entry = TransactionBuilder::new(0, LegacyEntryType::Seed)
            .from(LegacyHolder::World)
            .to(house())
            .amount(10)
            .reason("SPAWN".to_owned())
            .build()
            .unwrap();
        assert_eq!(entry.amount, 10);
        assert_eq!(entry.subject, None);
    }

    #[test]
    fn zero_amount_rejected() {
        let result = TransactionBuilder::new(1, LegacyEntryType::Bounty)
            .from(beast())
            .to(house())
            .amount(0)
            .reason("KILL".to_owned())
            .build();
        assert!(matches!(result, Err(LedgerError::ZeroAmount)));
    }

    #[test]
    fn missing_reason_rejected() {
        let result = TransactionBuilder::new(1, LegacyEntryType::Bounty)
            .from(beast())
            .to(house())
            .amount(5)
            .build();
        assert!(matches!(result, Err(LedgerError::MissingField("reason"))));
    }

    #[test]
    fn tribute_must_come_from_lineage() {
        let result = TransactionBuilder::new(1, LegacyEntryType::Tribute)
            .from(beast())
            .to(house())
            .amount(5)
            .reason("KILL".to_owned())
            .build();
        assert!(matches!(
            result,
            Err(LedgerError::InvalidHolderType { side: "from", .. })
        ));
    }

    #[test]
    fn nothing_flows_back_to_world() {
        let result = TransactionBuilder::new(1, LegacyEntryType::Bounty)
            .from(beast())
            .to(LegacyHolder::World)
            .amount(5)
            .reason("KILL".to_owned())
            .build();
        assert!(matches!(
            result,
            Err(LedgerError::InvalidHolderType { side: "to", .. })
        ));
    }

    #[test]
    fn self_transfer_rejected() {
        let holder = house();
        let result = TransactionBuilder::new(1, LegacyEntryType::Tribute)
            .from(holder)
            .to(holder)
            .amount(5)
            .reason("KILL".to_owned())
            .build();
        assert!(matches!(result, Err(LedgerError::SelfTransfer(_))));
    }
}
