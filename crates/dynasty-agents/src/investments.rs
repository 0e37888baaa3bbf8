//! Sparse per-character talent investments.
//!
//! [`Investments`] holds the points a character has put into each talent
//! plus an index from [`Aspect`] to the talents currently influencing it.
//! A talent enters the index on its first non-zero investment and leaves it
//! when its investment returns to zero, so resolving an attribute only ever
//! visits talents that actually contribute.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use dynasty_types::{Aspect, TalentId};

use crate::error::AgentError;
use crate::talents::Talent;

/// Talent -> invested points, with an aspect index of influencing talents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investments {
    points: BTreeMap<TalentId, u32>,
    by_aspect: BTreeMap<Aspect, BTreeSet<TalentId>>,
}

impl Investments {
    /// An empty investment map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` points to `talent`, returning the new total.
    ///
    /// Investing zero points is a no-op and does not index the talent.
    pub fn invest(&mut self, talent: &Talent, amount: u32) -> Result<u32, AgentError> {
        let current = self.investment(&talent.id);
        if amount == 0 {
            return Ok(current);
        }
        let total = current
            .checked_add(amount)
            .ok_or_else(|| AgentError::ArithmeticOverflow {
                context: format!("investment in {}", talent.id),
            })?;
        self.points.insert(talent.id.clone(), total);
        self.by_aspect
            .entry(talent.aspect())
            .or_default()
            .insert(talent.id.clone());
        Ok(total)
    }

    /// Remove up to `amount` points from `talent`, returning the points removed.
    ///
    /// When the investment reaches zero the talent is dropped from both the
    /// point map and the aspect index.
    pub fn divest(&mut self, talent: &Talent, amount: u32) -> u32 {
        let current = self.investment(&talent.id);
        let removed = amount.min(current);
        let remaining = current.saturating_sub(removed);
        if remaining > 0 {
            self.points.insert(talent.id.clone(), remaining);
            return removed;
        }

        self.points.remove(&talent.id);
        if let Some(talents) = self.by_aspect.get_mut(&talent.aspect()) {
            talents.remove(&talent.id);
            if talents.is_empty() {
                self.by_aspect.remove(&talent.aspect());
            }
        }
        removed
    }

    /// Points invested in `talent` (zero if never invested).
    pub fn investment(&self, talent: &TalentId) -> u32 {
        self.points.get(talent).copied().unwrap_or(0)
    }

    /// Talents with a non-zero investment that influence `aspect`.
    pub fn influencing(&self, aspect: Aspect) -> impl Iterator<Item = &TalentId> {
        self.by_aspect.get(&aspect).into_iter().flatten()
    }

    /// Every invested talent and its points, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&TalentId, u32)> {
        self.points.iter().map(|(id, points)| (id, *points))
    }

    /// Sum of all invested points.
    pub fn total(&self) -> u64 {
        self.points.values().map(|p| u64::from(*p)).sum()
    }

    /// Whether nothing has been invested.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dynasty_types::{Purpose, TalentKind};

    use super::*;
    use crate::attributes::Influence;
    use crate::talents::Algorithm;

    fn vigor() -> Talent {
        Talent::new(
            "Vigor",
            TalentKind::Passive,
            Algorithm::Linear { per_point: 0.1 },
            Influence::new(Aspect::MaxHealth, Purpose::Add),
        )
    }

    #[test]
    fn first_investment_populates_index() {
        let mut investments = Investments::new();
        assert_eq!(investments.influencing(Aspect::MaxHealth).count(), 0);

        let total = investments.invest(&vigor(), 5).unwrap();
        assert_eq!(total, 5);
        assert_eq!(investments.investment(&TalentId::new("Vigor")), 5);
        assert_eq!(investments.influencing(Aspect::MaxHealth).count(), 1);
    }

    #[test]
    fn zero_investment_is_not_indexed() {
        let mut investments = Investments::new();
        investments.invest(&vigor(), 0).unwrap();
        assert!(investments.is_empty());
        assert_eq!(investments.influencing(Aspect::MaxHealth).count(), 0);
    }

    #[test]
    fn divest_to_zero_drops_index_entry() {
        let mut investments = Investments::new();
        investments.invest(&vigor(), 3).unwrap();
        assert_eq!(investments.divest(&vigor(), 1), 1);
        assert_eq!(investments.influencing(Aspect::MaxHealth).count(), 1);

        // Asking for more than remains removes only what is there.
        assert_eq!(investments.divest(&vigor(), 10), 2);
        assert_eq!(investments.investment(&TalentId::new("Vigor")), 0);
        assert_eq!(investments.influencing(Aspect::MaxHealth).count(), 0);
        assert!(investments.is_empty());
    }

    #[test]
    fn overflow_is_reported() {
        let mut investments = Investments::new();
        investments.invest(&vigor(), u32::MAX).unwrap();
        let result = investments.invest(&vigor(), 1);
        assert!(matches!(result, Err(AgentError::ArithmeticOverflow { .. })));
    }

    #[test]
    fn total_sums_all_talents() {
        let mut investments = Investments::new();
        let focus = Talent::new(
            "Focus",
            TalentKind::Concept,
            Algorithm::Linear { per_point: 1.0 },
            Influence::new(Aspect::Activation, Purpose::ScaleDown),
        );
        investments.invest(&vigor(), 4).unwrap();
        investments.invest(&focus, 6).unwrap();
        assert_eq!(investments.total(), 10);
        assert_eq!(investments.iter().count(), 2);
    }
}
