//! Legacy leaderboard.
//!
//! [`RankedRegistry`] keeps every live, legacy-bearing character in a total
//! order: legacy descending, then name ascending, then identifier. The
//! ordered set never has its keys mutated in place. A legacy change removes
//! the old key and inserts a new one.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use dynasty_types::{CharacterId, RankedEntry};

/// Sort key of one registry entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    legacy: Reverse<u64>,
    name: String,
    id: CharacterId,
}

/// Ordered collection of characters ranked by legacy.
#[derive(Debug, Clone, Default)]
pub struct RankedRegistry {
    ranked: BTreeSet<RankKey>,
    keys: BTreeMap<CharacterId, RankKey>,
}

impl RankedRegistry {
    /// An empty registry.
    pub const fn new() -> Self {
        Self {
            ranked: BTreeSet::new(),
            keys: BTreeMap::new(),
        }
    }

    /// Insert `id`, replacing any existing entry for it.
    pub fn insert(&mut self, id: CharacterId, name: impl Into<String>, legacy: u64) {
        self.remove(id);
        let key = RankKey {
            legacy: Reverse(legacy),
            name: name.into(),
            id,
        };
        self.ranked.insert(key.clone());
        self.keys.insert(id, key);
    }

    /// Remove `id`; returns whether it was present.
    pub fn remove(&mut self, id: CharacterId) -> bool {
        match self.keys.remove(&id) {
            Some(key) => self.ranked.remove(&key),
            None => false,
        }
    }

    /// Re-rank `id` under a new legacy value; returns whether it was present.
    pub fn update_legacy(&mut self, id: CharacterId, legacy: u64) -> bool {
        let Some(mut key) = self.keys.remove(&id) else {
            return false;
        };
        self.ranked.remove(&key);
        key.legacy = Reverse(legacy);
        self.ranked.insert(key.clone());
        self.keys.insert(id, key);
        true
    }

    /// Whether `id` is ranked.
    pub fn contains(&self, id: CharacterId) -> bool {
        self.keys.contains_key(&id)
    }

    /// Legacy recorded for `id`.
    pub fn legacy_of(&self, id: CharacterId) -> Option<u64> {
        self.keys.get(&id).map(|key| key.legacy.0)
    }

    /// One-based rank of `id`.
    pub fn rank_of(&self, id: CharacterId) -> Option<u32> {
        let key = self.keys.get(&id)?;
        let ahead = self.ranked.range(..key).count();
        u32::try_from(ahead).ok()?.checked_add(1)
    }

    /// Number of ranked characters.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `(id, name, legacy)` in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, &str, u64)> {
        self.ranked
            .iter()
            .map(|key| (key.id, key.name.as_str(), key.legacy.0))
    }

    /// The first `n` entries in rank order.
    pub fn top_n(&self, n: usize) -> Vec<RankedEntry> {
        self.ranked
            .iter()
            .take(n)
            .zip(1_u32..)
            .map(|(key, rank)| RankedEntry {
                rank,
                character: key.id,
                name: key.name.clone(),
                legacy: key.legacy.0,
            })
            .collect()
    }
}
