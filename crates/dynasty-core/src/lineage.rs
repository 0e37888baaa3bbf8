//! Generational identity and succession.
//!
//! A [`Lineage`] outlives the characters that hold it. It carries the
//! family's legacy, an all-time legacy record, and fractional successor
//! points earned whenever the holder invests in a passive talent. When the
//! holder dies, [`LineageTracker::spawn_successor`] floors those points and
//! schedules a delayed spawn of the next generation.
//!
//! A lineage never has two living holders: [`Lineage::update`] refuses a
//! new holder while the current one is alive.

use std::collections::BTreeMap;
use std::sync::Arc;

use dynasty_agents::Class;
use dynasty_types::{BaseSettings, CharacterId, LineageId, LineageSnapshot};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use crate::actions::{KernelEffect, KernelScheduler};
use crate::scheduler::{ActionSpec, SchedulerError};
use crate::spawn::ArchetypeKind;

/// Errors raised by lineage bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineageError {
    /// A new holder was registered while the current one is alive.
    #[error("lineage {lineage} still has a living holder {holder}")]
    HolderAlive {
        /// Lineage.
        lineage: LineageId,
        /// Living holder.
        holder: CharacterId,
    },

    /// No lineage with this identifier.
    #[error("unknown lineage {0}")]
    UnknownLineage(LineageId),

    /// Crediting legacy would overflow.
    #[error("legacy overflow in lineage {0}")]
    LegacyOverflow(LineageId),

    /// Debiting more legacy than the lineage holds.
    #[error("lineage {lineage} holds {available} legacy, cannot debit {requested}")]
    Overdrawn {
        /// Lineage.
        lineage: LineageId,
        /// Amount requested.
        requested: u64,
        /// Amount held.
        available: u64,
    },

    /// Scheduling the successor spawn failed.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

// ---------------------------------------------------------------------------
// Heir template
// ---------------------------------------------------------------------------

/// What every holder of a lineage is spawned as.
#[derive(Debug, Clone)]
pub struct HeirTemplate {
    /// Lineal archetype kind.
    pub kind: ArchetypeKind,
    /// Archetype settings.
    pub settings: BaseSettings,
    /// Class the holders draw talents and skills from.
    pub class: Arc<Class>,
}

// ---------------------------------------------------------------------------
// Lineage
// ---------------------------------------------------------------------------

/// A persistent generational identity.
#[derive(Debug, Clone)]
pub struct Lineage {
    id: LineageId,
    name: String,
    legacy: u64,
    record: u64,
    successor_points: Decimal,
    generation: u32,
    holder: Option<CharacterId>,
    holder_alive: bool,
    successor_pending: bool,
    pending_skill_points: u32,
    heir: HeirTemplate,
}

impl Lineage {
    /// A lineage with no holder yet.
    pub fn new(name: impl Into<String>, heir: HeirTemplate) -> Self {
        Self {
            id: LineageId::new(),
            name: name.into(),
            legacy: 0,
            record: 0,
            successor_points: Decimal::ZERO,
            generation: 0,
            holder: None,
            holder_alive: false,
            successor_pending: false,
            pending_skill_points: 0,
            heir,
        }
    }

    /// Identifier.
    pub const fn id(&self) -> LineageId {
        self.id
    }

    /// Family name, shared by every holder.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current legacy.
    pub const fn legacy(&self) -> u64 {
        self.legacy
    }

    /// All-time legacy high-water mark.
    pub const fn record(&self) -> u64 {
        self.record
    }

    /// Accrued, not yet used successor points.
    pub const fn successor_points(&self) -> Decimal {
        self.successor_points
    }

    /// Number of holders so far.
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Current holder, alive or dead.
    pub const fn holder(&self) -> Option<CharacterId> {
        self.holder
    }

    /// Whether the current holder is alive.
    pub const fn holder_alive(&self) -> bool {
        self.holder_alive
    }

    /// Whether a successor spawn is scheduled.
    pub const fn successor_pending(&self) -> bool {
        self.successor_pending
    }

    /// Skill points the scheduled successor will inherit.
    pub const fn pending_skill_points(&self) -> u32 {
        self.pending_skill_points
    }

    /// Template for the next holder.
    pub const fn heir(&self) -> &HeirTemplate {
        &self.heir
    }

    /// Register `holder` as the lineage's new living holder.
    ///
    /// # Errors
    ///
    /// [`LineageError::HolderAlive`] while the current holder is alive.
    pub fn update(&mut self, holder: CharacterId) -> Result<(), LineageError> {
        if self.holder_alive {
            if let Some(current) = self.holder {
                return Err(LineageError::HolderAlive {
                    lineage: self.id,
                    holder: current,
                });
            }
        }
        self.holder = Some(holder);
        self.holder_alive = true;
        self.successor_pending = false;
        self.pending_skill_points = 0;
        self.generation = self.generation.saturating_add(1);
        info!(
            lineage = %self.id,
            name = self.name,
            %holder,
            generation = self.generation,
            "lineage holder registered"
        );
        Ok(())
    }

    /// Record the current holder's death.
    pub const fn mark_holder_dead(&mut self) {
        self.holder_alive = false;
    }

    /// Accrue half a successor point per point invested in a passive talent.
    pub fn increase_successor_points(&mut self, investment: u32) {
        let earned = Decimal::from(investment)
            .checked_div(Decimal::TWO)
            .unwrap_or(Decimal::ZERO);
        self.successor_points = self.successor_points.saturating_add(earned);
    }

    /// Whole successor points, the fraction discarded.
    pub fn whole_successor_points(&self) -> u32 {
        self.successor_points
            .floor()
            .to_u32()
            .unwrap_or(u32::MAX)
    }

    /// Add legacy, raising the record if it is beaten.
    ///
    /// # Errors
    ///
    /// [`LineageError::LegacyOverflow`] if the balance would overflow.
    pub fn credit(&mut self, amount: u64) -> Result<u64, LineageError> {
        self.legacy = self
            .legacy
            .checked_add(amount)
            .ok_or(LineageError::LegacyOverflow(self.id))?;
        self.record = self.record.max(self.legacy);
        Ok(self.legacy)
    }

    /// Remove legacy.
    ///
    /// # Errors
    ///
    /// [`LineageError::Overdrawn`] if the lineage holds less than `amount`.
    pub fn debit(&mut self, amount: u64) -> Result<u64, LineageError> {
        self.legacy = self
            .legacy
            .checked_sub(amount)
            .ok_or(LineageError::Overdrawn {
                lineage: self.id,
                requested: amount,
                available: self.legacy,
            })?;
        Ok(self.legacy)
    }

    /// Half the legacy, rounded down: what a killer takes from this lineage.
    pub const fn tribute(&self) -> u64 {
        self.legacy.div_euclid(2)
    }

    /// Name of the next holder, e.g. `"Aldric II"`.
    pub fn successor_name(&self) -> String {
        let next = self.generation.saturating_add(1);
        if next <= 1 {
            return self.name.clone();
        }
        format!("{} {}", self.name, roman(next))
    }

    /// Read-only view.
    pub fn snapshot(&self) -> LineageSnapshot {
        LineageSnapshot {
            id: self.id,
            name: self.name.clone(),
            legacy: self.legacy,
            record: self.record,
            generation: self.generation,
            holder: self.holder,
            successor_pending: self.successor_pending,
        }
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Every lineage in a simulation, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct LineageTracker {
    lineages: BTreeMap<LineageId, Lineage>,
}

impl LineageTracker {
    /// No lineages.
    pub const fn new() -> Self {
        Self {
            lineages: BTreeMap::new(),
        }
    }

    /// Start tracking a lineage.
    pub fn found(&mut self, lineage: Lineage) -> LineageId {
        let id = lineage.id();
        self.lineages.insert(id, lineage);
        id
    }

    /// Look up a lineage.
    pub fn get(&self, id: LineageId) -> Option<&Lineage> {
        self.lineages.get(&id)
    }

    /// Look up a lineage mutably.
    ///
    /// # Errors
    ///
    /// [`LineageError::UnknownLineage`] if `id` is not tracked.
    pub fn get_mut(&mut self, id: LineageId) -> Result<&mut Lineage, LineageError> {
        self.lineages
            .get_mut(&id)
            .ok_or(LineageError::UnknownLineage(id))
    }

    /// Every lineage in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Lineage> {
        self.lineages.values()
    }

    /// Number of lineages.
    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    /// Whether no lineage is tracked.
    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }

    /// Schedule the spawn of the next holder after `delay_ms`.
    ///
    /// Returns `false` without scheduling when the lineage has no holder,
    /// the holder is alive, or a spawn is already pending. On success the
    /// successor points are floored into the scheduled spawn and reset.
    ///
    /// # Errors
    ///
    /// [`LineageError::UnknownLineage`] or a scheduler error.
    pub fn spawn_successor(
        &mut self,
        id: LineageId,
        scheduler: &mut KernelScheduler,
        delay_ms: u64,
    ) -> Result<bool, LineageError> {
        let lineage = self.get_mut(id)?;
        if lineage.holder.is_none() || lineage.holder_alive || lineage.successor_pending {
            return Ok(false);
        }
        let skill_points = lineage.whole_successor_points();
        scheduler.schedule(ActionSpec::once(
            delay_ms,
            KernelEffect::SpawnSuccessor {
                lineage: id,
                skill_points,
            },
        ))?;
        lineage.successor_points = Decimal::ZERO;
        lineage.successor_pending = true;
        lineage.pending_skill_points = skill_points;
        info!(
            lineage = %id,
            name = lineage.name,
            delay_ms,
            skill_points,
            "successor spawn scheduled"
        );
        Ok(true)
    }
}

/// Upper-case Roman numeral for `n`, falling back to decimal past 3999.
fn roman(n: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if n == 0 || n > 3999 {
        return n.to_string();
    }
    let mut rest = n;
    let mut out = String::new();
    for (value, glyph) in NUMERALS {
        while rest >= value {
            out.push_str(glyph);
            rest = rest.saturating_sub(value);
        }
    }
    out
}
