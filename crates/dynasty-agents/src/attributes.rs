//! Attributes and influences: the declarative half of the attribute engine.
//!
//! An [`Attribute`] is a declared quantity (base value, base scale, and the
//! set of [`Aspect`]s it is subject to). Its *effective* value is never
//! stored; it is folded together from every matching [`Influence`] at read
//! time by the [`resolver`](crate::resolver).
//!
//! # Folding
//!
//! Each influencing talent contributes one number. Its [`Purpose`] decides
//! where that number goes:
//!
//! | Purpose | Accumulator | Sign |
//! |---------|-------------|------|
//! | `Add` | `add_total` | + |
//! | `Subtract` | `add_total` | - |
//! | `ScaleUp` | `scale_total` | + |
//! | `ScaleDown` | `scale_total` | - |
//!
//! The effective value is `(base_value + add_total) * (base_scale * (1 + scale_total))`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use dynasty_types::{Aspect, Purpose};

// ---------------------------------------------------------------------------
// Influence
// ---------------------------------------------------------------------------

/// How a talent's effect combines into attributes subject to an aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Influence {
    /// The aspect being modified.
    pub aspect: Aspect,
    /// How the contribution is folded.
    pub purpose: Purpose,
}

impl Influence {
    /// Create an influence.
    pub const fn new(aspect: Aspect, purpose: Purpose) -> Self {
        Self { aspect, purpose }
    }
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Running additive and scale totals for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InfluenceTotals {
    /// Sum of `Add` contributions minus `Subtract` contributions.
    pub add_total: f64,
    /// Sum of `ScaleUp` contributions minus `ScaleDown` contributions.
    pub scale_total: f64,
}

impl InfluenceTotals {
    /// Fold one talent's contribution into the totals.
    pub fn fold(&mut self, purpose: Purpose, contribution: f64) {
        match purpose {
            Purpose::Add => self.add_total += contribution,
            Purpose::Subtract => self.add_total -= contribution,
            Purpose::ScaleUp => self.scale_total += contribution,
            Purpose::ScaleDown => self.scale_total -= contribution,
        }
    }

    /// Apply the totals to an attribute's base value and scale.
    pub fn apply(self, base_value: f64, base_scale: f64) -> f64 {
        (base_value + self.add_total) * (base_scale * (1.0 + self.scale_total))
    }
}

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

/// A declared numeric quantity whose effective value is computed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Display name.
    pub name: String,
    /// Value before any influence.
    pub base_value: f64,
    /// Multiplier before any influence.
    pub base_scale: f64,
    /// Aspects this attribute is subject to.
    pub aspects: BTreeSet<Aspect>,
}

impl Attribute {
    /// Declare an attribute with a base scale of 1 and no aspects.
    pub fn new(name: impl Into<String>, base_value: f64) -> Self {
        Self {
            name: name.into(),
            base_value,
            base_scale: 1.0,
            aspects: BTreeSet::new(),
        }
    }

    /// Builder: make the attribute subject to an additional aspect.
    #[must_use]
    pub fn with_aspect(mut self, aspect: Aspect) -> Self {
        self.aspects.insert(aspect);
        self
    }

    /// Builder: override the base scale.
    #[must_use]
    pub fn with_scale(mut self, base_scale: f64) -> Self {
        self.base_scale = base_scale;
        self
    }

    /// Whether this attribute is subject to `aspect`.
    pub fn is_subject_to(&self, aspect: Aspect) -> bool {
        self.aspects.contains(&aspect)
    }

    /// The value with no influences applied: `base_value * base_scale`.
    pub fn unmodified(&self) -> f64 {
        self.base_value * self.base_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fold_routes_each_purpose() {
        let mut totals = InfluenceTotals::default();
        totals.fold(Purpose::Add, 3.0);
        totals.fold(Purpose::Subtract, 1.0);
        totals.fold(Purpose::ScaleUp, 0.5);
        totals.fold(Purpose::ScaleDown, 0.25);
        assert!(approx(totals.add_total, 2.0));
        assert!(approx(totals.scale_total, 0.25));
    }

    #[test]
    fn apply_combines_add_and_scale() {
        let totals = InfluenceTotals {
            add_total: 2.0,
            scale_total: 0.5,
        };
        // (10 + 2) * (2 * 1.5) = 36
        assert!(approx(totals.apply(10.0, 2.0), 36.0));
    }

    #[test]
    fn empty_totals_leave_value_unmodified() {
        let attribute = Attribute::new("Health", 12.0).with_scale(1.5);
        assert!(approx(
            InfluenceTotals::default().apply(attribute.base_value, attribute.base_scale),
            attribute.unmodified()
        ));
    }

    #[test]
    fn builder_collects_aspects() {
        let attribute = Attribute::new("Bolt", 5.0)
            .with_aspect(Aspect::LightningDamage)
            .with_aspect(Aspect::LightningDamage);
        assert_eq!(attribute.aspects.len(), 1);
        assert!(attribute.is_subject_to(Aspect::LightningDamage));
        assert!(!attribute.is_subject_to(Aspect::FireDamage));
    }
}
