//! The attribute resolver: folds talent influences into effective values.
//!
//! Resolution is a pure function of the attribute definition and the
//! current investments. Nothing is cached; callers that need a stable value
//! across a computation resolve once and hold the `f64`.
//!
//! # Algorithm
//!
//! For an attribute with base value `v0`, base scale `s0` and aspects
//! `{a1..an}`, every invested talent influencing some `ai` contributes
//! `algorithm(points)`, folded by its purpose into `add_total` or
//! `scale_total`. The result is `(v0 + add_total) * (s0 * (1 + scale_total))`.

use dynasty_types::TalentId;

use crate::attributes::{Attribute, InfluenceTotals};
use crate::class::Class;
use crate::error::AgentError;
use crate::investments::Investments;

/// Resolves attributes against one class's talent catalogue.
#[derive(Debug, Clone, Copy)]
pub struct AttributeResolver<'a> {
    class: &'a Class,
}

impl<'a> AttributeResolver<'a> {
    /// A resolver over `class`.
    pub const fn new(class: &'a Class) -> Self {
        Self { class }
    }

    /// The effective value of `attribute` under `investments`.
    pub fn resolve(
        &self,
        attribute: &Attribute,
        investments: &Investments,
    ) -> Result<f64, AgentError> {
        let totals = self.breakdown(attribute, investments)?;
        Ok(totals.apply(attribute.base_value, attribute.base_scale))
    }

    /// The additive and scale totals that [`resolve`](Self::resolve) applies.
    pub fn breakdown(
        &self,
        attribute: &Attribute,
        investments: &Investments,
    ) -> Result<InfluenceTotals, AgentError> {
        let mut totals = InfluenceTotals::default();
        for aspect in &attribute.aspects {
            for id in investments.influencing(*aspect) {
                let talent = self.class.talent(id)?;
                totals.fold(talent.purpose(), talent.effect(investments.investment(id)));
            }
        }
        Ok(totals)
    }

    /// The value `attribute` would have after investing `extra` more points
    /// in `talent`. The investments passed in are not modified.
    pub fn project(
        &self,
        attribute: &Attribute,
        investments: &Investments,
        talent: &TalentId,
        extra: u32,
    ) -> Result<f64, AgentError> {
        let talent = self.class.talent(talent)?;
        let mut hypothetical = investments.clone();
        hypothetical.invest(talent, extra)?;
        self.resolve(attribute, &hypothetical)
    }
}
