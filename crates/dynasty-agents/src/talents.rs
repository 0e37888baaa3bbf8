//! Talents: named capabilities that turn invested points into influence.
//!
//! A [`Talent`] pairs an [`Algorithm`] (investment to effect) with exactly
//! one [`Influence`]. Talents are owned by a [`Class`](crate::class::Class)
//! and referenced by characters through their investment map.
//!
//! # Algorithms
//!
//! - `Linear { per_point }`: `n * per_point`
//! - `Diminishing { coefficient }`: `coefficient * ln(1 + n)`
//! - `Capped { per_point, cap }`: `min(n * per_point, cap)`
//!
//! Every algorithm evaluates to exactly 0 at zero investment, which is what
//! lets the resolver treat "not invested" and "invested zero" identically.

use serde::{Deserialize, Serialize};

use dynasty_types::{Aspect, Purpose, TalentId, TalentKind};

use crate::attributes::Influence;

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Maps an invested point count to a talent's effect magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Grows linearly with investment.
    Linear {
        /// Effect per invested point.
        per_point: f64,
    },
    /// Grows logarithmically with investment.
    Diminishing {
        /// Multiplier applied to `ln(1 + n)`.
        coefficient: f64,
    },
    /// Grows linearly up to a ceiling.
    Capped {
        /// Effect per invested point.
        per_point: f64,
        /// Maximum effect.
        cap: f64,
    },
}

impl Algorithm {
    /// Evaluate the effect of `invested` points.
    pub fn evaluate(self, invested: u32) -> f64 {
        if invested == 0 {
            return 0.0;
        }
        let n = f64::from(invested);
        match self {
            Self::Linear { per_point } => n * per_point,
            Self::Diminishing { coefficient } => coefficient * n.ln_1p(),
            Self::Capped { per_point, cap } => (n * per_point).min(cap),
        }
    }
}

// ---------------------------------------------------------------------------
// Talent
// ---------------------------------------------------------------------------

/// A describable capability with an investment-to-effect function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talent {
    /// Canonical name, also the identifier.
    pub id: TalentId,
    /// Player-facing description.
    pub description: String,
    /// Concept or passive.
    pub kind: TalentKind,
    /// Investment to effect mapping.
    pub algorithm: Algorithm,
    /// Where the effect is folded.
    pub influence: Influence,
}

impl Talent {
    /// Define a talent.
    pub fn new(
        id: impl Into<TalentId>,
        kind: TalentKind,
        algorithm: Algorithm,
        influence: Influence,
    ) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            kind,
            algorithm,
            influence,
        }
    }

    /// Builder: attach a description.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The aspect this talent influences.
    pub const fn aspect(&self) -> Aspect {
        self.influence.aspect
    }

    /// How this talent's effect is folded.
    pub const fn purpose(&self) -> Purpose {
        self.influence.purpose
    }

    /// Whether investing in this talent accrues successor points.
    pub const fn is_passive(&self) -> bool {
        matches!(self.kind, TalentKind::Passive)
    }

    /// Effect of `invested` points.
    pub fn effect(&self, invested: u32) -> f64 {
        self.algorithm.evaluate(invested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zero_investment_has_no_effect() {
        for algorithm in [
            Algorithm::Linear { per_point: 3.0 },
            Algorithm::Diminishing { coefficient: 2.0 },
            Algorithm::Capped {
                per_point: 1.0,
                cap: 5.0,
            },
        ] {
            assert!(approx(algorithm.evaluate(0), 0.0), "{algorithm:?}");
        }
    }

    #[test]
    fn linear_tenth_per_point() {
        // f(n) = n / 10
        let algorithm = Algorithm::Linear { per_point: 0.1 };
        assert!(approx(algorithm.evaluate(20), 2.0));
    }

    #[test]
    fn diminishing_grows_slower_than_linear() {
        let algorithm = Algorithm::Diminishing { coefficient: 1.0 };
        assert!(approx(algorithm.evaluate(1), 2.0_f64.ln()));
        assert!(algorithm.evaluate(100) < 100.0);
        assert!(algorithm.evaluate(100) > algorithm.evaluate(50));
    }

    #[test]
    fn capped_stops_at_cap() {
        let algorithm = Algorithm::Capped {
            per_point: 2.0,
            cap: 7.0,
        };
        assert!(approx(algorithm.evaluate(3), 6.0));
        assert!(approx(algorithm.evaluate(4), 7.0));
        assert!(approx(algorithm.evaluate(400), 7.0));
    }

    #[test]
    fn passive_talent_reports_kind() {
        let talent = Talent::new(
            "Vigor",
            TalentKind::Passive,
            Algorithm::Linear { per_point: 0.1 },
            Influence::new(Aspect::MaxHealth, Purpose::Add),
        )
        .described("Hardier constitution");
        assert!(talent.is_passive());
        assert_eq!(talent.aspect(), Aspect::MaxHealth);
        assert_eq!(talent.purpose(), Purpose::Add);
        assert_eq!(talent.description, "Hardier constitution");
    }
}
