//! Tunable combat parameters.
//!
//! The [`CombatConfig`] struct bundles the combat constants that are not
//! per-archetype so that callers (the simulation context, tests) can
//! override defaults. The core crate builds it from the `combat` section of
//! the YAML configuration.

/// Configuration for combat timing and skill discounts.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatConfig {
    /// Milliseconds a corpse keeps occupying its tile (default: 2000).
    pub corpse_grace_ms: u64,

    /// Fraction of activation time removed per consecutive standard attack
    /// (default: 0.1).
    pub activation_discount_per_attack: f64,

    /// Upper bound on the activation discount (default: 0.5).
    ///
    /// Stored as a fraction (0.0 to 1.0). A discount of 1.0 would make
    /// skills instant.
    pub max_activation_discount: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            corpse_grace_ms: 2000,
            activation_discount_per_attack: 0.1,
            max_activation_discount: 0.5,
        }
    }
}

impl CombatConfig {
    /// Fraction of activation time removed after `consecutive` attacks.
    ///
    /// ```text
    /// discount = min(consecutive * per_attack, max_discount)
    /// ```
    pub fn activation_discount(&self, consecutive: u32) -> f64 {
        let raw = f64::from(consecutive) * self.activation_discount_per_attack;
        raw.min(self.max_activation_discount).clamp(0.0, 1.0)
    }

    /// Activation time after applying the consecutive-attack discount.
    pub fn discounted_activation(&self, activation_ms: f64, consecutive: u32) -> f64 {
        activation_ms * (1.0 - self.activation_discount(consecutive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_config_values() {
        let cfg = CombatConfig::default();
        assert_eq!(cfg.corpse_grace_ms, 2000);
        assert!(approx(cfg.activation_discount_per_attack, 0.1));
        assert!(approx(cfg.max_activation_discount, 0.5));
    }

    #[test]
    fn discount_grows_then_caps() {
        let cfg = CombatConfig::default();
        assert!(approx(cfg.activation_discount(0), 0.0));
        assert!(approx(cfg.activation_discount(3), 0.3));
        assert!(approx(cfg.activation_discount(5), 0.5));
        assert!(approx(cfg.activation_discount(40), 0.5));
    }

    #[test]
    fn discounted_activation_applies_fraction() {
        let cfg = CombatConfig::default();
        assert!(approx(cfg.discounted_activation(1000.0, 2), 800.0));
        assert!(approx(cfg.discounted_activation(1000.0, 0), 1000.0));
    }
}
