//! Conversions from authored configuration strings to kernel enums.
//!
//! Class definitions arrive as text. Each function here matches the
//! accepted spellings exhaustively and returns an
//! [`UnsupportedOperationError`] for anything else, so a typo in a talent
//! definition fails at load time instead of producing wrong numbers later.
//! Matching is case-insensitive and ignores `_`, `-` and spaces.

use dynasty_types::{Aspect, Direction, Purpose, TalentKind};

use crate::class::EffectKind;
use crate::error::UnsupportedOperationError;
use crate::talents::Algorithm;

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse an aspect name (e.g. `"MaxHealth"`, `"max_health"`).
pub fn parse_aspect(value: &str) -> Result<Aspect, UnsupportedOperationError> {
    let key = normalize(value);
    Aspect::ALL
        .into_iter()
        .find(|aspect| normalize(aspect.name()) == key)
        .ok_or_else(|| UnsupportedOperationError::new("aspect", value))
}

/// Parse an influence purpose.
pub fn parse_purpose(value: &str) -> Result<Purpose, UnsupportedOperationError> {
    match normalize(value).as_str() {
        "add" => Ok(Purpose::Add),
        "scaleup" => Ok(Purpose::ScaleUp),
        "scaledown" => Ok(Purpose::ScaleDown),
        "subtract" => Ok(Purpose::Subtract),
        _ => Err(UnsupportedOperationError::new("purpose", value)),
    }
}

/// Parse a talent kind.
pub fn parse_talent_kind(value: &str) -> Result<TalentKind, UnsupportedOperationError> {
    match normalize(value).as_str() {
        "concept" => Ok(TalentKind::Concept),
        "passive" => Ok(TalentKind::Passive),
        _ => Err(UnsupportedOperationError::new("talent kind", value)),
    }
}

/// Parse a skill effect kind.
pub fn parse_effect_kind(value: &str) -> Result<EffectKind, UnsupportedOperationError> {
    match normalize(value).as_str() {
        "strike" => Ok(EffectKind::Strike),
        "burst" => Ok(EffectKind::Burst),
        "mend" => Ok(EffectKind::Mend),
        _ => Err(UnsupportedOperationError::new("skill effect", value)),
    }
}

/// Parse a grid direction.
pub fn parse_direction(value: &str) -> Result<Direction, UnsupportedOperationError> {
    match normalize(value).as_str() {
        "north" | "n" | "up" => Ok(Direction::North),
        "east" | "e" | "right" => Ok(Direction::East),
        "south" | "s" | "down" => Ok(Direction::South),
        "west" | "w" | "left" => Ok(Direction::West),
        _ => Err(UnsupportedOperationError::new("direction", value)),
    }
}

/// Build an algorithm from its authored name and parameters.
///
/// `value` is the per-point rate (`linear`, `capped`) or the coefficient
/// (`diminishing`). `capped` additionally requires `cap`.
pub fn parse_algorithm(
    name: &str,
    value: f64,
    cap: Option<f64>,
) -> Result<Algorithm, UnsupportedOperationError> {
    match normalize(name).as_str() {
        "linear" => Ok(Algorithm::Linear { per_point: value }),
        "diminishing" | "logarithmic" => Ok(Algorithm::Diminishing { coefficient: value }),
        "capped" => cap
            .map(|cap| Algorithm::Capped {
                per_point: value,
                cap,
            })
            .ok_or_else(|| UnsupportedOperationError::new("algorithm", "capped without a cap")),
        _ => Err(UnsupportedOperationError::new("algorithm", name)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn aspects_accept_any_spelling() {
        assert_eq!(parse_aspect("MaxHealth").unwrap(), Aspect::MaxHealth);
        assert_eq!(parse_aspect("max_health").unwrap(), Aspect::MaxHealth);
        assert_eq!(
            parse_aspect("defense-damage-reduction").unwrap(),
            Aspect::DefenseDamageReduction
        );
        for aspect in Aspect::ALL {
            assert_eq!(parse_aspect(aspect.name()).unwrap(), aspect);
        }
    }

    #[test]
    fn unknown_purpose_is_unsupported() {
        assert_eq!(parse_purpose("scale_down").unwrap(), Purpose::ScaleDown);
        let err = parse_purpose("Scale").unwrap_err();
        assert_eq!(err.category, "purpose");
        assert_eq!(err.value, "Scale");
    }

    #[test]
    fn algorithms() {
        assert_eq!(
            parse_algorithm("linear", 0.1, None).unwrap(),
            Algorithm::Linear { per_point: 0.1 }
        );
        assert_eq!(
            parse_algorithm("Capped", 1.0, Some(4.0)).unwrap(),
            Algorithm::Capped {
                per_point: 1.0,
                cap: 4.0
            }
        );
        assert!(parse_algorithm("capped", 1.0, None).is_err());
        assert!(parse_algorithm("exponential", 1.0, None).is_err());
    }

    #[test]
    fn kinds_and_directions() {
        assert_eq!(parse_talent_kind("Passive").unwrap(), TalentKind::Passive);
        assert!(parse_talent_kind("Active").is_err());
        assert_eq!(parse_effect_kind("burst").unwrap(), EffectKind::Burst);
        assert!(parse_effect_kind("teleport").is_err());
        assert_eq!(parse_direction("W").unwrap(), Direction::West);
    }
}
