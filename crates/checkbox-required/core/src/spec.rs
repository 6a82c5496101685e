//! Cardinality specification parsing
//!
//! Turns the raw `data-checkbox-required` attribute value into a `{min, max}`
//! range. Accepted shapes are `""` (at least one), `"N"` (at least N) and
//! `"N-M"` (between N and M inclusive).
//!
//! Every token must be a count. An empty side such as `"-2"` or `"0-"` is
//! malformed rather than read as zero, so the group always fails until the
//! attribute is fixed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the strict parsing entry points
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("'{token}' is not a non-negative count")]
    InvalidBound { token: String },

    #[error("maximum {max} is lower than minimum {min}")]
    InvertedRange { min: usize, max: usize },
}

/// One side of a cardinality range
///
/// A malformed token is kept verbatim rather than rejected. Any comparison
/// against it fails, so a group carrying one is always reported as invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Count(usize),
    Malformed(String),
}

impl Bound {
    fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.parse::<usize>() {
            Ok(n) => Bound::Count(n),
            Err(_) => Bound::Malformed(token.to_string()),
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            Bound::Count(n) => Some(*n),
            Bound::Malformed(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Bound::Malformed(_))
    }

    fn strict(self) -> Result<usize, SpecError> {
        match self {
            Bound::Count(n) => Ok(n),
            Bound::Malformed(token) => Err(SpecError::InvalidBound { token }),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Count(n) => write!(f, "{}", n),
            Bound::Malformed(token) => f.write_str(token),
        }
    }
}

/// Parsed `{min, max}` constraint on how many group members may be checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalitySpec {
    pub min: Bound,
    #[serde(default)]
    pub max: Option<Bound>,
}

impl Default for CardinalitySpec {
    /// At least one member checked, no upper limit
    fn default() -> Self {
        Self {
            min: Bound::Count(1),
            max: None,
        }
    }
}

impl CardinalitySpec {
    pub fn at_least(min: usize) -> Self {
        Self {
            min: Bound::Count(min),
            max: None,
        }
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Bound::Count(min),
            max: Some(Bound::Count(max)),
        }
    }

    /// Parse an attribute value, never failing
    ///
    /// Tokens past the second are ignored.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }

        let mut tokens = raw.split('-');
        let min = tokens.next().map(Bound::parse).unwrap_or(Bound::Count(1));
        let max = tokens.next().map(Bound::parse);

        Self { min, max }
    }

    /// Parse an attribute value, rejecting malformed bounds and inverted ranges
    pub fn strict(raw: &str) -> Result<Self, SpecError> {
        let spec = Self::parse(raw);
        let min = spec.min.clone().strict()?;
        if let Some(max) = spec.max.clone() {
            let max = max.strict()?;
            if max < min {
                return Err(SpecError::InvertedRange { min, max });
            }
        }
        Ok(spec)
    }

    /// Whether `checked` members satisfy this constraint
    ///
    /// The minimum is checked first; the maximum is consulted only when the
    /// minimum holds.
    pub fn admits(&self, checked: usize) -> bool {
        let meets_min = match self.min.count() {
            Some(min) => checked >= min,
            None => false,
        };
        if !meets_min {
            return false;
        }

        match &self.max {
            None => true,
            Some(bound) => bound.count().is_some_and(|max| checked <= max),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        match (self.min.count(), self.max.as_ref().map(Bound::count)) {
            (None, _) | (_, Some(None)) => false,
            (Some(min), Some(Some(max))) => max >= min,
            (Some(_), None) => true,
        }
    }
}

impl fmt::Display for CardinalitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}", self.min),
        }
    }
}

impl FromStr for CardinalitySpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::strict(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", CardinalitySpec::at_least(1))]
    #[case("3", CardinalitySpec::at_least(3))]
    #[case("3-5", CardinalitySpec::between(3, 5))]
    #[case("0-5", CardinalitySpec::between(0, 5))]
    #[case(" 2 - 4 ", CardinalitySpec::between(2, 4))]
    #[case("1-2-3", CardinalitySpec::between(1, 2))]
    fn test_parse_shapes(#[case] raw: &str, #[case] expected: CardinalitySpec) {
        assert_eq!(CardinalitySpec::parse(raw), expected);
    }

    #[test]
    fn test_parse_keeps_malformed_tokens() {
        let spec = CardinalitySpec::parse("abc");
        assert_eq!(spec.min, Bound::Malformed("abc".to_string()));
        assert_eq!(spec.max, None);

        let spec = CardinalitySpec::parse("2-");
        assert_eq!(spec.min, Bound::Count(2));
        assert_eq!(spec.max, Some(Bound::Malformed(String::new())));
    }

    #[test]
    fn test_empty_side_is_malformed() {
        let spec = CardinalitySpec::parse("-2");
        assert!(spec.min.is_malformed());
        assert_eq!(spec.max, Some(Bound::Count(2)));
        assert!(!spec.admits(1));

        let spec = CardinalitySpec::parse("0-");
        assert!(!spec.min.is_malformed());
        assert!(spec.max.as_ref().is_some_and(Bound::is_malformed));
        assert!(!spec.admits(0));
    }

    #[test]
    fn test_malformed_spec_never_admits() {
        for raw in ["abc", "x-3", "2-y", "-1", "2-"] {
            let spec = CardinalitySpec::parse(raw);
            for checked in 0..10 {
                assert!(!spec.admits(checked), "{raw:?} admitted {checked}");
            }
        }
    }

    #[test]
    fn test_admits_range() {
        let spec = CardinalitySpec::between(3, 5);
        assert!(!spec.admits(2));
        assert!(spec.admits(3));
        assert!(spec.admits(4));
        assert!(spec.admits(5));
        assert!(!spec.admits(6));

        let spec = CardinalitySpec::at_least(1);
        assert!(!spec.admits(0));
        assert!(spec.admits(40));
    }

    #[test]
    fn test_inverted_range_always_fails() {
        let spec = CardinalitySpec::parse("5-3");
        assert!(!spec.is_well_formed());
        assert!((0..10).all(|n| !spec.admits(n)));
    }

    #[test]
    fn test_strict_rejects_bad_input() {
        assert_eq!(
            CardinalitySpec::strict("two"),
            Err(SpecError::InvalidBound {
                token: "two".to_string()
            })
        );
        assert_eq!(
            "5-3".parse::<CardinalitySpec>(),
            Err(SpecError::InvertedRange { min: 5, max: 3 })
        );
        assert_eq!(CardinalitySpec::strict(""), Ok(CardinalitySpec::at_least(1)));
    }

    #[test]
    fn test_display_round_trips_attribute_form() {
        assert_eq!(CardinalitySpec::between(0, 5).to_string(), "0-5");
        assert_eq!(CardinalitySpec::default().to_string(), "1");
        assert_eq!(CardinalitySpec::parse("x-2").to_string(), "x-2");
    }
}
