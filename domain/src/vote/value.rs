//! Vote values
//!
//! On the wire a vote value is a JSON number, one of the sentinel strings
//! `"?"` / `"coffee"`, or `null`. Numeric strings such as `"5"` or `"0.5"`
//! are accepted on input and normalised to numbers.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

/// Non-numeric cards that still count as a cast vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// "I don't know" (`?`)
    Unknown,
    /// "I need a break" (`coffee`)
    NeedsBreak,
}

impl Sentinel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentinel::Unknown => "?",
            Sentinel::NeedsBreak => "coffee",
        }
    }

    /// Parse a sentinel token; returns `None` for anything else.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "?" => Some(Sentinel::Unknown),
            t if t.eq_ignore_ascii_case("coffee") => Some(Sentinel::NeedsBreak),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sentinel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The value of a vote.
///
/// `Empty` means "no vote" (never cast, or retracted). Only `Numeric`
/// values take part in estimation statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VoteValue {
    Numeric(f64),
    Sentinel(Sentinel),
    #[default]
    Empty,
}

impl VoteValue {
    pub fn numeric(value: f64) -> Self {
        VoteValue::Numeric(value)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            VoteValue::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, VoteValue::Numeric(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, VoteValue::Empty)
    }
}

impl From<f64> for VoteValue {
    fn from(value: f64) -> Self {
        VoteValue::Numeric(value)
    }
}

impl From<i64> for VoteValue {
    fn from(value: i64) -> Self {
        VoteValue::Numeric(value as f64)
    }
}

impl From<Sentinel> for VoteValue {
    fn from(value: Sentinel) -> Self {
        VoteValue::Sentinel(value)
    }
}

impl std::fmt::Display for VoteValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteValue::Numeric(n) => write!(f, "{}", n),
            VoteValue::Sentinel(s) => write!(f, "{}", s),
            VoteValue::Empty => write!(f, "-"),
        }
    }
}

impl FromStr for VoteValue {
    type Err = String;

    /// Parse a card label: a number, a sentinel token, or empty for no vote.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(VoteValue::Empty);
        }
        if let Some(sentinel) = Sentinel::from_token(trimmed) {
            return Ok(VoteValue::Sentinel(sentinel));
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(VoteValue::Numeric(n)),
            _ => Err(format!("Unknown vote value: {}", trimmed)),
        }
    }
}

impl Serialize for VoteValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VoteValue::Numeric(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                serializer.serialize_i64(*n as i64)
            }
            VoteValue::Numeric(n) => serializer.serialize_f64(*n),
            VoteValue::Sentinel(s) => serializer.serialize_str(s.as_str()),
            VoteValue::Empty => serializer.serialize_none(),
        }
    }
}

struct VoteValueVisitor;

impl<'de> Visitor<'de> for VoteValueVisitor {
    type Value = VoteValue;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a number, \"?\", \"coffee\" or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<VoteValue, E> {
        Ok(VoteValue::Numeric(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<VoteValue, E> {
        Ok(VoteValue::Numeric(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<VoteValue, E> {
        if v.is_finite() {
            Ok(VoteValue::Numeric(v))
        } else {
            Err(E::custom("vote value must be finite"))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<VoteValue, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_none<E: de::Error>(self) -> Result<VoteValue, E> {
        Ok(VoteValue::Empty)
    }

    fn visit_unit<E: de::Error>(self) -> Result<VoteValue, E> {
        Ok(VoteValue::Empty)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<VoteValue, D::Error> {
        deserializer.deserialize_any(VoteValueVisitor)
    }
}

impl<'de> Deserialize<'de> for VoteValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VoteValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_card_labels() {
        assert_eq!("5".parse::<VoteValue>().unwrap(), VoteValue::Numeric(5.0));
        assert_eq!("0.5".parse::<VoteValue>().unwrap(), VoteValue::Numeric(0.5));
        assert_eq!(
            "?".parse::<VoteValue>().unwrap(),
            VoteValue::Sentinel(Sentinel::Unknown)
        );
        assert_eq!(
            "coffee".parse::<VoteValue>().unwrap(),
            VoteValue::Sentinel(Sentinel::NeedsBreak)
        );
        assert_eq!("".parse::<VoteValue>().unwrap(), VoteValue::Empty);
        assert!("XL".parse::<VoteValue>().is_err());
    }

    #[test]
    fn test_wire_form() {
        assert_eq!(serde_json::to_value(VoteValue::Numeric(8.0)).unwrap(), json!(8));
        assert_eq!(serde_json::to_value(VoteValue::Numeric(0.5)).unwrap(), json!(0.5));
        assert_eq!(
            serde_json::to_value(VoteValue::Sentinel(Sentinel::NeedsBreak)).unwrap(),
            json!("coffee")
        );
        assert_eq!(serde_json::to_value(VoteValue::Empty).unwrap(), json!(null));
    }

    #[test]
    fn test_accepts_numeric_strings_and_null() {
        let v: VoteValue = serde_json::from_value(json!("13")).unwrap();
        assert_eq!(v, VoteValue::Numeric(13.0));

        let v: VoteValue = serde_json::from_value(json!(null)).unwrap();
        assert!(v.is_empty());

        let v: VoteValue = serde_json::from_value(json!(-2)).unwrap();
        assert_eq!(v.as_number(), Some(-2.0));
    }

    #[test]
    fn test_rejects_unknown_tokens() {
        assert!(serde_json::from_value::<VoteValue>(json!("banana")).is_err());
        assert!(serde_json::from_value::<VoteValue>(json!({"value": 3})).is_err());
    }
}
