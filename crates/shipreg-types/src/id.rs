use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Key of a shipment in both the ledger and the index.
///
/// Chosen by the creator. Always a positive integer; zero is not
/// representable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentId(NonZeroU64);

impl ShipmentId {
    /// Parse caller input.
    ///
    /// Surrounding whitespace is ignored. Anything else that is not an ASCII
    /// digit (signs, separators, letters) is rejected, as are zero and values
    /// beyond `u64::MAX`.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let trimmed = input.trim();
        let invalid = |reason| TypeError::InvalidIdentifier {
            input: input.to_string(),
            reason,
        };
        if trimmed.is_empty() {
            return Err(invalid("empty"));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("not a positive integer"));
        }
        let value: u64 = trimmed.parse().map_err(|_| invalid("out of range"))?;
        NonZeroU64::new(value)
            .map(Self)
            .ok_or_else(|| invalid("must be greater than zero"))
    }

    /// Build from a raw integer. Returns `None` for zero.
    pub fn new(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(Self)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl FromStr for ShipmentId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for ShipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShipmentId({})", self.0)
    }
}

impl fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ShipmentId> for u64 {
    fn from(id: ShipmentId) -> Self {
        id.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_plain_digits() {
        assert_eq!(ShipmentId::parse("42").unwrap().get(), 42);
        assert_eq!(ShipmentId::parse("  7\n").unwrap().get(), 7);
    }

    #[test]
    fn rejects_zero_and_empty() {
        assert!(ShipmentId::parse("0").is_err());
        assert!(ShipmentId::parse("000").is_err());
        assert!(ShipmentId::parse("").is_err());
        assert!(ShipmentId::parse("   ").is_err());
    }

    #[test]
    fn rejects_non_numeric() {
        for input in ["-5", "+5", "12a", "SHP-12", "1.5", "1_000", "0x10"] {
            assert!(ShipmentId::parse(input).is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn rejects_overflow() {
        let err = ShipmentId::parse("18446744073709551616").unwrap_err();
        assert!(matches!(err, TypeError::InvalidIdentifier { reason: "out of range", .. }));
    }

    #[test]
    fn serde_is_a_bare_number() {
        let id = ShipmentId::new(9).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
        assert!(serde_json::from_str::<ShipmentId>("0").is_err());
    }

    proptest! {
        #[test]
        fn non_positive_integers_never_parse(n in i64::MIN..=0i64) {
            prop_assert!(ShipmentId::parse(&n.to_string()).is_err());
        }

        #[test]
        fn positive_integers_round_trip_through_display(n in 1u64..) {
            let id = ShipmentId::parse(&n.to_string()).unwrap();
            prop_assert_eq!(id.get(), n);
            prop_assert_eq!(id.to_string(), n.to_string());
        }

        #[test]
        fn inputs_with_letters_never_parse(s in "[0-9]{0,4}[a-zA-Z]+[0-9]{0,4}") {
            prop_assert!(ShipmentId::parse(&s).is_err());
        }
    }
}
