use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of a document in the content-addressed store.
///
/// The registry never interprets it beyond substituting it into gateway URL
/// templates, so the only rule is that it is a single non-empty URL path
/// segment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.is_empty()
            || value.contains('/')
            || value.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(TypeError::InvalidContentId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentId> for String {
    fn from(cid: ContentId) -> Self {
        cid.0
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash of a submitted ledger transaction (`0x` + 64 hex digits).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionRef(String);

impl TransactionRef {
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let body = value
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidTransactionRef(value.to_string()))?;
        if body.len() != 64 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidTransactionRef(value.to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn from_hash(hash: [u8; 32]) -> Self {
        let mut s = String::with_capacity(66);
        s.push_str("0x");
        for byte in hash {
            s.push_str(&format!("{byte:02x}"));
        }
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TransactionRef {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TransactionRef> for String {
    fn from(tx: TransactionRef) -> Self {
        tx.0
    }
}

impl fmt::Debug for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionRef({})", &self.0[..10])
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_id_rules() {
        assert!(ContentId::new("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi").is_ok());
        assert!(ContentId::new("").is_err());
        assert!(ContentId::new("a/b").is_err());
        assert!(ContentId::new("a b").is_err());
    }

    #[test]
    fn transaction_ref_from_hash_parses_back() {
        let tx = TransactionRef::from_hash([0xab; 32]);
        assert_eq!(tx.as_str().len(), 66);
        assert_eq!(TransactionRef::parse(tx.as_str()).unwrap(), tx);
    }

    #[test]
    fn transaction_ref_is_lowercased() {
        let upper = format!("0x{}", "AB".repeat(32));
        let tx = TransactionRef::parse(&upper).unwrap();
        assert_eq!(tx, TransactionRef::from_hash([0xab; 32]));
    }

    #[test]
    fn transaction_ref_rejects_short_hash() {
        assert!(TransactionRef::parse("0x1234").is_err());
        assert!(TransactionRef::parse(&"ab".repeat(32)).is_err());
    }
}
