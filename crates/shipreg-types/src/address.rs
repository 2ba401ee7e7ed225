use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// An account address on the ledger.
///
/// Parsing accepts the usual wallet spellings and normalizes them; `Display`
/// always yields the EIP-55 checksummed form, which is what gets sent to the
/// ledger and written to the index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(Address);

impl AccountAddress {
    /// The all-zero address. The ledger reports it for empty slots.
    pub const ZERO: Self = Self(Address::ZERO);

    /// Parse and normalize a textual address.
    ///
    /// Requires a `0x` prefix followed by 40 hex digits. All-lowercase and
    /// all-uppercase digits are accepted as is; mixed case must carry a valid
    /// checksum.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let invalid = |reason| TypeError::InvalidAddress {
            input: input.to_string(),
            reason,
        };
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix("0x")
            .ok_or_else(|| invalid("missing 0x prefix"))?;
        if body.len() != 40 {
            return Err(invalid("expected 40 hex digits"));
        }
        if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("non-hex character"));
        }
        let address = Address::from_str(body).map_err(|_| invalid("non-hex character"))?;

        let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum(None) != trimmed {
            return Err(invalid("checksum mismatch"));
        }
        Ok(Self(address))
    }

    pub fn from_address(address: Address) -> Self {
        Self(address)
    }

    pub fn as_address(&self) -> &Address {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// EIP-55 checksummed spelling.
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }

    /// Abbreviated form for display, e.g. `0x5aAe…eAed`.
    pub fn short(&self) -> String {
        let full = self.to_checksum();
        format!("{}…{}", &full[..6], &full[full.len() - 4..])
    }
}

impl FromStr for AccountAddress {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountAddress> for String {
    fn from(address: AccountAddress) -> Self {
        address.to_checksum()
    }
}

impl From<Address> for AccountAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self.to_checksum())
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}
