use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::AccountAddress;
use crate::content::ContentId;
use crate::id::ShipmentId;

/// Authoritative shipment fields as held by the ledger.
///
/// Written once by a create transaction. Sender and receiver never change;
/// a document upload only replaces `content_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub id: ShipmentId,
    pub description: String,
    pub sender: AccountAddress,
    pub receiver: AccountAddress,
    pub content_id: ContentId,
}

/// Lifecycle label kept in the index only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    InTransit,
    Delivered,
    Delayed,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::Delayed => "DELAYED",
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_TRANSIT" => Ok(Self::InTransit),
            "DELIVERED" => Ok(Self::Delivered),
            "DELAYED" => Ok(Self::Delayed),
            other => Err(format!("unknown shipment status: {other}")),
        }
    }
}

/// Descriptive record kept in the index under `shipments/<id>`.
///
/// The index is a human-editable cache, so the address, content and
/// transaction fields are kept as plain text and the creation time is
/// optional: a hand-edited entry must still decode. Older entries store the
/// creation time as `timestamp`. Anything that matters for correctness is
/// re-read from the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    pub id: ShipmentId,
    pub source: String,
    pub destination: String,
    #[serde(default)]
    pub receiver_address_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_days: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub document_content_id: String,
    #[serde(default)]
    pub document_url: String,
    #[serde(default)]
    pub transaction_ref: String,
    #[serde(default)]
    pub owner_address: String,
    #[serde(default, alias = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ShipmentStatus,
}

/// Read-time merge of an index record with its ledger record.
///
/// Ledger fields win whenever the ledger was read. `ledger_confirmed` is
/// `false` when the ledger read was skipped or failed; the ownership fields
/// are then whatever the index claims and must not be trusted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledView {
    pub id: ShipmentId,
    pub source: String,
    pub destination: String,
    pub expiry_days: Option<u32>,
    pub status: ShipmentStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub transaction_ref: Option<String>,
    pub description: String,
    pub sender: Option<AccountAddress>,
    pub receiver: Option<AccountAddress>,
    pub content_id: Option<ContentId>,
    pub document_url: Option<String>,
    pub explorer_url: Option<String>,
    pub ledger_confirmed: bool,
    pub ledger_error: Option<String>,
}
