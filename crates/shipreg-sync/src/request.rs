//! Caller input for shipment creation and its single validation pass.

use bytes::Bytes;
use shipreg_store::check_payload;
use shipreg_types::{AccountAddress, ShipmentId};

use crate::config::SynchronizerConfig;
use crate::error::{SyncError, SyncResult};

/// Raw creation request, as typed by the shipper.
#[derive(Clone, Debug, Default)]
pub struct CreateShipmentRequest {
    pub id: String,
    pub source: String,
    pub destination: String,
    pub contents: String,
    pub receiver_address: String,
    pub expiry_days: Option<u32>,
    pub payload: Bytes,
}

/// A request that passed validation. Text fields are sanitized and
/// truncated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedCreate {
    pub id: ShipmentId,
    pub source: String,
    pub destination: String,
    pub contents: String,
    pub receiver: AccountAddress,
    pub expiry_days: Option<u32>,
    pub payload: Bytes,
}

impl ValidatedCreate {
    /// Description stored on the ledger.
    pub fn ledger_description(&self) -> String {
        format!("{} | {} -> {}", self.contents, self.source, self.destination)
    }
}

/// Drop control characters, trim, and keep at most `max_chars` characters.
pub fn sanitize(input: &str, max_chars: usize) -> String {
    let cleaned: String = input.chars().filter(|c| !c.is_control()).collect();
    cleaned.trim().chars().take(max_chars).collect::<String>().trim_end().to_string()
}

impl CreateShipmentRequest {
    /// Check everything at once and report every problem found.
    ///
    /// Performs no I/O.
    pub fn validate(
        &self,
        config: &SynchronizerConfig,
        max_upload_bytes: usize,
    ) -> SyncResult<ValidatedCreate> {
        let mut problems = Vec::new();

        let id = ShipmentId::parse(&self.id)
            .map_err(|e| problems.push(e.to_string()))
            .ok();
        let receiver = AccountAddress::parse(&self.receiver_address)
            .map_err(|e| problems.push(e.to_string()))
            .ok();
        if let Err(e) = check_payload(&self.payload, max_upload_bytes) {
            problems.push(e.to_string());
        }

        let mut text = |name: &str, raw: &str, max: usize| {
            let value = sanitize(raw, max);
            if value.is_empty() {
                problems.push(format!("{name} is required"));
            }
            value
        };
        let source = text("source", &self.source, config.max_source_chars);
        let destination = text("destination", &self.destination, config.max_destination_chars);
        let contents = text("contents", &self.contents, config.max_contents_chars);

        if self.expiry_days == Some(0) {
            problems.push("expiry must be at least one day".into());
        }

        match (id, receiver) {
            (Some(id), Some(receiver)) if problems.is_empty() => Ok(ValidatedCreate {
                id,
                source,
                destination,
                contents,
                receiver,
                expiry_days: self.expiry_days,
                payload: self.payload.clone(),
            }),
            _ => Err(SyncError::InvalidInput(problems)),
        }
    }
}
