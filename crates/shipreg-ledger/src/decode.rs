//! Decoding of `getShipmentDetails` output.
//!
//! Depending on the bridge, the four return values arrive keyed by name
//! (`desc`, `sender`, `receiver`, `cid`), by position (`"0"`..`"3"`), both
//! at once, or as a bare array. Names are tried first so that a reordered
//! contract still decodes correctly when the bridge supplies them.

use serde_json::Value;
use shipreg_types::{AccountAddress, ContentId, LedgerRecord, ShipmentId};

use crate::error::{LedgerError, LedgerResult};

const FIELDS: [&str; 4] = ["desc", "sender", "receiver", "cid"];

fn field<'a>(output: &'a Value, index: usize) -> Option<&'a Value> {
    match output {
        Value::Object(map) => map
            .get(FIELDS[index])
            .or_else(|| map.get(&index.to_string())),
        Value::Array(items) => items.get(index),
        _ => None,
    }
}

fn text<'a>(output: &'a Value, index: usize) -> LedgerResult<&'a str> {
    let name = FIELDS[index];
    field(output, index)
        .ok_or_else(|| LedgerError::Decode(format!("missing field {name}")))?
        .as_str()
        .ok_or_else(|| LedgerError::Decode(format!("field {name} is not a string")))
}

fn address(output: &Value, index: usize) -> LedgerResult<AccountAddress> {
    let raw = text(output, index)?;
    AccountAddress::parse(raw)
        .map_err(|e| LedgerError::Decode(format!("field {}: {e}", FIELDS[index])))
}

/// Decode the raw read output for `id` into a typed record.
///
/// A zero sender is the contract's empty slot and maps to
/// [`LedgerError::RecordNotFound`].
pub fn decode_shipment_details(id: ShipmentId, output: &Value) -> LedgerResult<LedgerRecord> {
    let sender = address(output, 1)?;
    if sender.is_zero() {
        return Err(LedgerError::RecordNotFound(id));
    }
    let description = text(output, 0)?.to_string();
    let receiver = address(output, 2)?;
    let content_id = ContentId::new(text(output, 3)?)
        .map_err(|e| LedgerError::Decode(e.to_string()))?;

    Ok(LedgerRecord {
        id,
        description,
        sender,
        receiver,
        content_id,
    })
}
