//! Read-time merge of index and ledger data.

use shipreg_ledger::LedgerError;
use shipreg_types::{
    AccountAddress, ContentId, IndexRecord, LedgerRecord, ReconciledView, ShipmentId,
};

/// What became of the ledger side of a read.
#[derive(Debug)]
pub enum LedgerRead {
    /// No identity was held, so the ledger was not asked.
    Skipped,
    Read(LedgerRecord),
    Failed(LedgerError),
}

/// Merge an index record with the ledger read.
///
/// Ledger fields win whenever the ledger answered. Otherwise the index's
/// claims are passed through, unconfirmed. `document_url` comes from
/// `gateway_url` applied to the winning content id; the index's stored URL
/// is only used when no content id is usable.
pub fn reconcile(
    index: IndexRecord,
    ledger: LedgerRead,
    gateway_url: impl Fn(&ContentId) -> String,
    explorer_url: Option<String>,
) -> ReconciledView {
    let (ledger_record, ledger_error) = match ledger {
        LedgerRead::Read(record) => (Some(record), None),
        LedgerRead::Skipped => (None, None),
        LedgerRead::Failed(e) => (None, Some(e.to_string())),
    };

    let (description, sender, receiver, content_id) = match &ledger_record {
        Some(r) => (
            r.description.clone(),
            Some(r.sender),
            Some(r.receiver),
            Some(r.content_id.clone()),
        ),
        None => (
            index.description.clone(),
            AccountAddress::parse(&index.owner_address).ok(),
            AccountAddress::parse(&index.receiver_address_text).ok(),
            ContentId::new(index.document_content_id.clone()).ok(),
        ),
    };

    let document_url = match &content_id {
        Some(cid) => Some(gateway_url(cid)),
        None if !index.document_url.is_empty() => Some(index.document_url.clone()),
        None => None,
    };

    ReconciledView {
        id: index.id,
        source: index.source,
        destination: index.destination,
        expiry_days: index.expiry_days,
        status: index.status,
        created_at: index.created_at,
        transaction_ref: Some(index.transaction_ref).filter(|t| !t.is_empty()),
        description,
        sender,
        receiver,
        content_id,
        document_url,
        explorer_url,
        ledger_confirmed: ledger_record.is_some(),
        ledger_error,
    }
}

/// Fill the explorer template for a shipment.
pub fn explorer_url(template: &str, contract: AccountAddress, id: ShipmentId) -> String {
    template
        .replace("{contract}", &contract.to_string())
        .replace("{id}", &id.to_string())
}
