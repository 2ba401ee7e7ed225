use std::sync::Arc;

use shipreg_session::ConnectionSession;
use shipreg_types::{AccountAddress, ContentId, LedgerRecord, ShipmentId, TransactionRef};
use tracing::{debug, info, warn};

use crate::config::FeePolicy;
use crate::contract::{ContractCall, ContractError, ShipmentContract, TxParams};
use crate::decode::decode_shipment_details;
use crate::error::{LedgerError, LedgerResult};

/// Shipment operations translated into contract calls.
///
/// Writes sign as the session's current identity and return only once the
/// transaction is mined and executed; reads need no identity.
pub struct LedgerClient {
    session: Arc<ConnectionSession>,
    contract: Arc<dyn ShipmentContract>,
    fees: FeePolicy,
}

impl LedgerClient {
    pub fn new(
        session: Arc<ConnectionSession>,
        contract: Arc<dyn ShipmentContract>,
        fees: FeePolicy,
    ) -> Self {
        Self {
            session,
            contract,
            fees,
        }
    }

    pub fn session(&self) -> &Arc<ConnectionSession> {
        &self.session
    }

    /// Create the ledger record for `id`.
    ///
    /// The receiver is sent in checksummed form. The ledger itself refuses a
    /// second create for the same identifier.
    pub async fn create_record(
        &self,
        id: ShipmentId,
        description: &str,
        receiver: AccountAddress,
        content_id: &ContentId,
    ) -> LedgerResult<TransactionRef> {
        self.submit(ContractCall::CreateShipment {
            id,
            description: description.to_string(),
            receiver,
            content_id: content_id.clone(),
        })
        .await
    }

    /// Point the record at a new document. Only the record's sender may do so.
    pub async fn upload_document(
        &self,
        id: ShipmentId,
        content_id: &ContentId,
    ) -> LedgerResult<TransactionRef> {
        self.submit(ContractCall::UploadDocument {
            id,
            content_id: content_id.clone(),
        })
        .await
    }

    pub async fn read_record(&self, id: ShipmentId) -> LedgerResult<LedgerRecord> {
        let output = self
            .contract
            .get_shipment_details(id)
            .await
            .map_err(|e| classify(e, None))?;
        decode_shipment_details(id, &output)
    }

    async fn submit(&self, call: ContractCall) -> LedgerResult<TransactionRef> {
        let from = self.session.require_identity()?;
        let estimate = self
            .contract
            .estimate_gas(&call, from)
            .await
            .map_err(|e| classify(e, Some(&call)))?;

        let params = TxParams {
            from,
            gas_limit: self.fees.gas_limit(estimate),
            max_priority_fee_per_gas: self.fees.max_priority_fee_per_gas,
            max_fee_per_gas: self.fees.max_fee_per_gas,
        };
        debug!(
            method = call.method(),
            id = %call.shipment_id(),
            estimate,
            gas_limit = params.gas_limit,
            "submitting ledger transaction"
        );

        let tx = match self.contract.send(&call, &params).await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(method = call.method(), id = %call.shipment_id(), error = %e, "ledger transaction failed");
                return Err(classify(e, Some(&call)));
            }
        };
        debug!(method = call.method(), id = %call.shipment_id(), tx = %tx, "ledger transaction submitted");

        match self.contract.confirm(&tx).await {
            Ok(()) => {
                info!(method = call.method(), id = %call.shipment_id(), tx = %tx, "ledger transaction confirmed");
                Ok(tx)
            }
            Err(e) => {
                warn!(method = call.method(), id = %call.shipment_id(), tx = %tx, error = %e, "ledger transaction not confirmed");
                Err(classify(e, Some(&call)))
            }
        }
    }
}

const UNDERPRICED_MARKERS: [&str; 4] = ["underpriced", "fee cap", "max fee per gas", "base fee"];
const OWNERSHIP_MARKERS: [&str; 2] = ["owner", "sender"];

/// Map a backend failure onto the ledger error taxonomy.
fn classify(err: ContractError, call: Option<&ContractCall>) -> LedgerError {
    let mentions = |message: &str, markers: &[&str]| {
        let lower = message.to_ascii_lowercase();
        markers.iter().any(|m| lower.contains(m))
    };
    match err {
        ContractError::Transport(message) => LedgerError::Transport(message),
        ContractError::Decode(message) => LedgerError::Decode(message),
        ContractError::Reverted(reason)
            if matches!(call, Some(ContractCall::UploadDocument { .. }))
                && mentions(&reason, &OWNERSHIP_MARKERS) =>
        {
            LedgerError::NotOwner(reason)
        }
        ContractError::Reverted(message) | ContractError::Rejected(message) => {
            if mentions(&message, &UNDERPRICED_MARKERS) {
                LedgerError::Underpriced(message)
            } else {
                LedgerError::SubmissionRejected(message)
            }
        }
    }
}
