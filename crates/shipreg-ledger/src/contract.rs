use async_trait::async_trait;
use serde_json::Value;
use shipreg_types::{AccountAddress, ContentId, ShipmentId, TransactionRef};

/// A state-changing call on the shipment contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractCall {
    CreateShipment {
        id: ShipmentId,
        description: String,
        receiver: AccountAddress,
        content_id: ContentId,
    },
    UploadDocument {
        id: ShipmentId,
        content_id: ContentId,
    },
}

impl ContractCall {
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateShipment { .. } => "createShipment",
            Self::UploadDocument { .. } => "uploadDocument",
        }
    }

    pub fn shipment_id(&self) -> ShipmentId {
        match self {
            Self::CreateShipment { id, .. } | Self::UploadDocument { id, .. } => *id,
        }
    }
}

/// Submission parameters for a write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxParams {
    pub from: AccountAddress,
    pub gas_limit: u64,
    pub max_priority_fee_per_gas: u64,
    pub max_fee_per_gas: u64,
}

/// Raw failure reported by a contract backend, before classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// Execution reverted; carries the revert reason.
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// The node or wallet refused the transaction before execution.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),
}

/// Boundary to the deployed shipment contract.
///
/// Writes must be preceded by `estimate_gas`, and a hash from `send` only
/// means the transaction was accepted for inclusion: `confirm` reports
/// whether it actually executed. Reads return the bridge's raw output; see
/// [`crate::decode_shipment_details`].
#[async_trait]
pub trait ShipmentContract: Send + Sync {
    async fn estimate_gas(
        &self,
        call: &ContractCall,
        from: AccountAddress,
    ) -> Result<u64, ContractError>;

    async fn send(
        &self,
        call: &ContractCall,
        params: &TxParams,
    ) -> Result<TransactionRef, ContractError>;

    /// Wait until `tx` is mined. A mined transaction whose execution failed
    /// is [`ContractError::Reverted`].
    async fn confirm(&self, tx: &TransactionRef) -> Result<(), ContractError>;

    async fn get_shipment_details(&self, id: ShipmentId) -> Result<Value, ContractError>;
}
