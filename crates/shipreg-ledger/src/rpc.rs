//! Shipment contract reached through an Ethereum JSON-RPC endpoint.
//!
//! Writes go through `eth_sendTransaction`, so the endpoint must hold the
//! signing key for `from` (a wallet bridge or a dev node with unlocked
//! accounts). Confirmation polls `eth_getTransactionReceipt`.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use shipreg_session::{JsonRpcClient, RpcError};
use shipreg_types::{AccountAddress, ShipmentId, TransactionRef};
use tokio::time::Instant;
use tracing::debug;

use crate::contract::{ContractCall, ContractError, ShipmentContract, TxParams};

sol! {
    function createShipment(uint256 id, string desc, address receiver, string cid);
    function uploadDocument(uint256 id, string cid);
    function getShipmentDetails(uint256 id)
        returns (string desc, address sender, address receiver, string cid);
}

/// Standard JSON-RPC code for an execution revert.
const EXECUTION_REVERTED: i64 = 3;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Receipt {
    /// `0x1` success, `0x0` failure. Absent on pre-Byzantium chains.
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    block_number: Option<String>,
}

pub struct JsonRpcShipmentContract {
    rpc: Arc<JsonRpcClient>,
    address: AccountAddress,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl JsonRpcShipmentContract {
    pub fn new(rpc: Arc<JsonRpcClient>, address: AccountAddress) -> Self {
        Self {
            rpc,
            address,
            poll_interval: Duration::from_secs(1),
            receipt_timeout: Duration::from_secs(120),
        }
    }

    /// How often and how long `confirm` polls for a receipt.
    pub fn with_receipt_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.receipt_timeout = timeout;
        self
    }

    fn calldata(call: &ContractCall) -> Vec<u8> {
        match call {
            ContractCall::CreateShipment {
                id,
                description,
                receiver,
                content_id,
            } => createShipmentCall {
                id: U256::from(id.get()),
                desc: description.clone(),
                receiver: *receiver.as_address(),
                cid: content_id.to_string(),
            }
            .abi_encode(),
            ContractCall::UploadDocument { id, content_id } => uploadDocumentCall {
                id: U256::from(id.get()),
                cid: content_id.to_string(),
            }
            .abi_encode(),
        }
    }

    fn tx_object(&self, call: &ContractCall, from: AccountAddress) -> Value {
        json!({
            "from": from.to_string(),
            "to": self.address.to_string(),
            "data": format!("0x{}", hex::encode(Self::calldata(call))),
        })
    }
}

fn quantity(value: u64) -> String {
    format!("{value:#x}")
}

fn parse_quantity(raw: &str) -> Result<u64, ContractError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| ContractError::Decode(format!("not a hex quantity: {raw}")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| ContractError::Decode(format!("bad quantity {raw}: {e}")))
}

fn map_rpc_error(err: RpcError) -> ContractError {
    match err {
        RpcError::Transport(message) => ContractError::Transport(message),
        RpcError::Decode(message) => ContractError::Decode(message),
        RpcError::Server { code, message, .. }
            if code == EXECUTION_REVERTED || message.contains("revert") =>
        {
            let reason = message
                .strip_prefix("execution reverted: ")
                .unwrap_or(&message)
                .to_string();
            ContractError::Reverted(reason)
        }
        RpcError::Server { message, .. } => ContractError::Rejected(message),
    }
}

#[async_trait]
impl ShipmentContract for JsonRpcShipmentContract {
    async fn estimate_gas(
        &self,
        call: &ContractCall,
        from: AccountAddress,
    ) -> Result<u64, ContractError> {
        let raw: String = self
            .rpc
            .call("eth_estimateGas", json!([self.tx_object(call, from)]))
            .await
            .map_err(map_rpc_error)?;
        let estimate = parse_quantity(&raw)?;
        debug!(method = call.method(), estimate, "gas estimated");
        Ok(estimate)
    }

    async fn send(
        &self,
        call: &ContractCall,
        params: &TxParams,
    ) -> Result<TransactionRef, ContractError> {
        let mut tx = self.tx_object(call, params.from);
        tx["gas"] = json!(quantity(params.gas_limit));
        tx["maxPriorityFeePerGas"] = json!(quantity(params.max_priority_fee_per_gas));
        tx["maxFeePerGas"] = json!(quantity(params.max_fee_per_gas));

        let hash: String = self
            .rpc
            .call("eth_sendTransaction", json!([tx]))
            .await
            .map_err(map_rpc_error)?;
        TransactionRef::parse(&hash).map_err(|e| ContractError::Decode(e.to_string()))
    }

    async fn confirm(&self, tx: &TransactionRef) -> Result<(), ContractError> {
        let deadline = Instant::now() + self.receipt_timeout;
        loop {
            let receipt: Option<Receipt> = self
                .rpc
                .call("eth_getTransactionReceipt", json!([tx.as_str()]))
                .await
                .map_err(map_rpc_error)?;

            if let Some(receipt) = receipt {
                let block = receipt.block_number.as_deref().unwrap_or("pending");
                return match receipt.status.as_deref().map(parse_quantity).transpose()? {
                    Some(0) => Err(ContractError::Reverted(format!(
                        "transaction {tx} failed in block {block}"
                    ))),
                    _ => {
                        debug!(tx = %tx, block, "transaction mined");
                        Ok(())
                    }
                };
            }
            if Instant::now() + self.poll_interval > deadline {
                return Err(ContractError::Transport(format!(
                    "transaction {tx} not mined within {}ms",
                    self.receipt_timeout.as_millis()
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn get_shipment_details(&self, id: ShipmentId) -> Result<Value, ContractError> {
        let data = getShipmentDetailsCall {
            id: U256::from(id.get()),
        }
        .abi_encode();
        let raw: String = self
            .rpc
            .call(
                "eth_call",
                json!([
                    {"to": self.address.to_string(), "data": format!("0x{}", hex::encode(data))},
                    "latest"
                ]),
            )
            .await
            .map_err(map_rpc_error)?;

        let bytes = hex::decode(raw.trim_start_matches("0x"))
            .map_err(|e| ContractError::Decode(format!("eth_call result: {e}")))?;
        let ret = getShipmentDetailsCall::abi_decode_returns(&bytes, true)
            .map_err(|e| ContractError::Decode(format!("getShipmentDetails: {e}")))?;

        Ok(json!({
            "desc": ret.desc,
            "sender": AccountAddress::from_address(ret.sender).to_string(),
            "receiver": AccountAddress::from_address(ret.receiver).to_string(),
            "cid": ret.cid,
        }))
    }
}
