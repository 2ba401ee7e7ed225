use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{json, Value};
use shipreg_types::{AccountAddress, ContentId, ShipmentId, TransactionRef};

use crate::contract::{ContractCall, ContractError, ShipmentContract, TxParams};

const BASE_TX_GAS: u64 = 21_000;
const STORAGE_GAS: u64 = 40_000;
const CALLDATA_BYTE_GAS: u64 = 68;

#[derive(Clone, Debug)]
struct StoredShipment {
    description: String,
    sender: AccountAddress,
    receiver: AccountAddress,
    content_id: ContentId,
}

#[derive(Default)]
struct State {
    shipments: BTreeMap<ShipmentId, StoredShipment>,
    nonce: u64,
    sent: Vec<(ContractCall, TxParams)>,
    estimate_override: Option<u64>,
    /// Accepted but not yet executed (deferred mode only).
    pending: HashMap<TransactionRef, (ContractCall, AccountAddress)>,
    /// Execution result of every mined transaction.
    mined: HashMap<TransactionRef, Result<(), ContractError>>,
}

/// In-memory shipment contract.
///
/// Enforces the same rules as the deployed contract (unique identifiers,
/// sender-only document updates) and the node-side checks a submission can
/// fail (gas limit, fee cap against base fee). Counts calls so tests can
/// assert how often the ledger was touched.
///
/// By default a transaction executes inside `send`. In deferred mode it only
/// executes when confirmed, so two submissions can both be accepted and the
/// later one revert on the ledger.
pub struct InMemoryShipmentContract {
    state: RwLock<State>,
    base_fee: u64,
    deferred: AtomicBool,
    fail_reads: AtomicBool,
    fail_next_send: AtomicBool,
    estimate_calls: AtomicUsize,
    send_calls: AtomicUsize,
    confirm_calls: AtomicUsize,
    read_calls: AtomicUsize,
}

impl InMemoryShipmentContract {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            base_fee: 1_000_000_000,
            deferred: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_next_send: AtomicBool::new(false),
            estimate_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
            read_calls: AtomicUsize::new(0),
        }
    }

    /// Network base fee, in wei. Submissions whose fee cap is below it are
    /// rejected as underpriced.
    pub fn with_base_fee(mut self, base_fee: u64) -> Self {
        self.base_fee = base_fee;
        self
    }

    /// Execute transactions at confirmation instead of submission.
    pub fn set_deferred(&self, deferred: bool) {
        self.deferred.store(deferred, Ordering::SeqCst);
    }

    /// Report this value from `estimate_gas` instead of the computed cost.
    pub fn set_estimate_override(&self, estimate: Option<u64>) {
        self.state.write().expect("lock poisoned").estimate_override = estimate;
    }

    /// Make every read fail with a transport error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make the next `send` fail with a transport error.
    pub fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::SeqCst);
    }

    /// Insert a record directly, bypassing submission.
    pub fn seed(
        &self,
        id: ShipmentId,
        description: &str,
        sender: AccountAddress,
        receiver: AccountAddress,
        content_id: ContentId,
    ) {
        self.state.write().expect("lock poisoned").shipments.insert(
            id,
            StoredShipment {
                description: description.to_string(),
                sender,
                receiver,
                content_id,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.state.read().expect("lock poisoned").shipments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn estimate_calls(&self) -> usize {
        self.estimate_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Every accepted submission, oldest first.
    pub fn sent(&self) -> Vec<(ContractCall, TxParams)> {
        self.state.read().expect("lock poisoned").sent.clone()
    }

    pub fn last_params(&self) -> Option<TxParams> {
        self.state.read().expect("lock poisoned").sent.last().map(|(_, p)| *p)
    }

    fn gas_cost(call: &ContractCall) -> u64 {
        let calldata = match call {
            ContractCall::CreateShipment {
                description,
                content_id,
                ..
            } => description.len() + content_id.as_str().len() + 20,
            ContractCall::UploadDocument { content_id, .. } => content_id.as_str().len(),
        };
        BASE_TX_GAS + STORAGE_GAS + CALLDATA_BYTE_GAS * calldata as u64
    }

    /// Contract-level checks shared by estimation and execution.
    fn check(state: &State, call: &ContractCall, from: AccountAddress) -> Result<(), ContractError> {
        match call {
            ContractCall::CreateShipment { id, .. } => {
                if state.shipments.contains_key(id) {
                    return Err(ContractError::Reverted("shipment already exists".into()));
                }
            }
            ContractCall::UploadDocument { id, .. } => match state.shipments.get(id) {
                None => return Err(ContractError::Reverted("shipment does not exist".into())),
                Some(s) if s.sender != from => {
                    return Err(ContractError::Reverted(
                        "caller is not the shipment sender".into(),
                    ))
                }
                Some(_) => {}
            },
        }
        Ok(())
    }

    fn apply(state: &mut State, call: &ContractCall, from: AccountAddress) {
        match call {
            ContractCall::CreateShipment {
                id,
                description,
                receiver,
                content_id,
            } => {
                state.shipments.insert(
                    *id,
                    StoredShipment {
                        description: description.clone(),
                        sender: from,
                        receiver: *receiver,
                        content_id: content_id.clone(),
                    },
                );
            }
            ContractCall::UploadDocument { id, content_id } => {
                if let Some(s) = state.shipments.get_mut(id) {
                    s.content_id = content_id.clone();
                }
            }
        }
    }

    fn tx_hash(nonce: u64, call: &ContractCall) -> TransactionRef {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&nonce.to_be_bytes());
        hasher.update(call.method().as_bytes());
        hasher.update(&call.shipment_id().get().to_be_bytes());
        TransactionRef::from_hash(*hasher.finalize().as_bytes())
    }
}

impl Default for InMemoryShipmentContract {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShipmentContract for InMemoryShipmentContract {
    async fn estimate_gas(
        &self,
        call: &ContractCall,
        from: AccountAddress,
    ) -> Result<u64, ContractError> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().expect("lock poisoned");
        Self::check(&state, call, from)?;
        Ok(state.estimate_override.unwrap_or_else(|| Self::gas_cost(call)))
    }

    async fn send(
        &self,
        call: &ContractCall,
        params: &TxParams,
    ) -> Result<TransactionRef, ContractError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            return Err(ContractError::Transport("connection reset".into()));
        }
        if params.max_priority_fee_per_gas > params.max_fee_per_gas {
            return Err(ContractError::Rejected(
                "max priority fee per gas higher than max fee per gas".into(),
            ));
        }
        if params.max_fee_per_gas < self.base_fee {
            return Err(ContractError::Rejected(format!(
                "max fee per gas less than block base fee: maxFeePerGas: {}, baseFee: {}",
                params.max_fee_per_gas, self.base_fee
            )));
        }
        if params.gas_limit < Self::gas_cost(call) {
            return Err(ContractError::Reverted("out of gas".into()));
        }

        let mut state = self.state.write().expect("lock poisoned");
        let deferred = self.deferred.load(Ordering::SeqCst);
        if !deferred {
            Self::check(&state, call, params.from)?;
            Self::apply(&mut state, call, params.from);
        }
        state.nonce += 1;
        let tx = Self::tx_hash(state.nonce, call);
        if deferred {
            state.pending.insert(tx.clone(), (call.clone(), params.from));
        } else {
            state.mined.insert(tx.clone(), Ok(()));
        }
        state.sent.push((call.clone(), *params));
        Ok(tx)
    }

    async fn confirm(&self, tx: &TransactionRef) -> Result<(), ContractError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        if self.deferred.load(Ordering::SeqCst) {
            // Let other submissions in before this one is mined.
            tokio::task::yield_now().await;
        }
        let mut state = self.state.write().expect("lock poisoned");
        if let Some((call, from)) = state.pending.remove(tx) {
            let outcome = match Self::check(&state, &call, from) {
                Ok(()) => {
                    Self::apply(&mut state, &call, from);
                    Ok(())
                }
                Err(e) => Err(e),
            };
            state.mined.insert(tx.clone(), outcome);
        }
        match state.mined.get(tx) {
            Some(outcome) => outcome.clone(),
            None => Err(ContractError::Rejected(format!("unknown transaction {tx}"))),
        }
    }

    async fn get_shipment_details(&self, id: ShipmentId) -> Result<Value, ContractError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ContractError::Transport("node unreachable".into()));
        }
        let state = self.state.read().expect("lock poisoned");
        let (desc, sender, receiver, cid) = match state.shipments.get(&id) {
            Some(s) => (
                s.description.clone(),
                s.sender.to_string(),
                s.receiver.to_string(),
                s.content_id.to_string(),
            ),
            None => (
                String::new(),
                AccountAddress::ZERO.to_string(),
                AccountAddress::ZERO.to_string(),
                String::new(),
            ),
        };
        // Same shape a web3 bridge produces: positional and named keys.
        Ok(json!({
            "0": desc, "1": sender, "2": receiver, "3": cid,
            "desc": desc, "sender": sender, "receiver": receiver, "cid": cid,
            "__length__": 4,
        }))
    }
}
