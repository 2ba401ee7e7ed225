use std::sync::Arc;

use anyhow::Context;
use shipreg_index::RealtimeDbIndexStore;
use shipreg_ledger::{JsonRpcShipmentContract, LedgerClient};
use shipreg_session::{ConnectionSession, JsonRpcClient, JsonRpcIdentityProvider};
use shipreg_store::{DocumentStoreAdapter, IpfsHttpDocumentStore};
use shipreg_sync::{RegistryConfig, RegistrySynchronizer};

/// Wire the HTTP backends named in `config` into a synchronizer.
pub fn build(config: &RegistryConfig) -> anyhow::Result<RegistrySynchronizer> {
    let contract_address = config
        .ledger
        .contract_address
        .context("contract address not configured (set SHIPREG_CONTRACT_ADDRESS)")?;

    let rpc = || {
        JsonRpcClient::with_timeout(
            config.session.provider_url.clone(),
            config.session.request_timeout(),
        )
        .context("failed to build json-rpc client")
    };

    let provider = Arc::new(JsonRpcIdentityProvider::new(rpc()?));
    let session = Arc::new(ConnectionSession::new(provider, &config.session));

    let contract = Arc::new(
        JsonRpcShipmentContract::new(Arc::new(rpc()?), contract_address).with_receipt_polling(
            config.ledger.receipt_poll_interval(),
            config.ledger.receipt_timeout(),
        ),
    );
    let ledger = Arc::new(LedgerClient::new(session.clone(), contract, config.ledger.fees));

    let store =
        IpfsHttpDocumentStore::new(&config.documents).context("failed to build document store client")?;
    let documents = Arc::new(DocumentStoreAdapter::new(Arc::new(store), &config.documents));
    let index = Arc::new(
        RealtimeDbIndexStore::new(&config.index).context("failed to build index client")?,
    );

    Ok(
        RegistrySynchronizer::new(session, ledger, documents, index, config.sync.clone())
            .with_contract_address(contract_address),
    )
}

/// Effective configuration: file, then `SHIPREG_*` overrides.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<RegistryConfig> {
    let mut config = RegistryConfig::load(path)?;
    config.apply_env()?;
    Ok(config)
}
