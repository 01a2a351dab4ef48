//! Interfaces to the chain data services the viewer consults around a
//! decoded transaction. Implementations live with the hosting application.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    asset::TransactionAmount,
    hash::TxHash,
    registry::Registry,
    transaction::TransactionInput,
};

/// Where a transaction landed on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub hash: TxHash,
    pub block_height: u64,
    pub slot: u64,
    pub size: u64,
}

/// One output as reported by the UTxO service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoSummary {
    pub address: String,
    pub amount: Vec<TransactionAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_datum: Option<String>,
}

/// All outputs of a transaction, indexable by output index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxUtxos {
    pub hash: TxHash,
    pub outputs: Vec<UtxoSummary>,
}

/// Transaction lookup by hash; `Ok(None)` when it is not on chain (yet)
#[async_trait]
pub trait TransactionLookup: Send + Sync {
    async fn transaction_by_hash(&self, hash: &TxHash) -> Result<Option<TransactionSummary>>;
}

/// Outputs of a transaction by its hash; `Ok(None)` when unknown
#[async_trait]
pub trait UtxoLookup: Send + Sync {
    async fn utxos_by_transaction(&self, hash: &TxHash) -> Result<Option<TxUtxos>>;
}

/// The asset registry document
#[async_trait]
pub trait AssetRegistryLookup: Send + Sync {
    async fn registry(&self) -> Result<Registry>;
}

/// Resolve the output an input points at
pub async fn resolve_input(
    lookup: &dyn UtxoLookup,
    input: &TransactionInput,
) -> Result<Option<UtxoSummary>> {
    let Some(utxos) = lookup.utxos_by_transaction(&input.transaction_id).await? else {
        debug!("No outputs known for {}", input.transaction_id);
        return Ok(None);
    };

    let output =
        usize::try_from(input.output_index).ok().and_then(|i| utxos.outputs.into_iter().nth(i));
    if output.is_none() {
        debug!("{input} is beyond the outputs of its transaction");
    }
    Ok(output)
}
