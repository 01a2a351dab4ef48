//! Read-only description of a decoded transaction

use anyhow::{anyhow, Context, Result};
use dashu_int::UBig;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::{fmt, str::FromStr};

use crate::{
    asset::TransactionAmount,
    hash::{DatumHash, KeyHash, TxHash},
};

/// Reference to an output of an earlier transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub transaction_id: TxHash,
    pub output_index: u64,
}

impl TransactionInput {
    pub fn new(transaction_id: TxHash, output_index: u64) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }
}

/// `<tx hash>#<index>`
impl fmt::Display for TransactionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.transaction_id, self.output_index)
    }
}

impl FromStr for TransactionInput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (hash, index) =
            s.split_once('#').ok_or_else(|| anyhow!("Missing '#' in transaction reference {s}"))?;
        Ok(Self {
            transaction_id: hash.parse().with_context(|| format!("Bad transaction id {hash}"))?,
            output_index: index.parse().with_context(|| format!("Bad output index {index}"))?,
        })
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    /// Bech32 for Shelley-era addresses, base58 for Byron ones
    pub address: String,

    #[serde_as(as = "DisplayFromStr")]
    pub coin: UBig,

    /// Native assets in encoded order, then exactly one lovelace entry equal to `coin`
    pub amount: Vec<TransactionAmount>,

    /// Hex of the whole datum option as encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cbor_datum: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum_hash: Option<DatumHash>,

    /// Hex of the plutus data of an inline datum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_datum: Option<String>,
}

impl TransactionOutput {
    /// The lovelace entry of `amount`
    pub fn lovelace(&self) -> Option<&TransactionAmount> {
        self.amount.iter().find(|a| a.is_lovelace())
    }

    /// Native asset entries of `amount`, in encoded order
    pub fn native_assets(&self) -> impl Iterator<Item = &TransactionAmount> {
        self.amount.iter().filter(|a| !a.is_lovelace())
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Blake2b-256 of the body bytes
    pub hash: TxHash,

    /// Spent inputs, in encoded order
    pub inputs: Vec<TransactionInput>,

    /// Outputs, in encoded order; position is the output index
    pub outputs: Vec<TransactionOutput>,

    /// Read-only inputs, empty when the body has none
    pub reference_inputs: Vec<TransactionInput>,

    #[serde_as(as = "DisplayFromStr")]
    pub fee: UBig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_start: Option<u64>,

    #[serde(default)]
    pub required_signers: Vec<KeyHash>,

    /// Positive mint entries
    #[serde(default)]
    pub mint: Vec<TransactionAmount>,

    /// Negative mint entries, as magnitudes
    #[serde(default)]
    pub burn: Vec<TransactionAmount>,
}

impl Transaction {
    /// Sum of lovelace over all outputs
    pub fn total_output(&self) -> UBig {
        self.outputs.iter().fold(UBig::ZERO, |acc, o| acc + &o.coin)
    }

    /// Output at `index`, as addressed by a `TransactionInput` spending it
    pub fn output(&self, index: u64) -> Option<&TransactionOutput> {
        usize::try_from(index).ok().and_then(|i| self.outputs.get(i))
    }
}
