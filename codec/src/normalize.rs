//! Normalisation: flatten a `DecodedTx` into the public `Transaction` model

use dashu_int::UBig;
use txlens_common::{Transaction, TransactionAmount, TransactionOutput};

use crate::{
    decode::{DatumKind, DecodedOutput, DecodedTx},
    value::AssetEntry,
};

/// Map a decoded transaction to the public model. Cannot fail: everything
/// that could go wrong was checked while decoding.
pub fn normalize(tx: DecodedTx) -> Transaction {
    let (mint, burn) = split_mint(&tx.mint);

    Transaction {
        hash: tx.hash,
        inputs: tx.inputs,
        outputs: tx.outputs.into_iter().map(normalize_output).collect(),
        reference_inputs: tx.reference_inputs,
        fee: tx.fee,
        ttl: tx.ttl,
        validity_start: tx.validity_start,
        required_signers: tx.required_signers,
        mint,
        burn,
    }
}

fn normalize_output(output: DecodedOutput) -> TransactionOutput {
    let coin = output.value.coin;

    // Native assets in encoded order, lovelace always last
    let mut amount: Vec<TransactionAmount> = output
        .value
        .assets
        .into_iter()
        .map(|a| TransactionAmount::native_asset(&a.policy, &a.name, a.quantity))
        .collect();
    amount.push(TransactionAmount::lovelace(coin.clone()));

    let (cbor_datum, datum_hash, inline_datum) = match output.datum {
        None => (None, None, None),
        Some(datum) => {
            let raw = Some(hex::encode(&datum.raw));
            match datum.kind {
                DatumKind::Hash(hash) => (raw, Some(hash), None),
                DatumKind::Inline(data) => (raw, None, Some(hex::encode(data))),
            }
        }
    };

    TransactionOutput {
        address: output.address.into_text(),
        coin,
        amount,
        cbor_datum,
        datum_hash,
        inline_datum,
    }
}

/// Split signed mint entries into minted and burnt amounts, keeping order
fn split_mint(entries: &[AssetEntry<i128>]) -> (Vec<TransactionAmount>, Vec<TransactionAmount>) {
    let mut mint = Vec::new();
    let mut burn = Vec::new();

    for entry in entries {
        let quantity = UBig::from(entry.quantity.unsigned_abs());
        let amount = TransactionAmount::native_asset(&entry.policy, &entry.name, quantity);
        if entry.quantity < 0 {
            burn.push(amount);
        } else {
            mint.push(amount);
        }
    }

    (mint, burn)
}
