//! Human readable rendering of a decoded transaction

use txlens_common::{
    Registry, Transaction, TransactionAmount, TransactionInput, LOVELACE_UNIT,
    display::{display_quantity, unit_label},
};

pub fn render(tx: &Transaction, registry: Option<&Registry>) -> String {
    let mut lines = vec![
        format!("Transaction {}", tx.hash),
        format!("Fee: {} Ada", display_quantity(LOVELACE_UNIT, &tx.fee)),
    ];
    if let Some(ttl) = tx.ttl {
        lines.push(format!("TTL: slot {ttl}"));
    }
    if let Some(start) = tx.validity_start {
        lines.push(format!("Valid from: slot {start}"));
    }

    render_inputs(&mut lines, "Inputs", &tx.inputs);
    if !tx.reference_inputs.is_empty() {
        render_inputs(&mut lines, "Reference inputs", &tx.reference_inputs);
    }

    lines.push(format!("Outputs ({}):", tx.outputs.len()));
    for (index, output) in tx.outputs.iter().enumerate() {
        lines.push(format!("  #{index} {}", output.address));
        lines.extend(output.amount.iter().map(|a| amount_line("    ", a, registry)));
        if let Some(hash) = &output.datum_hash {
            lines.push(format!("    datum hash {hash}"));
        }
        if let Some(datum) = &output.inline_datum {
            lines.push(format!("    inline datum {datum}"));
        }
    }

    if !tx.required_signers.is_empty() {
        lines.push("Required signers:".to_string());
        lines.extend(tx.required_signers.iter().map(|signer| format!("  {signer}")));
    }

    for (title, amounts) in [("Mint", &tx.mint), ("Burn", &tx.burn)] {
        if !amounts.is_empty() {
            lines.push(format!("{title}:"));
            lines.extend(amounts.iter().map(|a| amount_line("  ", a, registry)));
        }
    }

    lines.join("\n")
}

fn render_inputs(lines: &mut Vec<String>, title: &str, inputs: &[TransactionInput]) {
    lines.push(format!("{title} ({}):", inputs.len()));
    lines.extend(inputs.iter().map(|input| format!("  {input}")));
}

fn amount_line(indent: &str, amount: &TransactionAmount, registry: Option<&Registry>) -> String {
    format!(
        "{indent}{} {}",
        display_quantity(&amount.unit, &amount.quantity),
        unit_label(&amount.unit, registry)
    )
}
