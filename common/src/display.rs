//! Text rendering of units and quantities

use dashu_int::UBig;

use crate::{asset::LOVELACE_UNIT, registry::Registry};

/// Units longer than this are shortened when shown
pub const DEFAULT_UNIT_THRESHOLD: usize = 32;

/// Decimal places a unit is shown with
pub fn unit_decimals(unit: &str) -> usize {
    if unit == LOVELACE_UNIT { 6 } else { 0 }
}

/// Quantity scaled by the unit's decimals, e.g. 2000000 lovelace is `2.000000`
pub fn display_quantity(unit: &str, quantity: &UBig) -> String {
    let decimals = unit_decimals(unit);
    if decimals == 0 {
        return quantity.to_string();
    }

    let scale = UBig::from(10u8).pow(decimals);
    let whole = quantity / &scale;
    let fraction = quantity % &scale;
    format!("{whole}.{:0>width$}", fraction.to_string(), width = decimals)
}

/// The first `threshold` characters of a unit, with `...` if anything was cut
pub fn short_unit(unit: &str, threshold: usize) -> String {
    match unit.char_indices().nth(threshold) {
        Some((cut, _)) => format!("{}...", &unit[..cut]),
        None => unit.to_string(),
    }
}

/// Label for a unit: `Ada` for lovelace, otherwise the shortened unit followed
/// by its registry name when it has one
pub fn unit_label(unit: &str, registry: Option<&Registry>) -> String {
    if unit == LOVELACE_UNIT {
        return "Ada".to_string();
    }

    let short = short_unit(unit, DEFAULT_UNIT_THRESHOLD);
    match registry.and_then(|r| r.script_name(unit)) {
        Some(name) => format!("{short} ({name})"),
        None => short,
    }
}
