//! Amounts held by an output: the native currency plus native assets

use dashu_int::UBig;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::hash::PolicyId;

/// Unit of the native currency
pub const LOVELACE_UNIT: &str = "lovelace";

/// Length of a hex policy id at the front of a native asset unit
pub const POLICY_ID_HEX_LEN: usize = 56;

/// Build the unit of a native asset: hex(policy id) followed by hex(asset name)
pub fn asset_unit(policy: &PolicyId, name: &[u8]) -> String {
    format!("{policy}{}", hex::encode(name))
}

/// One entry of an output's value
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAmount {
    /// `lovelace` or a native asset unit
    pub unit: String,

    /// Quantity as decimal text, never truncated to a machine integer
    #[serde_as(as = "DisplayFromStr")]
    pub quantity: UBig,
}

impl TransactionAmount {
    pub fn new(unit: impl Into<String>, quantity: UBig) -> Self {
        Self {
            unit: unit.into(),
            quantity,
        }
    }

    pub fn lovelace(quantity: UBig) -> Self {
        Self::new(LOVELACE_UNIT, quantity)
    }

    pub fn native_asset(policy: &PolicyId, name: &[u8], quantity: UBig) -> Self {
        Self::new(asset_unit(policy, name), quantity)
    }

    pub fn is_lovelace(&self) -> bool {
        self.unit == LOVELACE_UNIT
    }

    /// Policy id of a native asset unit
    pub fn policy_id(&self) -> Option<PolicyId> {
        if self.is_lovelace() {
            return None;
        }
        self.unit.get(..POLICY_ID_HEX_LEN)?.parse().ok()
    }

    /// Raw asset name of a native asset unit, possibly empty
    pub fn asset_name(&self) -> Option<Vec<u8>> {
        self.policy_id()?;
        hex::decode(&self.unit[POLICY_ID_HEX_LEN..]).ok()
    }
}
