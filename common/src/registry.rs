//! Asset registry: friendly names for scripts and minting policies
//!
//! The registry is a JSON document published next to the viewer. Only
//! `scriptInfos` is interpreted; everything else is carried as opaque JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::asset::{LOVELACE_UNIT, POLICY_ID_HEX_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptType {
    Validator,
    MintingPolicy,
    StakeValidator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptNetwork {
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptInfo {
    #[serde(rename = "type")]
    pub script_type: ScriptType,
    pub name: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<ScriptNetwork>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub script_hash: String,
    /// Locked-at reference UTxO or raw script; not interpreted here
    #[serde(default)]
    pub deployment: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub script_infos: Vec<ScriptInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<serde_json::Value>,
}

impl Registry {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid registry JSON")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read registry {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Script registered under exactly this hash
    pub fn script(&self, script_hash: &str) -> Option<&ScriptInfo> {
        self.script_infos.iter().find(|s| s.script_hash.eq_ignore_ascii_case(script_hash))
    }

    /// Friendly name for a unit.
    ///
    /// A native asset matches on the whole unit first, then on its policy id
    /// prefix. Lovelace never has a registry name.
    pub fn script_name(&self, unit: &str) -> Option<&str> {
        if unit == LOVELACE_UNIT {
            return None;
        }
        self.script(unit)
            .or_else(|| unit.get(..POLICY_ID_HEX_LEN).and_then(|policy| self.script(policy)))
            .map(|s| s.name.as_str())
    }
}
