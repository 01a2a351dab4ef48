use config::Config;
use serde::Deserialize;
use std::{
    fmt::{Display, Formatter, Result},
    str::FromStr,
};

pub const CONFIG_KEY_MAX_INPUTS: &str = "limits.max_inputs";
pub const CONFIG_KEY_MAX_OUTPUTS: &str = "limits.max_outputs";
pub const CONFIG_KEY_MAX_ASSETS: &str = "limits.max_assets";
pub const CONFIG_KEY_MAX_REFERENCE_INPUTS: &str = "limits.max_reference_inputs";
pub const CONFIG_KEY_REGISTRY_PATH: &str = "registry.path";
pub const CONFIG_KEY_OUTPUT_FORMAT: &str = "output.format";

/// Caps on declared collection sizes, checked before a collection is read.
/// Unbounded by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Spent inputs, and also required signers
    pub max_inputs: u64,
    pub max_outputs: u64,
    /// Policies in one multi-asset map, and asset names under one policy
    pub max_assets: u64,
    pub max_reference_inputs: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl DecodeLimits {
    pub const fn unbounded() -> Self {
        Self {
            max_inputs: u64::MAX,
            max_outputs: u64::MAX,
            max_assets: u64::MAX,
            max_reference_inputs: u64::MAX,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::unbounded();
        let get = |key: &str, default: u64| config.get::<u64>(key).unwrap_or(default);
        Self {
            max_inputs: get(CONFIG_KEY_MAX_INPUTS, defaults.max_inputs),
            max_outputs: get(CONFIG_KEY_MAX_OUTPUTS, defaults.max_outputs),
            max_assets: get(CONFIG_KEY_MAX_ASSETS, defaults.max_assets),
            max_reference_inputs: get(
                CONFIG_KEY_MAX_REFERENCE_INPUTS,
                defaults.max_reference_inputs,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Summary,
}

impl OutputFormat {
    pub fn from_config(config: &Config) -> Self {
        config.get::<OutputFormat>(CONFIG_KEY_OUTPUT_FORMAT).unwrap_or(OutputFormat::Json)
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "summary" => Ok(OutputFormat::Summary),
            other => Err(anyhow::anyhow!("Unknown output format {other}")),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}
