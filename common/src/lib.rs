// txlens common library - transaction model and helpers

pub mod asset;
pub mod configuration;
pub mod crypto;
pub mod display;
pub mod hash;
pub mod lookup;
pub mod registry;
pub mod transaction;

// Flattened re-exports
pub use self::asset::{asset_unit, TransactionAmount, LOVELACE_UNIT};
pub use self::configuration::DecodeLimits;
pub use self::hash::{DatumHash, Hash, KeyHash, PolicyId, TxHash};
pub use self::registry::{Registry, ScriptInfo, ScriptType};
pub use self::transaction::{Transaction, TransactionInput, TransactionOutput};
