//! Decode-then-normalise pipeline over raw or hex-encoded transactions

use tracing::debug;
use txlens_common::{DecodeLimits, Transaction};

use crate::{
    decode::decode_with_limits,
    error::DecodeError,
    normalize::normalize,
};

/// Decode and normalise a CBOR transaction, with no size limits
pub fn process_tx(bytes: &[u8]) -> Result<Transaction, DecodeError> {
    process_tx_with_limits(bytes, &DecodeLimits::unbounded())
}

/// Decode and normalise a CBOR transaction. Either the whole `Transaction` is
/// returned or an error, never anything partial.
pub fn process_tx_with_limits(
    bytes: &[u8],
    limits: &DecodeLimits,
) -> Result<Transaction, DecodeError> {
    let decoded = decode_with_limits(bytes, limits)?;
    debug!(
        "Normalising transaction {} with {} native asset entries",
        decoded.hash,
        decoded.asset_count()
    );
    Ok(normalize(decoded))
}

/// As `process_tx`, from hex text. Surrounding whitespace is ignored.
pub fn process_tx_hex(text: &str) -> Result<Transaction, DecodeError> {
    process_tx_hex_with_limits(text, &DecodeLimits::unbounded())
}

pub fn process_tx_hex_with_limits(
    text: &str,
    limits: &DecodeLimits,
) -> Result<Transaction, DecodeError> {
    let bytes = hex::decode(text.trim())
        .map_err(|e| DecodeError::Malformed(format!("invalid hex: {e}")))?;
    process_tx_with_limits(&bytes, limits)
}
