use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

/// Fixed-size digest; 32 bytes for transaction ids and datum hashes, 28 for
/// policy ids and signer key hashes. Text form is lowercase hex.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct Hash<const BYTES: usize>([u8; BYTES]);

pub type TxHash = Hash<32>;
pub type DatumHash = Hash<32>;
pub type PolicyId = Hash<28>;
pub type KeyHash = Hash<28>;

impl<const BYTES: usize> Hash<BYTES> {
    pub const fn new(bytes: [u8; BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn into_inner(self) -> [u8; BYTES] {
        self.0
    }
}

/// Fails unless the slice is exactly `BYTES` long
impl<const BYTES: usize> TryFrom<&[u8]> for Hash<BYTES> {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        slice.try_into().map(Self)
    }
}

impl<const BYTES: usize> fmt::Display for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl<const BYTES: usize> fmt::Debug for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash<{BYTES}>({self})")
    }
}

impl<const BYTES: usize> FromStr for Hash<BYTES> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; BYTES];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}
