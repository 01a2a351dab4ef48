mod address;
mod cbor;
mod decode;
mod error;
mod normalize;
mod tx;
mod value;

pub use address::*;
pub use cbor::{TAG_ENCODED_CBOR, TAG_POSITIVE_BIGNUM, TAG_SET};
pub use decode::*;
pub use error::DecodeError;
pub use normalize::*;
pub use tx::*;
pub use value::{AssetEntry, DecodedValue, MAX_ASSET_NAME_LEN};
