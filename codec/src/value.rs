//! Coin and multi-asset values

use dashu_int::UBig;
use minicbor::{Decoder, data::Type};
use std::collections::{HashMap, hash_map::Entry};
use tracing::warn;
use txlens_common::{DecodeLimits, PolicyId};

use crate::{
    cbor::{
        TAG_POSITIVE_BIGNUM, decode_hash, decode_map_entries, expect_len, heterogeneous_array,
    },
    error::{DecodeError, FieldContext},
};

/// Longest asset name the ledger allows
pub const MAX_ASSET_NAME_LEN: usize = 32;

/// One (policy, asset name) pair with its quantity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry<Q> {
    pub policy: PolicyId,
    pub name: Vec<u8>,
    pub quantity: Q,
}

/// Lovelace plus the flattened multi-asset map, in encoded order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedValue {
    pub coin: UBig,
    pub assets: Vec<AssetEntry<UBig>>,
}

/// Decode a non-negative quantity of any size: a plain unsigned integer or a
/// positive bignum
pub fn decode_quantity(d: &mut Decoder<'_>, field: &str) -> Result<UBig, DecodeError> {
    match d.datatype().field(field)? {
        Type::U8 | Type::U16 | Type::U32 | Type::U64 => Ok(UBig::from(d.u64().field(field)?)),
        Type::Tag => {
            let tag = d.tag().field(field)?;
            if tag.as_u64() != TAG_POSITIVE_BIGNUM {
                return Err(DecodeError::invalid(
                    field,
                    format!("unexpected tag {} for a quantity", tag.as_u64()),
                ));
            }
            Ok(UBig::from_be_bytes(d.bytes().field(field)?))
        }
        Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::Int => {
            Err(DecodeError::invalid(field, "must not be negative"))
        }
        other => Err(DecodeError::invalid(
            field,
            format!("expected unsigned integer, found {other}"),
        )),
    }
}

/// Decode a signed mint quantity
pub fn decode_mint_quantity(d: &mut Decoder<'_>, field: &str) -> Result<i128, DecodeError> {
    let value = d.int().field(field)?;
    Ok(i128::from(value))
}

/// Decode `coin / [coin, multiasset]`
pub fn decode_value(
    d: &mut Decoder<'_>,
    field: &str,
    limits: &DecodeLimits,
) -> Result<DecodedValue, DecodeError> {
    match d.datatype().field(field)? {
        Type::Array | Type::ArrayIndef => heterogeneous_array(d, field, |d, len| {
            expect_len(field, len, 2)?;
            let coin = decode_quantity(d, &format!("{field}.coin"))?;
            let assets = decode_multiasset(
                d,
                &format!("{field}.assets"),
                limits.max_assets,
                decode_quantity,
            )?;
            Ok(DecodedValue { coin, assets })
        }),
        _ => Ok(DecodedValue {
            coin: decode_quantity(d, field)?,
            assets: Vec::new(),
        }),
    }
}

/// Decode a two-level `policy => { asset name => quantity }` map into a flat
/// list, keeping the encoded order of both levels.
///
/// A repeated (policy, asset name) pair keeps the position of its first
/// occurrence and takes the quantity of its last one.
pub fn decode_multiasset<'b, Q>(
    d: &mut Decoder<'b>,
    field: &str,
    limit: u64,
    quantity: fn(&mut Decoder<'b>, &str) -> Result<Q, DecodeError>,
) -> Result<Vec<AssetEntry<Q>>, DecodeError> {
    let mut entries: Vec<AssetEntry<Q>> = Vec::new();
    let mut positions: HashMap<(PolicyId, Vec<u8>), usize> = HashMap::new();

    decode_map_entries(d, field, limit, |d, i| {
        let policy: PolicyId = decode_hash(d, &format!("{field}.policy[{i}]"))?;
        let policy_field = format!("{field}.{policy}");

        decode_map_entries(d, &policy_field, limit, |d, _| {
            let name = d.bytes().field(&policy_field)?;
            if name.len() > MAX_ASSET_NAME_LEN {
                return Err(DecodeError::invalid(
                    &policy_field,
                    format!("asset name of {} bytes", name.len()),
                ));
            }
            let name = name.to_vec();
            let amount = quantity(d, &format!("{policy_field}.{}", hex::encode(&name)))?;

            match positions.entry((policy, name)) {
                Entry::Occupied(slot) => {
                    warn!("Repeated asset {policy}.{} in {field}", hex::encode(&slot.key().1));
                    entries[*slot.get()].quantity = amount;
                }
                Entry::Vacant(slot) => {
                    let name = slot.key().1.clone();
                    slot.insert(entries.len());
                    entries.push(AssetEntry {
                        policy,
                        name,
                        quantity: amount,
                    });
                }
            }
            Ok(())
        })
    })?;

    Ok(entries)
}
