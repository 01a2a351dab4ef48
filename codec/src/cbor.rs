//! Structural helpers over `minicbor::Decoder`, shared by every decoder in
//! this crate. All of them accept both definite and indefinite lengths.

use minicbor::{Decoder, data::Type};
use txlens_common::Hash;

use crate::error::{DecodeError, FieldContext};

/// Tag wrapping the arrays of set-typed body fields
pub const TAG_SET: u64 = 258;

/// Tag of a positive bignum (big-endian magnitude bytes)
pub const TAG_POSITIVE_BIGNUM: u64 = 2;

/// Tag of an embedded CBOR byte string, used for inline datums
pub const TAG_ENCODED_CBOR: u64 = 24;

/// Check `bytes` holds exactly one well-formed CBOR item and nothing else
pub fn check_well_formed(bytes: &[u8]) -> Result<(), DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Malformed("empty buffer".to_string()));
    }

    let mut d = Decoder::new(bytes);
    d.skip().map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let trailing = bytes.len() - d.position();
    if trailing > 0 {
        return Err(DecodeError::Malformed(format!(
            "{trailing} trailing bytes after the transaction"
        )));
    }
    Ok(())
}

/// Consume a break if one is next. Only valid inside indefinite collections.
pub fn decode_break(
    d: &mut Decoder<'_>,
    len: Option<u64>,
    field: &str,
) -> Result<bool, DecodeError> {
    if d.datatype().field(field)? == Type::Break {
        // NOTE: a break inside a definite collection is an error
        if len.is_some() {
            return Err(DecodeError::invalid(field, "unexpected break"));
        }
        d.skip().field(field)?;
        return Ok(true);
    }
    Ok(false)
}

pub fn check_limit(field: &str, declared: u64, limit: u64) -> Result<(), DecodeError> {
    if declared > limit {
        return Err(DecodeError::Oversized {
            field: field.to_string(),
            declared,
            limit,
        });
    }
    Ok(())
}

/// Read an array header, optionally behind the set tag
fn collection_header(
    d: &mut Decoder<'_>,
    field: &str,
    allow_set_tag: bool,
) -> Result<Option<u64>, DecodeError> {
    if allow_set_tag && d.datatype().field(field)? == Type::Tag {
        let tag = d.tag().field(field)?;
        if tag.as_u64() != TAG_SET {
            return Err(DecodeError::invalid(field, format!("unexpected tag {}", tag.as_u64())));
        }
    }
    d.array().field(field)
}

fn collect<'b, T>(
    d: &mut Decoder<'b>,
    field: &str,
    len: Option<u64>,
    limit: u64,
    mut item: impl FnMut(&mut Decoder<'b>, usize) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    if let Some(n) = len {
        check_limit(field, n, limit)?;
    }

    // NOTE: never pre-allocate from a declared length
    let mut items = Vec::new();
    loop {
        match len {
            Some(n) if items.len() as u64 >= n => break,
            None if decode_break(d, len, field)? => break,
            _ => {}
        }
        let index = items.len();
        if len.is_none() {
            check_limit(field, index as u64 + 1, limit)?;
        }
        items.push(item(d, index)?);
    }
    Ok(items)
}

/// Decode a homogeneous array, at most `limit` elements long
pub fn decode_array<'b, T>(
    d: &mut Decoder<'b>,
    field: &str,
    limit: u64,
    item: impl FnMut(&mut Decoder<'b>, usize) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let len = collection_header(d, field, false)?;
    collect(d, field, len, limit, item)
}

/// Decode a set: an array, possibly wrapped in the set tag. Order is kept.
pub fn decode_set<'b, T>(
    d: &mut Decoder<'b>,
    field: &str,
    limit: u64,
    item: impl FnMut(&mut Decoder<'b>, usize) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let len = collection_header(d, field, true)?;
    collect(d, field, len, limit, item)
}

/// Visit every key/value entry of a homogeneous map, at most `limit` entries.
/// `entry` must consume both the key and the value.
pub fn decode_map_entries<'b>(
    d: &mut Decoder<'b>,
    field: &str,
    limit: u64,
    mut entry: impl FnMut(&mut Decoder<'b>, usize) -> Result<(), DecodeError>,
) -> Result<(), DecodeError> {
    let len = d.map().field(field)?;
    if let Some(n) = len {
        check_limit(field, n, limit)?;
    }

    let mut read = 0u64;
    loop {
        match len {
            Some(n) if read >= n => break,
            None if decode_break(d, len, field)? => break,
            _ => {}
        }
        if len.is_none() {
            check_limit(field, read + 1, limit)?;
        }
        entry(d, read as usize)?;
        read += 1;
    }
    Ok(())
}

/// Decode a map whose keys name heterogeneous fields, folding each value into
/// `state`. Keys may come in any order; the last occurrence of a key wins.
///
/// ```ignore
/// let (address, value) = heterogeneous_map(
///     d,
///     "outputs[0]",
///     (None, None),
///     |d| d.u64().field("outputs[0] key"),
///     |d, state, key| {
///         match key {
///             0 => state.0 = Some(decode_address(d, "outputs[0].address")?),
///             1 => state.1 = Some(decode_value(d, "outputs[0].value", limits)?),
///             _ => d.skip().field("outputs[0]")?,
///         }
///         Ok(())
///     },
/// )?;
/// ```
pub fn heterogeneous_map<'b, K, S>(
    d: &mut Decoder<'b>,
    field: &str,
    mut state: S,
    decode_key: impl Fn(&mut Decoder<'b>) -> Result<K, DecodeError>,
    mut decode_value: impl FnMut(&mut Decoder<'b>, &mut S, K) -> Result<(), DecodeError>,
) -> Result<S, DecodeError> {
    decode_map_entries(d, field, u64::MAX, |d, _| {
        let key = decode_key(d)?;
        decode_value(d, &mut state, key)
    })?;
    Ok(state)
}

/// Decode a heterogeneous array. `elems` receives the declared length (`None`
/// when indefinite) and must read every element it expects; an indefinite
/// array must then be closed by a break.
pub fn heterogeneous_array<'b, A>(
    d: &mut Decoder<'b>,
    field: &str,
    elems: impl FnOnce(&mut Decoder<'b>, Option<u64>) -> Result<A, DecodeError>,
) -> Result<A, DecodeError> {
    let len = d.array().field(field)?;
    let result = elems(d, len)?;
    if len.is_none() && !decode_break(d, len, field)? {
        return Err(DecodeError::invalid(field, "too many elements"));
    }
    Ok(result)
}

/// Fail unless a heterogeneous array has exactly `expected` elements
pub fn expect_len(field: &str, len: Option<u64>, expected: u64) -> Result<(), DecodeError> {
    match len {
        Some(n) if n != expected => Err(DecodeError::invalid(
            field,
            format!("expected {expected} elements, found {n}"),
        )),
        _ => Ok(()),
    }
}

/// Decode a byte string of exactly `N` bytes
pub fn decode_hash<const N: usize>(
    d: &mut Decoder<'_>,
    field: &str,
) -> Result<Hash<N>, DecodeError> {
    let bytes = d.bytes().field(field)?;
    Hash::try_from(bytes).map_err(|_| {
        DecodeError::invalid(field, format!("expected {N} bytes, found {}", bytes.len()))
    })
}

/// Decode an unsigned integer, rejecting negative ones by name
pub fn decode_uint(d: &mut Decoder<'_>, field: &str) -> Result<u64, DecodeError> {
    match d.datatype().field(field)? {
        Type::U8 | Type::U16 | Type::U32 | Type::U64 => d.u64().field(field),
        Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::Int => {
            Err(DecodeError::invalid(field, "must not be negative"))
        }
        other => Err(DecodeError::invalid(
            field,
            format!("expected unsigned integer, found {other}"),
        )),
    }
}
