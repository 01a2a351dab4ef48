//! Binary transaction decoder: CBOR bytes to the transient `DecodedTx` graph

use dashu_int::UBig;
use minicbor::{Decoder, data::Type};
use tracing::{debug, trace};
use txlens_common::{
    DatumHash, DecodeLimits, KeyHash, TransactionInput, TxHash, crypto::blake2b_256,
};

use crate::{
    address::OutputAddress,
    cbor::{
        TAG_ENCODED_CBOR, TAG_SET, check_limit, check_well_formed, decode_array, decode_hash,
        decode_set, decode_uint, expect_len, heterogeneous_array, heterogeneous_map,
    },
    error::{DecodeError, FieldContext},
    value::{
        AssetEntry, DecodedValue, decode_mint_quantity, decode_multiasset, decode_quantity,
        decode_value,
    },
};

const BODY_INPUTS: u64 = 0;
const BODY_OUTPUTS: u64 = 1;
const BODY_FEE: u64 = 2;
const BODY_TTL: u64 = 3;
const BODY_VALIDITY_START: u64 = 8;
const BODY_MINT: u64 = 9;
const BODY_REQUIRED_SIGNERS: u64 = 14;
const BODY_REFERENCE_INPUTS: u64 = 18;

const OUTPUT_ADDRESS: u64 = 0;
const OUTPUT_VALUE: u64 = 1;
const OUTPUT_DATUM: u64 = 2;

const DATUM_OPTION_HASH: u64 = 0;
const DATUM_OPTION_INLINE: u64 = 1;

/// A decoded transaction body, before normalisation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTx {
    /// Blake2b-256 of the body bytes exactly as encoded
    pub hash: TxHash,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<DecodedOutput>,
    pub fee: UBig,
    pub ttl: Option<u64>,
    pub validity_start: Option<u64>,
    /// Empty when the body has no reference inputs
    pub reference_inputs: Vec<TransactionInput>,
    pub required_signers: Vec<KeyHash>,
    pub mint: Vec<AssetEntry<i128>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedOutput {
    pub address: OutputAddress,
    pub value: DecodedValue,
    pub datum: Option<DecodedDatum>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatumKind {
    Hash(DatumHash),
    /// Plutus data bytes, checked to be one well-formed CBOR item
    Inline(Vec<u8>),
}

/// A datum attached to an output, with the bytes of its whole datum option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDatum {
    pub kind: DatumKind,
    pub raw: Vec<u8>,
}

impl DecodedDatum {
    /// The datum option a legacy output implies by carrying just a hash
    fn from_legacy_hash(hash: DatumHash) -> Self {
        let mut raw = vec![0x82, 0x00, 0x58, 0x20];
        raw.extend_from_slice(hash.as_bytes());
        Self {
            kind: DatumKind::Hash(hash),
            raw,
        }
    }
}

/// Element counts of the collections a caller may want to bound
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementCounts {
    pub inputs: u64,
    pub outputs: u64,
    pub reference_inputs: u64,
    pub required_signers: u64,
}

impl ElementCounts {
    /// Fail with `Oversized` on the first count over its limit
    pub fn check(&self, limits: &DecodeLimits) -> Result<(), DecodeError> {
        check_limit("inputs", self.inputs, limits.max_inputs)?;
        check_limit("outputs", self.outputs, limits.max_outputs)?;
        check_limit(
            "reference_inputs",
            self.reference_inputs,
            limits.max_reference_inputs,
        )?;
        check_limit("required_signers", self.required_signers, limits.max_inputs)
    }
}

impl DecodedTx {
    pub fn counts(&self) -> ElementCounts {
        ElementCounts {
            inputs: self.inputs.len() as u64,
            outputs: self.outputs.len() as u64,
            reference_inputs: self.reference_inputs.len() as u64,
            required_signers: self.required_signers.len() as u64,
        }
    }

    /// Multi-asset entries across all outputs
    pub fn asset_count(&self) -> usize {
        self.outputs.iter().map(|o| o.value.assets.len()).sum()
    }
}

/// Decode a transaction envelope, or a bare transaction body, with no limits
pub fn decode(bytes: &[u8]) -> Result<DecodedTx, DecodeError> {
    decode_with_limits(bytes, &DecodeLimits::unbounded())
}

/// Decode a transaction envelope, or a bare transaction body
pub fn decode_with_limits(bytes: &[u8], limits: &DecodeLimits) -> Result<DecodedTx, DecodeError> {
    check_well_formed(bytes)?;

    let mut d = Decoder::new(bytes);
    let tx = in_envelope(&mut d, |d| decode_body(d, limits))?;

    debug!(
        "Decoded transaction {} with {} inputs, {} outputs",
        tx.hash,
        tx.inputs.len(),
        tx.outputs.len()
    );
    Ok(tx)
}

/// Read the declared sizes of the body collections without materialising
/// any of them
pub fn inspect_counts(bytes: &[u8]) -> Result<ElementCounts, DecodeError> {
    check_well_formed(bytes)?;

    let mut d = Decoder::new(bytes);
    in_envelope(&mut d, |d| {
        heterogeneous_map(
            d,
            "body",
            ElementCounts::default(),
            |d| decode_uint(d, "body key"),
            |d, counts, key| {
                match key {
                    BODY_INPUTS => counts.inputs = count_elements(d, "inputs")?,
                    BODY_OUTPUTS => counts.outputs = count_elements(d, "outputs")?,
                    BODY_REFERENCE_INPUTS => {
                        counts.reference_inputs = count_elements(d, "reference_inputs")?
                    }
                    BODY_REQUIRED_SIGNERS => {
                        counts.required_signers = count_elements(d, "required_signers")?
                    }
                    _ => d.skip().field("body")?,
                }
                Ok(())
            },
        )
    })
}

/// Run `body` on the body map, whether it is bare or the first element of
/// the transaction array. Everything after the body is skipped.
fn in_envelope<'b, T>(
    d: &mut Decoder<'b>,
    body: impl FnOnce(&mut Decoder<'b>) -> Result<T, DecodeError>,
) -> Result<T, DecodeError> {
    match d.datatype().field("transaction")? {
        Type::Map | Type::MapIndef => body(d),
        Type::Array | Type::ArrayIndef => heterogeneous_array(d, "transaction", |d, len| {
            let empty = match len {
                Some(n) => n == 0,
                None => d.datatype().field("transaction")? == Type::Break,
            };
            if empty {
                return Err(DecodeError::missing("body"));
            }

            let result = body(d)?;
            match len {
                Some(n) => {
                    for _ in 1..n {
                        d.skip().field("transaction")?;
                    }
                }
                None => {
                    while d.datatype().field("transaction")? != Type::Break {
                        d.skip().field("transaction")?;
                    }
                }
            }
            Ok(result)
        }),
        other => Err(DecodeError::invalid(
            "transaction",
            format!("expected array or map, found {other}"),
        )),
    }
}

#[derive(Default)]
struct BodyFields {
    inputs: Option<Vec<TransactionInput>>,
    outputs: Option<Vec<DecodedOutput>>,
    fee: Option<UBig>,
    ttl: Option<u64>,
    validity_start: Option<u64>,
    mint: Option<Vec<AssetEntry<i128>>>,
    required_signers: Option<Vec<KeyHash>>,
    reference_inputs: Option<Vec<TransactionInput>>,
}

fn decode_body(d: &mut Decoder<'_>, limits: &DecodeLimits) -> Result<DecodedTx, DecodeError> {
    if !matches!(d.datatype().field("body")?, Type::Map | Type::MapIndef) {
        return Err(DecodeError::invalid("body", "expected map"));
    }

    let start = d.position();
    let fields = heterogeneous_map(
        d,
        "body",
        BodyFields::default(),
        |d| decode_uint(d, "body key"),
        |d, body, key| {
            match key {
                BODY_INPUTS => {
                    body.inputs = Some(decode_set(d, "inputs", limits.max_inputs, |d, i| {
                        decode_input(d, &format!("inputs[{i}]"))
                    })?)
                }
                BODY_OUTPUTS => {
                    body.outputs = Some(decode_array(d, "outputs", limits.max_outputs, |d, i| {
                        decode_output(d, &format!("outputs[{i}]"), limits)
                    })?)
                }
                BODY_FEE => body.fee = Some(decode_quantity(d, "fee")?),
                BODY_TTL => body.ttl = Some(decode_uint(d, "ttl")?),
                BODY_VALIDITY_START => {
                    body.validity_start = Some(decode_uint(d, "validity_start")?)
                }
                BODY_MINT => {
                    body.mint = Some(decode_multiasset(
                        d,
                        "mint",
                        limits.max_assets,
                        decode_mint_quantity,
                    )?)
                }
                BODY_REQUIRED_SIGNERS => {
                    body.required_signers =
                        Some(decode_set(d, "required_signers", limits.max_inputs, |d, i| {
                            decode_hash(d, &format!("required_signers[{i}]"))
                        })?)
                }
                BODY_REFERENCE_INPUTS => {
                    body.reference_inputs = Some(decode_set(
                        d,
                        "reference_inputs",
                        limits.max_reference_inputs,
                        |d, i| decode_input(d, &format!("reference_inputs[{i}]")),
                    )?)
                }
                other => {
                    trace!("Skipping body key {other}");
                    d.skip().field("body")?
                }
            }
            Ok(())
        },
    )?;
    let end = d.position();

    Ok(DecodedTx {
        hash: blake2b_256(&d.input()[start..end]),
        inputs: fields.inputs.ok_or_else(|| DecodeError::missing("body.inputs"))?,
        outputs: fields.outputs.ok_or_else(|| DecodeError::missing("body.outputs"))?,
        fee: fields.fee.ok_or_else(|| DecodeError::missing("body.fee"))?,
        ttl: fields.ttl,
        validity_start: fields.validity_start,
        reference_inputs: fields.reference_inputs.unwrap_or_default(),
        required_signers: fields.required_signers.unwrap_or_default(),
        mint: fields.mint.unwrap_or_default(),
    })
}

/// `[transaction_id, index]`
fn decode_input(d: &mut Decoder<'_>, field: &str) -> Result<TransactionInput, DecodeError> {
    heterogeneous_array(d, field, |d, len| {
        expect_len(field, len, 2)?;
        let id = decode_hash(d, &format!("{field}.transaction_id"))?;
        let index = decode_uint(d, &format!("{field}.index"))?;
        Ok(TransactionInput::new(id, index))
    })
}

fn decode_output(
    d: &mut Decoder<'_>,
    field: &str,
    limits: &DecodeLimits,
) -> Result<DecodedOutput, DecodeError> {
    match d.datatype().field(field)? {
        Type::Array | Type::ArrayIndef => decode_legacy_output(d, field, limits),
        Type::Map | Type::MapIndef => decode_post_alonzo_output(d, field, limits),
        other => Err(DecodeError::invalid(
            field,
            format!("expected array or map, found {other}"),
        )),
    }
}

/// `[address, value, ? datum_hash]`
fn decode_legacy_output(
    d: &mut Decoder<'_>,
    field: &str,
    limits: &DecodeLimits,
) -> Result<DecodedOutput, DecodeError> {
    heterogeneous_array(d, field, |d, len| {
        if let Some(n) = len {
            if n > 3 {
                return Err(DecodeError::invalid(
                    field,
                    format!("expected 2 or 3 elements, found {n}"),
                ));
            }
        }

        if !element_present(d, len, 0, field)? {
            return Err(DecodeError::missing(format!("{field}.address")));
        }
        let address = decode_address(d, &format!("{field}.address"))?;

        if !element_present(d, len, 1, field)? {
            return Err(DecodeError::missing(format!("{field}.value")));
        }
        let value = decode_value(d, &format!("{field}.value"), limits)?;

        let datum = if element_present(d, len, 2, field)? {
            let hash = decode_hash(d, &format!("{field}.datum_hash"))?;
            Some(DecodedDatum::from_legacy_hash(hash))
        } else {
            None
        };

        Ok(DecodedOutput {
            address,
            value,
            datum,
        })
    })
}

/// Whether element `index` of a heterogeneous array of `len` follows
fn element_present(
    d: &mut Decoder<'_>,
    len: Option<u64>,
    index: u64,
    field: &str,
) -> Result<bool, DecodeError> {
    match len {
        Some(n) => Ok(index < n),
        None => Ok(d.datatype().field(field)? != Type::Break),
    }
}

/// `{ 0: address, 1: value, ? 2: datum_option, ? 3: script_ref }`
fn decode_post_alonzo_output(
    d: &mut Decoder<'_>,
    field: &str,
    limits: &DecodeLimits,
) -> Result<DecodedOutput, DecodeError> {
    let (address, value, datum) = heterogeneous_map(
        d,
        field,
        (None, None, None),
        |d| decode_uint(d, &format!("{field} key")),
        |d, (address, value, datum), key| {
            match key {
                OUTPUT_ADDRESS => *address = Some(decode_address(d, &format!("{field}.address"))?),
                OUTPUT_VALUE => {
                    *value = Some(decode_value(d, &format!("{field}.value"), limits)?)
                }
                OUTPUT_DATUM => *datum = Some(decode_datum_option(d, &format!("{field}.datum"))?),
                // script references and anything newer
                _ => d.skip().field(field)?,
            }
            Ok(())
        },
    )?;

    Ok(DecodedOutput {
        address: address.ok_or_else(|| DecodeError::missing(format!("{field}.address")))?,
        value: value.ok_or_else(|| DecodeError::missing(format!("{field}.value")))?,
        datum,
    })
}

fn decode_address(d: &mut Decoder<'_>, field: &str) -> Result<OutputAddress, DecodeError> {
    let bytes = d.bytes().field(field)?;
    OutputAddress::from_bytes(bytes).map_err(|reason| DecodeError::invalid(field, reason))
}

/// `[0, datum_hash] / [1, #6.24(bytes)]`
fn decode_datum_option(d: &mut Decoder<'_>, field: &str) -> Result<DecodedDatum, DecodeError> {
    let start = d.position();
    let kind = heterogeneous_array(d, field, |d, len| {
        expect_len(field, len, 2)?;
        match decode_uint(d, &format!("{field}.kind"))? {
            DATUM_OPTION_HASH => Ok(DatumKind::Hash(decode_hash(d, &format!("{field}.hash"))?)),
            DATUM_OPTION_INLINE => {
                let tag = d.tag().field(field)?;
                if tag.as_u64() != TAG_ENCODED_CBOR {
                    return Err(DecodeError::invalid(
                        field,
                        format!("expected encoded CBOR tag, found {}", tag.as_u64()),
                    ));
                }
                let data = d.bytes().field(field)?;
                check_well_formed(data).map_err(|_| {
                    DecodeError::invalid(field, "inline datum is not well-formed CBOR")
                })?;
                Ok(DatumKind::Inline(data.to_vec()))
            }
            other => Err(DecodeError::invalid(field, format!("unknown datum option {other}"))),
        }
    })?;
    let end = d.position();

    Ok(DecodedDatum {
        kind,
        raw: d.input()[start..end].to_vec(),
    })
}

/// Count the elements of an array or set without decoding them
fn count_elements(d: &mut Decoder<'_>, field: &str) -> Result<u64, DecodeError> {
    if d.datatype().field(field)? == Type::Tag {
        let tag = d.tag().field(field)?;
        if tag.as_u64() != TAG_SET {
            return Err(DecodeError::invalid(field, format!("unexpected tag {}", tag.as_u64())));
        }
    }

    match d.array().field(field)? {
        Some(n) => {
            for _ in 0..n {
                d.skip().field(field)?;
            }
            Ok(n)
        }
        None => {
            let mut n = 0;
            while d.datatype().field(field)? != Type::Break {
                d.skip().field(field)?;
                n += 1;
            }
            d.skip().field(field)?;
            Ok(n)
        }
    }
}
