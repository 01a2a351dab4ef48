//! Decoding whole transactions built with the reference encoder

mod common;

use common::{InputFixture, OutputFixture, TxFixture};
use pallas_traverse::MultiEraTx;
use test_case::test_case;
use txlens_codec::{DecodeError, decode, decode_with_limits, inspect_counts, process_tx};
use txlens_common::{DecodeLimits, LOVELACE_UNIT, TransactionAmount};

fn single_output_tx() -> TxFixture {
    TxFixture::new(
        vec![InputFixture::new(0xaa, 0)],
        vec![OutputFixture::enterprise(0x5a, 2_000_000)],
        170_000,
    )
}

#[test]
fn single_lovelace_output() {
    let fixture = single_output_tx();
    let tx = process_tx(&fixture.envelope()).unwrap();

    assert_eq!(tx.inputs.len(), 1);
    assert_eq!(tx.inputs[0].transaction_id.to_string(), "aa".repeat(32));
    assert_eq!(tx.inputs[0].output_index, 0);

    assert_eq!(tx.outputs.len(), 1);
    let output = &tx.outputs[0];
    assert!(output.address.starts_with("addr1"));
    assert_eq!(output.address, fixture.outputs[0].expected_address());
    assert_eq!(output.coin.to_string(), "2000000");
    assert_eq!(
        output.amount,
        vec![TransactionAmount::lovelace(2_000_000u64.into())]
    );
    assert_eq!(output.cbor_datum, None);

    assert!(tx.reference_inputs.is_empty());
    assert_eq!(tx.fee.to_string(), "170000");
}

#[test]
fn multi_asset_precedes_lovelace() {
    let policy = [0x11; 28];
    let fixture = TxFixture::new(
        vec![InputFixture::new(0xaa, 0)],
        vec![OutputFixture::enterprise(0x5a, 1_000_000).with_asset(policy, b"nn", 5)],
        170_000,
    );
    let tx = process_tx(&fixture.envelope()).unwrap();

    let amounts: Vec<_> =
        tx.outputs[0].amount.iter().map(|a| (a.unit.clone(), a.quantity.to_string())).collect();
    assert_eq!(
        amounts,
        vec![
            (format!("{}{}", hex::encode(policy), hex::encode(b"nn")), "5".to_string()),
            (LOVELACE_UNIT.to_string(), "1000000".to_string()),
        ]
    );
}

#[test_case(None ; "absent")]
#[test_case(Some(vec![]) ; "empty")]
fn reference_inputs_absent_or_empty(reference_inputs: Option<Vec<InputFixture>>) {
    let mut fixture = single_output_tx();
    fixture.reference_inputs = reference_inputs;

    let tx = process_tx(&fixture.envelope()).unwrap();
    assert!(tx.reference_inputs.is_empty());
}

#[test]
fn reference_inputs_keep_order_and_duplicates_of_inputs() {
    let mut fixture = single_output_tx();
    fixture.reference_inputs = Some(vec![InputFixture::new(0xcc, 3), InputFixture::new(0xaa, 0)]);

    let tx = process_tx(&fixture.envelope()).unwrap();
    let refs: Vec<_> = tx.reference_inputs.iter().map(|i| i.to_string()).collect();
    assert_eq!(
        refs,
        vec![format!("{}#3", "cc".repeat(32)), format!("{}#0", "aa".repeat(32))]
    );
    assert_eq!(tx.inputs[0], tx.reference_inputs[1]);
}

#[test]
fn bignum_fee_beyond_u64() {
    // {0: [], 1: [], 2: 2(h'010000000000000000')}
    let bytes = hex::decode("a30080018002c249010000000000000000").unwrap();
    let tx = process_tx(&bytes).unwrap();
    assert_eq!(tx.fee.to_string(), "18446744073709551616");
}

#[test]
fn matches_pallas_hash_and_fee() {
    let mut fixture = TxFixture::new(
        vec![InputFixture::new(0xaa, 0), InputFixture::new(0xab, 2)],
        vec![
            OutputFixture::enterprise(0x5a, 2_000_000).with_asset([0x11; 28], b"nn", 5),
            OutputFixture::enterprise(0x5b, 1_500_000),
        ],
        170_000,
    );
    fixture.tagged_sets = true;
    fixture.reference_inputs = Some(vec![InputFixture::new(0xcc, 1)]);
    let bytes = fixture.envelope();

    let ours = decode(&bytes).unwrap();
    let theirs = MultiEraTx::decode(&bytes).unwrap();

    assert_eq!(ours.hash.to_vec(), theirs.hash().to_vec());
    assert_eq!(theirs.fee(), Some(170_000));
    assert_eq!(ours.inputs.len(), theirs.inputs().len());
    assert_eq!(ours.outputs.len(), theirs.outputs().len());
    assert_eq!(ours.reference_inputs.len(), theirs.reference_inputs().len());
}

#[test]
fn missing_fee() {
    // {0: [], 1: []}
    assert_eq!(
        decode(&hex::decode("a200800180").unwrap()),
        Err(DecodeError::MissingField("body.fee".to_string()))
    );
}

#[test]
fn short_transaction_id() {
    // {0: [[h'aa..aa' (31 bytes), 0]], 1: [], 2: 0}
    let bytes = hex::decode(format!("a3008182581f{}0001800200", "aa".repeat(31))).unwrap();
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::InvalidValue(
            "inputs[0].transaction_id".to_string(),
            "expected 32 bytes, found 31".to_string()
        ))
    );
}

#[test]
fn address_with_trailing_bytes_is_rejected() {
    let mut address = vec![0x41];
    address.extend_from_slice(&[0x11; 28]);
    address.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05]);

    let mut fixture = single_output_tx();
    fixture.outputs[0].address = address;
    assert_eq!(
        decode(&fixture.envelope()),
        Err(DecodeError::InvalidValue(
            "outputs[0].address".to_string(),
            "non-canonical address bytes".to_string()
        ))
    );
}

#[test_case(3, 0x82 ; "inputs claim two elements")]
#[test_case(3, 0x80 ; "inputs claim none")]
#[test_case(0, 0x85 ; "envelope claims five elements")]
#[test_case(1, 0xa4 ; "body claims four entries")]
#[test_case(1, 0xa2 ; "body claims two entries")]
fn flipped_length_is_an_error(index: usize, header: u8) {
    let mut bytes = single_output_tx().envelope();
    // envelope, body, key 0 and the inputs header lead the buffer
    assert_eq!(&bytes[..4], &[0x84, 0xa3, 0x00, 0x81]);
    bytes[index] = header;
    assert!(decode(&bytes).is_err());
}

#[test]
fn trailing_bytes_are_malformed() {
    let mut bytes = single_output_tx().envelope();
    bytes.push(0x00);
    assert!(matches!(decode(&bytes), Err(DecodeError::Malformed(_))));
}

#[test]
fn oversized_outputs_rejected_before_decoding() {
    let fixture = TxFixture::new(
        vec![],
        (0..5).map(|i| OutputFixture::enterprise(i, 1)).collect(),
        0,
    );
    let bytes = fixture.envelope();
    let limits = DecodeLimits {
        max_outputs: 4,
        ..DecodeLimits::unbounded()
    };

    let counts = inspect_counts(&bytes).unwrap();
    assert_eq!(counts.outputs, 5);
    assert!(counts.check(&limits).is_err());
    assert_eq!(
        decode_with_limits(&bytes, &limits),
        Err(DecodeError::Oversized {
            field: "outputs".to_string(),
            declared: 5,
            limit: 4,
        })
    );
}

#[test]
fn oversized_indefinite_inputs() {
    let mut fixture = TxFixture::new(
        (0..3).map(|i| InputFixture::new(i, 0)).collect(),
        vec![],
        0,
    );
    fixture.indefinite = true;
    let limits = DecodeLimits {
        max_inputs: 2,
        ..DecodeLimits::unbounded()
    };

    assert!(matches!(
        decode_with_limits(&fixture.envelope(), &limits),
        Err(DecodeError::Oversized { declared: 3, limit: 2, .. })
    ));
}
