//! Shared test infrastructure: a reference encoder for transaction bodies and
//! arbitrary transactions built from it.

#![allow(dead_code)]

use bech32::{Bech32, Hrp};
use minicbor::{Encoder, data::Tag};
use quickcheck::{Arbitrary, Gen};
use txlens_codec::{TAG_POSITIVE_BIGNUM, TAG_SET};

/// Header of a mainnet enterprise address with a key hash payment part
pub const ENTERPRISE_MAINNET: u8 = 0x61;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFixture {
    pub tx_id: [u8; 32],
    pub index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyFixture {
    pub policy: [u8; 28],
    /// Unique names, in encoded order
    pub assets: Vec<(Vec<u8>, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFixture {
    pub address: Vec<u8>,
    pub coin: u64,
    /// Unique policies, in encoded order
    pub policies: Vec<PolicyFixture>,
    /// Post-Alonzo map form rather than the legacy array
    pub map_form: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxFixture {
    pub inputs: Vec<InputFixture>,
    pub outputs: Vec<OutputFixture>,
    pub fee: u64,
    /// `None` leaves the key out of the body
    pub reference_inputs: Option<Vec<InputFixture>>,
    /// Wrap sets in tag 258
    pub tagged_sets: bool,
    /// Use indefinite lengths for body collections
    pub indefinite: bool,
    /// Encode the fee as a tag 2 bignum
    pub bignum_fee: bool,
}

impl InputFixture {
    pub fn new(byte: u8, index: u64) -> Self {
        Self {
            tx_id: [byte; 32],
            index,
        }
    }
}

impl OutputFixture {
    pub fn enterprise(key: u8, coin: u64) -> Self {
        Self {
            address: enterprise_address(key),
            coin,
            policies: vec![],
            map_form: false,
        }
    }

    pub fn with_asset(mut self, policy: [u8; 28], name: &[u8], quantity: u64) -> Self {
        match self.policies.iter_mut().find(|p| p.policy == policy) {
            Some(p) => p.assets.push((name.to_vec(), quantity)),
            None => self.policies.push(PolicyFixture {
                policy,
                assets: vec![(name.to_vec(), quantity)],
            }),
        }
        self
    }

    /// Expected units and decimal quantities of the multi-asset entries
    pub fn expected_assets(&self) -> Vec<(String, String)> {
        self.policies
            .iter()
            .flat_map(|p| {
                p.assets.iter().map(move |(name, quantity)| {
                    (
                        format!("{}{}", hex::encode(p.policy), hex::encode(name)),
                        quantity.to_string(),
                    )
                })
            })
            .collect()
    }

    /// Bech32 text of the address
    pub fn expected_address(&self) -> String {
        let hrp = if self.address[0] & 0x0f == 1 { "addr" } else { "addr_test" };
        bech32::encode::<Bech32>(Hrp::parse(hrp).unwrap(), &self.address).unwrap()
    }
}

impl TxFixture {
    pub fn new(inputs: Vec<InputFixture>, outputs: Vec<OutputFixture>, fee: u64) -> Self {
        Self {
            inputs,
            outputs,
            fee,
            reference_inputs: None,
            tagged_sets: false,
            indefinite: false,
            bignum_fee: false,
        }
    }

    /// Body map bytes
    pub fn body(&self) -> Vec<u8> {
        let mut e = Encoder::new(Vec::new());
        let entries = 3 + u64::from(self.reference_inputs.is_some());
        e.map(entries).unwrap();

        e.u8(0).unwrap();
        self.encode_inputs(&mut e, &self.inputs);

        e.u8(1).unwrap();
        self.begin(&mut e, self.outputs.len());
        for output in &self.outputs {
            encode_output(&mut e, output);
        }
        self.end(&mut e);

        e.u8(2).unwrap();
        if self.bignum_fee {
            e.tag(Tag::new(TAG_POSITIVE_BIGNUM)).unwrap();
            e.bytes(&self.fee.to_be_bytes()).unwrap();
        } else {
            e.u64(self.fee).unwrap();
        }

        if let Some(reference_inputs) = &self.reference_inputs {
            e.u8(18).unwrap();
            self.encode_inputs(&mut e, reference_inputs);
        }

        e.into_writer()
    }

    /// `[body, {}, true, null]`
    pub fn envelope(&self) -> Vec<u8> {
        let mut bytes = vec![0x84];
        bytes.extend_from_slice(&self.body());
        bytes.extend_from_slice(&[0xa0, 0xf5, 0xf6]);
        bytes
    }

    fn encode_inputs(&self, e: &mut Encoder<Vec<u8>>, inputs: &[InputFixture]) {
        if self.tagged_sets {
            e.tag(Tag::new(TAG_SET)).unwrap();
        }
        self.begin(e, inputs.len());
        for input in inputs {
            e.array(2).unwrap().bytes(&input.tx_id).unwrap().u64(input.index).unwrap();
        }
        self.end(e);
    }

    fn begin(&self, e: &mut Encoder<Vec<u8>>, len: usize) {
        if self.indefinite {
            e.begin_array().unwrap();
        } else {
            e.array(len as u64).unwrap();
        }
    }

    fn end(&self, e: &mut Encoder<Vec<u8>>) {
        if self.indefinite {
            e.end().unwrap();
        }
    }
}

fn encode_output(e: &mut Encoder<Vec<u8>>, output: &OutputFixture) {
    if output.map_form {
        e.map(2).unwrap();
        e.u8(0).unwrap().bytes(&output.address).unwrap();
        e.u8(1).unwrap();
    } else {
        e.array(2).unwrap().bytes(&output.address).unwrap();
    }

    if output.policies.is_empty() {
        e.u64(output.coin).unwrap();
        return;
    }

    e.array(2).unwrap().u64(output.coin).unwrap();
    e.map(output.policies.len() as u64).unwrap();
    for policy in &output.policies {
        e.bytes(&policy.policy).unwrap();
        e.map(policy.assets.len() as u64).unwrap();
        for (name, quantity) in &policy.assets {
            e.bytes(name).unwrap().u64(*quantity).unwrap();
        }
    }
}

pub fn enterprise_address(key: u8) -> Vec<u8> {
    let mut address = vec![ENTERPRISE_MAINNET];
    address.extend_from_slice(&[key; 28]);
    address
}

fn arbitrary_len(g: &mut Gen, max: usize) -> usize {
    usize::arbitrary(g) % (max + 1)
}

impl Arbitrary for InputFixture {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut tx_id = [0u8; 32];
        tx_id.iter_mut().for_each(|b| *b = u8::arbitrary(g));
        Self {
            tx_id,
            index: u64::arbitrary(g),
        }
    }
}

impl Arbitrary for OutputFixture {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut output = OutputFixture::enterprise(u8::arbitrary(g), u64::arbitrary(g));
        output.map_form = bool::arbitrary(g);

        for _ in 0..arbitrary_len(g, 3) {
            let policy = [u8::arbitrary(g); 28];
            for _ in 0..arbitrary_len(g, 3) {
                let mut name = Vec::<u8>::arbitrary(g);
                name.truncate(32);
                let taken = output
                    .policies
                    .iter()
                    .any(|p| p.policy == policy && p.assets.iter().any(|(n, _)| *n == name));
                if !taken {
                    output = output.with_asset(policy, &name, u64::arbitrary(g));
                }
            }
        }
        output
    }
}

impl Arbitrary for TxFixture {
    fn arbitrary(g: &mut Gen) -> Self {
        let inputs = (0..arbitrary_len(g, 4)).map(|_| InputFixture::arbitrary(g)).collect();
        let outputs = (0..arbitrary_len(g, 4)).map(|_| OutputFixture::arbitrary(g)).collect();
        let reference_inputs = if bool::arbitrary(g) {
            Some((0..arbitrary_len(g, 3)).map(|_| InputFixture::arbitrary(g)).collect())
        } else {
            None
        };

        Self {
            inputs,
            outputs,
            fee: u64::arbitrary(g),
            reference_inputs,
            tagged_sets: bool::arbitrary(g),
            indefinite: bool::arbitrary(g),
            bignum_fee: bool::arbitrary(g),
        }
    }
}
