use pallas::ledger::addresses::Address as PallasAddress;

/// An output address, validated and rendered to text while decoding so that
/// normalisation has nothing left to fail on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAddress {
    bytes: Vec<u8>,
    text: String,
}

impl OutputAddress {
    /// Parse raw address bytes; the error is a human readable reason
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        check_payload_length(bytes)?;
        let address = PallasAddress::from_bytes(bytes).map_err(|e| e.to_string())?;

        // The parser stops after the last field it knows, so anything it
        // skipped would be lost from the text
        if address.to_vec() != bytes {
            return Err("non-canonical address bytes".to_string());
        }

        let text = match &address {
            PallasAddress::Byron(byron) => byron.to_base58(),
            PallasAddress::Shelley(shelley) => shelley.to_bech32().map_err(|e| e.to_string())?,
            PallasAddress::Stake(stake) => stake.to_bech32().map_err(|e| e.to_string())?,
        };
        Ok(Self {
            bytes: bytes.to_vec(),
            text,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bech32 for Shelley-era addresses, base58 for Byron ones
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// The header nibble fixes the payload size of every Shelley-era address;
/// reject mismatches before the bytes reach the address parser
fn check_payload_length(bytes: &[u8]) -> Result<(), String> {
    let Some(header) = bytes.first() else {
        return Err("empty address".to_string());
    };

    let len = bytes.len();
    let ok = match header >> 4 {
        // base address: payment part + delegation part
        0b0000..=0b0011 => len == 57,
        // pointer address: payment part + three variable length integers
        0b0100 | 0b0101 => len >= 32,
        // enterprise and stake addresses
        0b0110 | 0b0111 | 0b1110 | 0b1111 => len == 29,
        // byron, parsed as CBOR
        0b1000 => true,
        other => return Err(format!("unknown address type {other}")),
    };

    if ok {
        Ok(())
    } else {
        Err(format!("unexpected length {len} for address type {}", header >> 4))
    }
}
