use thiserror::Error;

/// Why a transaction could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not one complete, well-formed CBOR item
    #[error("Malformed transaction CBOR: {0}")]
    Malformed(String),

    /// A mandatory field is absent
    #[error("Missing mandatory field {0}")]
    MissingField(String),

    /// A field is present but has the wrong shape
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// A collection declares more elements than the caller allows
    #[error("{field} declares {declared} elements, limit is {limit}")]
    Oversized {
        field: String,
        declared: u64,
        limit: u64,
    },
}

impl DecodeError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue(field.into(), reason.into())
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }
}

/// Attach the field being read to a low-level CBOR error
pub(crate) trait FieldContext<T> {
    fn field(self, name: &str) -> Result<T, DecodeError>;
}

impl<T> FieldContext<T> for Result<T, minicbor::decode::Error> {
    fn field(self, name: &str) -> Result<T, DecodeError> {
        self.map_err(|e| {
            if e.is_end_of_input() {
                DecodeError::Malformed(format!("{name}: {e}"))
            } else {
                DecodeError::invalid(name, e.to_string())
            }
        })
    }
}
