//! Protobuf wire-format decoding for the handful of Cosmos SDK messages the
//! explorer needs to read out of raw transactions.

pub mod decode;

pub use decode::{DecodingError, DecodingResult, Field, WireValue, malformed_input, read_field};

pub trait Decode
where
    Self: Sized,
{
    fn decode(bytes: &[u8]) -> DecodingResult<Self>;

    /// `decode` but ignoring, and not returning, any remaining bytes
    fn decode_all(bytes: &[u8]) -> Result<Self, DecodingError> {
        Self::decode(bytes).map(|x| x.0)
    }
}

/// A protobuf message assembled one field at a time. Unknown fields are
/// skipped, repeated fields are appended, scalar fields take the last value.
pub trait Message: Default {
    fn merge_field(&mut self, field: Field<'_>) -> Result<(), DecodingError>;

    fn decode_message(mut bytes: &[u8]) -> Result<Self, DecodingError> {
        let mut msg = Self::default();

        while !bytes.is_empty() {
            let (field, rest) = read_field(bytes)?;
            msg.merge_field(field)?;
            bytes = rest;
        }

        Ok(msg)
    }
}
