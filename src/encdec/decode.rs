use super::{Decode, Message};

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DecodingError {
    #[error("Malformed input: {0} ({len} bytes remaining)", len = .1.len())]
    MalformedInput(String, Vec<u8>),
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),
    #[error("Unsupported wire type {wire_type} on field {field}")]
    UnsupportedWireType { field: u32, wire_type: u8 },
    #[error("Field {field} has wire type {found}, expected {expected}")]
    UnexpectedWireType {
        field: u32,
        expected: &'static str,
        found: &'static str,
    },
}

// Helper method to create MalformedInput error with just a message
pub fn malformed_input<S: Into<String>>(msg: S, bytes: &[u8]) -> DecodingError {
    DecodingError::MalformedInput(msg.into(), bytes.to_vec())
}

pub type DecodingResult<'a, T> = Result<(T, &'a [u8]), DecodingError>;

const MAX_VARINT_LEN: usize = 10;

/// Base-128 varint
impl Decode for u64 {
    fn decode(bytes: &[u8]) -> DecodingResult<Self> {
        let mut value: u64 = 0;

        for (idx, byte) in bytes.iter().enumerate().take(MAX_VARINT_LEN) {
            let low = u64::from(byte & 0x7f);

            // the tenth byte may only carry the single remaining bit
            if idx == MAX_VARINT_LEN - 1 && low > 1 {
                return Err(malformed_input("varint overflows u64", bytes));
            }

            value |= low << (7 * idx);

            if byte & 0x80 == 0 {
                return Ok((value, &bytes[idx + 1..]));
            }
        }

        if bytes.len() >= MAX_VARINT_LEN {
            Err(malformed_input("varint too long", bytes))
        } else {
            Err(malformed_input("varint insufficient bytes", bytes))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireValue<'a> {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(&'a [u8]),
    Fixed32(u32),
}

impl WireValue<'_> {
    fn kind(&self) -> &'static str {
        match self {
            WireValue::Varint(_) => "varint",
            WireValue::Fixed64(_) => "fixed64",
            WireValue::LengthDelimited(_) => "length-delimited",
            WireValue::Fixed32(_) => "fixed32",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub number: u32,
    pub value: WireValue<'a>,
}

impl<'a> Field<'a> {
    fn unexpected(&self, expected: &'static str) -> DecodingError {
        DecodingError::UnexpectedWireType {
            field: self.number,
            expected,
            found: self.value.kind(),
        }
    }

    pub fn bytes(&self) -> Result<&'a [u8], DecodingError> {
        match self.value {
            WireValue::LengthDelimited(b) => Ok(b),
            _ => Err(self.unexpected("length-delimited")),
        }
    }

    pub fn string(&self) -> Result<String, DecodingError> {
        Ok(String::from_utf8(self.bytes()?.to_vec())?)
    }

    pub fn uint64(&self) -> Result<u64, DecodingError> {
        match self.value {
            WireValue::Varint(v) => Ok(v),
            _ => Err(self.unexpected("varint")),
        }
    }

    pub fn message<M: Message>(&self) -> Result<M, DecodingError> {
        M::decode_message(self.bytes()?)
    }
}

/// Read one tagged field off the front of `bytes`
pub fn read_field(bytes: &[u8]) -> DecodingResult<Field<'_>> {
    let (key, rest) = u64::decode(bytes)?;

    let number = u32::try_from(key >> 3)
        .map_err(|_| malformed_input("field number out of range", bytes))?;

    if number == 0 {
        return Err(malformed_input("field number zero", bytes));
    }

    let wire_type = (key & 0x07) as u8;

    let (value, rest) = match wire_type {
        0 => {
            let (v, rest) = u64::decode(rest)?;
            (WireValue::Varint(v), rest)
        }
        1 => {
            let (raw, rest) = rest
                .split_at_checked(8)
                .ok_or_else(|| malformed_input("fixed64 insufficient bytes", rest))?;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(raw);
            (WireValue::Fixed64(u64::from_le_bytes(buf)), rest)
        }
        2 => {
            let (len, rest) = u64::decode(rest)?;
            let len = usize::try_from(len)
                .map_err(|_| malformed_input("length exceeds address space", rest))?;
            let (data, rest) = rest
                .split_at_checked(len)
                .ok_or_else(|| malformed_input("length-delimited insufficient bytes", rest))?;
            (WireValue::LengthDelimited(data), rest)
        }
        5 => {
            let (raw, rest) = rest
                .split_at_checked(4)
                .ok_or_else(|| malformed_input("fixed32 insufficient bytes", rest))?;
            let mut buf = [0u8; 4];
            buf.copy_from_slice(raw);
            (WireValue::Fixed32(u32::from_le_bytes(buf)), rest)
        }
        // 3 and 4 are the deprecated group markers, never emitted by the SDK
        other => {
            return Err(DecodingError::UnsupportedWireType {
                field: number,
                wire_type: other,
            });
        }
    };

    Ok((Field { number, value }, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug)]
    struct Pair {
        name: String,
        count: u64,
        tags: Vec<String>,
    }

    impl Message for Pair {
        fn merge_field(&mut self, field: Field<'_>) -> Result<(), DecodingError> {
            match field.number {
                1 => self.name = field.string()?,
                2 => self.count = field.uint64()?,
                3 => self.tags.push(field.string()?),
                _ => {}
            }
            Ok(())
        }
    }

    #[test]
    fn decodes_varints() {
        assert_eq!(u64::decode(&[0x01, 0xff]).unwrap(), (1, &[0xff][..]));
        assert_eq!(u64::decode_all(&[0xac, 0x02]).unwrap(), 300);
        assert_eq!(
            u64::decode_all(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]).unwrap(),
            u64::MAX
        );
    }

    #[test]
    fn rejects_bad_varints() {
        assert!(u64::decode(&[]).is_err());
        assert!(u64::decode(&[0x80, 0x80]).is_err());
        assert!(u64::decode(&[0xff; 11]).is_err());
        assert!(
            u64::decode(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02]).is_err()
        );
    }

    #[test]
    fn decodes_message_and_skips_unknown_fields() {
        let bytes = [
            0x0a, 0x03, b'a', b'b', b'c', // 1: "abc"
            0x10, 0x07, // 2: 7
            0x1a, 0x01, b'x', // 3: "x"
            0x25, 0x01, 0x02, 0x03, 0x04, // 4: fixed32, unknown
            0x1a, 0x01, b'y', // 3: "y"
            0x29, 0, 0, 0, 0, 0, 0, 0, 0, // 5: fixed64, unknown
        ];

        let pair = Pair::decode_message(&bytes).unwrap();

        assert_eq!(pair.name, "abc");
        assert_eq!(pair.count, 7);
        assert_eq!(pair.tags, vec!["x", "y"]);
    }

    #[test]
    fn empty_input_is_default_message() {
        let pair = Pair::decode_message(&[]).unwrap();
        assert_eq!(pair.name, "");
        assert_eq!(pair.count, 0);
    }

    #[test]
    fn decodes_long_messages() {
        let mut bytes = Vec::new();
        for i in 0..5_000u32 {
            bytes.extend([0x1a, 0x01, b'a' + (i % 26) as u8]);
            bytes.extend([0x25, 0x01, 0x02, 0x03, 0x04]);
            bytes.extend([0x29, 0, 0, 0, 0, 0, 0, 0, 0]);
        }
        bytes.extend([0x10, 0x09]);

        let pair = Pair::decode_message(&bytes).unwrap();

        assert_eq!(pair.tags.len(), 5_000);
        assert_eq!(pair.tags[27], "b");
        assert_eq!(pair.count, 9);
    }

    #[test]
    fn rejects_truncated_fixed_width_fields() {
        let err = read_field(&[0x25, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, DecodingError::MalformedInput(ref m, ref rest) if m == "fixed32 insufficient bytes" && rest.len() == 2));

        let err = read_field(&[0x29, 0x01]).unwrap_err();
        assert!(matches!(err, DecodingError::MalformedInput(ref m, _) if m == "fixed64 insufficient bytes"));
    }

    #[test]
    fn rejects_truncated_length_delimited() {
        let err = Pair::decode_message(&[0x0a, 0x05, b'a']).unwrap_err();
        assert!(matches!(err, DecodingError::MalformedInput(..)));
    }

    #[test]
    fn rejects_groups_and_wrong_wire_types() {
        assert!(matches!(
            read_field(&[0x0b]).unwrap_err(),
            DecodingError::UnsupportedWireType { field: 1, wire_type: 3 }
        ));

        // field 1 sent as varint where a string is expected
        assert!(matches!(
            Pair::decode_message(&[0x08, 0x01]).unwrap_err(),
            DecodingError::UnexpectedWireType { field: 1, .. }
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            Pair::decode_message(&[0x0a, 0x01, 0xff]).unwrap_err(),
            DecodingError::InvalidUtf8(_)
        ));
    }
}
