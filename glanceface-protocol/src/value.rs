//! Tuple values carried in sync dictionaries

use heapless::{String, Vec};

use crate::dict::{DictError, DICT_HEADER_SIZE, INBOUND_CAPACITY, TUPLE_HEADER_SIZE};

/// Largest value a single tuple of an inbound dictionary can carry
pub const MAX_VALUE_LEN: usize = INBOUND_CAPACITY - DICT_HEADER_SIZE - TUPLE_HEADER_SIZE;

/// Largest text value (the wire form adds a NUL terminator)
pub const MAX_TEXT_LEN: usize = MAX_VALUE_LEN - 1;

/// Owned text value
pub type Text = String<MAX_TEXT_LEN>;

/// Tuple value type as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TupleType {
    /// Raw bytes
    ByteArray,
    /// NUL-terminated UTF-8 string
    CString,
    /// Little-endian unsigned integer (1, 2 or 4 bytes)
    Uint,
    /// Little-endian signed integer (1, 2 or 4 bytes)
    Int,
}

// Wire format values
const TYPE_BYTE_ARRAY: u8 = 0;
const TYPE_CSTRING: u8 = 1;
const TYPE_UINT: u8 = 2;
const TYPE_INT: u8 = 3;

impl TupleType {
    /// Parse a type from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            TYPE_BYTE_ARRAY => Some(TupleType::ByteArray),
            TYPE_CSTRING => Some(TupleType::CString),
            TYPE_UINT => Some(TupleType::Uint),
            TYPE_INT => Some(TupleType::Int),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            TupleType::ByteArray => TYPE_BYTE_ARRAY,
            TupleType::CString => TYPE_CSTRING,
            TupleType::Uint => TYPE_UINT,
            TupleType::Int => TYPE_INT,
        }
    }
}

/// A decoded tuple value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TupleValue {
    Bytes(Vec<u8, MAX_VALUE_LEN>),
    Text(Text),
    Uint(u32),
    Int(i32),
}

impl TupleValue {
    /// Build a text value, failing if it cannot fit a tuple
    pub fn text(text: &str) -> Result<Self, DictError> {
        let mut owned = Text::new();
        owned
            .push_str(text)
            .map_err(|_| DictError::ValueTooLarge)?;
        Ok(TupleValue::Text(owned))
    }

    /// Build a byte array value, failing if it cannot fit a tuple
    pub fn bytes(bytes: &[u8]) -> Result<Self, DictError> {
        let mut owned = Vec::new();
        owned
            .extend_from_slice(bytes)
            .map_err(|_| DictError::ValueTooLarge)?;
        Ok(TupleValue::Bytes(owned))
    }

    /// Wire type of this value
    pub fn tuple_type(&self) -> TupleType {
        match self {
            TupleValue::Bytes(_) => TupleType::ByteArray,
            TupleValue::Text(_) => TupleType::CString,
            TupleValue::Uint(_) => TupleType::Uint,
            TupleValue::Int(_) => TupleType::Int,
        }
    }

    /// Number of value bytes on the wire
    ///
    /// Integers use the narrowest width that holds them.
    pub fn encoded_len(&self) -> usize {
        match self {
            TupleValue::Bytes(bytes) => bytes.len(),
            TupleValue::Text(text) => text.len() + 1,
            TupleValue::Uint(v) => match *v {
                0..=0xFF => 1,
                0x100..=0xFFFF => 2,
                _ => 4,
            },
            TupleValue::Int(v) => match *v {
                -0x80..=0x7F => 1,
                -0x8000..=0x7FFF => 2,
                _ => 4,
            },
        }
    }

    /// Text content, if this is a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TupleValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Value as a byte, if it is an integer in 0..=255
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            TupleValue::Uint(v) => u8::try_from(*v).ok(),
            TupleValue::Int(v) => u8::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Write the value bytes (no tuple header) into `out`
    pub(crate) fn write_to<const N: usize>(&self, out: &mut Vec<u8, N>) -> Result<(), DictError> {
        let width = self.encoded_len();
        match self {
            TupleValue::Bytes(bytes) => out.extend_from_slice(bytes),
            TupleValue::Text(text) => out
                .extend_from_slice(text.as_bytes())
                .and_then(|_| out.push(0).map_err(|_| ())),
            TupleValue::Uint(v) => out.extend_from_slice(&v.to_le_bytes()[..width]),
            TupleValue::Int(v) => out.extend_from_slice(&v.to_le_bytes()[..width]),
        }
        .map_err(|_| DictError::NotEnoughStorage)
    }

    /// Decode value bytes of the given wire type
    pub(crate) fn decode(tuple_type: TupleType, raw: &[u8]) -> Result<Self, DictError> {
        match tuple_type {
            TupleType::ByteArray => Self::bytes(raw),
            TupleType::CString => {
                if raw.is_empty() {
                    return Err(DictError::InvalidLength);
                }
                let end = raw
                    .iter()
                    .position(|&b| b == 0)
                    .ok_or(DictError::InvalidText)?;
                if end > MAX_TEXT_LEN {
                    return Err(DictError::ValueTooLarge);
                }
                let text = core::str::from_utf8(&raw[..end]).map_err(|_| DictError::InvalidText)?;
                Self::text(text)
            }
            TupleType::Uint => match *raw {
                [a] => Ok(TupleValue::Uint(a as u32)),
                [a, b] => Ok(TupleValue::Uint(u16::from_le_bytes([a, b]) as u32)),
                [a, b, c, d] => Ok(TupleValue::Uint(u32::from_le_bytes([a, b, c, d]))),
                _ => Err(DictError::InvalidLength),
            },
            TupleType::Int => match *raw {
                [a] => Ok(TupleValue::Int(a as i8 as i32)),
                [a, b] => Ok(TupleValue::Int(i16::from_le_bytes([a, b]) as i32)),
                [a, b, c, d] => Ok(TupleValue::Int(i32::from_le_bytes([a, b, c, d]))),
                _ => Err(DictError::InvalidLength),
            },
        }
    }
}
