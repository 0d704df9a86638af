//! Sync dictionary encoding and decoding.
//!
//! Dictionary format:
//! - COUNT (1 byte): number of tuples
//! - per tuple:
//!   - KEY (4 bytes, little-endian)
//!   - TYPE (1 byte): see [`TupleType`]
//!   - LENGTH (2 bytes, little-endian): value length in bytes
//!   - VALUE (LENGTH bytes)

use heapless::Vec;

use crate::value::{TupleType, TupleValue};

/// Largest dictionary accepted from the companion device
pub const INBOUND_CAPACITY: usize = 256;

/// Largest dictionary sent to the companion device
pub const OUTBOUND_CAPACITY: usize = 16;

/// COUNT byte
pub const DICT_HEADER_SIZE: usize = 1;

/// KEY + TYPE + LENGTH
pub const TUPLE_HEADER_SIZE: usize = 4 + 1 + 2;

/// Errors that can occur during dictionary decoding or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DictError {
    /// Input ends before the declared content
    Truncated,
    /// Unknown tuple type byte
    InvalidType,
    /// Length does not fit the tuple type
    InvalidLength,
    /// String is not NUL-terminated UTF-8
    InvalidText,
    /// Value larger than any tuple can carry
    ValueTooLarge,
    /// Bytes left over after the last tuple
    TrailingBytes,
    /// Destination buffer too small
    NotEnoughStorage,
    /// More tuples than the destination can hold
    TooManyTuples,
}

/// A key/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tuple {
    /// Raw wire key
    pub key: u32,
    pub value: TupleValue,
}

impl Tuple {
    /// Create a new tuple
    pub fn new(key: u32, value: TupleValue) -> Self {
        Self { key, value }
    }

    /// Encoded size including the tuple header
    pub fn encoded_len(&self) -> usize {
        TUPLE_HEADER_SIZE + self.value.encoded_len()
    }
}

/// Encoded size of a dictionary holding `tuples`
pub fn encoded_size(tuples: &[Tuple]) -> usize {
    DICT_HEADER_SIZE + tuples.iter().map(Tuple::encoded_len).sum::<usize>()
}

/// Decode a whole dictionary into at most `N` tuples
pub fn decode<const N: usize>(bytes: &[u8]) -> Result<Vec<Tuple, N>, DictError> {
    let mut tuples = Vec::new();
    for tuple in DictReader::new(bytes)? {
        tuples.push(tuple?).map_err(|_| DictError::TooManyTuples)?;
    }
    Ok(tuples)
}

/// Encode `tuples` into a dictionary of at most `N` bytes
pub fn encode<const N: usize>(tuples: &[Tuple]) -> Result<Vec<u8, N>, DictError> {
    let mut writer = DictWriter::<N>::new();
    for tuple in tuples {
        writer.push(tuple)?;
    }
    writer.finish()
}

/// Iterator over the tuples of an encoded dictionary
///
/// Yields `Err` at most once and then stops.
#[derive(Debug, Clone)]
pub struct DictReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    remaining: u8,
    done: bool,
}

impl<'a> DictReader<'a> {
    /// Start reading a dictionary
    pub fn new(bytes: &'a [u8]) -> Result<Self, DictError> {
        let (&count, _) = bytes.split_first().ok_or(DictError::Truncated)?;
        Ok(Self {
            bytes,
            offset: DICT_HEADER_SIZE,
            remaining: count,
            done: false,
        })
    }

    /// Number of tuples not yet read
    pub fn remaining(&self) -> usize {
        self.remaining as usize
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DictError> {
        let end = self.offset.checked_add(len).ok_or(DictError::Truncated)?;
        let slice = self.bytes.get(self.offset..end).ok_or(DictError::Truncated)?;
        self.offset = end;
        Ok(slice)
    }

    fn read_tuple(&mut self) -> Result<Tuple, DictError> {
        let header = self.take(TUPLE_HEADER_SIZE)?;
        let key = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let tuple_type = TupleType::from_byte(header[4]).ok_or(DictError::InvalidType)?;
        let length = u16::from_le_bytes([header[5], header[6]]) as usize;

        let raw = self.take(length)?;
        let value = TupleValue::decode(tuple_type, raw)?;
        Ok(Tuple { key, value })
    }
}

impl Iterator for DictReader<'_> {
    type Item = Result<Tuple, DictError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.remaining == 0 {
            self.done = true;
            if self.offset != self.bytes.len() {
                return Some(Err(DictError::TrailingBytes));
            }
            return None;
        }

        self.remaining -= 1;
        let result = self.read_tuple();
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Builds an encoded dictionary of at most `N` bytes
#[derive(Debug, Clone)]
pub struct DictWriter<const N: usize> {
    buffer: Vec<u8, N>,
    count: u8,
}

impl<const N: usize> Default for DictWriter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DictWriter<N> {
    /// Create an empty dictionary
    pub fn new() -> Self {
        let mut buffer = Vec::new();
        // With N == 0 the header is missing and every push reports NotEnoughStorage
        let _ = buffer.push(0);
        Self { buffer, count: 0 }
    }

    /// Append a tuple
    ///
    /// On error the dictionary is left as it was.
    pub fn push(&mut self, tuple: &Tuple) -> Result<(), DictError> {
        if self.buffer.is_empty() || self.buffer.len() + tuple.encoded_len() > N {
            return Err(DictError::NotEnoughStorage);
        }
        let length =
            u16::try_from(tuple.value.encoded_len()).map_err(|_| DictError::ValueTooLarge)?;
        let count = self.count.checked_add(1).ok_or(DictError::TooManyTuples)?;

        let mut header = [0u8; TUPLE_HEADER_SIZE];
        header[..4].copy_from_slice(&tuple.key.to_le_bytes());
        header[4] = tuple.value.tuple_type().to_byte();
        header[5..].copy_from_slice(&length.to_le_bytes());

        self.buffer
            .extend_from_slice(&header)
            .map_err(|_| DictError::NotEnoughStorage)?;
        tuple.value.write_to(&mut self.buffer)?;
        self.count = count;
        Ok(())
    }

    /// Number of tuples written so far
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Check if no tuple was written
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Finish the dictionary and return its bytes
    pub fn finish(mut self) -> Result<Vec<u8, N>, DictError> {
        let header = self.buffer.first_mut().ok_or(DictError::NotEnoughStorage)?;
        *header = self.count;
        Ok(self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn event_location() -> [Tuple; 2] {
        [
            Tuple::new(1, TupleValue::text("Lunch").unwrap()),
            Tuple::new(2, TupleValue::text("Cafe").unwrap()),
        ]
    }

    #[test]
    fn test_encode_layout() {
        let tuples = [Tuple::new(1, TupleValue::Uint(42))];
        let bytes = encode::<16>(&tuples).unwrap();

        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], 1); // count
        assert_eq!(&bytes[1..5], &[1, 0, 0, 0]); // key
        assert_eq!(bytes[5], 2); // uint
        assert_eq!(&bytes[6..8], &[1, 0]); // length
        assert_eq!(bytes[8], 42);
    }

    #[test]
    fn test_encode_cstring_has_terminator() {
        let tuples = [Tuple::new(2, TupleValue::text("Hi").unwrap())];
        let bytes = encode::<16>(&tuples).unwrap();

        assert_eq!(&bytes[6..8], &[3, 0]);
        assert_eq!(&bytes[8..], b"Hi\0");
        assert_eq!(bytes.len(), encoded_size(&tuples));
    }

    #[test]
    fn test_decode_two_tuples() {
        let tuples = event_location();
        let bytes = encode::<INBOUND_CAPACITY>(&tuples).unwrap();

        let decoded = decode::<4>(&bytes).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].key, 1);
        assert_eq!(decoded[0].value.as_text(), Some("Lunch"));
        assert_eq!(decoded[1].key, 2);
        assert_eq!(decoded[1].value.as_text(), Some("Cafe"));
    }

    #[test]
    fn test_decode_empty_input() {
        assert_eq!(decode::<4>(&[]), Err(DictError::Truncated));
    }

    #[test]
    fn test_decode_empty_dictionary() {
        assert_eq!(decode::<4>(&[0]).unwrap().len(), 0);
    }

    #[test]
    fn test_decode_truncated_value() {
        let bytes = encode::<INBOUND_CAPACITY>(&event_location()).unwrap();
        let cut = &bytes[..bytes.len() - 2];
        assert_eq!(decode::<4>(cut), Err(DictError::Truncated));
    }

    #[test]
    fn test_decode_count_larger_than_content() {
        let mut bytes = encode::<INBOUND_CAPACITY>(&event_location()).unwrap();
        bytes[0] = 3;
        assert_eq!(decode::<4>(&bytes), Err(DictError::Truncated));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut bytes = encode::<INBOUND_CAPACITY>(&event_location()).unwrap();
        bytes.push(0xAA).unwrap();
        assert_eq!(decode::<4>(&bytes), Err(DictError::TrailingBytes));
    }

    #[test]
    fn test_decode_invalid_type() {
        let bytes = [1, 1, 0, 0, 0, 9, 1, 0, 0];
        assert_eq!(decode::<4>(&bytes), Err(DictError::InvalidType));
    }

    #[test]
    fn test_decode_too_many_tuples() {
        let bytes = encode::<INBOUND_CAPACITY>(&event_location()).unwrap();
        assert_eq!(decode::<1>(&bytes), Err(DictError::TooManyTuples));
    }

    #[test]
    fn test_reader_stops_after_error() {
        let bytes = [2, 1, 0, 0, 0, 9, 0, 0];
        let mut reader = DictReader::new(&bytes).unwrap();
        assert_eq!(reader.remaining(), 2);
        assert_eq!(reader.next(), Some(Err(DictError::InvalidType)));
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn test_writer_rejects_overflow() {
        let mut writer = DictWriter::<OUTBOUND_CAPACITY>::new();
        writer.push(&Tuple::new(1, TupleValue::Uint(80))).unwrap();

        // 9 bytes used, header plus "x\0" needs 9 more
        let long = Tuple::new(2, TupleValue::text("x").unwrap());
        assert_eq!(writer.push(&long), Err(DictError::NotEnoughStorage));
        assert_eq!(writer.len(), 1);

        let bytes = writer.finish().unwrap();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], 1);
    }

    #[test]
    fn test_zero_capacity_writer() {
        let mut writer = DictWriter::<0>::new();
        assert!(writer.is_empty());
        assert_eq!(
            writer.push(&Tuple::new(1, TupleValue::Uint(1))),
            Err(DictError::NotEnoughStorage)
        );
        assert_eq!(writer.finish(), Err(DictError::NotEnoughStorage));
    }

    proptest! {
        #[test]
        fn prop_text_survives_codec(text in "[ -~]{0,200}", key in any::<u32>()) {
            let tuples = [Tuple::new(key, TupleValue::text(&text).unwrap())];
            let bytes = encode::<INBOUND_CAPACITY>(&tuples).unwrap();
            let decoded = decode::<1>(&bytes).unwrap();
            prop_assert_eq!(decoded[0].key, key);
            prop_assert_eq!(decoded[0].value.as_text(), Some(text.as_str()));
        }

        #[test]
        fn prop_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
            let _ = decode::<8>(&bytes);
        }
    }
}
