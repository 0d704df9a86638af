//! Companion sync protocol
//!
//! This crate defines how the paired companion device pushes data to the
//! watch face. Every push is a small key/value dictionary:
//! ```text
//! ┌───────┬───────────────────────────────────────────┐
//! │ COUNT │ TUPLE × COUNT                             │
//! │ 1B    │ KEY u32 │ TYPE u8 │ LENGTH u16 │ VALUE    │
//! └───────┴───────────────────────────────────────────┘
//! ```
//!
//! Inbound dictionaries are at most 256 bytes, outbound ones at most 16.
//! The key numbering depends on which watch-face variant is running, see
//! [`keys`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod dict;
pub mod keys;
pub mod value;

pub use dict::{
    DictError, DictReader, DictWriter, Tuple, DICT_HEADER_SIZE, INBOUND_CAPACITY,
    OUTBOUND_CAPACITY, TUPLE_HEADER_SIZE,
};
pub use keys::{FieldKey, ValueKind, Variant, BATTERY_CHARGING, BATTERY_UNKNOWN};
pub use value::{Text, TupleType, TupleValue, MAX_TEXT_LEN, MAX_VALUE_LEN};
