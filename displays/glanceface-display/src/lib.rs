//! Display side of the Glanceface watch face
//!
//! This crate provides:
//! - `FieldId`, the text fields a watch-face layout can show
//! - `DisplaySink`, the "set text of field F" capability the core writes to
//! - `DisplayModel`, an owned copy of every field's text
//!
//! # Architecture
//!
//! The rendering toolkit owns fonts, geometry and drawing. It either
//! implements `DisplaySink` itself, or reads a `DisplayModel` after each
//! handled event and redraws the fields that changed.

#![no_std]
#![deny(unsafe_code)]

pub mod model;
pub mod sink;

// Re-export key types
pub use model::{DisplayModel, MAX_FIELD_LEN};
pub use sink::{DisplayError, DisplaySink, FieldId, FIELD_COUNT};
