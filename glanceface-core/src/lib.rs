//! Board-agnostic core logic for the Glanceface watch face
//!
//! This crate contains everything between the platform's event loop and
//! the renderer:
//!
//! - Field store for values pushed by the companion device
//! - Sync channel applying dictionary pushes and sync errors
//! - Clock and battery text formatting
//! - Typed events, the event queue and the `WatchFace` dispatcher
//! - Per-variant configuration

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

mod logging;

pub mod battery;
pub mod clock;
pub mod config;
pub mod event;
pub mod face;
pub mod fields;
pub mod sync;

pub use battery::{BatteryState, BatteryText};
pub use clock::{ClockReading, ClockStyle, ClockStyleSource, DateText, TimeText};
pub use config::{ConfigError, ErrorPolicy, FaceConfig};
pub use event::{Event, EventQueue, EventSource, QueueFull, EVENT_QUEUE_DEPTH};
pub use face::WatchFace;
pub use fields::{FieldStore, FieldValue, StoreError};
pub use sync::{SyncChannel, SyncError, TransportError, UpdateOutcome};
