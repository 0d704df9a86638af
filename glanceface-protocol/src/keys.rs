//! Sync keys for the two watch-face variants
//!
//! Both variants number their keys from 1, so a raw key only means
//! something together with the variant that received it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Event/location variant
pub const KEY_EVENT: u32 = 1;
pub const KEY_LOCATION: u32 = 2;

// Phone status variant
pub const KEY_BATTERY_LEVEL: u32 = 1;
pub const KEY_CALENDAR: u32 = 2;

/// Remote battery level sentinel: phone is charging
pub const BATTERY_CHARGING: u8 = 254;
/// Remote battery level sentinel: level not known yet
pub const BATTERY_UNKNOWN: u8 = 255;

/// Sync-state buffer size of the event/location variant
pub const EVENT_LOCATION_SYNC_BUFFER: usize = 512;
/// Sync-state buffer size of the phone status variant
pub const PHONE_STATUS_SYNC_BUFFER: usize = 256;

/// Watch-face variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Variant {
    /// Next calendar event and its location
    EventLocation,
    /// Phone battery level and calendar summary
    PhoneStatus,
}

/// A synchronized field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FieldKey {
    Event,
    Location,
    BatteryLevel,
    Calendar,
}

/// Kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueKind {
    /// UTF-8 text, sent as a C string
    Text,
    /// Battery level byte (0-100, or a sentinel)
    Percent,
}

impl FieldKey {
    /// Value kind carried by this key
    pub fn kind(self) -> ValueKind {
        match self {
            FieldKey::BatteryLevel => ValueKind::Percent,
            FieldKey::Event | FieldKey::Location | FieldKey::Calendar => ValueKind::Text,
        }
    }

    /// Variant this key belongs to
    pub fn variant(self) -> Variant {
        match self {
            FieldKey::Event | FieldKey::Location => Variant::EventLocation,
            FieldKey::BatteryLevel | FieldKey::Calendar => Variant::PhoneStatus,
        }
    }

    /// Wire key number
    pub fn raw(self) -> u32 {
        match self {
            FieldKey::Event => KEY_EVENT,
            FieldKey::Location => KEY_LOCATION,
            FieldKey::BatteryLevel => KEY_BATTERY_LEVEL,
            FieldKey::Calendar => KEY_CALENDAR,
        }
    }
}

impl Variant {
    /// Map a wire key to a field of this variant
    ///
    /// Returns `None` for keys the variant does not know.
    pub fn decode_key(self, raw: u32) -> Option<FieldKey> {
        self.keys().iter().copied().find(|key| key.raw() == raw)
    }

    /// All keys of this variant, in wire order
    pub fn keys(self) -> &'static [FieldKey] {
        match self {
            Variant::EventLocation => &[FieldKey::Event, FieldKey::Location],
            Variant::PhoneStatus => &[FieldKey::BatteryLevel, FieldKey::Calendar],
        }
    }

    /// Field that shows sync errors
    pub fn primary(self) -> FieldKey {
        match self {
            Variant::EventLocation => FieldKey::Event,
            Variant::PhoneStatus => FieldKey::Calendar,
        }
    }

    /// Field blanked on sync errors, if the variant has one
    pub fn secondary(self) -> Option<FieldKey> {
        match self {
            Variant::EventLocation => Some(FieldKey::Location),
            Variant::PhoneStatus => None,
        }
    }

    /// Size of the sync-state buffer holding the current values
    pub fn sync_buffer_size(self) -> usize {
        match self {
            Variant::EventLocation => EVENT_LOCATION_SYNC_BUFFER,
            Variant::PhoneStatus => PHONE_STATUS_SYNC_BUFFER,
        }
    }
}
