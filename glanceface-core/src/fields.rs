//! Synchronized field storage
//!
//! Holds the current value of every key the running variant knows.
//! Storage is accounted in wire bytes against the variant's sync-state
//! buffer, the same way the values would sit in an encoded dictionary.

use glanceface_protocol::{
    FieldKey, Text, TupleValue, ValueKind, Variant, BATTERY_UNKNOWN, DICT_HEADER_SIZE,
    TUPLE_HEADER_SIZE,
};
use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::FieldDefault;
use crate::logging::debug;

/// Most keys a variant can have
pub const MAX_FIELDS: usize = 4;

/// Primary field text after a sync error
pub const SYNC_ERROR_TEXT: &str = "Sync Error";

/// Field store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Value kind does not match the key
    KindMismatch,
    /// Integer outside 0..=255 for a level key
    OutOfRange,
    /// Text longer than a tuple can carry
    TextTooLong,
    /// Sync-state buffer is full
    NotEnoughStorage,
}

/// A stored value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FieldValue {
    Text(Text),
    /// Battery level byte, sentinels included
    Level(u8),
}

impl FieldValue {
    /// Build a text value
    pub fn text(text: &str) -> Result<Self, StoreError> {
        let mut owned = Text::new();
        owned.push_str(text).map_err(|_| StoreError::TextTooLong)?;
        Ok(FieldValue::Text(owned))
    }

    /// Blank value of a kind: empty text, or the unknown battery level
    pub fn blank(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Text => FieldValue::Text(Text::new()),
            ValueKind::Percent => FieldValue::Level(BATTERY_UNKNOWN),
        }
    }

    /// Convert a received tuple value for a key of the given kind
    pub fn from_tuple(kind: ValueKind, value: &TupleValue) -> Result<Self, StoreError> {
        match (kind, value) {
            (ValueKind::Text, TupleValue::Text(text)) => Ok(FieldValue::Text(text.clone())),
            (ValueKind::Percent, TupleValue::Uint(_) | TupleValue::Int(_)) => value
                .as_u8()
                .map(FieldValue::Level)
                .ok_or(StoreError::OutOfRange),
            _ => Err(StoreError::KindMismatch),
        }
    }

    /// Wire form of this value
    pub fn to_tuple_value(&self) -> TupleValue {
        match self {
            FieldValue::Text(text) => TupleValue::Text(text.clone()),
            FieldValue::Level(level) => TupleValue::Uint(*level as u32),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Level(_) => ValueKind::Percent,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            FieldValue::Level(_) => None,
        }
    }

    pub fn as_level(&self) -> Option<u8> {
        match self {
            FieldValue::Level(level) => Some(*level),
            FieldValue::Text(_) => None,
        }
    }

    /// Bytes this value occupies in the sync-state buffer, tuple header included
    pub fn stored_len(&self) -> usize {
        let value_len = match self {
            FieldValue::Text(text) => text.len() + 1,
            FieldValue::Level(_) => 1,
        };
        TUPLE_HEADER_SIZE + value_len
    }
}

/// A field and its current value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    key: FieldKey,
    value: FieldValue,
    present: bool,
}

impl Field {
    pub fn key(&self) -> FieldKey {
        self.key
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// True once the companion pushed this key, false again after a sync error
    pub fn is_present(&self) -> bool {
        self.present
    }
}

/// Result of a `set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetOutcome {
    /// Value stored
    Stored,
    /// Key not known to this variant, nothing stored
    Ignored,
}

/// Current values of the synchronized fields
#[derive(Debug, Clone)]
pub struct FieldStore {
    variant: Variant,
    fields: Vec<Field, MAX_FIELDS>,
    capacity: usize,
    error: bool,
}

impl FieldStore {
    /// Seed every key of `variant`
    ///
    /// Keys without a default start blank. Defaults for keys of the
    /// other variant are skipped.
    pub fn init(
        variant: Variant,
        defaults: &[FieldDefault],
        capacity: usize,
    ) -> Result<Self, StoreError> {
        let mut fields = Vec::new();
        for &key in variant.keys() {
            let value = defaults
                .iter()
                .rev()
                .find(|d| d.key == key)
                .map(|d| d.value.clone())
                .unwrap_or_else(|| FieldValue::blank(key.kind()));

            if value.kind() != key.kind() {
                return Err(StoreError::KindMismatch);
            }

            fields
                .push(Field {
                    key,
                    value,
                    present: false,
                })
                .map_err(|_| StoreError::NotEnoughStorage)?;
        }

        let skipped = defaults
            .iter()
            .filter(|d| d.key.variant() != variant)
            .count();
        if skipped > 0 {
            debug!("Skipped {} defaults not used by {:?}", skipped, variant);
        }

        let store = Self {
            variant,
            fields,
            capacity,
            error: false,
        };

        // The error state must fit too; it is the same size whatever was stored
        if store.used_bytes().max(store.error_state_bytes()) > capacity {
            return Err(StoreError::NotEnoughStorage);
        }
        Ok(store)
    }

    /// Overwrite the value of a key
    ///
    /// Last write wins. On error the store is unchanged.
    pub fn set(&mut self, key: FieldKey, value: FieldValue) -> Result<SetOutcome, StoreError> {
        let used = self.used_bytes();
        let capacity = self.capacity;

        let Some(field) = self.fields.iter_mut().find(|f| f.key == key) else {
            return Ok(SetOutcome::Ignored);
        };

        if value.kind() != key.kind() {
            return Err(StoreError::KindMismatch);
        }

        if used - field.value.stored_len() + value.stored_len() > capacity {
            return Err(StoreError::NotEnoughStorage);
        }

        field.value = value;
        field.present = true;
        self.error = false;
        Ok(SetOutcome::Stored)
    }

    /// Current value of a key
    pub fn get(&self, key: FieldKey) -> Option<&FieldValue> {
        self.field(key).map(Field::value)
    }

    /// Field of a key, with its presence flag
    pub fn field(&self, key: FieldKey) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Show a sync error
    ///
    /// The primary field gets the error text, the secondary field (if the
    /// variant has one) is blanked. Other fields keep their values.
    pub fn reset_to_error_state(&mut self) {
        let primary = self.variant.primary();
        let secondary = self.variant.secondary();

        for field in self.fields.iter_mut() {
            if field.key == primary {
                field.value = FieldValue::Text(error_text());
                field.present = false;
            } else if Some(field.key) == secondary {
                field.value = FieldValue::Text(Text::new());
                field.present = false;
            }
        }
        self.error = true;
    }

    /// Check if the last thing that happened was a sync error
    pub fn in_error(&self) -> bool {
        self.error
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Bytes used in the sync-state buffer
    pub fn used_bytes(&self) -> usize {
        DICT_HEADER_SIZE
            + self
                .fields
                .iter()
                .map(|f| f.value.stored_len())
                .sum::<usize>()
    }

    /// Bytes used once `reset_to_error_state` has run
    fn error_state_bytes(&self) -> usize {
        let primary = self.variant.primary();
        let secondary = self.variant.secondary();
        let error_len = FieldValue::Text(error_text()).stored_len();
        let blank_len = FieldValue::Text(Text::new()).stored_len();

        DICT_HEADER_SIZE
            + self
                .fields
                .iter()
                .map(|f| {
                    if f.key == primary {
                        error_len
                    } else if Some(f.key) == secondary {
                        blank_len
                    } else {
                        f.value.stored_len()
                    }
                })
                .sum::<usize>()
    }

    /// Size of the sync-state buffer
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over all fields
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }
}

fn error_text() -> Text {
    let mut text = Text::new();
    // Fixed text, shorter than a tuple value
    let _ = text.push_str(SYNC_ERROR_TEXT);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> FieldValue {
        FieldValue::text(value).unwrap()
    }

    fn event_location() -> FieldStore {
        let defaults = [
            FieldDefault::new(FieldKey::Event, text("No event synced")),
            FieldDefault::new(FieldKey::Location, text("")),
        ];
        FieldStore::init(Variant::EventLocation, &defaults, 512).unwrap()
    }

    #[test]
    fn test_init_seeds_defaults() {
        let store = event_location();
        assert_eq!(
            store.get(FieldKey::Event).and_then(FieldValue::as_text),
            Some("No event synced")
        );
        assert_eq!(
            store.get(FieldKey::Location).and_then(FieldValue::as_text),
            Some("")
        );
        assert!(!store.field(FieldKey::Event).unwrap().is_present());
        assert_eq!(store.iter().count(), 2);
    }

    #[test]
    fn test_init_blank_for_missing_default() {
        let store = FieldStore::init(Variant::PhoneStatus, &[], 256).unwrap();
        assert_eq!(
            store.get(FieldKey::BatteryLevel),
            Some(&FieldValue::Level(BATTERY_UNKNOWN))
        );
        assert_eq!(
            store.get(FieldKey::Calendar).and_then(FieldValue::as_text),
            Some("")
        );
    }

    #[test]
    fn test_init_skips_foreign_defaults() {
        let defaults = [FieldDefault::new(FieldKey::Calendar, text("None!!"))];
        let store = FieldStore::init(Variant::EventLocation, &defaults, 512).unwrap();
        assert!(store.get(FieldKey::Calendar).is_none());
    }

    #[test]
    fn test_init_rejects_wrong_kind() {
        let defaults = [FieldDefault::new(FieldKey::BatteryLevel, text("full"))];
        let result = FieldStore::init(Variant::PhoneStatus, &defaults, 256);
        assert_eq!(result.err(), Some(StoreError::KindMismatch));
    }

    #[test]
    fn test_init_defaults_must_fit() {
        let defaults = [FieldDefault::new(FieldKey::Event, text("No event synced"))];
        let result = FieldStore::init(Variant::EventLocation, &defaults, 16);
        assert_eq!(result.err(), Some(StoreError::NotEnoughStorage));
    }

    #[test]
    fn test_init_reserves_room_for_error_state() {
        // Blank event and location take 17 bytes, the error state 27
        assert_eq!(
            FieldStore::init(Variant::EventLocation, &[], 17).err(),
            Some(StoreError::NotEnoughStorage)
        );

        let mut store = FieldStore::init(Variant::EventLocation, &[], 27).unwrap();
        assert_eq!(store.used_bytes(), 17);
        store.reset_to_error_state();
        assert_eq!(store.used_bytes(), 27);
        assert!(store.used_bytes() <= store.capacity());
    }

    #[test]
    fn test_error_state_fits_after_any_set() {
        let mut store = FieldStore::init(Variant::PhoneStatus, &[], 64).unwrap();
        store.set(FieldKey::Calendar, text("")).unwrap();
        store.set(FieldKey::BatteryLevel, FieldValue::Level(9)).unwrap();

        store.reset_to_error_state();
        assert_eq!(store.used_bytes(), 27);
        assert!(store.used_bytes() <= store.capacity());
    }

    #[test]
    fn test_set_last_write_wins() {
        let mut store = event_location();
        assert_eq!(store.set(FieldKey::Event, text("Lunch")), Ok(SetOutcome::Stored));
        assert_eq!(store.set(FieldKey::Event, text("Dinner")), Ok(SetOutcome::Stored));

        let field = store.field(FieldKey::Event).unwrap();
        assert_eq!(field.value().as_text(), Some("Dinner"));
        assert!(field.is_present());
    }

    #[test]
    fn test_set_unknown_key_ignored() {
        let mut store = event_location();
        let before = store.used_bytes();
        assert_eq!(
            store.set(FieldKey::BatteryLevel, FieldValue::Level(50)),
            Ok(SetOutcome::Ignored)
        );
        assert_eq!(store.used_bytes(), before);
        assert!(store.get(FieldKey::BatteryLevel).is_none());
    }

    #[test]
    fn test_set_wrong_kind() {
        let mut store = event_location();
        assert_eq!(
            store.set(FieldKey::Event, FieldValue::Level(3)),
            Err(StoreError::KindMismatch)
        );
        assert_eq!(
            store.get(FieldKey::Event).and_then(FieldValue::as_text),
            Some("No event synced")
        );
    }

    #[test]
    fn test_set_beyond_capacity_leaves_store_unchanged() {
        let mut store = FieldStore::init(Variant::PhoneStatus, &[], 64).unwrap();
        // header 1 + level 8 + empty text 8 = 17 used
        assert_eq!(store.used_bytes(), 17);

        let fits = "x".repeat(64 - 17);
        assert_eq!(store.set(FieldKey::Calendar, text(&fits)), Ok(SetOutcome::Stored));
        assert_eq!(store.used_bytes(), 64);

        let too_long = "x".repeat(64 - 16);
        assert_eq!(
            store.set(FieldKey::Calendar, text(&too_long)),
            Err(StoreError::NotEnoughStorage)
        );
        assert_eq!(
            store.get(FieldKey::Calendar).and_then(FieldValue::as_text),
            Some(fits.as_str())
        );
    }

    #[test]
    fn test_reset_to_error_state() {
        let mut store = event_location();
        store.set(FieldKey::Event, text("Lunch")).unwrap();
        store.set(FieldKey::Location, text("Cafe")).unwrap();

        store.reset_to_error_state();

        let event = store.field(FieldKey::Event).unwrap();
        assert_eq!(event.value().as_text(), Some(SYNC_ERROR_TEXT));
        assert!(!event.is_present());
        assert_eq!(
            store.get(FieldKey::Location).and_then(FieldValue::as_text),
            Some("")
        );
        assert!(store.in_error());

        store.set(FieldKey::Event, text("Lunch")).unwrap();
        assert!(!store.in_error());
    }

    #[test]
    fn test_reset_keeps_other_fields() {
        let mut store = FieldStore::init(Variant::PhoneStatus, &[], 256).unwrap();
        store.set(FieldKey::BatteryLevel, FieldValue::Level(42)).unwrap();
        store.set(FieldKey::Calendar, text("Dentist")).unwrap();

        store.reset_to_error_state();

        assert_eq!(
            store.get(FieldKey::Calendar).and_then(FieldValue::as_text),
            Some(SYNC_ERROR_TEXT)
        );
        assert_eq!(store.get(FieldKey::BatteryLevel), Some(&FieldValue::Level(42)));
        assert!(store.field(FieldKey::BatteryLevel).unwrap().is_present());
    }

    #[test]
    fn test_from_tuple() {
        assert_eq!(
            FieldValue::from_tuple(ValueKind::Percent, &TupleValue::Uint(80)),
            Ok(FieldValue::Level(80))
        );
        assert_eq!(
            FieldValue::from_tuple(ValueKind::Percent, &TupleValue::Uint(256)),
            Err(StoreError::OutOfRange)
        );
        assert_eq!(
            FieldValue::from_tuple(ValueKind::Percent, &TupleValue::Int(-1)),
            Err(StoreError::OutOfRange)
        );
        assert_eq!(
            FieldValue::from_tuple(ValueKind::Text, &TupleValue::Uint(1)),
            Err(StoreError::KindMismatch)
        );
        assert_eq!(
            FieldValue::from_tuple(ValueKind::Percent, &TupleValue::text("80").unwrap()),
            Err(StoreError::KindMismatch)
        );
    }
}
