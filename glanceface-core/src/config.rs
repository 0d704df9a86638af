//! Watch-face configuration
//!
//! Each variant ships with a stock configuration. With the `serde`
//! feature a configuration can also be loaded from a postcard blob
//! bundled with the firmware image.

use glanceface_display::FieldId;
use glanceface_protocol::{
    FieldKey, Variant, BATTERY_UNKNOWN, INBOUND_CAPACITY, OUTBOUND_CAPACITY,
};
use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fields::{FieldValue, MAX_FIELDS};

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Default event text before the companion syncs
pub const NO_EVENT_TEXT: &str = "No event synced";

/// Default calendar text before the companion syncs
pub const NO_CALENDAR_TEXT: &str = "None!!";

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Inbound capacity above the compiled-in buffer
    InboundTooLarge,
    /// Outbound capacity above the compiled-in buffer
    OutboundTooLarge,
    /// Default given for a key of the other variant
    ForeignDefault,
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
    /// Config version mismatch
    VersionMismatch,
}

/// What to do with channel-level sync errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ErrorPolicy {
    /// Show "Sync Error" in the primary field and blank the secondary
    #[default]
    Surface,
    /// Log and keep showing the last values
    Ignore,
}

/// Message size limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelConfig {
    /// Largest inbound dictionary in bytes
    pub inbound_capacity: u16,
    /// Largest outbound dictionary in bytes
    pub outbound_capacity: u16,
    /// Sync-state buffer holding the current values
    pub sync_buffer: u16,
}

impl ChannelConfig {
    /// Stock limits of a variant
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            inbound_capacity: INBOUND_CAPACITY as u16,
            outbound_capacity: OUTBOUND_CAPACITY as u16,
            sync_buffer: variant.sync_buffer_size() as u16,
        }
    }
}

/// Initial value of a field
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldDefault {
    pub key: FieldKey,
    pub value: FieldValue,
}

impl FieldDefault {
    pub fn new(key: FieldKey, value: FieldValue) -> Self {
        Self { key, value }
    }
}

/// Complete watch-face configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaceConfig {
    /// Config format version
    pub version: u8,
    pub variant: Variant,
    pub channel: ChannelConfig,
    pub error_policy: ErrorPolicy,
    /// Values shown until the companion syncs
    pub defaults: Vec<FieldDefault, MAX_FIELDS>,
}

impl FaceConfig {
    /// Stock configuration of a variant
    pub fn for_variant(variant: Variant) -> Self {
        let mut defaults = Vec::new();
        match variant {
            Variant::EventLocation => {
                let _ = defaults.push(text_default(FieldKey::Event, NO_EVENT_TEXT));
                let _ = defaults.push(text_default(FieldKey::Location, ""));
            }
            Variant::PhoneStatus => {
                let _ = defaults.push(FieldDefault::new(
                    FieldKey::BatteryLevel,
                    FieldValue::Level(BATTERY_UNKNOWN),
                ));
                let _ = defaults.push(text_default(FieldKey::Calendar, NO_CALENDAR_TEXT));
            }
        }

        Self {
            version: CONFIG_VERSION,
            variant,
            channel: ChannelConfig::for_variant(variant),
            error_policy: ErrorPolicy::Surface,
            defaults,
        }
    }

    /// Check the limits against the compiled-in buffers
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel.inbound_capacity as usize > INBOUND_CAPACITY {
            return Err(ConfigError::InboundTooLarge);
        }
        if self.channel.outbound_capacity as usize > OUTBOUND_CAPACITY {
            return Err(ConfigError::OutboundTooLarge);
        }
        if self.defaults.iter().any(|d| d.key.variant() != self.variant) {
            return Err(ConfigError::ForeignDefault);
        }
        Ok(())
    }

    /// Fields the variant's layout shows
    pub fn display_fields(&self) -> &'static [FieldId] {
        match self.variant {
            Variant::EventLocation => &[
                FieldId::Date,
                FieldId::Time,
                FieldId::LocalBattery,
                FieldId::Primary,
                FieldId::Secondary,
            ],
            Variant::PhoneStatus => &[
                FieldId::Date,
                FieldId::Time,
                FieldId::LocalBattery,
                FieldId::RemoteBattery,
                FieldId::Primary,
            ],
        }
    }

    /// Load a configuration from postcard bytes
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: FaceConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;

        if config.version != CONFIG_VERSION {
            crate::logging::warn!(
                "Config version mismatch: found {}, expected {}",
                config.version,
                CONFIG_VERSION
            );
            return Err(ConfigError::VersionMismatch);
        }

        config.validate()?;
        Ok(config)
    }

    /// Serialize into `buffer`, returning the used part
    #[cfg(feature = "serde")]
    pub fn to_slice<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }
}

fn text_default(key: FieldKey, text: &str) -> FieldDefault {
    let mut value = glanceface_protocol::Text::new();
    // Stock defaults are short literals
    let _ = value.push_str(text);
    FieldDefault::new(key, FieldValue::Text(value))
}
