//! Sync channel
//!
//! Applies what the companion device pushes to the field store and
//! refreshes the display field of every key it touches. Keys are applied
//! one at a time; a push that updates two keys produces two refreshes.

use glanceface_display::{DisplaySink, FieldId};
use glanceface_protocol::dict::{self, DictError, DictReader, Tuple};
use glanceface_protocol::{FieldKey, TupleValue, Variant, OUTBOUND_CAPACITY};
use heapless::Vec;

use crate::battery;
use crate::config::{ChannelConfig, ConfigError, ErrorPolicy, FaceConfig};
use crate::fields::{FieldStore, FieldValue, SetOutcome, StoreError};
use crate::logging::{debug, info, warn};

/// Channel-level sync errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// Inbound dictionary could not be decoded
    Dictionary(DictError),
    /// Inbound dictionary above the inbound capacity
    MessageTooLarge,
    /// Values do not fit the sync-state buffer
    NotEnoughStorage,
    /// Key not used by the running variant
    UnknownKey,
    /// Value not acceptable for the key
    Store(StoreError),
    /// Configuration rejected at open
    Config(ConfigError),
    /// Transport reported a failure
    Transport(TransportError),
}

/// Transport failures reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Companion not connected
    NotConnected,
    /// Outbound message was not acknowledged in time
    SendTimeout,
    /// Companion rejected the outbound message
    SendRejected,
    /// Inbound message dropped by the transport
    Dropped,
}

impl From<DictError> for SyncError {
    fn from(e: DictError) -> Self {
        SyncError::Dictionary(e)
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotEnoughStorage => SyncError::NotEnoughStorage,
            e => SyncError::Store(e),
        }
    }
}

impl From<ConfigError> for SyncError {
    fn from(e: ConfigError) -> Self {
        SyncError::Config(e)
    }
}

/// Result of a single key update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateOutcome {
    /// Stored and displayed
    Applied(FieldKey),
    /// Key unknown to the variant
    Ignored,
    /// Value not acceptable for the key
    Rejected(StoreError),
}

/// Display field showing a synced key
pub fn display_field(key: FieldKey) -> FieldId {
    match key {
        FieldKey::Event | FieldKey::Calendar => FieldId::Primary,
        FieldKey::Location => FieldId::Secondary,
        FieldKey::BatteryLevel => FieldId::RemoteBattery,
    }
}

/// Authoritative copy of everything the companion pushed
#[derive(Debug, Clone)]
pub struct SyncChannel {
    store: FieldStore,
    limits: ChannelConfig,
    policy: ErrorPolicy,
}

impl SyncChannel {
    /// Open the channel and show the default values
    pub fn open<D: DisplaySink>(config: &FaceConfig, display: &mut D) -> Result<Self, SyncError> {
        config.validate()?;
        let store = FieldStore::init(
            config.variant,
            &config.defaults,
            config.channel.sync_buffer as usize,
        )?;

        info!(
            "Sync channel open: {:?}, in {} out {} buffer {}",
            config.variant,
            config.channel.inbound_capacity,
            config.channel.outbound_capacity,
            config.channel.sync_buffer
        );

        let channel = Self {
            store,
            limits: config.channel,
            policy: config.error_policy,
        };
        for &key in config.variant.keys() {
            channel.refresh(key, display);
        }
        Ok(channel)
    }

    /// Current field values
    pub fn fields(&self) -> &FieldStore {
        &self.store
    }

    pub fn variant(&self) -> Variant {
        self.store.variant()
    }

    /// Apply one key/value update
    ///
    /// Unknown keys change nothing. A value that does not fit the
    /// sync-state buffer raises a channel error.
    pub fn on_update<D: DisplaySink>(
        &mut self,
        raw_key: u32,
        value: &TupleValue,
        display: &mut D,
    ) -> UpdateOutcome {
        let Some(key) = self.variant().decode_key(raw_key) else {
            debug!("Ignoring unknown key {}", raw_key);
            return UpdateOutcome::Ignored;
        };

        let value = match FieldValue::from_tuple(key.kind(), value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Rejected value for {:?}: {:?}", key, e);
                return UpdateOutcome::Rejected(e);
            }
        };

        match self.store.set(key, value) {
            Ok(SetOutcome::Stored) => {
                debug!("Updated {:?}", key);
                self.refresh(key, display);
                UpdateOutcome::Applied(key)
            }
            Ok(SetOutcome::Ignored) => UpdateOutcome::Ignored,
            Err(StoreError::NotEnoughStorage) => {
                self.on_error(SyncError::NotEnoughStorage, display);
                UpdateOutcome::Rejected(StoreError::NotEnoughStorage)
            }
            Err(e) => {
                warn!("Rejected value for {:?}: {:?}", key, e);
                UpdateOutcome::Rejected(e)
            }
        }
    }

    /// Apply an encoded inbound dictionary
    ///
    /// The whole dictionary is checked before any key is applied; a
    /// malformed or oversized one raises a channel error and changes
    /// nothing. Returns the number of keys applied.
    pub fn on_message<D: DisplaySink>(
        &mut self,
        bytes: &[u8],
        display: &mut D,
    ) -> Result<usize, SyncError> {
        if let Err(e) = self.check_message(bytes) {
            self.on_error(e, display);
            return Err(e);
        }

        let mut applied = 0;
        for tuple in DictReader::new(bytes)? {
            let tuple = tuple?;
            if let UpdateOutcome::Applied(_) = self.on_update(tuple.key, &tuple.value, display) {
                applied += 1;
            }
        }
        Ok(applied)
    }

    fn check_message(&self, bytes: &[u8]) -> Result<(), SyncError> {
        if bytes.len() > self.limits.inbound_capacity as usize {
            return Err(SyncError::MessageTooLarge);
        }
        for tuple in DictReader::new(bytes)? {
            tuple?;
        }
        Ok(())
    }

    /// Handle a channel-level error
    pub fn on_error<D: DisplaySink>(&mut self, error: SyncError, display: &mut D) {
        match self.policy {
            ErrorPolicy::Ignore => {
                warn!("Sync error ignored: {:?}", error);
            }
            ErrorPolicy::Surface => {
                warn!("Sync error: {:?}", error);
                self.store.reset_to_error_state();

                let variant = self.variant();
                self.refresh(variant.primary(), display);
                if let Some(secondary) = variant.secondary() {
                    self.refresh(secondary, display);
                }
            }
        }
    }

    /// Store a value locally and encode it for the companion
    ///
    /// Fails without changing anything if the value does not fit the
    /// outbound capacity or the sync-state buffer.
    pub fn set<D: DisplaySink>(
        &mut self,
        key: FieldKey,
        value: FieldValue,
        display: &mut D,
    ) -> Result<Vec<u8, OUTBOUND_CAPACITY>, SyncError> {
        if key.variant() != self.variant() {
            return Err(SyncError::UnknownKey);
        }
        if value.kind() != key.kind() {
            return Err(SyncError::Store(StoreError::KindMismatch));
        }

        let tuple = Tuple::new(key.raw(), value.to_tuple_value());
        if tuple.encoded_len() + dict::DICT_HEADER_SIZE > self.limits.outbound_capacity as usize {
            return Err(SyncError::Dictionary(DictError::NotEnoughStorage));
        }
        let message = dict::encode::<OUTBOUND_CAPACITY>(&[tuple])?;

        self.store.set(key, value)?;
        self.refresh(key, display);
        Ok(message)
    }

    /// Push the current text of one key to its display field
    fn refresh<D: DisplaySink>(&self, key: FieldKey, display: &mut D) {
        let Some(value) = self.store.get(key) else {
            return;
        };
        let field = display_field(key);

        let result = match value {
            FieldValue::Text(text) => display.set_field_text(field, text.as_str()),
            FieldValue::Level(level) => {
                display.set_field_text(field, battery::format_remote(*level).as_str())
            }
        };
        if let Err(e) = result {
            warn!("Display rejected {:?}: {:?}", field, e);
        }
    }
}
