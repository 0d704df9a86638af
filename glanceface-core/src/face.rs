//! Watch face application
//!
//! Ties the sync channel and the formatters to the display. Each event
//! is handled to completion before the next one is looked at.

use glanceface_display::{DisplayModel, DisplaySink, FieldId};

use crate::battery::{self, BatteryState};
use crate::clock::{self, ClockReading, ClockStyleSource};
use crate::config::FaceConfig;
use crate::event::{Event, EventQueue, EventSource};
use crate::logging::{debug, info, trace, warn};
use crate::sync::{SyncChannel, SyncError};

/// Running watch face
#[derive(Debug, Clone)]
pub struct WatchFace {
    config: FaceConfig,
    sync: SyncChannel,
}

impl WatchFace {
    /// Open the sync channel and show the default field values
    pub fn new<D: DisplaySink>(config: FaceConfig, display: &mut D) -> Result<Self, SyncError> {
        let sync = SyncChannel::open(&config, display)?;
        info!("Watch face ready: {:?}", config.variant);
        Ok(Self { config, sync })
    }

    /// Show the initial battery state
    pub fn start<D: DisplaySink>(&mut self, battery: BatteryState, display: &mut D) {
        self.show_battery(&battery, display);
    }

    pub fn config(&self) -> &FaceConfig {
        &self.config
    }

    pub fn sync(&self) -> &SyncChannel {
        &self.sync
    }

    /// Sync channel, for outbound `set`
    pub fn sync_mut(&mut self) -> &mut SyncChannel {
        &mut self.sync
    }

    /// Display model sized for this face's layout
    pub fn display_model(&self) -> DisplayModel {
        DisplayModel::with_fields(self.config.display_fields())
    }

    /// Handle one event
    pub fn handle<C, D>(&mut self, event: &Event, clock: &C, display: &mut D)
    where
        C: ClockStyleSource + ?Sized,
        D: DisplaySink,
    {
        match event {
            Event::MinuteTick(reading) => self.show_clock(reading, clock.is_24h_style(), display),
            Event::BatteryChanged(state) => self.show_battery(state, display),
            Event::SyncUpdate(tuple) => {
                self.sync.on_update(tuple.key, &tuple.value, display);
            }
            Event::SyncMessage(bytes) => {
                if let Err(e) = self.sync.on_message(bytes, display) {
                    debug!("Sync message dropped: {:?}", e);
                }
            }
            Event::SyncError(error) => self.sync.on_error(*error, display),
        }
    }

    /// Handle every pending event of `source`, returning how many there were
    pub fn dispatch_pending<S, C, D>(&mut self, source: &mut S, clock: &C, display: &mut D) -> usize
    where
        S: EventSource + ?Sized,
        C: ClockStyleSource + ?Sized,
        D: DisplaySink,
    {
        let mut handled = 0;
        while let Some(event) = source.poll_event() {
            self.handle(&event, clock, display);
            handled += 1;
        }
        if handled > 0 {
            trace!("Dispatched {} events", handled);
        }
        handled
    }

    /// Wait for the next queued event and handle it
    pub async fn process_next<const N: usize, C, D>(
        &mut self,
        queue: &EventQueue<N>,
        clock: &C,
        display: &mut D,
    ) where
        C: ClockStyleSource + ?Sized,
        D: DisplaySink,
    {
        let event = queue.next().await;
        self.handle(&event, clock, display);
    }

    fn show_clock<D: DisplaySink>(&self, reading: &ClockReading, use_24h: bool, display: &mut D) {
        let (time, date) = clock::format(reading, use_24h);
        write_field(display, FieldId::Date, date.as_str());
        write_field(display, FieldId::Time, time.as_str());
    }

    fn show_battery<D: DisplaySink>(&self, state: &BatteryState, display: &mut D) {
        let text = battery::format_local(state);
        write_field(display, FieldId::LocalBattery, text.as_str());
    }
}

fn write_field<D: DisplaySink>(display: &mut D, field: FieldId, text: &str) {
    if let Err(e) = display.set_field_text(field, text) {
        warn!("Display rejected {:?}: {:?}", field, e);
    }
}
