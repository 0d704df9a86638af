//! Events and the event queue
//!
//! Everything the platform reports to the watch face arrives as an
//! [`Event`]. Producers post into an [`EventQueue`]; the face drains it
//! one event at a time.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use glanceface_protocol::{Tuple, INBOUND_CAPACITY};
use heapless::Vec;

use crate::battery::BatteryState;
use crate::clock::ClockReading;
use crate::logging::warn;
use crate::sync::SyncError;

/// Default event queue depth
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Platform event
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Wall clock crossed a minute boundary
    MinuteTick(ClockReading),
    /// Watch battery state changed
    BatteryChanged(BatteryState),
    /// Companion updated a single key
    SyncUpdate(Tuple),
    /// Companion pushed an encoded dictionary
    SyncMessage(Vec<u8, INBOUND_CAPACITY>),
    /// Channel-level sync failure
    SyncError(SyncError),
}

impl Event {
    /// Build a `SyncMessage` from raw bytes
    ///
    /// Returns `None` if `bytes` exceeds the inbound capacity.
    pub fn sync_message(bytes: &[u8]) -> Option<Self> {
        Vec::from_slice(bytes).ok().map(Event::SyncMessage)
    }

    pub fn is_tick(&self) -> bool {
        matches!(self, Event::MinuteTick(_))
    }

    /// Check if the event comes from the sync channel
    pub fn is_sync(&self) -> bool {
        matches!(
            self,
            Event::SyncUpdate(_) | Event::SyncMessage(_) | Event::SyncError(_)
        )
    }
}

/// Anything that can hand out pending events
pub trait EventSource {
    /// Next pending event, without waiting
    fn poll_event(&mut self) -> Option<Event>;
}

/// Queue full; the rejected event is handed back
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull(pub Event);

/// Bounded single-executor event queue
pub struct EventQueue<const N: usize = EVENT_QUEUE_DEPTH> {
    channel: Channel<NoopRawMutex, Event, N>,
}

impl<const N: usize> EventQueue<N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Post an event without waiting
    pub fn post(&self, event: Event) -> Result<(), QueueFull> {
        self.channel.try_send(event).map_err(|TrySendError::Full(event)| {
            warn!("Event queue full, rejecting event");
            QueueFull(event)
        })
    }

    /// Wait for the next event
    pub async fn next(&self) -> Event {
        self.channel.receive().await
    }

    /// Next event if one is pending
    pub fn try_next(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventSource for EventQueue<N> {
    fn poll_event(&mut self) -> Option<Event> {
        self.try_next()
    }
}

impl<const N: usize> EventSource for &EventQueue<N> {
    fn poll_event(&mut self) -> Option<Event> {
        self.try_next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    fn tick(minute: u8) -> Event {
        Event::MinuteTick(ClockReading::new(9, minute, 3, 1).unwrap())
    }

    #[test]
    fn test_fifo_order() {
        let queue: EventQueue = EventQueue::new();
        queue.post(tick(1)).unwrap();
        queue.post(Event::BatteryChanged(BatteryState::new(20, false))).unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_next(), Some(tick(1)));
        assert_eq!(
            queue.try_next(),
            Some(Event::BatteryChanged(BatteryState::new(20, false)))
        );
        assert_eq!(queue.try_next(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_rejects() {
        let queue: EventQueue<2> = EventQueue::new();
        queue.post(tick(1)).unwrap();
        queue.post(tick(2)).unwrap();
        assert!(queue.is_full());

        assert_eq!(queue.post(tick(3)), Err(QueueFull(tick(3))));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_next(), Some(tick(1)));
    }

    #[test]
    fn test_async_next() {
        let queue: EventQueue = EventQueue::new();
        queue
            .post(Event::SyncError(SyncError::MessageTooLarge))
            .unwrap();

        let event = block_on(queue.next());
        assert_eq!(event, Event::SyncError(SyncError::MessageTooLarge));
    }

    #[test]
    fn test_poll_through_reference() {
        let queue: EventQueue = EventQueue::new();
        queue.post(tick(5)).unwrap();

        let mut source = &queue;
        assert_eq!(source.poll_event(), Some(tick(5)));
        assert_eq!(source.poll_event(), None);
    }

    #[test]
    fn test_sync_message_capacity() {
        assert!(Event::sync_message(&[0u8; INBOUND_CAPACITY]).is_some());
        assert!(Event::sync_message(&[0u8; INBOUND_CAPACITY + 1]).is_none());

        let event = Event::sync_message(&[1, 2, 3]).unwrap();
        assert!(event.is_sync());
        assert!(!event.is_tick());
    }
}
