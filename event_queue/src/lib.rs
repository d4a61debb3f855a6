//! # Event Queue
//!
//! The downstream collaborator every backend delivers into.
//!
//! ## Philosophy
//!
//! - **Backends push, applications poll**: Drivers never wait on the queue
//! - **Bounded**: A full queue drops the new event instead of growing
//! - **Observable**: Last known key and button state can be queried
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A filter (redundant presses are delivered as-is)
//! - A focus manager or dispatcher

use input_types::{ButtonState, InputEvent, KeySym};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// Default queue depth, matching the library's historical event limit.
pub const DEFAULT_CAPACITY: usize = 128;

/// Event queue error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventQueueError {
    #[error("Event queue full ({capacity} events)")]
    Full { capacity: usize },
}

/// Sink interface for delivering input events.
///
/// Backends hold a `&mut dyn EventSink` for the duration of one pump cycle.
pub trait EventSink {
    fn push_event(&mut self, event: InputEvent) -> Result<(), EventQueueError>;
}

impl EventSink for Vec<InputEvent> {
    fn push_event(&mut self, event: InputEvent) -> Result<(), EventQueueError> {
        self.push(event);
        Ok(())
    }
}

/// Bounded FIFO of input events
///
/// Also records the latest state seen for every key symbol and the current
/// mouse button mask.
#[derive(Debug)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
    capacity: usize,
    dropped: u64,
    key_state: HashMap<KeySym, ButtonState>,
    button_mask: u8,
}

impl EventQueue {
    /// Creates a queue holding at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
            key_state: HashMap::new(),
            button_mask: 0,
        }
    }

    /// Removes and returns the oldest event
    pub fn poll(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    /// Returns the oldest event without removing it
    pub fn peek(&self) -> Option<&InputEvent> {
        self.events.front()
    }

    /// Removes and returns every queued event in arrival order
    pub fn drain(&mut self) -> Vec<InputEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events rejected because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Latest state delivered for `sym`, released if never seen
    pub fn key_state(&self, sym: KeySym) -> ButtonState {
        self.key_state
            .get(&sym)
            .copied()
            .unwrap_or(ButtonState::Released)
    }

    /// Current mouse button mask (bit 0 = left)
    pub fn button_mask(&self) -> u8 {
        self.button_mask
    }

    /// Discards queued events and tracked state
    pub fn clear(&mut self) {
        self.events.clear();
        self.key_state.clear();
        self.button_mask = 0;
    }

    fn track(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Key(key) => {
                self.key_state.insert(key.sym, key.state);
            }
            InputEvent::MouseButton { button, state } => match state {
                ButtonState::Pressed => self.button_mask |= button.mask(),
                ButtonState::Released => self.button_mask &= !button.mask(),
            },
            _ => {}
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventSink for EventQueue {
    fn push_event(&mut self, event: InputEvent) -> Result<(), EventQueueError> {
        if self.events.len() >= self.capacity {
            self.dropped += 1;
            tracing::debug!(dropped = self.dropped, ?event, "event queue full");
            return Err(EventQueueError::Full {
                capacity: self.capacity,
            });
        }
        self.track(&event);
        self.events.push_back(event);
        Ok(())
    }
}

/// Pushes an event, logging instead of failing when the sink rejects it.
///
/// Steady-state driver paths have no error channel; this is their delivery
/// primitive.
pub fn deliver(sink: &mut dyn EventSink, event: InputEvent) {
    if let Err(err) = sink.push_event(event) {
        tracing::debug!(%err, "input event dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input_types::{KeyEvent, MouseButton};

    #[test]
    fn test_queue_fifo_order() {
        let mut queue = EventQueue::default();
        queue
            .push_event(InputEvent::key(KeyEvent::pressed(0x1E, KeySym::A)))
            .unwrap();
        queue.push_event(InputEvent::motion(1, 1)).unwrap();

        assert_eq!(queue.len(), 2);
        assert!(queue.poll().unwrap().is_key());
        assert_eq!(queue.poll(), Some(InputEvent::motion(1, 1)));
        assert_eq!(queue.poll(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_full_rejects_new_events() {
        let mut queue = EventQueue::new(2);
        queue.push_event(InputEvent::motion(1, 0)).unwrap();
        queue.push_event(InputEvent::motion(2, 0)).unwrap();

        let result = queue.push_event(InputEvent::motion(3, 0));
        assert_eq!(result, Err(EventQueueError::Full { capacity: 2 }));
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.drain(), vec![InputEvent::motion(1, 0), InputEvent::motion(2, 0)]);
    }

    #[test]
    fn test_key_state_tracking() {
        let mut queue = EventQueue::default();
        assert_eq!(queue.key_state(KeySym::A), ButtonState::Released);

        queue
            .push_event(InputEvent::key(KeyEvent::pressed(0x1E, KeySym::A)))
            .unwrap();
        assert_eq!(queue.key_state(KeySym::A), ButtonState::Pressed);

        queue
            .push_event(InputEvent::key(KeyEvent::released(0x1E, KeySym::A)))
            .unwrap();
        assert_eq!(queue.key_state(KeySym::A), ButtonState::Released);
    }

    #[test]
    fn test_redundant_presses_are_delivered() {
        let mut queue = EventQueue::default();
        let press = InputEvent::key(KeyEvent::pressed(0x00, KeySym::Unknown));
        queue.push_event(press).unwrap();
        queue.push_event(press).unwrap();

        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_button_mask_tracking() {
        let mut queue = EventQueue::default();
        queue
            .push_event(InputEvent::button(MouseButton::Left, ButtonState::Pressed))
            .unwrap();
        queue
            .push_event(InputEvent::button(MouseButton::Right, ButtonState::Pressed))
            .unwrap();
        assert_eq!(queue.button_mask(), 0b101);

        queue
            .push_event(InputEvent::button(MouseButton::Left, ButtonState::Released))
            .unwrap();
        assert_eq!(queue.button_mask(), 0b100);

        queue.clear();
        assert_eq!(queue.button_mask(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_deliver_swallows_full_queue() {
        let mut queue = EventQueue::new(1);
        deliver(&mut queue, InputEvent::motion(1, 0));
        deliver(&mut queue, InputEvent::motion(2, 0));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dropped(), 1);
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<InputEvent> = Vec::new();
        deliver(&mut sink, InputEvent::motion(5, -3));
        assert_eq!(sink, vec![InputEvent::motion(5, -3)]);
    }
}
