//! Action Event Queue
//!
//! This module carries the logical side of the binding system: when a bound
//! physical input fires, the mapper raises a typed action event here for the
//! application to consume. The queue is double-buffered so event order never
//! depends on where in the frame a system runs.
//!
//! # Design Principles
//!
//! - **Type Safety**: All events are strongly typed via the `ActionEvent` enum
//! - **Double Buffering**: Events are frame-consistent (no mid-frame mutations)
//! - **Simplicity**: No pub/sub machinery - just push and iterate
//!
//! # Example
//!
//! ```ignore
//! // Each frame, after feeding raw input and calling mapper.update():
//! for event in mapper.events() {
//!     match event {
//!         ActionEvent::Pressed { action } if action == "jump" => player.jump(),
//!         _ => {}
//!     }
//! }
//! ```

use std::collections::VecDeque;

// ============================================================================
// Event Types
// ============================================================================

/// Logical events raised by the mapper.
///
/// Events name the action, never the physical input that caused it; the
/// application reacts to "jump", not to the space bar.
///
/// # Extensibility
///
/// The `#[non_exhaustive]` attribute allows adding new variants without
/// breaking downstream code that uses wildcard patterns.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ActionEvent {
    /// A press-edge action fired.
    Pressed {
        /// The logical action name
        action: String,
    },

    /// A release-edge action fired.
    Released {
        /// The logical action name
        action: String,
    },

    /// A held action's value crossed between zero and non-zero.
    ///
    /// `value` is the value at the transition: the new magnitude on
    /// activation, `0.0` on deactivation. Analog changes while the action
    /// stays active do not raise events; poll the mapper for those.
    HeldChanged {
        /// The logical action name
        action: String,
        /// The held value at the transition
        value: f32,
    },

    /// An action's binding changed through the interactive rebind flow or a
    /// profile application.
    ///
    /// This is the application's cue to refresh any controls UI and to
    /// persist the current mapping snapshot.
    BindingChanged {
        /// The affected action name
        action: String,
    },
}

impl ActionEvent {
    /// The action name this event refers to.
    pub fn action(&self) -> &str {
        match self {
            ActionEvent::Pressed { action }
            | ActionEvent::Released { action }
            | ActionEvent::HeldChanged { action, .. }
            | ActionEvent::BindingChanged { action } => action,
        }
    }
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered queue of action events.
///
/// Events pushed during frame N become visible during frame N+1, after the
/// frame-boundary [`ActionQueue::swap`]. This keeps every consumer seeing
/// the same events in the same frame regardless of update order.
#[derive(Debug)]
pub struct ActionQueue {
    /// Events being written this frame
    pending: VecDeque<ActionEvent>,
    /// Events from the previous frame, ready for processing
    processing: VecDeque<ActionEvent>,
}

impl ActionQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new queue with the given initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next frame.
    #[inline]
    pub fn push(&mut self, event: ActionEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Called once per frame by the mapper's update. After swapping,
    /// `iter()` returns the previous frame's events and `push()` writes to a
    /// fresh pending queue.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over the previous frame's events.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ActionEvent> {
        self.processing.iter()
    }

    /// Drain the previous frame's events, taking ownership.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = ActionEvent> + '_ {
        self.processing.drain(..)
    }

    /// Whether there are no events ready for processing.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Number of events queued for the next frame.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events, both pending and processing.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(action: &str) -> ActionEvent {
        ActionEvent::Pressed {
            action: action.to_string(),
        }
    }

    #[test]
    fn test_push_and_swap() {
        let mut queue = ActionQueue::new();

        queue.push(pressed("jump"));
        assert!(queue.is_empty(), "events should not be visible before swap");

        queue.swap();
        assert_eq!(queue.len(), 1);

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events[0].action(), "jump");
    }

    #[test]
    fn test_double_buffer_isolation() {
        let mut queue = ActionQueue::new();

        // Frame 1: push A
        queue.push(pressed("a"));
        queue.swap();

        // Frame 2: push B while A is being processed
        queue.push(pressed("b"));

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action(), "a");

        // Frame 3: now we see B
        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action(), "b");
    }

    #[test]
    fn test_drain_consumes() {
        let mut queue = ActionQueue::new();
        queue.push(pressed("a"));
        queue.push(ActionEvent::Released {
            action: "a".to_string(),
        });
        queue.swap();

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events.len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_drops_both_buffers() {
        let mut queue = ActionQueue::new();
        queue.push(pressed("a"));
        queue.swap();
        queue.push(pressed("b"));

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_held_changed_carries_value() {
        let event = ActionEvent::HeldChanged {
            action: "thrust".to_string(),
            value: 0.8,
        };
        if let ActionEvent::HeldChanged { value, .. } = event {
            assert!((value - 0.8).abs() < f32::EPSILON);
        } else {
            panic!("wrong event type");
        }
    }
}
