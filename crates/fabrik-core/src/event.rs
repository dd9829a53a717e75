//! Prioritized outcome reports and the shared queue they travel through.
//!
//! Systems push events from their worker threads; the supervisor (or any
//! other consumer) pops them. A single mutex serializes the whole queue --
//! it is the one structure in the plant with many writers and a reader.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::id::{ResourceId, SystemId};
use crate::resource::Status;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Urgency of an event. Supply failures outrank capacity pressure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Priority {
    Low,
    High,
}

/// One system's report of a cycle outcome.
///
/// Immutable, and moved into the queue by value: once pushed, the producer
/// shares no ownership with the queued copy. `amount` is the level of
/// `resource` sampled when the report was built, which may already be stale
/// by the time a consumer reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub system: SystemId,
    pub resource: ResourceId,
    pub status: Status,
    pub priority: Priority,
    pub amount: u32,
}

// ---------------------------------------------------------------------------
// EventQueue
// ---------------------------------------------------------------------------

/// Everything behind the one lock: a deque per priority band and the size
/// counter, which is kept in step with the deques on every mutation.
#[derive(Debug, Default)]
struct Bands {
    high: VecDeque<Event>,
    low: VecDeque<Event>,
    len: usize,
}

/// Thread-safe mailbox of events, ordered by priority.
///
/// A pushed event lands in front of every queued event whose priority does
/// not exceed its own. HIGH therefore drains entirely before LOW, and
/// *within* one band the queue behaves as a stack: the most recently pushed
/// event pops first. A consumer always sees the freshest report of a given
/// urgency, at the price of older reports waiting behind it in a busy band.
/// Intended behavior, pinned by the ordering tests below.
#[derive(Debug, Default)]
pub struct EventQueue {
    bands: Mutex<Bands>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event. The lock is held for the full mutation, size update
    /// included, so concurrent pushers can never lose an update.
    pub fn push(&self, event: Event) {
        let mut bands = self.bands.lock();
        match event.priority {
            Priority::High => bands.high.push_front(event),
            Priority::Low => bands.low.push_front(event),
        }
        bands.len += 1;
    }

    /// Remove the front event: highest priority first, most recent first
    /// within a band. Returns `None` on an empty queue without blocking and
    /// without touching the size.
    pub fn pop(&self) -> Option<Event> {
        let mut bands = self.bands.lock();
        let event = match bands.high.pop_front() {
            Some(event) => event,
            None => bands.low.pop_front()?,
        };
        bands.len -= 1;
        Some(event)
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.bands.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every queued event in pop order, holding the lock once.
    pub fn drain(&self) -> Vec<Event> {
        let mut bands = self.bands.lock();
        let Bands { high, low, len } = &mut *bands;
        *len = 0;
        high.drain(..).chain(low.drain(..)).collect()
    }

    /// Drop every queued event and reset the size to zero.
    pub fn clear(&self) {
        let mut bands = self.bands.lock();
        bands.high.clear();
        bands.low.clear();
        bands.len = 0;
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::report;

    #[test]
    fn new_queue_is_empty() {
        let queue = EventQueue::new();
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn size_tracks_pushes_and_pops() {
        let queue = EventQueue::new();
        for i in 1..=4 {
            queue.push(report(Priority::Low, i));
            assert_eq!(queue.len(), i as usize);
        }
        for i in (0..4).rev() {
            let _ = queue.pop();
            assert_eq!(queue.len(), i);
        }
    }

    #[test]
    fn pop_on_empty_does_not_mutate_size() {
        let queue = EventQueue::new();
        queue.push(report(Priority::High, 1));
        assert_eq!(queue.pop().map(|e| e.amount), Some(1));
        // Repeated pops on the now-empty queue stay at zero.
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn high_band_drains_before_low() {
        let queue = EventQueue::new();
        queue.push(report(Priority::Low, 1));
        queue.push(report(Priority::High, 2));
        queue.push(report(Priority::Low, 3));

        assert_eq!(queue.pop().map(|e| e.priority), Some(Priority::High));
        assert_eq!(queue.pop().map(|e| e.priority), Some(Priority::Low));
        assert_eq!(queue.pop().map(|e| e.priority), Some(Priority::Low));
    }

    #[test]
    fn within_a_band_newest_pops_first() {
        // Push order Low#1, High#1, Low#2, High#2; pop order is the high
        // band newest-first, then the low band newest-first.
        let queue = EventQueue::new();
        queue.push(report(Priority::Low, 1));
        queue.push(report(Priority::High, 1));
        queue.push(report(Priority::Low, 2));
        queue.push(report(Priority::High, 2));

        let popped: Vec<(Priority, u32)> = std::iter::from_fn(|| queue.pop())
            .map(|e| (e.priority, e.amount))
            .collect();
        assert_eq!(
            popped,
            vec![
                (Priority::High, 2),
                (Priority::High, 1),
                (Priority::Low, 2),
                (Priority::Low, 1),
            ]
        );
    }

    #[test]
    fn drain_returns_pop_order_and_empties() {
        let queue = EventQueue::new();
        queue.push(report(Priority::Low, 1));
        queue.push(report(Priority::High, 2));
        queue.push(report(Priority::High, 3));

        let drained = queue.drain();
        let amounts: Vec<u32> = drained.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![3, 2, 1]);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn clear_resets_size() {
        let queue = EventQueue::new();
        queue.push(report(Priority::High, 1));
        queue.push(report(Priority::Low, 2));
        queue.clear();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn priority_ordering_is_total() {
        assert!(Priority::High > Priority::Low);
    }
}
