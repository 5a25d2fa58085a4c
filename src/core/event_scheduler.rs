use super::error::SimError;
use super::types::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct ScheduledEvent<E> {
    pub time: SimTime,
    pub sequence_num: u64,
    pub event: E,
}

impl<E> PartialEq for ScheduledEvent<E> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence_num == other.sequence_num
    }
}

impl<E> Eq for ScheduledEvent<E> {}

impl<E> PartialOrd for ScheduledEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for ScheduledEvent<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Owns the simulation clock and the queue of pending events.
///
/// Events at the same instant come out in the order they were scheduled.
pub struct EventScheduler<E> {
    event_queue: BinaryHeap<ScheduledEvent<E>>,
    sequence_counter: u64,
    now: SimTime,
}

impl<E> EventScheduler<E> {
    /// Create a new EventScheduler with the clock at zero
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
            now: SimTime::ZERO,
        }
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedule an event to execute `delay` time units from now
    pub fn schedule(&mut self, delay: f64, event: E) -> Result<SimTime, SimError> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(SimError::InvalidDelay { delay });
        }

        let time = self.now + delay;
        let scheduled_event = ScheduledEvent {
            time,
            sequence_num: self.sequence_counter,
            event,
        };

        self.event_queue.push(scheduled_event);
        self.sequence_counter += 1;
        Ok(time)
    }

    /// Pop the earliest event and move the clock to its time
    pub fn advance(&mut self) -> Option<(SimTime, E)> {
        let scheduled_event = self.event_queue.pop()?;
        self.now = scheduled_event.time;
        Some((scheduled_event.time, scheduled_event.event))
    }

    /// Move the clock forward without executing anything
    pub(crate) fn idle_until(&mut self, target: SimTime) {
        if target > self.now {
            self.now = target;
        }
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.event_queue.len()
    }

    /// Get the next event time without removing events
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|event| event.time)
    }
}

impl<E> Default for EventScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
