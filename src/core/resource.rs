use super::error::SimError;
use log::{trace, warn};
use std::collections::VecDeque;

/// Result of a slot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Granted,
    /// Appended to the wait-queue; `position` is 0 for the head.
    Queued { position: usize },
}

/// Point-in-time view of a pool, used by samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub queue_length: usize,
    pub in_use: usize,
    pub capacity: usize,
    pub total_capacity: usize,
}

/// Capacity-limited pool of interchangeable slots.
///
/// Waiters are tokens of type `T` kept in a FIFO. Every operation that can free a slot
/// returns the tokens it granted, so the caller decides how the waiter resumes. The pool
/// itself knows nothing about time or the scheduler.
///
/// Lowering `capacity` never revokes held slots: `in_use` may stay above `capacity` until
/// enough holders release.
#[derive(Debug, Clone)]
pub struct ResourcePool<T> {
    name: String,
    capacity: usize,
    total_capacity: usize,
    in_use: usize,
    waiting: VecDeque<T>,
    total_grants: u64,
}

impl<T> ResourcePool<T> {
    pub fn new(name: impl Into<String>, capacity: usize, total_capacity: usize) -> Result<Self, SimError> {
        let name = name.into();
        if capacity > total_capacity {
            return Err(SimError::CapacityExceedsTotal {
                pool: name,
                requested: capacity,
                total: total_capacity,
            });
        }

        Ok(Self {
            name,
            capacity,
            total_capacity,
            in_use: 0,
            waiting: VecDeque::new(),
            total_grants: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_capacity(&self) -> usize {
        self.total_capacity
    }

    pub fn in_use(&self) -> usize {
        self.in_use
    }

    pub fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    /// Waiters in grant order
    pub fn waiting(&self) -> impl Iterator<Item = &T> {
        self.waiting.iter()
    }

    /// Number of slots handed out since creation
    pub fn total_grants(&self) -> u64 {
        self.total_grants
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            queue_length: self.waiting.len(),
            in_use: self.in_use,
            capacity: self.capacity,
            total_capacity: self.total_capacity,
        }
    }

    /// Take a slot if one is free, otherwise join the back of the wait-queue.
    pub fn request(&mut self, token: T) -> RequestOutcome {
        if self.in_use < self.capacity {
            self.in_use += 1;
            self.total_grants += 1;
            RequestOutcome::Granted
        } else {
            self.waiting.push_back(token);
            RequestOutcome::Queued {
                position: self.waiting.len() - 1,
            }
        }
    }

    /// Give back a slot. If a waiter can take it, it is granted in the same call and
    /// returned; it never re-enters the queue.
    pub fn release(&mut self) -> Result<Option<T>, SimError> {
        if self.in_use == 0 {
            return Err(SimError::ReleaseWithoutHold {
                pool: self.name.clone(),
            });
        }

        self.in_use -= 1;
        Ok(self.grant_next())
    }

    /// Change staffing. Raising it runs one grant check per added unit; lowering it
    /// leaves held slots alone.
    pub fn set_capacity(&mut self, new_capacity: usize) -> Result<Vec<T>, SimError> {
        if new_capacity > self.total_capacity {
            return Err(SimError::CapacityExceedsTotal {
                pool: self.name.clone(),
                requested: new_capacity,
                total: self.total_capacity,
            });
        }

        let old_capacity = self.capacity;
        self.capacity = new_capacity;

        if new_capacity < self.in_use {
            warn!(
                "[{}] capacity lowered to {} while {} slots are held; no slot is revoked",
                self.name, new_capacity, self.in_use
            );
        }

        let mut granted = Vec::new();
        for _ in old_capacity..new_capacity {
            if let Some(token) = self.grant_next() {
                granted.push(token);
            }
        }
        Ok(granted)
    }

    /// Change the hard ceiling. Refuses to go below current staffing or the slots
    /// currently held.
    pub fn set_total_capacity(&mut self, new_total: usize) -> Result<(), SimError> {
        // slots held through a capacity cut still count against the ceiling
        if new_total < self.capacity.max(self.in_use) {
            return Err(SimError::TotalBelowCapacity {
                pool: self.name.clone(),
                requested: new_total,
                capacity: self.capacity,
                in_use: self.in_use,
            });
        }

        self.total_capacity = new_total;
        Ok(())
    }

    fn grant_next(&mut self) -> Option<T> {
        if self.in_use >= self.capacity {
            return None;
        }

        let token = self.waiting.pop_front()?;
        self.in_use += 1;
        self.total_grants += 1;
        trace!("[{}] granted waiting request ({} still queued)", self.name, self.waiting.len());
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(capacity: usize, total: usize) -> ResourcePool<u32> {
        ResourcePool::new("test", capacity, total).unwrap()
    }

    #[test]
    fn test_request_grants_until_full_then_queues() {
        let mut p = pool(2, 2);
        assert_eq!(p.request(1), RequestOutcome::Granted);
        assert_eq!(p.request(2), RequestOutcome::Granted);
        assert_eq!(p.request(3), RequestOutcome::Queued { position: 0 });
        assert_eq!(p.request(4), RequestOutcome::Queued { position: 1 });
        assert_eq!(p.in_use(), 2);
        assert_eq!(p.queue_len(), 2);
    }

    #[test]
    fn test_release_hands_slot_to_head_of_queue() {
        let mut p = pool(1, 1);
        p.request(1);
        p.request(2);
        p.request(3);

        assert_eq!(p.release().unwrap(), Some(2));
        assert_eq!(p.in_use(), 1);
        assert_eq!(p.waiting().copied().collect::<Vec<_>>(), vec![3]);

        // a newcomer cannot jump ahead of the queue once the slot is re-granted
        assert_eq!(p.request(4), RequestOutcome::Queued { position: 1 });
        assert_eq!(p.release().unwrap(), Some(3));
        assert_eq!(p.release().unwrap(), Some(4));
        assert_eq!(p.release().unwrap(), None);
        assert_eq!(p.in_use(), 0);
        assert_eq!(p.total_grants(), 4);
    }

    #[test]
    fn test_release_without_hold_fails() {
        let mut p = pool(1, 1);
        assert_eq!(
            p.release(),
            Err(SimError::ReleaseWithoutHold { pool: "test".to_string() })
        );
    }

    #[test]
    fn test_capacity_increase_grants_waiters() {
        let mut p = pool(1, 4);
        p.request(1);
        p.request(2);
        p.request(3);
        p.request(4);

        let granted = p.set_capacity(3).unwrap();
        assert_eq!(granted, vec![2, 3]);
        assert_eq!(p.in_use(), 3);
        assert_eq!(p.queue_len(), 1);
    }

    #[test]
    fn test_capacity_decrease_keeps_held_slots() {
        let mut p = pool(3, 3);
        p.request(1);
        p.request(2);
        p.request(3);
        p.request(4);

        assert!(p.set_capacity(1).unwrap().is_empty());
        assert_eq!(p.in_use(), 3);
        assert_eq!(p.capacity(), 1);

        // released slots are not replaced while in_use is above capacity
        assert_eq!(p.release().unwrap(), None);
        assert_eq!(p.release().unwrap(), None);
        assert_eq!(p.in_use(), 1);
        assert_eq!(p.release().unwrap(), Some(4));
        assert_eq!(p.in_use(), 1);
    }

    #[test]
    fn test_increase_inside_decrease_window_only_grants_real_free_slots() {
        let mut p = pool(3, 4);
        p.request(1);
        p.request(2);
        p.request(3);
        p.request(4);
        p.set_capacity(1).unwrap();

        // capacity 2 is still below in_use 3
        assert!(p.set_capacity(2).unwrap().is_empty());
        assert_eq!(p.set_capacity(4).unwrap(), vec![4]);
        assert_eq!(p.in_use(), 4);
    }

    #[test]
    fn test_capacity_exceeds_total_rejected_without_mutation() {
        let mut p = pool(2, 3);
        let err = p.set_capacity(4).unwrap_err();
        assert_eq!(
            err,
            SimError::CapacityExceedsTotal {
                pool: "test".to_string(),
                requested: 4,
                total: 3
            }
        );
        assert_eq!(p.capacity(), 2);
    }

    #[test]
    fn test_total_capacity_changes() {
        let mut p = pool(2, 2);
        assert!(p.set_total_capacity(1).is_err());
        assert_eq!(p.total_capacity(), 2);

        p.set_total_capacity(5).unwrap();
        assert!(p.set_capacity(5).is_ok());
        assert!(matches!(
            p.set_capacity(6),
            Err(SimError::CapacityExceedsTotal { .. })
        ));
    }

    #[test]
    fn test_total_capacity_cannot_drop_below_held_slots() {
        let mut p = pool(3, 4);
        p.request(1);
        p.request(2);
        p.request(3);
        p.set_capacity(1).unwrap();

        assert_eq!(
            p.set_total_capacity(2),
            Err(SimError::TotalBelowCapacity {
                pool: "test".to_string(),
                requested: 2,
                capacity: 1,
                in_use: 3
            })
        );
        assert_eq!(p.total_capacity(), 4);

        p.set_total_capacity(3).unwrap();
        p.release().unwrap();
        p.release().unwrap();
        p.set_total_capacity(1).unwrap();
        assert_eq!((p.in_use(), p.total_capacity()), (1, 1));
    }

    #[test]
    fn test_new_rejects_capacity_over_total() {
        assert!(ResourcePool::<u32>::new("bad", 3, 2).is_err());
    }

    #[test]
    fn test_zero_capacity_queues_everything() {
        let mut p = pool(0, 1);
        assert_eq!(p.request(7), RequestOutcome::Queued { position: 0 });
        assert_eq!(p.set_capacity(1).unwrap(), vec![7]);
    }
}
