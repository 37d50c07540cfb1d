//! Virtual-clock queue for delayed engine actions.
//!
//! Entries fire in `(fire_at, insertion order)` order. Each entry is tagged
//! with the session epoch it was scheduled in; the engine drops entries from
//! an older epoch instead of running them.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Action {
    /// Add one target if the mode is still short of its target count
    Spawn,
    /// Drop a hit target after its exit window and refill missing slots
    RemoveHit { target_id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Scheduled {
    pub fire_at: u64,
    seq: u64,
    pub epoch: u64,
    pub action: Action,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, fire_at: u64, epoch: u64, action: Action) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            fire_at,
            seq,
            epoch,
            action,
        }));
    }

    /// Pop the earliest entry due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<Scheduled> {
        match self.queue.peek() {
            Some(Reverse(next)) if next.fire_at <= now => self.queue.pop().map(|Reverse(s)| s),
            _ => None,
        }
    }

    /// Push every pending entry back by `ms`, keeping relative order.
    pub fn shift(&mut self, ms: u64) {
        let shifted = std::mem::take(&mut self.queue)
            .into_iter()
            .map(|Reverse(mut s)| {
                s.fire_at += ms;
                Reverse(s)
            })
            .collect();
        self.queue = shifted;
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
