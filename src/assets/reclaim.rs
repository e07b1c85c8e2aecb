//! Deferred reclaim queues
//!
//! Destruction of an entity whose count reaches zero is delayed until the
//! next registry update. A release followed by a re-acquire within the same
//! tick cancels the pending entry, so the churn never reaches the engine.
//!
//! Per tracked item:
//!
//! ```text
//! Live --count reaches 0--> PendingReclaim --update()--> Reclaimed
//!   ^                            |
//!   +------re-acquire (cancel)---+
//! ```
//!
//! The queue only holds candidates. The registry decides at sweep time
//! whether a candidate is still at zero and performs the actual teardown.
//!
//! # Performance Characteristics
//!
//! | Operation             | Cost                          |
//! |-----------------------|-------------------------------|
//! | `push` / `remove`     | O(1)                          |
//! | `contains` / `state`  | O(1)                          |
//! | `take`                | O(pushes since the last take) |

use std::hash::Hash;

use rustc_hash::FxHashSet;

/// Lifecycle state of a tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimState {
    /// Referenced, or unreferenced without a pending reclaim
    Live,
    /// Waiting for the next sweep
    PendingReclaim,
}

/// Pending set of reclaim candidates, swept once per tick
#[derive(Debug)]
pub struct ReclaimQueue<T> {
    /// Candidates in first-queued order; may hold removed or repeated entries
    order: Vec<T>,
    /// Candidates actually pending
    pending: FxHashSet<T>,
}

impl<T: Eq + Hash + Clone> ReclaimQueue<T> {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            pending: FxHashSet::default(),
        }
    }

    /// Queue a candidate unless it is already pending.
    ///
    /// Returns `true` if the candidate was added.
    pub fn push(&mut self, item: T) -> bool {
        if !self.pending.insert(item.clone()) {
            return false;
        }
        self.order.push(item);
        true
    }

    /// Remove a pending candidate, returning it to `Live`.
    ///
    /// Returns `true` if the candidate was pending.
    pub fn remove(&mut self, item: &T) -> bool {
        self.pending.remove(item)
    }

    /// Take every pending candidate for sweeping, in the order they were
    /// first queued.
    ///
    /// Candidates pushed while the returned batch is processed stay queued
    /// for the next sweep.
    pub fn take(&mut self) -> Vec<T> {
        let mut pending = std::mem::take(&mut self.pending);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter(|item| pending.remove(item))
            .collect()
    }

    /// Drop every pending candidate without sweeping
    pub fn clear(&mut self) {
        self.order.clear();
        self.pending.clear();
    }

    /// Number of pending candidates
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Check if a candidate is pending
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.pending.contains(item)
    }

    /// State of a candidate as seen by this queue
    #[must_use]
    pub fn state(&self, item: &T) -> ReclaimState {
        if self.contains(item) {
            ReclaimState::PendingReclaim
        } else {
            ReclaimState::Live
        }
    }
}

impl<T: Eq + Hash + Clone> Default for ReclaimQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
