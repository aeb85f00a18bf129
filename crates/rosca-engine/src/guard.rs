//! Per-circle mutual exclusion for state-mutating operations.
//!
//! `deposit`, `withdraw` and `decommission` hold a [`CircleGuard`] from
//! their first check until the external transfer has returned. While it is
//! held:
//! - the same thread re-entering the same circle (a token callback, say)
//!   is rejected with [`RoscaError::ReentrantCall`];
//! - other threads touching the same circle wait their turn.
//!
//! The guard is released on drop, so every exit path (including `?`)
//! frees the circle.

use std::{
    collections::HashMap,
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, ThreadId},
};

use rosca_types::{CircleId, Result, RoscaError};

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    busy: Mutex<HashMap<CircleId, ThreadId>>,
    released: Condvar,
}

impl ReentrancyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the circle, waiting for other threads if needed.
    ///
    /// # Errors
    /// `ReentrantCall` if the calling thread already holds this circle.
    pub fn acquire(&self, circle_id: CircleId) -> Result<CircleGuard<'_>> {
        let me = thread::current().id();
        let mut busy = self.lock();
        loop {
            match busy.get(&circle_id) {
                None => {
                    busy.insert(circle_id, me);
                    return Ok(CircleGuard {
                        owner: self,
                        circle_id,
                    });
                }
                Some(holder) if *holder == me => {
                    tracing::warn!(circle = %circle_id, "Re-entrant call rejected");
                    return Err(RoscaError::ReentrantCall(circle_id));
                }
                Some(_) => {
                    busy = self
                        .released
                        .wait(busy)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    #[must_use]
    pub fn is_held(&self, circle_id: CircleId) -> bool {
        self.lock().contains_key(&circle_id)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CircleId, ThreadId>> {
        self.busy.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, circle_id: CircleId) {
        self.lock().remove(&circle_id);
        self.released.notify_all();
    }
}

/// Scoped hold on one circle. Dropping it releases the circle.
#[derive(Debug)]
pub struct CircleGuard<'a> {
    owner: &'a ReentrancyGuard,
    circle_id: CircleId,
}

impl CircleGuard<'_> {
    #[must_use]
    pub fn circle_id(&self) -> CircleId {
        self.circle_id
    }
}

impl Drop for CircleGuard<'_> {
    fn drop(&mut self) {
        self.owner.release(self.circle_id);
    }
}
