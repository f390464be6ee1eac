//! Per-view state guarded by a request sequence.
//!
//! Every load takes a [`Ticket`] before it starts. When it finishes, its
//! result is applied only if no newer load has started since, so a slow
//! response for an old time range cannot overwrite a newer one.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one load of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Monotonically increasing ticket counter.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    /// Issues a new ticket, superseding all earlier ones.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns `true` if `ticket` is the most recently issued one.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// The current value of a view plus the sequence guarding it.
#[derive(Debug)]
pub struct ViewState<T> {
    sequence: RequestSequence,
    current: RwLock<Option<T>>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            sequence: RequestSequence::default(),
            current: RwLock::new(None),
        }
    }
}

impl<T: Clone> ViewState<T> {
    /// Starts a load.
    pub fn begin(&self) -> Ticket {
        self.sequence.issue()
    }

    /// Stores `value` if `ticket` is still current. Returns whether it was
    /// applied.
    pub fn apply(&self, ticket: Ticket, value: T) -> bool {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Checked under the write lock so a newer load cannot slip in
        // between the check and the store.
        if !self.sequence.is_current(ticket) {
            log::debug!("Discarding stale response for ticket {ticket:?}");
            return false;
        }
        *current = Some(value);
        true
    }

    /// Returns a copy of the current value, if any load has completed.
    pub fn get(&self) -> Option<T> {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Mutates the current value in place, regardless of sequence. Used by
    /// user actions (such as resolving an alert) that patch loaded data.
    /// Returns `None` if nothing has been loaded yet.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_mut()
            .map(f)
    }
}
