//! Explicit observer registration and notification.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;

/// Handle returned by [`ObserverList::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the raw ID.
    pub fn id(&self) -> u64 {
        self.0
    }
}

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A list of callbacks fired in subscription order.
pub struct ObserverList<E> {
    next_id: AtomicU64,
    observers: Mutex<IndexMap<SubscriptionId, Callback<E>>>,
}

impl<E> ObserverList<E> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            observers: Mutex::new(IndexMap::new()),
        }
    }

    /// Register a callback.
    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().insert(id, Arc::new(callback));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.lock().shift_remove(&id).is_some()
    }

    /// Call every registered callback with `event`.
    ///
    /// Callbacks run outside the registry lock, so they may subscribe or
    /// unsubscribe; such changes take effect from the next fire.
    pub fn fire(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = self.observers.lock().values().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    /// Check if no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.observers.lock().is_empty()
    }
}

impl<E> Default for ObserverList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for ObserverList<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.len())
            .finish()
    }
}
