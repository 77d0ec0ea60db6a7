#![forbid(unsafe_code)]

//! Observable state with change notification.
//!
//! A [`Store`] owns one value. Components mutate it only through
//! [`set`](Store::set) or [`update`](Store::update); renderers register
//! callbacks with [`subscribe`](Store::subscribe) and are told about every
//! change. Writes that leave the value equal are not reported.

use std::fmt;

/// Identifies a subscriber so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

/// Single-threaded observable value.
pub struct Store<T> {
    value: T,
    version: u64,
    next_id: u64,
    subscribers: Vec<(SubscriberId, Callback<T>)>,
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.value)
            .field("version", &self.version)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<T: Default + PartialEq> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: PartialEq> Store<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value,
            version: 0,
            next_id: 1,
            subscribers: Vec::new(),
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Number of observed changes since creation.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Replace the value. Returns `true` and notifies if it changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.changed();
        true
    }

    /// Register a change callback. It is not invoked for the current value.
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Drop every subscriber.
    pub fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn changed(&mut self) {
        self.version += 1;
        for (_, callback) in &mut self.subscribers {
            callback(&self.value);
        }
    }
}

impl<T: PartialEq + Clone> Store<T> {
    /// Mutate in place. Returns `true` and notifies if the value changed.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> bool {
        let before = self.value.clone();
        f(&mut self.value);
        if before == self.value {
            return false;
        }
        self.changed();
        true
    }
}
