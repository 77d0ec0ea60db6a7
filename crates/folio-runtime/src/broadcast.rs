#![forbid(unsafe_code)]

//! Fire-once broadcast.
//!
//! A [`OneShot`] carries a single value from whoever completes an operation
//! to every [`Listener`] created from it, including listeners created after
//! the value arrived. Each listener observes the value exactly once. This is
//! how several inputs waiting on the same lazy load converge without each
//! holding a handle to the load itself.

use std::cell::RefCell;
use std::rc::Rc;

/// Sending side. Clones share the same slot.
#[derive(Debug)]
pub struct OneShot<T> {
    slot: Rc<RefCell<Option<T>>>,
}

impl<T> Clone for OneShot<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> Default for OneShot<T> {
    fn default() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }
}

impl<T: Clone> OneShot<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the value. Only the first call has an effect.
    pub fn fire(&self, value: T) -> bool {
        let mut slot = self.slot.borrow_mut();
        if slot.is_some() {
            tracing::trace!("one-shot already fired; ignoring");
            return false;
        }
        *slot = Some(value);
        true
    }

    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// The published value, if any.
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        self.slot.borrow().clone()
    }

    /// Create a listener that has not yet observed the value.
    #[must_use]
    pub fn listen(&self) -> Listener<T> {
        Listener {
            slot: Rc::clone(&self.slot),
            observed: false,
        }
    }
}

/// Receiving side.
#[derive(Debug)]
pub struct Listener<T> {
    slot: Rc<RefCell<Option<T>>>,
    observed: bool,
}

impl<T: Clone> Listener<T> {
    /// Take the value if it arrived and this listener has not seen it yet.
    pub fn try_recv(&mut self) -> Option<T> {
        if self.observed {
            return None;
        }
        let value = self.slot.borrow().clone()?;
        self.observed = true;
        Some(value)
    }

    /// Whether this listener already consumed the value.
    #[must_use]
    pub const fn has_observed(&self) -> bool {
        self.observed
    }
}
