#![forbid(unsafe_code)]

//! Scoped release of side effects with global reach.
//!
//! Document-level listeners, observers and style overrides are registered
//! through a [`TeardownScope`]. Release actions run in reverse registration
//! order when the scope is closed or dropped, so a setup routine that fails
//! halfway (`?` out of [`TeardownScope::build`]) still removes whatever it
//! had already installed.

use std::fmt;

type Action = Box<dyn FnOnce()>;

/// Ordered collection of release actions.
#[derive(Default)]
pub struct TeardownScope {
    actions: Vec<(&'static str, Action)>,
}

impl fmt::Debug for TeardownScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.actions.iter().map(|(label, _)| label))
            .finish()
    }
}

impl TeardownScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a setup routine inside a fresh scope.
    ///
    /// On success the caller receives the scope and owns the release. On
    /// error the partially built scope is dropped here, releasing everything
    /// registered so far, and the error is returned.
    pub fn build<T, E>(
        setup: impl FnOnce(&mut TeardownScope) -> Result<T, E>,
    ) -> Result<(T, TeardownScope), E> {
        let mut scope = TeardownScope::new();
        let value = setup(&mut scope)?;
        Ok((value, scope))
    }

    /// Register a release action.
    pub fn defer(&mut self, label: &'static str, action: impl FnOnce() + 'static) {
        self.actions.push((label, Box::new(action)));
    }

    /// Move every action of `other` into this scope, after the existing ones.
    pub fn absorb(&mut self, mut other: TeardownScope) {
        self.actions.append(&mut other.actions);
    }

    /// Run all release actions now, newest first.
    pub fn close(&mut self) {
        if self.actions.is_empty() {
            return;
        }
        tracing::debug!(count = self.actions.len(), "releasing scoped registrations");
        while let Some((label, action)) = self.actions.pop() {
            tracing::trace!(label, "release");
            action();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Drop for TeardownScope {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &'static str| {
            let sink = Rc::clone(&sink);
            Box::new(move || sink.borrow_mut().push(name)) as Box<dyn FnOnce()>
        };
        (log, make)
    }

    #[test]
    fn releases_in_reverse_order_on_drop() {
        let (log, make) = recorder();
        {
            let mut scope = TeardownScope::new();
            scope.defer("keydown", make("keydown"));
            scope.defer("wheel", make("wheel"));
            scope.defer("observer", make("observer"));
        }
        assert_eq!(*log.borrow(), vec!["observer", "wheel", "keydown"]);
    }

    #[test]
    fn close_is_idempotent() {
        let (log, make) = recorder();
        let mut scope = TeardownScope::new();
        scope.defer("a", make("a"));
        scope.close();
        scope.close();
        drop(scope);
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn failed_setup_releases_partial_registrations() {
        let (log, make) = recorder();
        let result: Result<((), TeardownScope), &str> = TeardownScope::build(|scope| {
            scope.defer("page-load", make("page-load"));
            scope.defer("keydown", make("keydown"));
            Err("observer construction failed")
        });
        assert!(result.is_err());
        assert_eq!(*log.borrow(), vec!["keydown", "page-load"]);
    }

    #[test]
    fn successful_setup_hands_scope_to_caller() {
        let (log, make) = recorder();
        let (value, scope) = TeardownScope::build(|scope| {
            scope.defer("wheel", make("wheel"));
            Ok::<_, ()>(42)
        })
        .expect("setup succeeds");
        assert_eq!(value, 42);
        assert!(log.borrow().is_empty());
        assert_eq!(scope.len(), 1);
        drop(scope);
        assert_eq!(*log.borrow(), vec!["wheel"]);
    }

    #[test]
    fn absorb_keeps_release_order() {
        let (log, make) = recorder();
        let mut outer = TeardownScope::new();
        outer.defer("outer", make("outer"));
        let mut inner = TeardownScope::new();
        inner.defer("inner", make("inner"));
        outer.absorb(inner);
        drop(outer);
        assert_eq!(*log.borrow(), vec!["inner", "outer"]);
    }
}
