//! Callback Group - de-duplicated multi-subscriber notification.
//!
//! The foundation for [`crate::signal`] and for ref unmount hooks. A
//! [`Callbacks`] group holds an ordered list of subscribers and notifies
//! them in subscription order. Adding the same `Rc` callback twice is a
//! no-op (the group is a set keyed by callback identity), and the
//! [`Subscription`] returned from `add` is idempotent: unsubscribing twice
//! does nothing the second time.
//!
//! Notification snapshots the subscriber list first, so a listener may
//! subscribe or unsubscribe reentrantly without disturbing the current
//! emission.
//!
//! # Example
//!
//! ```ignore
//! use refdom::callbacks::Callbacks;
//!
//! let group: Callbacks<i32> = Callbacks::new();
//! let sub = group.add_fn(|value| println!("got {value}"));
//! group.emit(&1);
//! sub.unsubscribe();
//! sub.unsubscribe(); // no-op
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

// =============================================================================
// Callback Group
// =============================================================================

struct Entry<T> {
    token: u64,
    callback: Rc<dyn Fn(&T)>,
}

struct Registry<T> {
    entries: Vec<Entry<T>>,
    next_token: u64,
}

/// Ordered, de-duplicated group of `Fn(&T)` subscribers.
pub struct Callbacks<T> {
    inner: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for Callbacks<T> {
    fn clone(&self) -> Self {
        Callbacks {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Default for Callbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Callbacks<T> {
    /// Create an empty group.
    pub fn new() -> Self {
        Callbacks {
            inner: Rc::new(RefCell::new(Registry {
                entries: Vec::new(),
                next_token: 0,
            })),
        }
    }

    /// Add a subscriber. If this exact `Rc` is already subscribed the
    /// existing entry is reused. Returns a [`Subscription`] that removes
    /// the entry.
    pub fn add(&self, callback: Rc<dyn Fn(&T)>) -> Subscription {
        let token = {
            let mut registry = self.inner.borrow_mut();
            let existing = registry
                .entries
                .iter()
                .find(|entry| Rc::ptr_eq(&entry.callback, &callback))
                .map(|entry| entry.token);
            match existing {
                Some(token) => token,
                None => {
                    let token = registry.next_token;
                    registry.next_token += 1;
                    registry.entries.push(Entry { token, callback });
                    token
                }
            }
        };

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || remove_token(&weak, token))
    }

    /// Convenience wrapper around [`Callbacks::add`] for plain closures.
    pub fn add_fn(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.add(Rc::new(callback))
    }

    /// Notify all subscribers in subscription order.
    pub fn emit(&self, value: &T) {
        // Snapshot so listeners can (un)subscribe while we iterate.
        let snapshot: Vec<Rc<dyn Fn(&T)>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|entry| entry.callback.clone())
            .collect();
        for callback in snapshot {
            callback(value);
        }
    }

    /// Number of current subscribers.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// True when no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn remove_token<T>(registry: &Weak<RefCell<Registry<T>>>, token: u64) {
    if let Some(registry) = registry.upgrade() {
        registry
            .borrow_mut()
            .entries
            .retain(|entry| entry.token != token);
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Handle returned from [`Callbacks::add`].
///
/// Dropping a `Subscription` does *not* unsubscribe - removal is always
/// explicit, matching the runtime's no-implicit-disposal policy.
pub struct Subscription {
    cancel: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Subscription {
            cancel: Cell::new(Some(Box::new(cancel))),
        }
    }

    /// Remove the subscriber. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
