//! Signals - push-based observable value cells.
//!
//! Two flavors share the same storage:
//!
//! - [`signal`] creates a mutable state cell: `get`/`set`/`update` (and
//!   `toggle` for booleans). Setting a value equal to the current one is a
//!   no-op and notifies nobody.
//! - [`store`] creates an action-reducer cell: `emit(action)` first notifies
//!   action subscribers with the *pre-reduction* value, then applies the
//!   reducer and notifies state subscribers with the result.
//!
//! Subscribing to state replays the current value immediately; action
//! subscribers never replay. All notification is synchronous, in
//! subscription order, built on [`crate::callbacks::Callbacks`]. There is no
//! implicit disposal: keep the [`Subscription`] and unsubscribe explicitly.
//!
//! # Example
//!
//! ```ignore
//! use refdom::signal::{signal, store};
//!
//! let count = signal(0);
//! let sub = count.on(|value| println!("count = {value}")); // prints 0
//! count.set(1);          // prints 1
//! count.set(1);          // identical value, silent
//! sub.unsubscribe();
//!
//! let cart = store(Vec::<String>::new(), |items, action: &String| {
//!     let mut next = items.clone();
//!     next.push(action.clone());
//!     next
//! });
//! cart.emit("apples".to_string());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::callbacks::{Callbacks, Subscription};

// =============================================================================
// State cell
// =============================================================================

struct SignalInner<T> {
    value: RefCell<T>,
    watchers: Callbacks<T>,
}

/// Observable state cell. Cheap to clone; clones share the same value.
pub struct Signal<T: Clone + PartialEq + 'static> {
    inner: Rc<SignalInner<T>>,
}

impl<T: Clone + PartialEq + 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Signal {
            inner: self.inner.clone(),
        }
    }
}

/// Create a state cell holding `value`.
pub fn signal<T: Clone + PartialEq + 'static>(value: T) -> Signal<T> {
    Signal {
        inner: Rc::new(SignalInner {
            value: RefCell::new(value),
            watchers: Callbacks::new(),
        }),
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Current value, no side effect.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Replace the value. Equal values short-circuit: no store, no
    /// notification.
    pub fn set(&self, value: T) {
        let changed = {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        };
        if changed {
            let current = self.get();
            self.inner.watchers.emit(&current);
        }
    }

    /// Replace the value with `updater(previous)`.
    pub fn update(&self, updater: impl FnOnce(&T) -> T) {
        let next = updater(&self.get());
        self.set(next);
    }

    /// Subscribe to state changes. The listener is invoked immediately with
    /// the current value, then once per distinct subsequent `set`.
    pub fn on(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<dyn Fn(&T)> = Rc::new(listener);
        callback(&self.get());
        self.inner.watchers.add(callback)
    }

    /// Number of state subscribers (diagnostics and tests).
    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.len()
    }
}

impl Signal<bool> {
    /// `set(!previous)`.
    pub fn toggle(&self) {
        self.update(|value| !value);
    }
}

// =============================================================================
// Action-reducer cell
// =============================================================================

struct StoreInner<T: Clone + PartialEq + 'static, A> {
    state: Signal<T>,
    actions: Callbacks<(T, A)>,
    reducer: Rc<dyn Fn(&T, &A) -> T>,
}

/// Observable cell driven by emitted actions through a pure reducer.
pub struct Store<T: Clone + PartialEq + 'static, A: 'static> {
    inner: Rc<StoreInner<T, A>>,
}

impl<T: Clone + PartialEq + 'static, A: 'static> Clone for Store<T, A> {
    fn clone(&self) -> Self {
        Store {
            inner: self.inner.clone(),
        }
    }
}

/// Create an action-reducer cell with `initial` state.
pub fn store<T, A>(initial: T, reducer: impl Fn(&T, &A) -> T + 'static) -> Store<T, A>
where
    T: Clone + PartialEq + 'static,
    A: 'static,
{
    Store {
        inner: Rc::new(StoreInner {
            state: signal(initial),
            actions: Callbacks::new(),
            reducer: Rc::new(reducer),
        }),
    }
}

impl<T: Clone + PartialEq + 'static, A: 'static> Store<T, A> {
    /// Current state, no side effect.
    pub fn get(&self) -> T {
        self.inner.state.get()
    }

    /// Emit an action: action subscribers observe `(current, action)` before
    /// the reducer runs, then state subscribers observe the reduced state.
    pub fn emit(&self, action: A) {
        let pair = (self.inner.state.get(), action);
        self.inner.actions.emit(&pair);
        let next = (self.inner.reducer)(&pair.0, &pair.1);
        self.inner.state.set(next);
    }

    /// Subscribe to state changes, with immediate replay of the current
    /// state.
    pub fn on_state(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.inner.state.on(listener)
    }

    /// Subscribe to actions. Listeners see the pre-reduction value and the
    /// action. Never replays on subscribe.
    pub fn on_action(&self, listener: impl Fn(&T, &A) + 'static) -> Subscription {
        self.inner
            .actions
            .add_fn(move |(value, action)| listener(value, action))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_on_replays_current_value() {
        let count = signal(7);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        count.on(move |value| seen_clone.borrow_mut().push(*value));

        assert_eq!(*seen.borrow(), vec![7], "subscribe replays current value");
    }

    #[test]
    fn test_set_notifies_once_per_distinct_value() {
        let count = signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        count.on(move |value| seen_clone.borrow_mut().push(*value));

        count.set(1);
        count.set(1); // identical, silent
        count.set(2);

        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_update_receives_previous_value() {
        let count = signal(10);
        count.update(|previous| previous + 5);
        assert_eq!(count.get(), 15);
    }

    #[test]
    fn test_toggle() {
        let flag = signal(false);
        flag.toggle();
        assert!(flag.get());
        flag.toggle();
        assert!(!flag.get());
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let count = signal(0);
        let fired = Rc::new(Cell::new(0));

        let fired_clone = fired.clone();
        let sub = count.on(move |_| fired_clone.set(fired_clone.get() + 1));
        assert_eq!(fired.get(), 1, "replay");

        sub.unsubscribe();
        count.set(1);
        assert_eq!(fired.get(), 1);
        assert_eq!(count.watcher_count(), 0);
    }

    #[test]
    fn test_notification_order_is_subscription_order() {
        let count = signal(0);
        let order = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = order.clone();
            count.on(move |_| order.borrow_mut().push(label));
        }
        order.borrow_mut().clear();

        count.set(1);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_store_action_sees_pre_reduction_value() {
        let counter = store(0, |state, action: &i32| state + action);
        let observed = Rc::new(RefCell::new(Vec::new()));

        let observed_clone = observed.clone();
        counter.on_action(move |value, action| {
            observed_clone.borrow_mut().push((*value, *action));
        });

        counter.emit(3);
        counter.emit(4);

        assert_eq!(
            *observed.borrow(),
            vec![(0, 3), (3, 4)],
            "action subscribers observe the value before reduction"
        );
        assert_eq!(counter.get(), 7);
    }

    #[test]
    fn test_store_state_sees_reduced_value() {
        let counter = store(1, |state, action: &i32| state * action);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        counter.on_state(move |value| seen_clone.borrow_mut().push(*value));

        counter.emit(5);
        assert_eq!(*seen.borrow(), vec![1, 5], "replay then reduced state");
    }

    #[test]
    fn test_store_action_subscribers_never_replay() {
        let counter = store(0, |state, action: &i32| state + action);
        let fired = Rc::new(Cell::new(0));

        let fired_clone = fired.clone();
        counter.on_action(move |_, _| fired_clone.set(fired_clone.get() + 1));

        assert_eq!(fired.get(), 0, "no replay for action subscribers");
    }

    #[test]
    fn test_store_equal_reduction_skips_state_notification() {
        let counter = store(5, |state, _action: &i32| *state);
        let fired = Rc::new(Cell::new(0));

        let fired_clone = fired.clone();
        counter.on_state(move |_| fired_clone.set(fired_clone.get() + 1));
        assert_eq!(fired.get(), 1, "replay");

        counter.emit(99);
        assert_eq!(fired.get(), 1, "identity reduction notifies nobody");
    }
}
