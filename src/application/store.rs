//! Single source of truth for dashboard state.
//!
//! Writes replace one property at a time. An effective write queues a
//! notification job for its property unless one is already queued; jobs
//! drain FIFO and read the property's value at delivery time, so listeners
//! may read or write the store freely and every listener of a property ends
//! up observing that property's final value.

use super::subscriptions::{Listener, Subscription, SubscriptionRegistry};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::Symbol;
use crate::domain::state::{AppState, KeyedProperty, Property, StoreProperty};
use crate::log_trace;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

type Notification = Box<dyn FnOnce(&Store)>;

#[derive(Default)]
struct StoreInner {
    state: RefCell<AppState>,
    registry: SubscriptionRegistry,
    pending: RefCell<VecDeque<Notification>>,
    /// Properties with a job in `pending`.
    queued: RefCell<HashSet<Property>>,
    /// Non-zero while a drain or a batch is in progress.
    holds: Cell<u32>,
}

/// Cheaply cloneable handle; clones share the same state and listeners.
#[derive(Clone, Default)]
pub struct Store {
    inner: Rc<StoreInner>,
}

struct Hold<'a>(&'a Cell<u32>);

impl<'a> Hold<'a> {
    fn acquire(holds: &'a Cell<u32>) -> Self {
        holds.set(holds.get() + 1);
        Self(holds)
    }
}

impl Drop for Hold<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `P`, cloned out of the store.
    pub fn get<P: StoreProperty>(&self) -> P::Value {
        P::read(&self.inner.state.borrow()).clone()
    }

    /// Borrowing read. `f` must not write to the store.
    pub fn with<P: StoreProperty, R>(&self, f: impl FnOnce(&P::Value) -> R) -> R {
        f(P::read(&self.inner.state.borrow()))
    }

    /// Borrowing read across properties. `f` must not write to the store.
    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    pub fn get_entry<P: KeyedProperty>(&self, key: &Symbol) -> Option<P::Entry> {
        P::entry(P::read(&self.inner.state.borrow()), key).cloned()
    }

    /// Deep copy of every property, independent of later writes.
    pub fn snapshot(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    /// Replaces `P` and notifies its listeners. Writing a value equal to the
    /// current one is a no-op; returns whether the value changed.
    pub fn set<P: StoreProperty>(&self, value: P::Value) -> bool {
        let previous = {
            let mut state = self.inner.state.borrow_mut();
            let slot = P::slot(&mut state);
            if *slot == value {
                return false;
            }
            std::mem::replace(slot, value)
        };
        log_trace!(LogComponent::Store("set"), "✏️ {} updated", P::ID);
        // A queued job already holds the older previous value.
        if self.inner.queued.borrow_mut().insert(P::ID) {
            self.inner.pending.borrow_mut().push_back(Box::new(move |store: &Store| {
                store.inner.queued.borrow_mut().remove(&P::ID);
                store.deliver::<P>(&previous);
            }));
        }
        self.flush();
        true
    }

    /// Clone-modify-write of `P`.
    pub fn update<P: StoreProperty>(&self, f: impl FnOnce(&mut P::Value)) -> bool {
        let mut value = self.get::<P>();
        f(&mut value);
        self.set::<P>(value)
    }

    /// Writes one entry of a keyed property, `None` removes it.
    pub fn set_entry<P: KeyedProperty>(&self, key: Symbol, entry: Option<P::Entry>) -> bool {
        self.update::<P>(|value| P::put_entry(value, key, entry))
    }

    /// Runs several writes and delivers their notifications afterwards, so
    /// listeners of any property written inside `f` observe all of them.
    pub fn batch<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        let result = {
            let _hold = Hold::acquire(&self.inner.holds);
            f(self)
        };
        self.flush();
        result
    }

    /// Registers `listener` for every effective change of `P`.
    pub fn subscribe<P: StoreProperty>(&self, listener: impl Fn(&P::Value) + 'static) -> Subscription {
        let erased: Listener = Rc::new(move |_previous: &dyn Any, current: &dyn Any| {
            if let Some(value) = current.downcast_ref::<P::Value>() {
                listener(value);
            }
        });
        self.inner.registry.register(P::ID, erased)
    }

    /// Registers `listener` for changes of the single entry `key` of `P`.
    /// Writes that leave that entry untouched do not reach it.
    pub fn subscribe_key<P: KeyedProperty>(
        &self,
        key: Symbol,
        listener: impl Fn(Option<&P::Entry>) + 'static,
    ) -> Subscription {
        let erased: Listener = Rc::new(move |previous: &dyn Any, current: &dyn Any| {
            let (Some(previous), Some(current)) =
                (previous.downcast_ref::<P::Value>(), current.downcast_ref::<P::Value>())
            else {
                return;
            };
            let after = P::entry(current, &key);
            if P::entry(previous, &key) != after {
                listener(after);
            }
        });
        self.inner.registry.register(P::ID, erased)
    }

    pub fn listener_count<P: StoreProperty>(&self) -> usize {
        self.inner.registry.listener_count(P::ID)
    }

    fn flush(&self) {
        if self.inner.holds.get() > 0 {
            return;
        }
        let _hold = Hold::acquire(&self.inner.holds);
        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            match next {
                Some(job) => job(self),
                None => break,
            }
        }
    }

    fn deliver<P: StoreProperty>(&self, previous: &P::Value) {
        let current = self.get::<P>();
        if *previous == current {
            return;
        }
        for (id, listener) in self.inner.registry.listeners(P::ID) {
            // Skip listeners removed by an earlier listener in this round.
            if self.inner.registry.is_registered(P::ID, id) {
                listener(previous, &current);
            }
        }
    }
}
