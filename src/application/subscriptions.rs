//! Per-property listener sets.
//!
//! Listeners are type-erased here and typed again by [`Store`](super::store::Store);
//! each receives the value before and after a write so keyed listeners can
//! compare the one entry they care about.
//!
//! # Invariants
//!
//! 1. Listeners of a property are invoked in registration order.
//! 2. A listener removed during a notification cycle is not invoked for the
//!    remainder of that cycle.
//! 3. Dropping a [`Subscription`] removes its listener; a registry that has
//!    already been dropped makes the guard inert.

use crate::domain::state::Property;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Receives `(previous, current)` property values as `&dyn Any`.
pub type Listener = Rc<dyn Fn(&dyn Any, &dyn Any)>;

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    listeners: HashMap<Property, Vec<(u64, Listener)>>,
}

#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, property: Property, listener: Listener) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.entry(property).or_default().push((id, listener));
        Subscription { registry: Rc::downgrade(&self.inner), property, id }
    }

    /// Registration-ordered copy of the listeners, safe to call into while
    /// listeners subscribe or unsubscribe.
    pub fn listeners(&self, property: Property) -> Vec<(u64, Listener)> {
        self.inner
            .borrow()
            .listeners
            .get(&property)
            .map(|entries| entries.iter().map(|(id, l)| (*id, Rc::clone(l))).collect())
            .unwrap_or_default()
    }

    pub fn is_registered(&self, property: Property, id: u64) -> bool {
        self.inner
            .borrow()
            .listeners
            .get(&property)
            .is_some_and(|entries| entries.iter().any(|(entry_id, _)| *entry_id == id))
    }

    pub fn listener_count(&self, property: Property) -> usize {
        self.inner.borrow().listeners.get(&property).map_or(0, Vec::len)
    }
}

fn remove(inner: &RefCell<RegistryInner>, property: Property, id: u64) {
    let mut inner = inner.borrow_mut();
    if let Some(entries) = inner.listeners.get_mut(&property) {
        entries.retain(|(entry_id, _)| *entry_id != id);
        if entries.is_empty() {
            inner.listeners.remove(&property);
        }
    }
}

/// RAII guard for one registered listener.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<RefCell<RegistryInner>>,
    property: Property,
    id: u64,
}

impl Subscription {
    pub fn property(&self) -> Property {
        self.property
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            remove(&inner, self.property, self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("property", &self.property)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Listener {
        Rc::new(|_: &dyn Any, _: &dyn Any| {})
    }

    #[test]
    fn listeners_come_back_in_registration_order() {
        let registry = SubscriptionRegistry::new();
        let a = registry.register(Property::Watchlist, noop());
        let b = registry.register(Property::Watchlist, noop());
        let ids: Vec<u64> = registry.listeners(Property::Watchlist).iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
    }

    #[test]
    fn dropping_guard_unregisters() {
        let registry = SubscriptionRegistry::new();
        let sub = registry.register(Property::Trending, noop());
        let id = sub.id();
        assert!(registry.is_registered(Property::Trending, id));
        sub.unsubscribe();
        assert!(!registry.is_registered(Property::Trending, id));
        assert_eq!(registry.listener_count(Property::Trending), 0);
    }

    #[test]
    fn guard_outliving_registry_is_inert() {
        let registry = SubscriptionRegistry::new();
        let sub = registry.register(Property::Trades, noop());
        drop(registry);
        drop(sub);
    }
}
