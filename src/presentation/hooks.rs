//! Binds UI lifetimes to store properties.
//!
//! [`PropertyHook`] and [`KeyedPropertyHook`] are framework-free: they own a
//! [`Subscription`] and release it on drop, so teardown happens on every exit
//! path. The `use_*` functions wrap them into leptos signals whose lifetime
//! follows the reactive owner they are created under.

use crate::application::{Dashboard, Store, Subscription};
use crate::domain::errors::AppResult;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{
    Bar, MarketApi, Notification, PriceInfo, Stock, Symbol, Trade, TrendingList,
};
use crate::domain::state::{EmptySentinel, KeyedProperty, StoreProperty, props};
use crate::{log_debug, log_warn};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use leptos::{
    ReadSignal, SignalSet, create_effect, create_rw_signal, on_cleanup, spawn_local, untrack,
};
use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::rc::Rc;

/// A bootstrap action ready to be spawned; failures are logged.
pub type Bootstrap = LocalBoxFuture<'static, ()>;

/// Subscription to one whole property for the lifetime of a component.
pub struct PropertyHook<P: StoreProperty> {
    subscription: Option<Subscription>,
    _property: PhantomData<P>,
}

impl<P: StoreProperty> PropertyHook<P> {
    pub fn activate(store: &Store, on_change: impl Fn(&P::Value) + 'static) -> Self {
        Self { subscription: Some(store.subscribe::<P>(on_change)), _property: PhantomData }
    }

    /// Subscribes, then returns the bootstrap future unless the store
    /// already holds a non-empty value for `P`. The subscription is in place
    /// before the bootstrap runs, so its result is never missed.
    pub fn activate_with<F, Fut>(
        store: &Store,
        on_change: impl Fn(&P::Value) + 'static,
        bootstrap: F,
    ) -> (Self, Option<Bootstrap>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<()>> + 'static,
    {
        let hook = Self::activate(store, on_change);
        if !store.with::<P, _>(|value| value.is_empty_value()) {
            log_debug!(LogComponent::Ui("hook"), "{} cached, bootstrap skipped", P::ID);
            return (hook, None);
        }
        let pending = bootstrap();
        let task = async move {
            if let Err(err) = pending.await {
                log_warn!(LogComponent::Ui("hook"), "⚠️ {} bootstrap failed: {}", P::ID, err);
            }
        }
        .boxed_local();
        (hook, Some(task))
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn deactivate(&mut self) {
        self.subscription = None;
    }
}

/// Subscription to one entry of a keyed property; the key can change
/// while the hook is alive.
pub struct KeyedPropertyHook<P: KeyedProperty> {
    store: Store,
    key: Option<Symbol>,
    on_change: Rc<dyn Fn(Option<&P::Entry>)>,
    subscription: Option<Subscription>,
}

impl<P: KeyedProperty> KeyedPropertyHook<P> {
    pub fn activate(
        store: &Store,
        key: Option<Symbol>,
        on_change: impl Fn(Option<&P::Entry>) + 'static,
    ) -> Self {
        let mut hook = Self { store: store.clone(), key: None, on_change: Rc::new(on_change), subscription: None };
        hook.bind(key);
        hook
    }

    pub fn key(&self) -> Option<&Symbol> {
        self.key.as_ref()
    }

    pub fn current(&self) -> Option<P::Entry> {
        self.key.as_ref().and_then(|key| self.store.get_entry::<P>(key))
    }

    /// Rebinds to `key`: the old key's listener is removed before the new
    /// one is registered, and `on_change` receives the new key's entry.
    pub fn set_key(&mut self, key: Option<Symbol>) {
        if key == self.key {
            return;
        }
        self.subscription = None;
        self.bind(key);
        let current = self.current();
        (self.on_change)(current.as_ref());
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn deactivate(&mut self) {
        self.subscription = None;
        self.key = None;
    }

    fn bind(&mut self, key: Option<Symbol>) {
        self.subscription = key.clone().map(|key| {
            let on_change = Rc::clone(&self.on_change);
            self.store.subscribe_key::<P>(key, move |entry| on_change(entry))
        });
        self.key = key;
    }
}

/// Signal mirroring `P`, released when the current reactive owner is
/// disposed.
pub fn use_property<P: StoreProperty>(store: &Store) -> ReadSignal<P::Value> {
    let signal = create_rw_signal(store.get::<P>());
    let hook = PropertyHook::<P>::activate(store, move |value| signal.set(value.clone()));
    on_cleanup(move || drop(hook));
    signal.read_only()
}

/// Like [`use_property`], spawning `bootstrap` when nothing is cached yet.
pub fn use_property_with<P, F, Fut>(store: &Store, bootstrap: F) -> ReadSignal<P::Value>
where
    P: StoreProperty,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<()>> + 'static,
{
    let signal = create_rw_signal(store.get::<P>());
    let (hook, task) =
        PropertyHook::<P>::activate_with(store, move |value| signal.set(value.clone()), bootstrap);
    on_cleanup(move || drop(hook));
    if let Some(task) = task {
        spawn_local(task);
    }
    signal.read_only()
}

/// Signal mirroring one entry of `P` under a reactive key.
pub fn use_keyed_property<P: KeyedProperty>(
    store: &Store,
    key: impl Fn() -> Option<Symbol> + 'static,
) -> ReadSignal<Option<P::Entry>> {
    let initial_key = untrack(&key);
    let signal = create_rw_signal(initial_key.as_ref().and_then(|k| store.get_entry::<P>(k)));
    let hook = Rc::new(RefCell::new(KeyedPropertyHook::<P>::activate(
        store,
        initial_key,
        move |entry| signal.set(entry.cloned()),
    )));

    let rebind = Rc::clone(&hook);
    create_effect(move |_| {
        let next = key();
        rebind.borrow_mut().set_key(next);
    });
    on_cleanup(move || hook.borrow_mut().deactivate());
    signal.read_only()
}

/// Watchlist panel, loading the watchlist on first use.
pub fn use_watchlist<A: MarketApi + 'static>(dashboard: &Dashboard<A>) -> ReadSignal<Vec<Stock>> {
    let actions = dashboard.clone();
    use_property_with::<props::Watchlist, _, _>(dashboard.store(), move || async move {
        actions.refresh_watchlist().await
    })
}

/// Trending panel, loading the feed on first use.
pub fn use_trending<A: MarketApi + 'static>(dashboard: &Dashboard<A>) -> ReadSignal<TrendingList> {
    let actions = dashboard.clone();
    use_property_with::<props::Trending, _, _>(dashboard.store(), move || async move {
        actions.load_trending().await
    })
}

pub fn use_current_stock(store: &Store) -> ReadSignal<Option<Stock>> {
    use_property::<props::CurrentStock>(store)
}

pub fn use_current_stock_bars(store: &Store) -> ReadSignal<Vec<Bar>> {
    use_property::<props::CurrentStockBars>(store)
}

pub fn use_search_results(store: &Store) -> ReadSignal<Vec<Stock>> {
    use_property::<props::SearchResults>(store)
}

pub fn use_notification(store: &Store) -> ReadSignal<Option<Notification>> {
    use_property::<props::Notification>(store)
}

/// Quote row for one watchlist symbol.
pub fn use_stock_info(
    store: &Store,
    symbol: impl Fn() -> Option<Symbol> + 'static,
) -> ReadSignal<Option<PriceInfo>> {
    use_keyed_property::<props::StockInfo>(store, symbol)
}

pub fn use_stock_trade(
    store: &Store,
    symbol: impl Fn() -> Option<Symbol> + 'static,
) -> ReadSignal<Option<Trade>> {
    use_keyed_property::<props::StockTrades>(store, symbol)
}
