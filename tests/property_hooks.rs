mod common;

use common::{MockApi, dashboard};
use futures::executor::block_on;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use stock_dashboard::application::Store;
use stock_dashboard::domain::errors::AppError;
use stock_dashboard::domain::market_data::{PriceInfo, Symbol, TrendingList};
use stock_dashboard::domain::state::props;
use stock_dashboard::presentation::{KeyedPropertyHook, PropertyHook};

#[test]
fn bootstrap_runs_when_nothing_is_cached() {
    let api = MockApi::new();
    api.watched("1", "AAPL", 110.0, 100.0);
    let dashboard = dashboard(&api);
    let seen = Rc::new(Cell::new(0));
    let counter = Rc::clone(&seen);

    let actions = dashboard.clone();
    let (hook, bootstrap) = PropertyHook::<props::Watchlist>::activate_with(
        dashboard.store(),
        move |watchlist| counter.set(watchlist.len()),
        move || async move { actions.refresh_watchlist().await },
    );
    let bootstrap = bootstrap.expect("empty watchlist must bootstrap");
    block_on(bootstrap);

    assert!(hook.is_active());
    assert_eq!(seen.get(), 1);
    assert_eq!(api.call_count("GET /watchlist"), 1);
}

#[test]
fn bootstrap_is_skipped_when_the_store_is_populated() {
    let store = Store::new();
    store.set::<props::Trending>(TrendingList::from_pairs([("AAPL", 4.0)]));
    let called = Rc::new(Cell::new(false));
    let flag = Rc::clone(&called);

    let (_hook, bootstrap) = PropertyHook::<props::Trending>::activate_with(
        &store,
        |_| {},
        move || {
            flag.set(true);
            async { Ok(()) }
        },
    );

    assert!(bootstrap.is_none());
    assert!(!called.get());
}

#[test]
fn failed_bootstrap_still_releases_the_subscription() {
    let store = Store::new();
    let (hook, bootstrap) = PropertyHook::<props::Trending>::activate_with(
        &store,
        |_| {},
        || async { Err(AppError::Network("offline".to_string())) },
    );
    assert_eq!(store.listener_count::<props::Trending>(), 1);

    block_on(bootstrap.expect("empty trending must bootstrap"));
    drop(hook);

    assert_eq!(store.listener_count::<props::Trending>(), 0);
}

#[test]
fn deactivating_mid_bootstrap_drops_the_late_result() {
    let api = MockApi::new();
    api.trending.replace(TrendingList::from_pairs([("TSLA", 9.0)]));
    let gate = api.hold("GET /trending");
    let dashboard = dashboard(&api);
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);

    let actions = dashboard.clone();
    let (mut hook, bootstrap) = PropertyHook::<props::Trending>::activate_with(
        dashboard.store(),
        move |_| counter.set(counter.get() + 1),
        move || async move { actions.load_trending().await },
    );
    let mut pool = futures::executor::LocalPool::new();
    futures::task::LocalSpawnExt::spawn_local(&pool.spawner(), bootstrap.expect("bootstrap"))
        .expect("spawn");
    pool.run_until_stalled();

    hook.deactivate();
    gate.send(()).expect("bootstrap still waiting");
    pool.run();

    assert!(!hook.is_active());
    assert_eq!(hits.get(), 0);
    assert!(!dashboard.store().get::<props::Trending>().is_empty());
}

#[test]
fn keyed_hook_follows_key_changes() {
    let store = Store::new();
    store.set_entry::<props::StockInfo>(Symbol::from("AAPL"), PriceInfo::new(110.0, 100.0));
    store.set_entry::<props::StockInfo>(Symbol::from("TSLA"), PriceInfo::new(200.0, 250.0));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let mut hook = KeyedPropertyHook::<props::StockInfo>::activate(
        &store,
        Some(Symbol::from("AAPL")),
        move |entry| sink.borrow_mut().push(entry.map(PriceInfo::last_price)),
    );
    assert_eq!(hook.current().map(|info| info.last_price()), Some(110.0));

    hook.set_key(Some(Symbol::from("TSLA")));
    assert_eq!(*seen.borrow(), vec![Some(200.0)]);
    assert_eq!(store.listener_count::<props::StockInfo>(), 1);

    // The old key no longer reaches the hook.
    store.set_entry::<props::StockInfo>(Symbol::from("AAPL"), PriceInfo::new(120.0, 100.0));
    assert_eq!(seen.borrow().len(), 1);

    store.set_entry::<props::StockInfo>(Symbol::from("TSLA"), PriceInfo::new(210.0, 250.0));
    assert_eq!(*seen.borrow(), vec![Some(200.0), Some(210.0)]);
}

#[test]
fn keyed_hook_without_key_holds_no_listener() {
    let store = Store::new();
    let mut hook = KeyedPropertyHook::<props::StockTrades>::activate(&store, None, |_| {});
    assert!(!hook.is_active());
    assert_eq!(store.listener_count::<props::StockTrades>(), 0);

    hook.set_key(Some(Symbol::from("AAPL")));
    assert!(hook.is_active());
    hook.deactivate();
    assert_eq!(store.listener_count::<props::StockTrades>(), 0);
    assert_eq!(hook.key(), None);
}

#[test]
fn dropping_a_keyed_hook_unsubscribes() {
    let store = Store::new();
    let hook = KeyedPropertyHook::<props::StockInfo>::activate(&store, Some(Symbol::from("AAPL")), |_| {});
    assert_eq!(store.listener_count::<props::StockInfo>(), 1);
    drop(hook);
    assert_eq!(store.listener_count::<props::StockInfo>(), 0);
}
