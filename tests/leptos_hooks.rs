use leptos::{SignalGet, SignalGetUntracked, SignalSet, as_child_of_current_owner, create_runtime, create_rw_signal};
use stock_dashboard::application::Store;
use stock_dashboard::domain::market_data::{PriceInfo, PricePoint, Stock, Symbol};
use stock_dashboard::domain::state::props;
use stock_dashboard::presentation::{use_keyed_property, use_property, use_stock_trade};

fn stock(pk: &str, symbol: &str) -> Stock {
    Stock::new(pk, symbol, &format!("{symbol} Inc"))
}

#[test]
fn property_signal_follows_the_store_until_disposed() {
    let runtime = create_runtime();
    let store = Store::new();
    store.set::<props::Watchlist>(vec![stock("1", "AAPL")]);

    let mount = as_child_of_current_owner(|store: Store| use_property::<props::Watchlist>(&store));
    let (watchlist, disposer) = mount(store.clone());
    assert_eq!(watchlist.get_untracked().len(), 1);
    assert_eq!(store.listener_count::<props::Watchlist>(), 1);

    store.set::<props::Watchlist>(vec![stock("1", "AAPL"), stock("2", "TSLA")]);
    assert_eq!(watchlist.get_untracked().len(), 2);

    drop(disposer);
    assert_eq!(store.listener_count::<props::Watchlist>(), 0);
    runtime.dispose();
}

#[test]
fn keyed_signal_rebinds_when_the_key_changes() {
    let runtime = create_runtime();
    let store = Store::new();
    store.set_entry::<props::StockInfo>(Symbol::from("AAPL"), PriceInfo::new(110.0, 100.0));
    store.set_entry::<props::StockInfo>(Symbol::from("TSLA"), PriceInfo::new(180.0, 200.0));
    let key = create_rw_signal(Some(Symbol::from("AAPL")));

    let mount = as_child_of_current_owner(move |store: Store| {
        use_keyed_property::<props::StockInfo>(&store, move || key.get())
    });
    let (quote, disposer) = mount(store.clone());
    assert_eq!(quote.get_untracked().map(|q| q.last_price()), Some(110.0));

    key.set(Some(Symbol::from("TSLA")));
    assert_eq!(quote.get_untracked().map(|q| q.last_price()), Some(180.0));

    // The old key no longer reaches the signal.
    store.set_entry::<props::StockInfo>(Symbol::from("AAPL"), PriceInfo::new(120.0, 100.0));
    assert_eq!(quote.get_untracked().map(|q| q.last_price()), Some(180.0));
    store.set_entry::<props::StockInfo>(Symbol::from("TSLA"), PriceInfo::new(190.0, 200.0));
    assert_eq!(quote.get_untracked().map(|q| q.last_price()), Some(190.0));

    key.set(None);
    assert_eq!(quote.get_untracked(), None);

    drop(disposer);
    assert_eq!(store.listener_count::<props::StockInfo>(), 0);
    runtime.dispose();
}

#[test]
fn stock_trade_signal_starts_from_the_cached_entry() {
    let runtime = create_runtime();
    let store = Store::new();
    store.set_entry::<props::StockTrades>(Symbol::from("AAPL"), Some(PricePoint::at(2, 110.0)));

    let mount = as_child_of_current_owner(|store: Store| {
        use_stock_trade(&store, || Some(Symbol::from("AAPL")))
    });
    let (trade, disposer) = mount(store.clone());
    assert_eq!(trade.get_untracked(), Some(PricePoint::at(2, 110.0)));

    store.set_entry::<props::StockTrades>(Symbol::from("AAPL"), Some(PricePoint::at(3, 111.0)));
    assert_eq!(trade.get_untracked(), Some(PricePoint::at(3, 111.0)));

    drop(disposer);
    assert_eq!(store.listener_count::<props::StockTrades>(), 0);
    runtime.dispose();
}
