//! The dashboard's property set and the traits that tie each property id
//! to its value type.

use crate::domain::market_data::{Bar, PriceInfo, RecentTrades, Stock, Symbol, Trade, TrendingList};
use std::collections::BTreeMap;

/// "Nothing cached yet" check used to decide whether a hook bootstraps.
pub trait EmptySentinel {
    fn is_empty_value(&self) -> bool;
}

impl<T> EmptySentinel for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> EmptySentinel for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl<K, V> EmptySentinel for BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl EmptySentinel for TrendingList {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

/// A named slot of [`AppState`] with a statically known value type.
pub trait StoreProperty: 'static {
    type Value: Clone + PartialEq + EmptySentinel + 'static;
    const ID: Property;

    fn read(state: &AppState) -> &Self::Value;

    fn slot(state: &mut AppState) -> &mut Self::Value;
}

/// A map-valued property whose listeners may scope to a single symbol.
pub trait KeyedProperty: StoreProperty {
    type Entry: Clone + PartialEq + 'static;

    fn entry<'a>(value: &'a Self::Value, key: &Symbol) -> Option<&'a Self::Entry>;

    /// Inserts `entry` under `key`, or removes the key when `entry` is `None`.
    fn put_entry(value: &mut Self::Value, key: Symbol, entry: Option<Self::Entry>);
}

fn put_map_entry<V>(map: &mut BTreeMap<Symbol, V>, key: Symbol, entry: Option<V>) {
    match entry {
        Some(entry) => {
            map.insert(key, entry);
        }
        None => {
            map.remove(&key);
        }
    }
}

crate::store_properties! {
    /// Tracked stocks, in server order, unique by symbol.
    Watchlist => watchlist: Vec<Stock>,
    /// Latest applied search response; empty for short queries.
    SearchResults => search_results: Vec<Stock>,
    /// At most one pending user-facing message.
    Notification => notification: Option<crate::domain::market_data::Notification>,
    /// The stock the chart, news and trade panels follow.
    CurrentStock => current_stock: Option<Stock>,
    /// Flat `symbol, score, symbol, score, ...` feed, replaced wholesale.
    Trending => trending: TrendingList,
    /// Recent-trade pair for the selected stock.
    Trades => trades: Option<RecentTrades>,
    /// Quote per watched symbol.
    StockInfo => stock_info: BTreeMap<Symbol, PriceInfo>,
    /// Latest trade per watched symbol.
    StockTrades => stock_trades: BTreeMap<Symbol, Trade>,
    /// Price history of the selected stock, ascending by timestamp.
    CurrentStockBars => current_stock_bars: Vec<Bar>,
}

impl KeyedProperty for props::StockInfo {
    type Entry = PriceInfo;

    fn entry<'a>(value: &'a Self::Value, key: &Symbol) -> Option<&'a PriceInfo> {
        value.get(key)
    }

    fn put_entry(value: &mut Self::Value, key: Symbol, entry: Option<PriceInfo>) {
        put_map_entry(value, key, entry);
    }
}

impl KeyedProperty for props::StockTrades {
    type Entry = Trade;

    fn entry<'a>(value: &'a Self::Value, key: &Symbol) -> Option<&'a Trade> {
        value.get(key)
    }

    fn put_entry(value: &mut Self::Value, key: Symbol, entry: Option<Trade>) {
        put_map_entry(value, key, entry);
    }
}

impl AppState {
    pub fn current_symbol(&self) -> Option<&Symbol> {
        self.current_stock.as_ref().map(|stock| &stock.symbol)
    }

    pub fn is_selected(&self, symbol: &Symbol) -> bool {
        self.current_symbol() == Some(symbol)
    }

    /// Looks a symbol up in the watchlist first, then in search results.
    pub fn find_stock(&self, symbol: &Symbol) -> Option<&Stock> {
        self.watchlist
            .iter()
            .chain(self.search_results.iter())
            .find(|stock| &stock.symbol == symbol)
    }
}
