//! Named async operations that fetch from the backend and publish into the
//! store.
//!
//! Every action leaves the store consistent on failure: nothing is
//! published until all of an action's requests have succeeded, and the error
//! is returned to the caller. Selection, search and watchlist refreshes are
//! ticketed so a slow response never overwrites a newer one.

use super::sequence::{RequestSequence, Ticket};
use super::store::Store;
use crate::config::DashboardConfig;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::services::{dedupe_by_symbol, sort_bars};
use crate::domain::market_data::{
    Bar, MarketApi, Notification, PriceInfo, RecentTrades, Severity, Stock, Symbol, Trade,
};
use crate::domain::state::props;
use crate::{log_debug, log_info, log_warn};
use futures::future::{join, try_join_all};
use std::collections::BTreeMap;
use std::rc::Rc;

struct DashboardInner<A> {
    store: Store,
    api: Rc<A>,
    min_search_len: usize,
    watchlist_requests: RequestSequence,
    selection_requests: RequestSequence,
    search_requests: RequestSequence,
}

/// The action layer bound to one store and one backend.
pub struct Dashboard<A> {
    inner: Rc<DashboardInner<A>>,
}

impl<A> Clone for Dashboard<A> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

struct Quote {
    symbol: Symbol,
    trade: Option<Trade>,
    close: Option<Trade>,
}

impl<A: MarketApi> Dashboard<A> {
    pub fn new(api: Rc<A>) -> Self {
        Self::with_config(api, &DashboardConfig::default())
    }

    pub fn with_config(api: Rc<A>, config: &DashboardConfig) -> Self {
        Self::with_store(Store::new(), api, config)
    }

    pub fn with_store(store: Store, api: Rc<A>, config: &DashboardConfig) -> Self {
        Self {
            inner: Rc::new(DashboardInner {
                store,
                api,
                min_search_len: config.min_search_len,
                watchlist_requests: RequestSequence::new(),
                selection_requests: RequestSequence::new(),
                search_requests: RequestSequence::new(),
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// Reloads the watchlist with a quote per member.
    ///
    /// Quotes are published before the watchlist so rows render with prices
    /// on first paint. Selects the first member when nothing is selected.
    pub async fn refresh_watchlist(&self) -> AppResult<()> {
        let ticket = self.inner.watchlist_requests.issue();
        log_debug!(LogComponent::Action("refresh_watchlist"), "📡 Fetching watchlist");

        let watchlist = dedupe_by_symbol(self.api().watchlist().await?);
        let quotes =
            try_join_all(watchlist.iter().map(|stock| self.fetch_quote(stock.symbol.clone()))).await?;

        if !self.inner.watchlist_requests.is_latest(ticket) {
            log_debug!(LogComponent::Action("refresh_watchlist"), "⏭️ Superseded response dropped");
            return Ok(());
        }

        let mut stock_info = BTreeMap::new();
        let mut stock_trades = BTreeMap::new();
        for Quote { symbol, trade, close } in quotes {
            let Some(trade) = trade else {
                continue;
            };
            match close.and_then(|close| PriceInfo::new(trade.price.value(), close.price.value())) {
                Some(info) => {
                    stock_info.insert(symbol.clone(), info);
                }
                None => {
                    log_debug!(LogComponent::Action("refresh_watchlist"), "No reference close for {}", symbol);
                }
            }
            stock_trades.insert(symbol, trade);
        }

        log_info!(
            LogComponent::Action("refresh_watchlist"),
            "📋 Watchlist: {} stocks, {} quotes",
            watchlist.len(),
            stock_info.len()
        );

        self.store().batch(|store| {
            store.set::<props::StockInfo>(stock_info);
            store.set::<props::StockTrades>(stock_trades);
            store.set::<props::Watchlist>(watchlist.clone());
        });

        let nothing_selected = self.store().with::<props::CurrentStock, _>(Option::is_none);
        match watchlist.into_iter().next() {
            Some(first) if nothing_selected => self.select_stock(first).await,
            _ => Ok(()),
        }
    }

    async fn fetch_quote(&self, symbol: Symbol) -> AppResult<Quote> {
        let (trade, close) =
            futures::try_join!(self.api().latest_trade(&symbol), self.api().previous_close(&symbol))?;
        Ok(Quote { symbol, trade, close })
    }

    /// Makes `stock` the selection and loads its bars and latest trade.
    ///
    /// Switching to a different stock clears the previous stock's bars and
    /// trades first so no panel shows them under the new selection.
    pub async fn select_stock(&self, stock: Stock) -> AppResult<()> {
        let ticket = self.inner.selection_requests.issue();
        let symbol = stock.symbol.clone();
        log_info!(LogComponent::Action("select_stock"), "🎯 Selected {}", symbol);

        let switching = !self.store().with_state(|state| state.is_selected(&symbol));
        self.store().batch(|store| {
            if switching {
                store.set::<props::CurrentStockBars>(Vec::new());
                store.set::<props::Trades>(None);
            }
            store.set::<props::CurrentStock>(Some(stock));
        });

        let bars = async {
            let bars = self.api().bars(&symbol).await?;
            self.publish_bars(ticket, &symbol, bars);
            Ok::<(), AppError>(())
        };
        let trade = async {
            let trade = self.api().latest_trade(&symbol).await?;
            self.publish_first_trade(ticket, &symbol, trade);
            Ok::<(), AppError>(())
        };
        let (bars, trade) = join(bars, trade).await;
        bars.and(trade)
    }

    /// Selects the stock with `symbol` from the watchlist or search results.
    pub async fn select_symbol(&self, symbol: &str) -> AppResult<()> {
        let symbol = Symbol::new(symbol)?;
        let stock = self.store().with_state(|state| state.find_stock(&symbol).cloned());
        match stock {
            Some(stock) => self.select_stock(stock).await,
            None => Err(AppError::UnknownStock(symbol.to_string())),
        }
    }

    /// Refetches bars for whatever is selected right now.
    pub async fn refresh_current_bars(&self) -> AppResult<()> {
        let ticket = self.inner.selection_requests.current();
        let Some(symbol) = self.store().with_state(|state| state.current_symbol().cloned()) else {
            return Ok(());
        };
        let bars = self.api().bars(&symbol).await?;
        self.publish_bars(ticket, &symbol, bars);
        Ok(())
    }

    fn publish_bars(&self, ticket: Ticket, symbol: &Symbol, bars: Vec<Bar>) {
        if !self.inner.selection_requests.is_latest(ticket) {
            log_debug!(LogComponent::Action("bars"), "⏭️ Stale bars for {} dropped", symbol);
            return;
        }
        log_debug!(LogComponent::Action("bars"), "📈 {} bars for {}", bars.len(), symbol);
        self.store().set::<props::CurrentStockBars>(sort_bars(bars));
    }

    fn publish_first_trade(&self, ticket: Ticket, symbol: &Symbol, trade: Option<Trade>) {
        if !self.inner.selection_requests.is_latest(ticket) {
            log_debug!(LogComponent::Action("trades"), "⏭️ Stale trade for {} dropped", symbol);
            return;
        }
        // Ticks that arrived while the request was in flight win; a missing
        // trade never clears them.
        let Some(trade) = trade else {
            return;
        };
        self.store().update::<props::Trades>(|trades| {
            *trades = match trades.take() {
                Some(recent) if recent.latest.timestamp >= trade.timestamp => Some(recent),
                Some(recent) => Some(recent.push(trade)),
                None => Some(RecentTrades::starting_at(trade)),
            };
        });
    }

    pub async fn watch(&self, symbol: &Symbol) -> AppResult<()> {
        log_info!(LogComponent::Action("watch"), "➕ Watching {}", symbol);
        self.api().watch(symbol).await?;
        self.refresh_watchlist().await
    }

    pub async fn unwatch(&self, symbol: &Symbol) -> AppResult<()> {
        log_info!(LogComponent::Action("unwatch"), "➖ Unwatching {}", symbol);
        self.api().unwatch(symbol).await?;
        self.refresh_watchlist().await
    }

    /// Runs a symbol/name search. Queries shorter than the configured
    /// minimum clear the results without a request; only the most recently
    /// issued query may publish.
    pub async fn search(&self, query: &str) -> AppResult<()> {
        let ticket = self.inner.search_requests.issue();
        let query = query.trim();
        if query.chars().count() < self.inner.min_search_len {
            self.store().set::<props::SearchResults>(Vec::new());
            return Ok(());
        }

        let results = self.api().search(query).await?;
        if !self.inner.search_requests.is_latest(ticket) {
            log_debug!(LogComponent::Action("search"), "⏭️ Results for {:?} superseded", query);
            return Ok(());
        }
        log_debug!(LogComponent::Action("search"), "🔎 {} results for {:?}", results.len(), query);
        self.store().set::<props::SearchResults>(dedupe_by_symbol(results));
        Ok(())
    }

    pub async fn load_trending(&self) -> AppResult<()> {
        let trending = self.api().trending().await?;
        log_debug!(LogComponent::Action("trending"), "🔥 {} trending items", trending.items().len());
        self.store().set::<props::Trending>(trending);
        Ok(())
    }

    /// Replaces the pending notification.
    pub fn notify(&self, notification: Notification) {
        if notification.severity == Severity::Danger {
            log_warn!(LogComponent::Action("notify"), "{}", notification.text.join(" "));
        }
        self.store().set::<props::Notification>(Some(notification));
    }

    pub fn dismiss_notification(&self) {
        self.store().set::<props::Notification>(None);
    }
}
