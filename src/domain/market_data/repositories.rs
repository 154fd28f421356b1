use super::entities::{Bar, Stock, Symbol, Trade, TrendingList};
use crate::domain::errors::AppResult;

/// REST backend the actions read from and mutate through.
///
/// Paths are relative to the configured API base URL:
/// `GET /watchlist`, `POST|DELETE /watchlist/{symbol}`, `GET /search/{query}`,
/// `GET /trending`, `GET /bars/{symbol}`, `GET /trade/{symbol}`,
/// `GET /close/{symbol}`.
#[allow(async_fn_in_trait)]
pub trait MarketApi {
    async fn watchlist(&self) -> AppResult<Vec<Stock>>;

    async fn watch(&self, symbol: &Symbol) -> AppResult<()>;

    async fn unwatch(&self, symbol: &Symbol) -> AppResult<()>;

    async fn search(&self, query: &str) -> AppResult<Vec<Stock>>;

    async fn trending(&self) -> AppResult<TrendingList>;

    async fn bars(&self, symbol: &Symbol) -> AppResult<Vec<Bar>>;

    /// `None` when the backend has no trade recorded for the symbol.
    async fn latest_trade(&self, symbol: &Symbol) -> AppResult<Option<Trade>>;

    /// `None` when the backend has no close in its lookback window.
    async fn previous_close(&self, symbol: &Symbol) -> AppResult<Option<Trade>>;
}
