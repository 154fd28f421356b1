use crate::config::DashboardConfig;
use crate::domain::{
    errors::{AppError, AppResult},
    logging::LogComponent,
    market_data::{Bar, MarketApi, PricePoint, Stock, Symbol, Trade, TrendingList},
};
use crate::log_debug;
use futures::future::{Either, select};
use gloo::net::http::{Request, RequestBuilder, Response};
use gloo_timers::future::sleep;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// HTTP клиент для REST бэкенда на gloo
#[derive(Debug, Clone)]
pub struct RestMarketApi {
    base_url: String,
    timeout: Duration,
}

impl RestMarketApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DashboardConfig::default().request_timeout(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(&config.api_url).with_timeout(config.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Абсолютный URL: каждый элемент `segments` кодируется как один сегмент пути
    pub fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> AppResult<Response> {
        // Создаем HTTP запрос с gloo
        let request = request
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");
        // Гонка запроса с таймером таймаута
        let response = match select(Box::pin(request.send()), Box::pin(sleep(self.timeout))).await {
            Either::Left((response, _)) => {
                response.map_err(|e| AppError::Network(format!("{url}: {e:?}")))?
            }
            Either::Right(_) => return Err(AppError::Timeout(url.to_string())),
        };
        if !response.ok() {
            return Err(AppError::Http { url: url.to_string(), status: response.status() });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> AppResult<T> {
        let url = self.endpoint(segments);
        log_debug!(LogComponent::Rest("get"), "📡 GET {}", url);
        let response = self.send(Request::get(&url), &url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Decode(format!("{url}: {e:?}")))
    }

    async fn get_point(&self, segments: &[&str]) -> AppResult<Option<PricePoint>> {
        decode_optional_point(self.get_json::<Value>(segments).await?)
    }
}

/// Эндпоинты сделки и закрытия отвечают `[ts, price]`, `[]` или `null`;
/// нулевой timestamp означает, что данных нет.
pub fn decode_optional_point(value: Value) -> AppResult<Option<PricePoint>> {
    match value {
        Value::Null => Ok(None),
        Value::Array(ref items) if items.is_empty() => Ok(None),
        value => {
            let point: PricePoint = serde_json::from_value(value)?;
            Ok((point.timestamp.value() != 0).then_some(point))
        }
    }
}

impl MarketApi for RestMarketApi {
    async fn watchlist(&self) -> AppResult<Vec<Stock>> {
        self.get_json(&["watchlist"]).await
    }

    async fn watch(&self, symbol: &Symbol) -> AppResult<()> {
        let url = self.endpoint(&["watchlist", symbol.value()]);
        self.send(Request::post(&url), &url).await.map(|_| ())
    }

    async fn unwatch(&self, symbol: &Symbol) -> AppResult<()> {
        let url = self.endpoint(&["watchlist", symbol.value()]);
        self.send(Request::delete(&url), &url).await.map(|_| ())
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Stock>> {
        self.get_json(&["search", query]).await
    }

    async fn trending(&self) -> AppResult<TrendingList> {
        self.get_json(&["trending"]).await
    }

    async fn bars(&self, symbol: &Symbol) -> AppResult<Vec<Bar>> {
        self.get_json(&["bars", symbol.value()]).await
    }

    async fn latest_trade(&self, symbol: &Symbol) -> AppResult<Option<Trade>> {
        self.get_point(&["trade", symbol.value()]).await
    }

    async fn previous_close(&self, symbol: &Symbol) -> AppResult<Option<Trade>> {
        self.get_point(&["close", symbol.value()]).await
    }
}
