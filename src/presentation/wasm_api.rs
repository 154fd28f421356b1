use crate::application::Dashboard;
use crate::config::DashboardConfig;
use crate::domain::errors::AppError;
use crate::domain::market_data::{Notification, Severity, Symbol};
use crate::infrastructure::RestMarketApi;
use gloo::utils::format::JsValueSerdeExt;
use js_sys::Promise;
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// JavaScript bridge over the dashboard actions.
/// Every action returns a Promise that rejects with the error message.
#[wasm_bindgen]
pub struct DashboardApi {
    dashboard: Dashboard<RestMarketApi>,
    config: DashboardConfig,
}

fn to_js(err: AppError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn run<F>(action: F) -> Promise
where
    F: Future<Output = Result<(), AppError>> + 'static,
{
    future_to_promise(async move {
        action.await.map(|_| JsValue::UNDEFINED).map_err(to_js)
    })
}

impl DashboardApi {
    pub fn from_config(config: DashboardConfig) -> Self {
        let api = Rc::new(RestMarketApi::from_config(&config));
        Self { dashboard: Dashboard::with_config(api, &config), config }
    }

    pub fn dashboard(&self) -> &Dashboard<RestMarketApi> {
        &self.dashboard
    }
}

#[wasm_bindgen]
impl DashboardApi {
    /// Build-time URLs are used for any URL not given.
    #[wasm_bindgen(constructor)]
    pub fn new(api_url: Option<String>, ws_url: Option<String>) -> Self {
        let mut config = DashboardConfig::from_build_env();
        if let Some(url) = api_url {
            config = config.with_api_url(&url);
        }
        if let Some(url) = ws_url {
            config = config.with_ws_url(&url);
        }
        Self::from_config(config)
    }

    /// Accepts a JSON `DashboardConfig`; absent fields keep their defaults.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<DashboardApi, JsValue> {
        DashboardConfig::from_json(json).map(Self::from_config).map_err(to_js)
    }

    /// Opens the trending, trade and bars channels in the background.
    #[wasm_bindgen(js_name = startStreams)]
    pub fn start_streams(&self) {
        crate::spawn_streams(&self.dashboard, &self.config);
    }

    #[wasm_bindgen(js_name = refreshWatchlist)]
    pub fn refresh_watchlist(&self) -> Promise {
        let dashboard = self.dashboard.clone();
        run(async move { dashboard.refresh_watchlist().await })
    }

    #[wasm_bindgen(js_name = selectSymbol)]
    pub fn select_symbol(&self, symbol: String) -> Promise {
        let dashboard = self.dashboard.clone();
        run(async move { dashboard.select_symbol(&symbol).await })
    }

    pub fn watch(&self, symbol: String) -> Promise {
        let dashboard = self.dashboard.clone();
        run(async move { dashboard.watch(&Symbol::new(&symbol)?).await })
    }

    pub fn unwatch(&self, symbol: String) -> Promise {
        let dashboard = self.dashboard.clone();
        run(async move { dashboard.unwatch(&Symbol::new(&symbol)?).await })
    }

    pub fn search(&self, query: String) -> Promise {
        let dashboard = self.dashboard.clone();
        run(async move { dashboard.search(&query).await })
    }

    #[wasm_bindgen(js_name = loadTrending)]
    pub fn load_trending(&self) -> Promise {
        let dashboard = self.dashboard.clone();
        run(async move { dashboard.load_trending().await })
    }

    /// `severity` is one of `info`, `success`, `warning`, `danger`.
    pub fn notify(&self, text: String, severity: Option<String>) {
        let severity = severity.and_then(|s| s.parse::<Severity>().ok()).unwrap_or_default();
        self.dashboard.notify(Notification::new(severity, &text));
    }

    #[wasm_bindgen(js_name = dismissNotification)]
    pub fn dismiss_notification(&self) {
        self.dashboard.dismiss_notification();
    }

    /// Deep copy of the whole state as a plain JS object.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        JsValue::from_serde(&self.dashboard.store().snapshot()).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
