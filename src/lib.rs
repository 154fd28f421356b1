use wasm_bindgen::prelude::*;

pub mod macros;

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

use crate::application::{Dashboard, StreamIngestion};
use crate::config::DashboardConfig;
use crate::domain::logging::LogComponent;
use crate::infrastructure::{GlooStreamConnector, RestMarketApi};
use std::rc::Rc;

/// Инициализация: panic hook, консольный логгер и браузерные часы
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let logger = if cfg!(debug_assertions) {
        infrastructure::services::ConsoleLogger::new_development()
    } else {
        infrastructure::services::ConsoleLogger::new_production()
    };
    domain::logging::init_logger(Box::new(logger));
    domain::logging::init_time_provider(Box::new(infrastructure::services::BrowserTimeProvider::new()));

    log_info!(LogComponent::Ui("initialize"), "🚀 Dashboard core initialized");
}

/// Builds the dashboard against the REST backend and starts the push
/// channels in the background.
pub fn launch(config: &DashboardConfig) -> Dashboard<RestMarketApi> {
    let dashboard = Dashboard::with_config(Rc::new(RestMarketApi::from_config(config)), config);
    spawn_streams(&dashboard, config);
    dashboard
}

/// Spawns the trending, trade and bars channels feeding `dashboard`.
pub fn spawn_streams(dashboard: &Dashboard<RestMarketApi>, config: &DashboardConfig) {
    let ingestion = StreamIngestion::new(
        dashboard.clone(),
        GlooStreamConnector::new(&config.ws_url),
        config.reconnect,
    );
    log_info!(LogComponent::Ui("streams"), "🚀 Starting push channels");
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = ingestion.run().await {
            log_error!(LogComponent::Ui("streams"), "❌ Push channels stopped: {}", err);
        }
    });
}
