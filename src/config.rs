//! Runtime configuration for the dashboard core.
//!
//! Defaults point at a local backend. Deployments either bake URLs in at
//! build time (`DASHBOARD_API_URL`, `DASHBOARD_WS_URL`) or hand a JSON
//! document to [`DashboardConfig::from_json`]; missing fields keep their
//! defaults.

use crate::domain::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/1.0";
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/api/1.0";
pub const DEFAULT_MIN_SEARCH_LEN: usize = 3;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    pub api_url: String,
    pub ws_url: String,
    pub request_timeout_ms: u64,
    /// Queries shorter than this clear the results without a request.
    pub min_search_len: usize,
    pub reconnect: ReconnectPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            min_search_len: DEFAULT_MIN_SEARCH_LEN,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by URLs baked in at compile time.
    pub fn from_build_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = option_env!("DASHBOARD_API_URL") {
            config.api_url = url.to_string();
        }
        if let Some(url) = option_env!("DASHBOARD_WS_URL") {
            config.ws_url = url.to_string();
        }
        config
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_ws_url(mut self, url: &str) -> Self {
        self.ws_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_min_search_len(mut self, len: usize) -> Self {
        self.min_search_len = len;
        self
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Exponential backoff for push channels: the delay doubles after every
/// failed attempt, capped at `max_delay_ms`. `max_attempts: None` retries
/// forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconnectPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { initial_delay_ms: 1_000, max_delay_ms: 32_000, max_attempts: None }
    }
}

impl ReconnectPolicy {
    pub fn limited(max_attempts: u32) -> Self {
        Self { max_attempts: Some(max_attempts), ..Self::default() }
    }

    /// Задержка перед попыткой переподключения номер `attempt` (с 1)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self.initial_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt <= max)
    }
}
