//! Browser implementations of the domain logging seams.

use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider};

/// Логгер для браузерной консоли
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn new_development() -> Self {
        Self::new(LogLevel::Trace)
    }

    pub fn new_production() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        let line = entry.render();
        match entry.level {
            LogLevel::Error => gloo::console::error!(line),
            LogLevel::Warn => gloo::console::warn!(line),
            LogLevel::Info => gloo::console::info!(line),
            LogLevel::Debug | LogLevel::Trace => gloo::console::debug!(line),
        }
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

/// Провайдер времени на основе `Date.now()`
#[derive(Default)]
pub struct BrowserTimeProvider;

impl BrowserTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for BrowserTimeProvider {
    fn current_timestamp(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp as f64));
        let iso = String::from(date.to_iso_string());
        // `2024-05-01T12:34:56.789Z` -> `12:34:56.789`
        iso.get(11..23).map(str::to_string).unwrap_or(iso)
    }
}
