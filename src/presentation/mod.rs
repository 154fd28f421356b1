//! Presentation layer: leptos property hooks and the JavaScript bridge.

pub mod hooks;
pub mod wasm_api;

pub use hooks::*;
pub use wasm_api::DashboardApi;
