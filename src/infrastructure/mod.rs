//! Browser-facing adapters: REST over gloo-net, WebSocket push channels and
//! the console logger.

pub mod http;
pub mod services;
pub mod websocket;

pub use http::RestMarketApi;
pub use websocket::GlooStreamConnector;
