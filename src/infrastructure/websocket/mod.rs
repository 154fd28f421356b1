//! Push-channel connector over browser WebSockets.

pub mod client;

pub use client::*;
