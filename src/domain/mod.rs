//! Domain layer: market data types, the store's property set, push-channel
//! messages, errors and logging. Nothing here touches the browser.

pub mod errors;
pub mod events;
pub mod logging;
pub mod market_data;
pub mod state;
