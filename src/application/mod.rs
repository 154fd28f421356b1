//! Application layer: the store, its subscription registry, the actions that
//! move data from the backend into the store, and the push-channel supervisor.

pub mod actions;
pub mod sequence;
pub mod store;
pub mod stream_ingestion;
pub mod subscriptions;

pub use actions::Dashboard;
pub use sequence::{RequestSequence, Ticket};
pub use store::Store;
pub use stream_ingestion::{StreamConnector, StreamEffect, StreamIngestion};
pub use subscriptions::{Subscription, SubscriptionRegistry};
