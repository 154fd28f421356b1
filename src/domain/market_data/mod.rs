//! Market data aggregate: stocks, quotes, trending feed, and the REST
//! collaborator contract that supplies them.

pub mod entities;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use repositories::MarketApi;
pub use value_objects::*;
