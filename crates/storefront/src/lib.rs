//! Babynest storefront data layer.
//!
//! Typed access to the marketplace REST API for the customer-facing
//! storefront: an HTTP adapter, one service per resource, and a query cache
//! with per-resource queries on top.
//!
//! ```rust,ignore
//! let storefront = Storefront::new(StorefrontConfig::from_env()?)?;
//! let orders = storefront.queries().all_orders(PageParams::page(2));
//! let page = orders.fetch().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod queries;
pub mod query;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, StorefrontConfig};
pub use error::ApiError;
pub use state::Storefront;
