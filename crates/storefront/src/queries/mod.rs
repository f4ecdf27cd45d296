//! Per-resource queries and cache-aware mutations.
//!
//! [`StoreQueries`] turns each service read into a [`Query`] handle keyed by
//! resource and parameters, and wraps each mutation so that the reads it
//! affects are invalidated once it succeeds.

mod account;
mod baby;
mod catalog;
mod content;
mod shop;

pub use account::CurrentUser;

use std::future::Future;

use tracing::debug;

use crate::api::Session;
use crate::error::ApiError;
use crate::query::{Query, QueryClient, QueryKey};
use crate::services::Services;

/// Resource names used in cache keys.
pub mod resource {
    pub const ADDRESSES: &str = "addresses";
    pub const BABIES: &str = "babies";
    pub const BABY: &str = "baby";
    pub const BLOG: &str = "blog";
    pub const BLOGS: &str = "blogs";
    pub const BRAND_PRODUCTS: &str = "brand-products";
    pub const BRANDS: &str = "brands";
    pub const CART: &str = "cart";
    pub const CATEGORIES: &str = "categories";
    pub const CATEGORY_PRODUCTS: &str = "category-products";
    pub const CHECKOUT_DETAIL: &str = "checkout-detail";
    pub const HOSPITALS: &str = "hospitals";
    pub const ORDER: &str = "order";
    pub const ORDERS: &str = "orders";
    pub const PRODUCT: &str = "product";
    pub const PRODUCTS: &str = "products";
    pub const USER: &str = "user";
}

/// Queries over every resource, sharing one cache.
#[derive(Debug, Clone)]
pub struct StoreQueries {
    services: Services,
    client: QueryClient,
    session: Session,
}

impl StoreQueries {
    #[must_use]
    pub const fn new(services: Services, client: QueryClient, session: Session) -> Self {
        Self {
            services,
            client,
            session,
        }
    }

    #[must_use]
    pub const fn client(&self) -> &QueryClient {
        &self.client
    }

    /// Observe `key`, fetching through `call` with a clone of `service`.
    fn read<S, T, F, Fut>(&self, key: QueryKey, service: &S, call: F) -> Query<T>
    where
        S: Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let service = service.clone();
        self.client.query(key, move || call(service.clone()))
    }

    /// Invalidate every key of each resource.
    async fn invalidate(&self, resources: &[&str]) {
        debug!(?resources, "Invalidating after mutation");
        for resource in resources {
            self.client.invalidate_resource(resource).await;
        }
    }
}
