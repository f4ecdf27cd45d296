//! Product catalog.

use babynest_core::{ApiResponse, Paginated, Product, ProductFilter};
use tracing::instrument;

use crate::api::{ApiClient, ApiRequest};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct ProductService {
    api: ApiClient,
}

impl ProductService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// One page of products matching `filter`.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<ApiResponse<Paginated<Product>>, ApiError> {
        self.api.send(ApiRequest::get("/products").query(filter)).await
    }

    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product(&self, slug: &str) -> Result<ApiResponse<Product>, ApiError> {
        self.api.send(ApiRequest::get("/products").segment(slug)).await
    }
}
