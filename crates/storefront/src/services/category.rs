//! Product categories.

use babynest_core::{ApiResponse, Category, Paginated, Product, ProductFilter};
use tracing::instrument;

use crate::api::{ApiClient, ApiRequest};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct CategoryService {
    api: ApiClient,
}

impl CategoryService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<ApiResponse<Vec<Category>>, ApiError> {
        self.api.send(ApiRequest::get("/categories")).await
    }

    #[instrument(skip(self, filter), fields(slug = %slug))]
    pub async fn get_category_products(
        &self,
        slug: &str,
        filter: &ProductFilter,
    ) -> Result<ApiResponse<Paginated<Product>>, ApiError> {
        self.api
            .send(
                ApiRequest::get("/categories")
                    .segment(slug)
                    .segment("products")
                    .query(filter),
            )
            .await
    }
}
