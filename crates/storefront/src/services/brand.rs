//! Brands and their products.

use babynest_core::{ApiResponse, Brand, Paginated, Product, ProductFilter};
use tracing::instrument;

use crate::api::{ApiClient, ApiRequest};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct BrandService {
    api: ApiClient,
}

impl BrandService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn get_brands(&self) -> Result<ApiResponse<Vec<Brand>>, ApiError> {
        self.api.send(ApiRequest::get("/brands")).await
    }

    #[instrument(skip(self, filter), fields(slug = %slug))]
    pub async fn get_brand_products(
        &self,
        slug: &str,
        filter: &ProductFilter,
    ) -> Result<ApiResponse<Paginated<Product>>, ApiError> {
        self.api
            .send(
                ApiRequest::get("/brands")
                    .segment(slug)
                    .segment("products")
                    .query(filter),
            )
            .await
    }
}
