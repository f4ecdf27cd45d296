//! Parenting blog posts.

use babynest_core::{ApiResponse, Blog, PageParams, Paginated};
use tracing::instrument;

use crate::api::{ApiClient, ApiRequest};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct BlogService {
    api: ApiClient,
}

impl BlogService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn get_blogs(
        &self,
        params: &PageParams,
    ) -> Result<ApiResponse<Paginated<Blog>>, ApiError> {
        self.api.send(ApiRequest::get("/blogs").query(params)).await
    }

    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_blog(&self, slug: &str) -> Result<ApiResponse<Blog>, ApiError> {
        self.api.send(ApiRequest::get("/blogs").segment(slug)).await
    }
}
