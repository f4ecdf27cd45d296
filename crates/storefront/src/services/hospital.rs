//! Hospital directory.

use babynest_core::{ApiResponse, Hospital, HospitalFilter, Paginated};
use tracing::instrument;

use crate::api::{ApiClient, ApiRequest};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct HospitalService {
    api: ApiClient,
}

impl HospitalService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn get_hospitals(
        &self,
        filter: &HospitalFilter,
    ) -> Result<ApiResponse<Paginated<Hospital>>, ApiError> {
        self.api.send(ApiRequest::get("/hospitals").query(filter)).await
    }
}
