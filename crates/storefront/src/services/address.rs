//! Saved delivery addresses.

use babynest_core::{Address, AddressId, AddressInput, ApiResponse};
use tracing::instrument;

use super::Acknowledgement;
use crate::api::{ApiClient, ApiRequest};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct AddressService {
    api: ApiClient,
}

impl AddressService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn get_addresses(&self) -> Result<ApiResponse<Vec<Address>>, ApiError> {
        self.api.send(ApiRequest::get("/addresses").auth()).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_address(
        &self,
        input: &AddressInput,
    ) -> Result<ApiResponse<Address>, ApiError> {
        self.api
            .send(ApiRequest::post("/addresses").auth().json(input)?)
            .await
    }

    #[instrument(skip(self, input), fields(address_id = %id))]
    pub async fn update_address(
        &self,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<ApiResponse<Address>, ApiError> {
        self.api
            .send(ApiRequest::put("/addresses").segment(id).auth().json(input)?)
            .await
    }

    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn delete_address(&self, id: AddressId) -> Result<Acknowledgement, ApiError> {
        self.api
            .send(ApiRequest::delete("/addresses").segment(id).auth())
            .await
    }
}
