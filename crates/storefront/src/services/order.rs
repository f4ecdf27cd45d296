//! Orders placed by the signed-in user.

use babynest_core::{ApiResponse, NewOrder, Order, PageParams, Paginated};
use tracing::instrument;
use uuid::Uuid;

use crate::api::{ApiClient, ApiRequest};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Place an order from the current cart.
    #[instrument(skip(self, order), fields(address_id = %order.address_id))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<ApiResponse<Order>, ApiError> {
        self.api
            .send(ApiRequest::post("/orders").auth().json(order)?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_all_orders(
        &self,
        params: &PageParams,
    ) -> Result<ApiResponse<Paginated<Order>>, ApiError> {
        self.api
            .send(ApiRequest::get("/orders").auth().query(params))
            .await
    }

    #[instrument(skip(self), fields(order_uuid = %uuid))]
    pub async fn get_order(&self, uuid: Uuid) -> Result<ApiResponse<Order>, ApiError> {
        self.api
            .send(ApiRequest::get("/orders").segment(uuid).auth())
            .await
    }
}
