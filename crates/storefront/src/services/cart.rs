//! Shopping cart and checkout summary.

use babynest_core::{AddToCart, ApiResponse, CartItem, CheckoutDetail, UpdateCartItem};
use tracing::instrument;
use uuid::Uuid;

use super::Acknowledgement;
use crate::api::{ApiClient, ApiRequest};
use crate::error::ApiError;

/// Server-side cart of the signed-in user.
///
/// Every call needs the bearer credential. There is no local cart; the
/// server is the only copy.
#[derive(Debug, Clone)]
pub struct CartService {
    api: ApiClient,
}

impl CartService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<ApiResponse<Vec<CartItem>>, ApiError> {
        self.api.send(ApiRequest::get("/cart").auth()).await
    }

    #[instrument(skip(self), fields(item_uuid = %item.item_uuid))]
    pub async fn add_to_cart(&self, item: &AddToCart) -> Result<Acknowledgement, ApiError> {
        self.api
            .send(ApiRequest::post("/cart").auth().json(item)?)
            .await
    }

    #[instrument(skip(self), fields(item_uuid = %item_uuid))]
    pub async fn update_cart_item(
        &self,
        item_uuid: Uuid,
        update: UpdateCartItem,
    ) -> Result<Acknowledgement, ApiError> {
        self.api
            .send(
                ApiRequest::put("/cart").segment(item_uuid)
                    .auth()
                    .json(&update)?,
            )
            .await
    }

    #[instrument(skip(self), fields(item_uuid = %item_uuid))]
    pub async fn remove_cart_item(&self, item_uuid: Uuid) -> Result<Acknowledgement, ApiError> {
        self.api
            .send(ApiRequest::delete("/cart").segment(item_uuid).auth())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_checkout_detail(&self) -> Result<ApiResponse<CheckoutDetail>, ApiError> {
        self.api.send(ApiRequest::get("/checkout-detail").auth()).await
    }
}
