//! Cart, checkout and orders.

use babynest_core::{
    AddToCart, ApiResponse, CartItem, CheckoutDetail, NewOrder, Order, PageParams, Paginated,
    UpdateCartItem,
};
use uuid::Uuid;

use super::{StoreQueries, resource};
use crate::error::ApiError;
use crate::query::{Query, QueryKey};
use crate::services::Acknowledgement;

const CART_DEPENDENTS: &[&str] = &[resource::CART, resource::CHECKOUT_DETAIL, resource::USER];

const ORDER_DEPENDENTS: &[&str] = &[
    resource::ORDERS,
    resource::CART,
    resource::CHECKOUT_DETAIL,
    resource::USER,
];

impl StoreQueries {
    #[must_use]
    pub fn cart(&self) -> Query<Vec<CartItem>> {
        self.read(
            QueryKey::new(resource::CART),
            &self.services.cart,
            |service| async move { Ok(service.get_cart().await?.into_data()) },
        )
    }

    #[must_use]
    pub fn checkout_detail(&self) -> Query<CheckoutDetail> {
        self.read(
            QueryKey::new(resource::CHECKOUT_DETAIL),
            &self.services.cart,
            |service| async move { Ok(service.get_checkout_detail().await?.into_data()) },
        )
    }

    /// One page of the signed-in user's orders.
    #[must_use]
    pub fn all_orders(&self, params: PageParams) -> Query<Paginated<Order>> {
        let key = QueryKey::new(resource::ORDERS).with(&params);
        self.read(key, &self.services.order, move |service| {
            let params = params.clone();
            async move { Ok(service.get_all_orders(&params).await?.into_data()) }
        })
    }

    #[must_use]
    pub fn order(&self, uuid: Uuid) -> Query<Option<Order>> {
        let key = QueryKey::new(resource::ORDER).param("uuid", uuid);
        self.read(key, &self.services.order, move |service| async move {
            Ok(service.get_order(uuid).await?.data)
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn add_to_cart(&self, item: &AddToCart) -> Result<Acknowledgement, ApiError> {
        let body = self.services.cart.add_to_cart(item).await?;
        self.invalidate(CART_DEPENDENTS).await;
        Ok(body)
    }

    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn update_cart_item(
        &self,
        item_uuid: Uuid,
        update: UpdateCartItem,
    ) -> Result<Acknowledgement, ApiError> {
        let body = self.services.cart.update_cart_item(item_uuid, update).await?;
        self.invalidate(CART_DEPENDENTS).await;
        Ok(body)
    }

    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn remove_cart_item(&self, item_uuid: Uuid) -> Result<Acknowledgement, ApiError> {
        let body = self.services.cart.remove_cart_item(item_uuid).await?;
        self.invalidate(CART_DEPENDENTS).await;
        Ok(body)
    }

    /// Place an order; the cart, checkout summary and order list are refreshed.
    ///
    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn create_order(&self, order: &NewOrder) -> Result<ApiResponse<Order>, ApiError> {
        let body = self.services.order.create_order(order).await?;
        self.invalidate(ORDER_DEPENDENTS).await;
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use babynest_core::{AddressId, ItemType, PaymentMethod};
    use serde_json::json;

    use super::*;
    use crate::api::HttpMethod;
    use crate::testing::{MockTransport, json_response, store_queries};

    const ORDERS_PAGE: &str = r#"{"data": {"data": [{
        "uuid": "0b5f8c1e-2f5d-4c6e-9a51-0a3d2f3b7c44",
        "status": "pending",
        "total": "450.00"
    }], "current_page": 2, "last_page": 3}}"#;

    fn orders_transport() -> Arc<MockTransport> {
        MockTransport::with(|request| {
            if request.method == HttpMethod::Get && request.url.path() == "/api/v1/orders" {
                Ok(json_response(200, &serde_json::from_str(ORDERS_PAGE).unwrap()))
            } else {
                Ok(json_response(200, &json!({"success": true})))
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_orders_page_two_cached_for_ten_minutes() {
        let transport = orders_transport();
        let queries = store_queries(transport.clone());
        let orders = queries.all_orders(PageParams::page(2));

        let first = orders.fetch().await;
        tokio::time::advance(Duration::from_secs(9 * 60)).await;
        let second = orders.fetch().await;

        assert_eq!(transport.calls(), 1);
        assert!(Arc::ptr_eq(&first.data, &second.data));
        assert!(first.data.has_next());

        tokio::time::advance(Duration::from_secs(60)).await;
        orders.fetch().await;

        assert_eq!(transport.calls(), 2);
        assert_eq!(
            transport.last_request().unwrap().url.query(),
            Some("page=2")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_order_invalidates_orders_and_cart() {
        let transport = orders_transport();
        let queries = store_queries(transport.clone());
        let orders = queries.all_orders(PageParams::page(2));
        let products = queries.products(babynest_core::ProductFilter::default());

        orders.fetch().await;
        products.fetch().await;
        assert_eq!(transport.calls(), 2);

        queries
            .create_order(&NewOrder {
                address_id: AddressId::new(1),
                payment_method: PaymentMethod::CashOnDelivery,
                note: None,
            })
            .await
            .unwrap();

        assert!(orders.snapshot().await.is_stale);
        assert!(!products.snapshot().await.is_stale);

        orders.fetch().await;
        products.fetch().await;
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_to_cart_while_cart_loads() {
        let added = Arc::new(AtomicBool::new(false));
        let transport = MockTransport::paced(
            |request| {
                if request.method == HttpMethod::Get {
                    Duration::from_secs(2)
                } else {
                    Duration::ZERO
                }
            },
            {
                let added = added.clone();
                move |request| {
                    if request.method == HttpMethod::Post {
                        added.store(true, Ordering::SeqCst);
                        return Ok(json_response(200, &json!({"success": true})));
                    }
                    let lines = if added.load(Ordering::SeqCst) {
                        json!([{
                            "item_uuid": Uuid::nil(),
                            "quantity": 1,
                            "price": "120.00",
                            "subtotal": "120.00"
                        }])
                    } else {
                        json!([])
                    };
                    Ok(json_response(200, &json!({"data": lines})))
                }
            },
        );
        let queries = store_queries(transport.clone());
        let cart = Arc::new(queries.cart());

        let loading = tokio::spawn({
            let cart = cart.clone();
            async move { cart.fetch().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        queries
            .add_to_cart(&AddToCart {
                item_uuid: Uuid::nil(),
                item_type: ItemType::Product,
                variant_id: None,
                quantity: 1,
            })
            .await
            .unwrap();

        assert!(loading.await.unwrap().data.is_empty());
        assert!(cart.snapshot().await.is_stale);

        let refreshed = cart.fetch().await;
        assert_eq!(refreshed.data.len(), 1);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_mutation_invalidates_nothing() {
        let transport = MockTransport::with(|request| {
            if request.method == HttpMethod::Post {
                Ok(json_response(422, &json!({"message": "Out of stock"})))
            } else {
                Ok(json_response(200, &json!({"data": []})))
            }
        });
        let queries = store_queries(transport);
        let cart = queries.cart();
        cart.fetch().await;

        let err = queries
            .add_to_cart(&AddToCart {
                item_uuid: Uuid::nil(),
                item_type: ItemType::Product,
                variant_id: None,
                quantity: 9,
            })
            .await
            .unwrap_err();

        assert_eq!(err.message(), Some("Out of stock"));
        assert!(!cart.snapshot().await.is_stale);
    }
}
