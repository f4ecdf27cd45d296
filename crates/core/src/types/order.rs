//! Orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::ItemType;
use super::id::{AddressId, VariantId};
use super::status::{OrderStatus, PaymentMethod};

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_uuid: Uuid,
    #[serde(default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub uuid: Uuid,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /orders`; the server builds the order from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub address_id: AddressId,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
