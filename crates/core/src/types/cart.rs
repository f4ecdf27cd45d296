//! Cart lines and checkout summary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::address::Address;
use super::id::VariantId;

/// Kind of item a cart line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    Product,
    Package,
    #[serde(other)]
    Unknown,
}

/// A line in the customer's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub item_uuid: Uuid,
    #[serde(default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToCart {
    pub item_uuid: Uuid,
    pub item_type: ItemType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
}

/// Body of `PUT /cart/{item_uuid}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateCartItem {
    pub quantity: u32,
}

/// Totals shown on the checkout page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutDetail {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub delivery_charge: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub total: Decimal,
    /// Saved addresses the order can ship to.
    #[serde(default)]
    pub addresses: Vec<Address>,
}
