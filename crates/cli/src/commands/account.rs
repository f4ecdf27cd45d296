//! Commands that act for the signed-in user.

use babynest_core::{BabyId, LoginRequest, PageParams};
use babynest_storefront::queries::StoreQueries;
use serde_json::json;
use uuid::Uuid;

use super::{CommandError, data, print_json};

pub async fn orders(queries: &StoreQueries, page: Option<u32>) -> Result<(), CommandError> {
    let orders = data(queries.all_orders(PageParams { page }).fetch().await)?;
    print_json(&*orders)
}

pub async fn order(queries: &StoreQueries, uuid: Uuid) -> Result<(), CommandError> {
    let order = data(queries.order(uuid).fetch().await)?;
    let order = Option::as_ref(&order).ok_or_else(|| CommandError::NotFound(format!("order {uuid}")))?;
    print_json(order)
}

pub async fn cart(queries: &StoreQueries) -> Result<(), CommandError> {
    let items = data(queries.cart().fetch().await)?;
    let quantity: u32 = items.iter().map(|item| item.quantity).sum();
    tracing::info!(lines = items.len(), quantity, "Fetched cart");
    print_json(&*items)
}

/// List every profile, or show one with the vaccines that still need attention.
pub async fn babies(queries: &StoreQueries, id: Option<BabyId>) -> Result<(), CommandError> {
    let Some(id) = id else {
        return print_json(&*data(queries.babies().fetch().await)?);
    };

    let baby = data(queries.baby(id).fetch().await)?;
    let baby = Option::as_ref(&baby).ok_or_else(|| CommandError::NotFound(format!("baby {id}")))?;
    print_json(&json!({
        "baby": baby,
        "pending_vaccines": baby.pending_vaccines(),
    }))
}

pub async fn me(queries: &StoreQueries) -> Result<(), CommandError> {
    let current = data(queries.current_user().fetch().await)?;
    print_json(&json!({
        "is_authenticated": current.is_authenticated,
        "user": current.user,
    }))
}

pub async fn login(
    queries: &StoreQueries,
    email: String,
    password: String,
) -> Result<(), CommandError> {
    let body = queries.login(&LoginRequest { email, password }).await?;
    let login = body
        .data
        .ok_or_else(|| CommandError::NotFound("token in login response".to_string()))?;

    print_json(&json!({
        "access_token": login.access_token,
        "token_type": login.token_type,
        "user": login.user,
    }))
}
