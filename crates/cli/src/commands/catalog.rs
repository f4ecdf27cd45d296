//! Catalog browsing commands.

use babynest_core::ProductFilter;
use babynest_storefront::queries::StoreQueries;

use super::{CommandError, data, print_json};

pub async fn products(queries: &StoreQueries, filter: ProductFilter) -> Result<(), CommandError> {
    let page = data(queries.products(filter).fetch().await)?;
    tracing::info!(
        page = page.current_page,
        last_page = page.last_page,
        total = page.total,
        "Fetched products"
    );
    print_json(&page.data)
}

pub async fn product(queries: &StoreQueries, slug: &str) -> Result<(), CommandError> {
    let product = data(queries.product(slug).fetch().await)?;
    let product = Option::as_ref(&product)
        .ok_or_else(|| CommandError::NotFound(format!("product '{slug}'")))?;
    print_json(product)
}

pub async fn categories(queries: &StoreQueries) -> Result<(), CommandError> {
    print_json(&*data(queries.categories().fetch().await)?)
}

pub async fn brands(queries: &StoreQueries) -> Result<(), CommandError> {
    print_json(&*data(queries.brands().fetch().await)?)
}
