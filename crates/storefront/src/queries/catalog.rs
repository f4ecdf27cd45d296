//! Product, category and brand listings.

use babynest_core::{Brand, Category, Paginated, Product, ProductFilter};

use super::{StoreQueries, resource};
use crate::query::{Query, QueryKey};

impl StoreQueries {
    /// One page of products matching `filter`.
    #[must_use]
    pub fn products(&self, filter: ProductFilter) -> Query<Paginated<Product>> {
        let key = QueryKey::new(resource::PRODUCTS).with(&filter);
        self.read(key, &self.services.product, move |service| {
            let filter = filter.clone();
            async move { Ok(service.get_products(&filter).await?.into_data()) }
        })
    }

    /// A single product; `None` when the API sends no record.
    #[must_use]
    pub fn product(&self, slug: &str) -> Query<Option<Product>> {
        let slug = slug.trim().to_owned();
        let key = QueryKey::new(resource::PRODUCT).param("slug", &slug);
        self.read(key, &self.services.product, move |service| {
            let slug = slug.clone();
            async move { Ok(service.get_product(&slug).await?.data) }
        })
    }

    #[must_use]
    pub fn categories(&self) -> Query<Vec<Category>> {
        self.read(
            QueryKey::new(resource::CATEGORIES),
            &self.services.category,
            |service| async move { Ok(service.get_categories().await?.into_data()) },
        )
    }

    #[must_use]
    pub fn category_products(
        &self,
        slug: &str,
        filter: ProductFilter,
    ) -> Query<Paginated<Product>> {
        let slug = slug.trim().to_owned();
        let key = QueryKey::new(resource::CATEGORY_PRODUCTS)
            .param("slug", &slug)
            .with(&filter);
        self.read(key, &self.services.category, move |service| {
            let slug = slug.clone();
            let filter = filter.clone();
            async move {
                Ok(service
                    .get_category_products(&slug, &filter)
                    .await?
                    .into_data())
            }
        })
    }

    #[must_use]
    pub fn brands(&self) -> Query<Vec<Brand>> {
        self.read(
            QueryKey::new(resource::BRANDS),
            &self.services.brand,
            |service| async move { Ok(service.get_brands().await?.into_data()) },
        )
    }

    #[must_use]
    pub fn brand_products(&self, slug: &str, filter: ProductFilter) -> Query<Paginated<Product>> {
        let slug = slug.trim().to_owned();
        let key = QueryKey::new(resource::BRAND_PRODUCTS)
            .param("slug", &slug)
            .with(&filter);
        self.read(key, &self.services.brand, move |service| {
            let slug = slug.clone();
            let filter = filter.clone();
            async move { Ok(service.get_brand_products(&slug, &filter).await?.into_data()) }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::testing::{MockTransport, store_queries};

    #[tokio::test(start_paused = true)]
    async fn test_equivalent_filters_share_request() {
        let transport = MockTransport::ok(json!({
            "data": {"data": [{"slug": "soft-wipes", "name": "Soft Wipes", "price": "120.00"}]}
        }));
        let queries = store_queries(transport.clone());

        let first = queries.products(ProductFilter::search("wipes")).fetch().await;
        let second = queries
            .products(ProductFilter {
                search: Some("  wipes ".to_string()),
                brand: Some(String::new()),
                ..ProductFilter::default()
            })
            .fetch()
            .await;

        assert_eq!(transport.calls(), 1);
        assert!(Arc::ptr_eq(&first.data, &second.data));
        assert_eq!(first.data.data[0].slug, "soft-wipes");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_product_is_none() {
        let transport = MockTransport::ok(json!({"success": true}));
        let queries = store_queries(transport);

        let result = queries.product("ghost").fetch().await;
        assert!(result.is_success());
        assert!(result.data.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slug_is_part_of_key() {
        let transport = MockTransport::ok(json!({"data": {"data": []}}));
        let queries = store_queries(transport.clone());

        queries
            .category_products("diapers", ProductFilter::default())
            .fetch()
            .await;
        queries
            .category_products("bottles", ProductFilter::default())
            .fetch()
            .await;

        assert_eq!(transport.calls(), 2);
        assert_eq!(
            transport.last_request().unwrap().url.path(),
            "/api/v1/categories/bottles/products"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_padded_slug_requests_trimmed_slug() {
        let transport = MockTransport::ok(json!({
            "data": {"slug": "soft-wipes", "name": "Soft Wipes", "price": "120.00"}
        }));
        let queries = store_queries(transport.clone());

        let padded = queries.product(" soft-wipes ");
        let plain = queries.product("soft-wipes");
        assert_eq!(padded.key(), plain.key());

        padded.fetch().await;
        plain.fetch().await;

        assert_eq!(transport.calls(), 1);
        assert_eq!(
            transport.last_request().unwrap().url.path(),
            "/api/v1/products/soft-wipes"
        );

        queries
            .brand_products(" pigeon\t", ProductFilter::default())
            .fetch()
            .await;
        assert_eq!(
            transport.last_request().unwrap().url.path(),
            "/api/v1/brands/pigeon/products"
        );
    }
}
