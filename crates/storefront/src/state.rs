//! The storefront data layer, wired together.

use std::sync::Arc;

use crate::api::{ApiClient, Session, Transport, TransportError};
use crate::config::{ImageHosts, StorefrontConfig};
use crate::queries::StoreQueries;
use crate::query::QueryClient;
use crate::services::Services;

/// Adapter, services and query cache sharing one session.
///
/// This struct is cheaply cloneable via `Arc`. Create it once per process;
/// the query cache lives as long as it does.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    services: Services,
    queries: StoreQueries,
}

impl Storefront {
    /// Create the data layer over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, TransportError> {
        let api = ApiClient::new(&config.api)?;
        Ok(Self::from_client(config, api))
    }

    /// Create the data layer over an arbitrary transport.
    #[must_use]
    pub fn with_transport(config: StorefrontConfig, transport: Arc<dyn Transport>) -> Self {
        let api = ApiClient::with_transport(&config.api, transport);
        Self::from_client(config, api)
    }

    fn from_client(config: StorefrontConfig, api: ApiClient) -> Self {
        let services = Services::new(&api);
        let queries = StoreQueries::new(
            services.clone(),
            QueryClient::new(config.query),
            api.session().clone(),
        );

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                services,
                queries,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Direct access to the services, bypassing the cache.
    #[must_use]
    pub fn services(&self) -> &Services {
        &self.inner.services
    }

    #[must_use]
    pub fn queries(&self) -> &StoreQueries {
        &self.inner.queries
    }

    #[must_use]
    pub fn query_client(&self) -> &QueryClient {
        self.inner.queries.client()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.inner.api.session()
    }

    #[must_use]
    pub fn image_hosts(&self) -> &ImageHosts {
        &self.inner.config.images
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api", &self.inner.api)
            .field("query", &self.inner.config.query)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;
    use crate::query::QueryOptions;
    use crate::testing::{MockTransport, api_config};

    fn config() -> StorefrontConfig {
        let mut api = api_config();
        api.token = Some(SecretString::from("tok-123"));
        StorefrontConfig {
            api,
            query: QueryOptions::default(),
            images: ImageHosts::default(),
        }
    }

    #[tokio::test]
    async fn test_layers_share_session() {
        let transport = MockTransport::ok(json!({"data": []}));
        let storefront = Storefront::with_transport(config(), transport.clone());

        storefront.queries().cart().fetch().await;
        assert_eq!(
            transport.last_request().unwrap().header("Authorization"),
            Some("Bearer tok-123")
        );

        storefront.session().clear().await;
        storefront.services().cart.get_cart().await.unwrap();
        assert_eq!(transport.last_request().unwrap().header("Authorization"), None);
    }

    #[test]
    fn test_new_builds_http_client() {
        assert!(Storefront::new(config()).is_ok());
    }
}
