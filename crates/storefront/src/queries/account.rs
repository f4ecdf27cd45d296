//! Identity, session and saved addresses.

use babynest_core::{
    Address, AddressId, AddressInput, ApiResponse, GoogleLogin, LoginRequest, LoginResponse,
    RegisterInput, User,
};
use secrecy::SecretString;
use tracing::{info, instrument};

use super::{StoreQueries, resource};
use crate::error::ApiError;
use crate::query::{Query, QueryKey};
use crate::services::Acknowledgement;

/// Who is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentUser {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl StoreQueries {
    /// The signed-in user.
    ///
    /// A 401 resolves to an unauthenticated result rather than an error, and
    /// the query never retries.
    #[must_use]
    pub fn current_user(&self) -> Query<CurrentUser> {
        let options = self.client.default_options().with_retry(0);
        let service = self.services.auth.clone();

        self.client
            .query_with(QueryKey::new(resource::USER), options, move || {
                let service = service.clone();
                async move {
                    match service.current_user().await {
                        Ok(body) => Ok(CurrentUser {
                            is_authenticated: body.data.is_some(),
                            user: body.data,
                        }),
                        Err(err) if err.is_unauthorized() => Ok(CurrentUser::default()),
                        Err(err) => Err(err),
                    }
                }
            })
    }

    #[must_use]
    pub fn addresses(&self) -> Query<Vec<Address>> {
        self.read(
            QueryKey::new(resource::ADDRESSES),
            &self.services.address,
            |service| async move { Ok(service.get_addresses().await?.into_data()) },
        )
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in and keep the returned token for authenticated calls.
    ///
    /// # Errors
    ///
    /// Returns the adapter error if the API rejects the credentials.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(
        &self,
        credentials: &LoginRequest,
    ) -> Result<ApiResponse<LoginResponse>, ApiError> {
        let body = self.services.auth.login(credentials).await?;
        self.start_session(&body).await;
        Ok(body)
    }

    /// Sign in with a Google identity token.
    ///
    /// # Errors
    ///
    /// Returns the adapter error if the exchange fails.
    #[instrument(skip(self, login))]
    pub async fn google_login(
        &self,
        login: &GoogleLogin,
    ) -> Result<ApiResponse<LoginResponse>, ApiError> {
        let body = self.services.auth.google_login(login).await?;
        self.start_session(&body).await;
        Ok(body)
    }

    /// Create an account, signing in when the API returns a token.
    ///
    /// # Errors
    ///
    /// Returns the adapter error, including field validation errors.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(
        &self,
        input: RegisterInput,
    ) -> Result<ApiResponse<LoginResponse>, ApiError> {
        let body = self.services.auth.register(input).await?;
        self.start_session(&body).await;
        Ok(body)
    }

    /// Sign out.
    ///
    /// The local session and the whole cache are cleared even when the API
    /// call fails.
    ///
    /// # Errors
    ///
    /// Returns the adapter error of the logout call.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Acknowledgement, ApiError> {
        let result = self.services.auth.logout().await;
        self.session.clear().await;
        self.client.clear().await;
        info!("Signed out");
        result
    }

    async fn start_session(&self, body: &ApiResponse<LoginResponse>) {
        if let Some(login) = &body.data {
            self.session
                .set_token(SecretString::from(login.access_token.clone()))
                .await;
            info!("Signed in");
            self.invalidate(&[resource::USER, resource::CART]).await;
        }
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn create_address(
        &self,
        input: &AddressInput,
    ) -> Result<ApiResponse<Address>, ApiError> {
        let body = self.services.address.create_address(input).await?;
        self.invalidate(ADDRESS_DEPENDENTS).await;
        Ok(body)
    }

    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn update_address(
        &self,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<ApiResponse<Address>, ApiError> {
        let body = self.services.address.update_address(id, input).await?;
        self.invalidate(ADDRESS_DEPENDENTS).await;
        Ok(body)
    }

    /// # Errors
    ///
    /// Returns the adapter error; nothing is invalidated on failure.
    pub async fn delete_address(&self, id: AddressId) -> Result<Acknowledgement, ApiError> {
        let body = self.services.address.delete_address(id).await?;
        self.invalidate(ADDRESS_DEPENDENTS).await;
        Ok(body)
    }
}

const ADDRESS_DEPENDENTS: &[&str] = &[resource::ADDRESSES, resource::CHECKOUT_DETAIL];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::testing::{MockTransport, json_response, store_queries};

    #[tokio::test(start_paused = true)]
    async fn test_current_user_unauthorized_is_not_an_error() {
        let transport = MockTransport::respond(401, json!({"message": "Unauthenticated."}));
        let queries = store_queries(transport.clone());

        let result = queries.current_user().fetch().await;

        assert!(!result.data.is_authenticated);
        assert!(result.data.user.is_none());
        assert!(result.error.is_none());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_user_does_not_retry() {
        let transport = MockTransport::respond(503, json!({"message": "Down"}));
        let queries = store_queries(transport.clone());

        let result = queries.current_user().fetch().await;

        assert_eq!(result.error.unwrap().status(), Some(503));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_stores_token_and_refreshes_user() {
        let transport = MockTransport::with(|request| {
            let body = match request.url.path() {
                "/api/v1/login" => json!({"data": {"access_token": "tok-new"}}),
                "/api/v1/user" if request.header("Authorization") == Some("Bearer tok-new") => {
                    json!({"data": {"id": 1, "uuid": "6f1c2f8e-8a43-4c57-9f0e-2d3b1f1a9c11", "name": "Rina"}})
                }
                _ => return Ok(json_response(401, &json!({"message": "Unauthenticated."}))),
            };
            Ok(json_response(200, &body))
        });
        let queries = store_queries(transport.clone());
        let me = queries.current_user();

        assert!(!me.fetch().await.data.is_authenticated);

        queries
            .login(&LoginRequest {
                email: "rina@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();

        assert!(me.snapshot().await.is_stale);
        let result = me.fetch().await;
        assert!(result.data.is_authenticated);
        assert_eq!(result.data.user.as_ref().unwrap().name, "Rina");
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_clears_session_and_cache_even_on_failure() {
        let transport = MockTransport::respond(500, json!({"message": "boom"}));
        let queries = store_queries(transport);
        queries.session.set_token(SecretString::from("tok")).await;
        queries
            .client
            .query(QueryKey::new(resource::CART), || async { Ok(3_u32) })
            .fetch()
            .await;

        assert!(queries.logout().await.is_err());

        assert!(!queries.session.is_authenticated().await);
        assert!(
            queries
                .client
                .get_query_data::<u32>(&QueryKey::new(resource::CART))
                .await
                .is_none()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_while_user_loads() {
        let transport = MockTransport::paced(
            |request| {
                if request.url.path() == "/api/v1/user" {
                    Duration::from_secs(2)
                } else {
                    Duration::ZERO
                }
            },
            |request| {
                let body = if request.url.path() == "/api/v1/user" {
                    json!({"data": {"id": 1, "uuid": "6f1c2f8e-8a43-4c57-9f0e-2d3b1f1a9c11", "name": "Rina"}})
                } else {
                    json!({"success": true})
                };
                Ok(json_response(200, &body))
            },
        );
        let queries = store_queries(transport);
        queries.session.set_token(SecretString::from("tok")).await;
        let me = Arc::new(queries.current_user());

        let loading = tokio::spawn({
            let me = me.clone();
            async move { me.fetch().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        queries.logout().await.unwrap();

        assert!(loading.await.unwrap().data.is_authenticated);
        assert!(!me.snapshot().await.has_data);
        assert!(
            queries
                .client
                .get_query_data::<CurrentUser>(&QueryKey::new(resource::USER))
                .await
                .is_none()
        );
    }
}
