//! Authentication endpoints.

use babynest_core::{ApiResponse, GoogleLogin, LoginRequest, LoginResponse, RegisterInput, User};
use tracing::instrument;

use super::Acknowledgement;
use crate::api::{ApiClient, ApiRequest, MultipartForm};
use crate::error::ApiError;

impl From<RegisterInput> for MultipartForm {
    fn from(input: RegisterInput) -> Self {
        Self::new()
            .text("name", input.name)
            .text("email", input.email)
            .text_opt("phone", input.phone)
            .text("password", input.password)
            .text("password_confirmation", input.password_confirmation)
            .file_opt("avatar", input.avatar)
    }
}

/// Login, registration and the current identity.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for a bearer token.
    ///
    /// The token is returned, not stored; see `StoreQueries::login`.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(
        &self,
        credentials: &LoginRequest,
    ) -> Result<ApiResponse<LoginResponse>, ApiError> {
        self.api
            .send(ApiRequest::post("/login").json(credentials)?)
            .await
    }

    /// Create an account. Sent as multipart so an avatar can ride along.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(
        &self,
        input: RegisterInput,
    ) -> Result<ApiResponse<LoginResponse>, ApiError> {
        self.api
            .send(ApiRequest::post("/register").multipart(input.into()))
            .await
    }

    /// Exchange a Google identity token for a bearer token.
    #[instrument(skip(self, login))]
    pub async fn google_login(
        &self,
        login: &GoogleLogin,
    ) -> Result<ApiResponse<LoginResponse>, ApiError> {
        self.api
            .send(ApiRequest::post("/auth/google").json(login)?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<ApiResponse<User>, ApiError> {
        self.api.send(ApiRequest::get("/user").auth()).await
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Acknowledgement, ApiError> {
        self.api.send(ApiRequest::post("/logout").auth()).await
    }
}
