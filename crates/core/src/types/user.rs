//! Authenticated user and authentication payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::id::UserId;
use super::upload::FileUpload;

/// The authenticated customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Number of lines in the customer's cart.
    #[serde(default)]
    pub cart_item_count: u32,
    /// Number of products on the customer's wishlist.
    #[serde(default)]
    pub favourite_item_count: u32,
}

/// Credentials for `POST /login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Email address or phone number.
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Google ID token exchanged for an API token.
#[derive(Clone, Serialize)]
pub struct GoogleLogin {
    pub token: String,
}

impl std::fmt::Debug for GoogleLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleLogin")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Payload of a successful login or registration.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for authenticated endpoints.
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("user", &self.user)
            .finish()
    }
}

/// Registration form, sent as multipart because of the optional avatar.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub password_confirmation: String,
    pub avatar: Option<FileUpload>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_counts_default_to_zero() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"uuid":"6f1c2f8e-8a43-4c57-9f0e-2d3b1f1a9c11","name":"Rina"}"#,
        )
        .unwrap();
        assert_eq!(user.cart_item_count, 0);
        assert_eq!(user.favourite_item_count, 0);
        assert!(user.email.is_none());
    }

    #[test]
    fn test_login_response_accepts_token_alias() {
        let body: LoginResponse = serde_json::from_str(r#"{"token":"abc123"}"#).unwrap();
        assert_eq!(body.access_token, "abc123");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let request = LoginRequest {
            email: "rina@example.com".to_string(),
            password: "hunter2-super-secret".to_string(),
        };
        let output = format!("{request:?}");
        assert!(output.contains("rina@example.com"));
        assert!(!output.contains("hunter2-super-secret"));

        let response: LoginResponse =
            serde_json::from_str(r#"{"access_token":"tok-very-secret"}"#).unwrap();
        assert!(!format!("{response:?}").contains("tok-very-secret"));
    }
}
