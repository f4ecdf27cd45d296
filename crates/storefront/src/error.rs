//! Normalized API errors.
//!
//! Every failure surfaced by the adapter is an [`ApiError`]. When the server
//! answers with an error body, that body replaces the transport-level failure
//! ([`ApiError::Server`]); when it does not, the raw status is kept
//! ([`ApiError::Status`]). Transport failures such as timeouts keep their own
//! variant.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::api::TransportError;

/// Errors returned by the adapter, the services and the query layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (timeout, connection).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with an error payload.
    #[error("API error {status}: {}", .payload.summary())]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error body sent by the server.
        payload: ErrorPayload,
    },

    /// The server answered with a non-success status and no usable payload.
    #[error("HTTP {status}: {}", truncate(.body))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A success body could not be decoded into the expected type.
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request body could not be encoded.
    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The request URL could not be built.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of the response, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the request as unauthenticated (HTTP 401).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }

    /// Whether repeating the same read could succeed.
    ///
    /// Transport failures, request timeouts (408), throttling (429) and
    /// server faults (5xx) are retryable. Client errors, validation errors and
    /// undecodable bodies are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_retryable(),
            Self::Server { status, .. } | Self::Status { status, .. } => {
                matches!(status, 408 | 429 | 500..=599)
            }
            Self::Decode(_) | Self::Encode(_) | Self::Url(_) => false,
        }
    }

    /// Server-provided message, when there is one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Server { payload, .. } => payload.message.as_deref(),
            _ => None,
        }
    }
}

/// Error body returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    /// Top-level message.
    pub message: Option<String>,
    /// Field validation errors, keyed by field name.
    pub errors: BTreeMap<String, Vec<String>>,
    /// The complete body as received.
    pub raw: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

impl ErrorPayload {
    /// Interpret a JSON error body.
    ///
    /// Returns `None` for `null`, so the caller can fall back to the raw
    /// status error. Bodies that do not follow the usual shape are kept as
    /// `raw` with no message.
    #[must_use]
    pub fn from_value(raw: serde_json::Value) -> Option<Self> {
        if raw.is_null() {
            return None;
        }

        let body = serde_json::from_value::<ErrorBody>(raw.clone()).unwrap_or(ErrorBody {
            message: raw.as_str().map(str::to_owned),
            errors: BTreeMap::new(),
        });

        Some(Self {
            message: body.message,
            errors: body.errors,
            raw,
        })
    }

    fn summary(&self) -> String {
        let mut parts = Vec::new();

        if let Some(message) = &self.message {
            parts.push(message.clone());
        }

        for (field, messages) in &self.errors {
            parts.push(format!("{field}: {}", messages.join(", ")));
        }

        if parts.is_empty() {
            truncate(&self.raw.to_string())
        } else {
            parts.join("; ")
        }
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn server(status: u16, raw: serde_json::Value) -> ApiError {
        ApiError::Server {
            status,
            payload: ErrorPayload::from_value(raw).unwrap(),
        }
    }

    #[test]
    fn test_server_error_display_includes_validation() {
        let err = server(
            422,
            json!({
                "message": "The given data was invalid.",
                "errors": { "quantity": ["The quantity must be at least 1."] }
            }),
        );
        assert_eq!(
            err.to_string(),
            "API error 422: The given data was invalid.; quantity: The quantity must be at least 1."
        );
        assert_eq!(err.message(), Some("The given data was invalid."));
    }

    #[test]
    fn test_unusual_payload_kept_raw() {
        let err = server(500, json!(["boom"]));
        assert_eq!(err.to_string(), "API error 500: [\"boom\"]");
        assert_eq!(err.message(), None);
    }

    #[test]
    fn test_null_payload_is_none() {
        assert!(ErrorPayload::from_value(serde_json::Value::Null).is_none());
    }

    #[test]
    fn test_retry_eligibility() {
        assert!(ApiError::Transport(TransportError::Timeout).is_retryable());
        assert!(server(503, json!({"message": "down"})).is_retryable());
        assert!(server(429, json!({})).is_retryable());
        assert!(!server(422, json!({})).is_retryable());
        assert!(
            !ApiError::Status {
                status: 404,
                body: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_unauthorized() {
        let err = server(401, json!({"message": "Unauthenticated."}));
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
        assert!(!ApiError::Transport(TransportError::Timeout).is_unauthorized());
    }
}
