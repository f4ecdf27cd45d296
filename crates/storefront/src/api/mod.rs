//! HTTP client adapter for the marketplace API.
//!
//! # Architecture
//!
//! - [`ApiRequest`] describes a logical call: method, path, query, body and
//!   whether it needs the bearer credential
//! - [`ApiClient`] resolves it against the base URL, attaches headers, hands it
//!   to a [`Transport`] and normalizes the outcome
//! - Success bodies are decoded straight into the caller's type
//! - Error bodies replace the transport failure as [`ApiError::Server`]
//!
//! There is no retry here; retry lives in the query layer and only for reads.
//!
//! # Example
//!
//! ```rust,ignore
//! use babynest_storefront::api::{ApiClient, ApiRequest};
//!
//! let api = ApiClient::new(&config.api)?;
//! let body: ApiResponse<Paginated<Order>> = api
//!     .send(ApiRequest::get("/orders").auth().query(&PageParams::page(2)))
//!     .await?;
//! ```

mod multipart;
mod session;
mod transport;

pub use multipart::{MultipartForm, Part};
pub use session::Session;
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, RequestBody, Transport,
    TransportError,
};

use std::sync::Arc;

use babynest_core::QueryParams;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::{ParseError, Url};

use crate::config::ApiConfig;
use crate::error::{ApiError, ErrorPayload};

// =============================================================================
// ApiRequest
// =============================================================================

/// A logical request against the API, before URL resolution.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: HttpMethod,
    /// Unescaped path segments below the base URL.
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: RequestBody,
    auth: bool,
}

impl ApiRequest {
    /// Create a request for a fixed `path`, relative to the API base URL.
    ///
    /// Values that vary per call (slugs, ids) go through
    /// [`ApiRequest::segment`] so they are escaped.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl AsRef<str>) -> Self {
        Self {
            method,
            segments: path
                .as_ref()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
            query: Vec::new(),
            body: RequestBody::Empty,
            auth: false,
        }
    }

    /// `GET path`.
    #[must_use]
    pub fn get(path: impl AsRef<str>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// `POST path`.
    #[must_use]
    pub fn post(path: impl AsRef<str>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// `PUT path`.
    #[must_use]
    pub fn put(path: impl AsRef<str>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// `DELETE path`.
    #[must_use]
    pub fn delete(path: impl AsRef<str>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Append one path segment, percent-encoding `/`, `?`, `#` and the like.
    #[must_use]
    pub fn segment(mut self, segment: impl std::fmt::Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Mark the request as requiring the bearer credential.
    #[must_use]
    pub const fn auth(mut self) -> Self {
        self.auth = true;
        self
    }

    /// Append normalized query parameters.
    #[must_use]
    pub fn query(mut self, params: &impl QueryParams) -> Self {
        self.query.extend(
            params
                .pairs()
                .into_iter()
                .map(|(name, value)| (name.to_owned(), value)),
        );
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Encode` if `body` cannot be serialized.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        self.body = RequestBody::Json(serde_json::to_value(body).map_err(ApiError::Encode)?);
        Ok(self)
    }

    /// Attach a multipart body.
    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Whether the bearer credential will be attached.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        self.auth
    }

    /// Whether the body is sent as multipart form data.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the marketplace REST API.
///
/// Cheap to clone; all clones share the transport and the session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    transport: Arc<dyn Transport>,
    base_url: Url,
    session: Session,
    clear_session_on_unauthorized: bool,
}

impl ApiClient {
    /// Create a client that talks to the API over HTTP.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport.
    #[must_use]
    pub fn with_transport(config: &ApiConfig, transport: Arc<dyn Transport>) -> Self {
        let session = config
            .token
            .clone()
            .map_or_else(Session::new, Session::with_token);

        Self {
            inner: Arc::new(ApiClientInner {
                transport,
                base_url: config.base_url.clone(),
                session,
                clear_session_on_unauthorized: config.clear_session_on_unauthorized,
            }),
        }
    }

    /// The credential store used for authenticated requests.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve the request's path and query against the base URL.
    ///
    /// The path is appended to the base URL's path rather than replacing it,
    /// so a base of `https://host/api/v1` and a path of `/orders` resolve to
    /// `https://host/api/v1/orders`. Each segment is percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if the base URL cannot take a path.
    pub fn resolve(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(&request.segments);

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        Ok(url)
    }

    /// Send a request and decode the response body.
    ///
    /// # Errors
    ///
    /// - `ApiError::Transport` if no response was received
    /// - `ApiError::Server` if the server answered with an error payload
    /// - `ApiError::Status` if it answered with an error status and no payload
    /// - `ApiError::Decode` if a success body does not match `T`
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let url = self.resolve(&request)?;

        let mut headers = Vec::new();
        if request.auth {
            match self.inner.session.bearer().await {
                Some(bearer) => headers.push(("Authorization".to_owned(), bearer)),
                None => warn!(%url, "Authenticated request sent without a stored credential"),
            }
        }

        debug!(method = %request.method, url = %url, auth = request.auth, "Sending API request");

        let response = self
            .inner
            .transport
            .send(HttpRequest {
                method: request.method,
                url,
                headers,
                body: request.body,
            })
            .await?;

        if response.is_success() {
            return decode(&response.body);
        }

        if response.status == 401 && request.auth && self.inner.clear_session_on_unauthorized {
            warn!("API rejected the stored credential, clearing session");
            self.inner.session.clear().await;
        }

        Err(error_from_response(&response))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

/// Decode a success body; an empty body reads as an empty JSON object.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };

    serde_json::from_slice(body).map_err(ApiError::Decode)
}

fn error_from_response(response: &HttpResponse) -> ApiError {
    let status = response.status;

    serde_json::from_slice::<serde_json::Value>(&response.body)
        .ok()
        .and_then(ErrorPayload::from_value)
        .map_or_else(
            || ApiError::Status {
                status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            },
            |payload| ApiError::Server { status, payload },
        )
}
