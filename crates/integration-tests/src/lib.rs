//! Mock marketplace API for end-to-end tests.
//!
//! [`MockApi::spawn`] serves a small in-memory imitation of the Babynest REST
//! API on a random local port. Tests point a real
//! [`Storefront`](babynest_storefront::Storefront) at it, so requests travel
//! through the reqwest transport, and then inspect what the server saw.
//!
//! # Routes (under `/api/v1`)
//!
//! - `POST /login` - `rina@example.com` / `secret` yields [`VALID_TOKEN`]
//! - `GET /user` - needs the bearer token
//! - `GET /products`, `GET /products/{slug}` - public catalog
//! - `GET /orders` - needs the bearer token; echoes the page
//! - `POST /babies/{id}` - multipart profile update, only with `_method=PUT`
//! - `GET /slow` - answers after [`SLOW_RESPONSE`]
//! - `GET /broken` - 502 with an HTML body

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use url::Url;

/// Bearer token accepted by authenticated routes.
pub const VALID_TOKEN: &str = "tok-integration";

/// How long `GET /slow` takes to answer.
pub const SLOW_RESPONSE: Duration = Duration::from_secs(2);

/// What the server has seen so far.
#[derive(Debug, Default)]
pub struct Recorded {
    /// Requests per route name.
    pub hits: HashMap<&'static str, usize>,
    /// `Authorization` header of every request, in order.
    pub authorization: Vec<Option<String>>,
    /// Fields of the last multipart body; files appear as `file:<name>`.
    pub multipart: Vec<(String, String)>,
}

type Shared = Arc<RwLock<Recorded>>;

/// A running mock API.
pub struct MockApi {
    addr: SocketAddr,
    recorded: Shared,
    handle: JoinHandle<()>,
}

impl MockApi {
    /// Start the server on a random local port.
    ///
    /// # Errors
    ///
    /// Returns error if no local port can be bound.
    pub async fn spawn() -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let recorded = Shared::default();

        let app = app(recorded.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            recorded,
            handle,
        })
    }

    /// Base URL to configure the client with.
    ///
    /// # Errors
    ///
    /// Returns error if the address does not form a valid URL.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}/api/v1", self.addr))
    }

    /// Number of requests a route has served.
    pub async fn hits(&self, route: &str) -> usize {
        self.recorded.read().await.hits.get(route).copied().unwrap_or(0)
    }

    pub async fn authorization_headers(&self) -> Vec<Option<String>> {
        self.recorded.read().await.authorization.clone()
    }

    pub async fn multipart_fields(&self) -> Vec<(String, String)> {
        self.recorded.read().await.multipart.clone()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn app(recorded: Shared) -> Router {
    Router::new()
        .route("/api/v1/login", post(login))
        .route("/api/v1/user", get(current_user))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/{slug}", get(get_product))
        .route("/api/v1/orders", get(list_orders))
        .route("/api/v1/babies/{id}", post(update_baby))
        .route("/api/v1/slow", get(slow))
        .route("/api/v1/broken", get(broken))
        .with_state(recorded)
}

// =============================================================================
// Handlers
// =============================================================================

async fn record(state: &Shared, route: &'static str, headers: &HeaderMap) {
    let mut recorded = state.write().await;
    *recorded.hits.entry(route).or_default() += 1;
    recorded.authorization.push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
    );
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {VALID_TOKEN}").as_str())
}

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthenticated."})),
    )
        .into_response()
}

fn product(slug: &str) -> Value {
    json!({
        "id": 11,
        "slug": slug,
        "name": "Soft Baby Wipes",
        "brand": {"slug": "softy", "name": "Softy"},
        "price": "120.00",
        "previous_price": "150.00",
        "stock": 40,
        "rating": 4.5
    })
}

async fn login(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "login", &headers).await;

    if body["email"] == "rina@example.com" && body["password"] == "secret" {
        Json(json!({
            "success": true,
            "data": {"access_token": VALID_TOKEN, "token_type": "Bearer"}
        }))
        .into_response()
    } else {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "These credentials do not match our records.",
                "errors": {"email": ["These credentials do not match our records."]}
            })),
        )
            .into_response()
    }
}

async fn current_user(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record(&state, "user", &headers).await;

    if !is_authorized(&headers) {
        return unauthenticated();
    }

    Json(json!({
        "success": true,
        "data": {
            "id": 1,
            "uuid": "6f1c2f8e-8a43-4c57-9f0e-2d3b1f1a9c11",
            "name": "Rina",
            "email": "rina@example.com",
            "cart_item_count": 2
        }
    }))
    .into_response()
}

async fn list_products(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    record(&state, "products", &headers).await;

    let page: u32 = params
        .get("page")
        .and_then(|page| page.parse().ok())
        .unwrap_or(1);
    let slug = params
        .get("search")
        .map_or_else(|| "soft-wipes".to_string(), |search| format!("{search}-result"));

    Json(json!({
        "success": true,
        "data": {
            "data": [product(&slug)],
            "current_page": page,
            "last_page": 3,
            "per_page": 1,
            "total": 3
        }
    }))
}

async fn get_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Response {
    record(&state, "product", &headers).await;

    if slug == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Product not found"})),
        )
            .into_response();
    }

    Json(json!({"success": true, "data": product(&slug)})).into_response()
}

async fn list_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record(&state, "orders", &headers).await;

    if !is_authorized(&headers) {
        return unauthenticated();
    }

    let page: u32 = params
        .get("page")
        .and_then(|page| page.parse().ok())
        .unwrap_or(1);

    Json(json!({
        "success": true,
        "data": {
            "data": [{
                "uuid": "0b5f8c1e-2f5d-4c6e-9a51-0a3d2f3b7c44",
                "status": "shipped",
                "total": "450.00",
                "items": [{
                    "item_uuid": "5d8e8f0a-1c9b-4b7e-8f3a-2e6d4c1b0a99",
                    "item_type": "product",
                    "name": "Soft Baby Wipes",
                    "quantity": 3,
                    "price": "150.00",
                    "subtotal": "450.00"
                }]
            }],
            "current_page": page,
            "last_page": 2
        }
    }))
    .into_response()
}

async fn update_baby(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Response {
    record(&state, "update_baby", &headers).await;

    if !is_authorized(&headers) {
        return unauthenticated();
    }

    let mut fields = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        };

        let name = field.name().unwrap_or_default().to_owned();
        let value = match field.file_name().map(str::to_owned) {
            Some(file_name) => format!("file:{file_name}"),
            None => match field.text().await {
                Ok(text) => text,
                Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            },
        };
        fields.push((name, value));
    }

    let text = |name: &str| {
        fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.clone())
    };

    if text("_method").as_deref() != Some("PUT") {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({"message": "The POST method is not supported for this route."})),
        )
            .into_response();
    }

    let body = json!({
        "success": true,
        "data": {
            "id": id,
            "name": text("name"),
            "dob": text("dob"),
            "gender": text("gender"),
            "vaccines": []
        }
    });

    state.write().await.multipart = fields;
    Json(body).into_response()
}

async fn slow(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    record(&state, "slow", &headers).await;
    tokio::time::sleep(SLOW_RESPONSE).await;
    Json(json!({"success": true}))
}

async fn broken(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record(&state, "broken", &headers).await;
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body>502 Bad Gateway</body></html>",
    )
        .into_response()
}
