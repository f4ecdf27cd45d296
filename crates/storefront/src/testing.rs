//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::api::{ApiClient, HttpRequest, HttpResponse, Transport, TransportError};
use crate::config::ApiConfig;
use crate::queries::StoreQueries;
use crate::query::{QueryClient, QueryOptions};
use crate::services::Services;

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;
type Pacer = Box<dyn Fn(&HttpRequest) -> Duration + Send + Sync>;

/// Transport that records requests and answers from a closure.
pub struct MockTransport {
    responder: Responder,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
    pacer: Pacer,
}

impl MockTransport {
    /// Answer every request through `responder`.
    pub fn with(
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self::build(Box::new(responder), Box::new(|_| Duration::ZERO)))
    }

    /// Like [`MockTransport::with`], but every answer takes `delay`.
    pub fn delayed(
        delay: Duration,
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self::build(Box::new(responder), Box::new(move |_| delay)))
    }

    /// Like [`MockTransport::with`], but each answer takes as long as
    /// `pacer` says for its request.
    pub fn paced(
        pacer: impl Fn(&HttpRequest) -> Duration + Send + Sync + 'static,
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self::build(Box::new(responder), Box::new(pacer)))
    }

    /// Answer every request with `status` and a JSON body.
    pub fn respond(status: u16, body: serde_json::Value) -> Arc<Self> {
        Self::with(move |_| Ok(json_response(status, &body)))
    }

    /// Answer every request with 200 and a JSON body.
    pub fn ok(body: serde_json::Value) -> Arc<Self> {
        Self::respond(200, body)
    }

    fn build(responder: Responder, pacer: Pacer) -> Self {
        Self {
            responder,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            pacer,
        }
    }

    /// Number of requests sent so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = (self.responder)(&request);
        let delay = (self.pacer)(&request);
        self.requests.lock().unwrap().push(request);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        response
    }
}

/// A response with a JSON body.
pub fn json_response(status: u16, body: &serde_json::Value) -> HttpResponse {
    HttpResponse {
        status,
        body: serde_json::to_vec(body).unwrap(),
    }
}

/// Adapter configuration pointing at a fake host.
pub fn api_config() -> ApiConfig {
    ApiConfig::new(Url::parse("https://api.babynest.test/api/v1").unwrap())
}

/// Queries over `transport` with default cache options.
pub fn store_queries(transport: Arc<dyn Transport>) -> StoreQueries {
    let api = ApiClient::with_transport(&api_config(), transport);
    StoreQueries::new(
        Services::new(&api),
        QueryClient::new(QueryOptions::default()),
        api.session().clone(),
    )
}
