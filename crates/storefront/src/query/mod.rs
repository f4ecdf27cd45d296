//! Query cache for API reads.
//!
//! [`QueryClient`] is the cache context: one per process, cloned wherever it
//! is needed. A [`Query`] handle pairs a [`QueryKey`] with the function that
//! fetches it and observes the key for as long as it lives.
//!
//! # Behavior
//!
//! - A fresh cached value is returned as-is (same `Arc`), without I/O
//! - Concurrent fetches of one key share a single request
//! - Stale values are refetched when a handle fetches them, and when the
//!   window regains focus ([`QueryClient::window_focused`])
//! - Failed reads retry only when [`ApiError::is_retryable`] says so, with
//!   exponential backoff
//! - A value nobody observes is evicted once the garbage-collection window
//!   has passed since it was fetched or last observed
//!
//! Values are stored type-erased in `moka`; freshness and eviction are
//! decided here against `tokio::time::Instant`, so paused-clock tests drive
//! them deterministically. `moka` bounds capacity and coalesces in-flight
//! loads.
//!
//! # Example
//!
//! ```rust,ignore
//! let orders = client.query(QueryKey::new("orders").with(&PageParams::page(2)), {
//!     let service = services.order.clone();
//!     move || {
//!         let service = service.clone();
//!         async move { Ok(service.get_all_orders(&PageParams::page(2)).await?.into_data()) }
//!     }
//! });
//! let result = orders.fetch().await;
//! ```

mod key;
mod options;
mod result;

pub use key::QueryKey;
pub use options::{QueryOptions, retry_delay};
pub use result::QueryResult;

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use moka::future::Cache;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ApiError;

const MAX_ENTRIES: u64 = 10_000;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type Erased = Arc<dyn Any + Send + Sync>;
type ErasedFn = Arc<dyn Fn() -> BoxFuture<Result<Erased, ApiError>> + Send + Sync>;

/// A cached value and when it was fetched.
struct QueryEntry {
    data: Erased,
    fetched_at: Instant,
    gc_time: Duration,
    invalidated: bool,
}

impl QueryEntry {
    fn is_stale(&self, options: &QueryOptions, now: Instant) -> bool {
        self.invalidated || now >= self.fetched_at + options.stale_time
    }

    fn to_invalidated(&self) -> Self {
        Self {
            data: self.data.clone(),
            fetched_at: self.fetched_at,
            gc_time: self.gc_time,
            invalidated: true,
        }
    }
}

/// Bookkeeping for one key.
#[derive(Default)]
struct KeyState {
    observers: usize,
    released_at: Option<Instant>,
    fetching: usize,
    /// Bumped by every invalidation; a load started under an older
    /// generation cannot be stored as fresh.
    generation: u64,
    error: Option<Arc<ApiError>>,
    refetch: Option<(ErasedFn, QueryOptions)>,
}

/// The query cache.
///
/// Cheap to clone; all clones share the same cache.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<QueryClientInner>,
}

struct QueryClientInner {
    entries: Cache<QueryKey, Arc<QueryEntry>>,
    inflight: Cache<(QueryKey, u64), Arc<QueryEntry>>,
    states: Mutex<HashMap<QueryKey, KeyState>>,
    /// Bumped by `clear`; results of loads started before are discarded.
    epoch: AtomicU64,
    defaults: QueryOptions,
}

impl QueryClient {
    /// Create an empty cache whose queries default to `defaults`.
    #[must_use]
    pub fn new(defaults: QueryOptions) -> Self {
        Self {
            inner: Arc::new(QueryClientInner {
                entries: Cache::builder().max_capacity(MAX_ENTRIES).build(),
                inflight: Cache::builder().max_capacity(MAX_ENTRIES).build(),
                states: Mutex::new(HashMap::new()),
                epoch: AtomicU64::new(0),
                defaults,
            }),
        }
    }

    #[must_use]
    pub fn default_options(&self) -> QueryOptions {
        self.inner.defaults
    }

    /// Observe `key` with the default options.
    #[must_use]
    pub fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Query<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        self.query_with(key, self.inner.defaults, fetch)
    }

    /// Observe `key` with explicit options.
    #[must_use]
    pub fn query_with<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetch: F) -> Query<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let fetch: ErasedFn = Arc::new(move || -> BoxFuture<Result<Erased, ApiError>> {
            let fut = fetch();
            Box::pin(async move { fut.await.map(|value| Arc::new(value) as Erased) })
        });

        {
            let mut states = self.states();
            let state = states.entry(key.clone()).or_default();
            state.observers += 1;
            state.released_at = None;
            state.refetch = Some((fetch.clone(), options));
        }

        Query {
            client: self.clone(),
            _observer: Observer {
                client: self.clone(),
                key: key.clone(),
            },
            key,
            options,
            fetch,
            _marker: PhantomData,
        }
    }

    /// Cached value for `key`, if present and of type `T`.
    pub async fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.cached(key).await?.data.clone().downcast::<T>().ok()
    }

    /// Number of live handles observing `key`.
    #[must_use]
    pub fn observer_count(&self, key: &QueryKey) -> usize {
        self.states().get(key).map_or(0, |state| state.observers)
    }

    /// Mark `key` stale so its next fetch goes to the network.
    ///
    /// The current value stays visible to snapshots until then. A fetch
    /// already in flight for `key` stores its result as stale, and later
    /// fetches do not join it.
    pub async fn invalidate(&self, key: &QueryKey) {
        if let Some(state) = self.states().get_mut(key) {
            state.generation += 1;
        }

        if let Some(entry) = self.inner.entries.get(key).await {
            debug!(key = %key, "Invalidating query");
            self.inner
                .entries
                .insert(key.clone(), Arc::new(entry.to_invalidated()))
                .await;
        }
    }

    /// Invalidate every key of `resource`, whatever its parameters.
    pub async fn invalidate_resource(&self, resource: &str) {
        let mut keys: HashSet<QueryKey> = self
            .inner
            .entries
            .iter()
            .filter(|(key, _)| key.resource() == resource)
            .map(|(key, _)| (*key).clone())
            .collect();
        keys.extend(
            self.states()
                .keys()
                .filter(|key| key.resource() == resource)
                .cloned(),
        );

        for key in keys {
            self.invalidate(&key).await;
        }
    }

    /// Drop every cached value.
    ///
    /// Fetches in flight still answer their callers, but their results are
    /// not cached.
    pub async fn clear(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.inflight.invalidate_all();
        self.inner.entries.invalidate_all();
        self.inner.inflight.run_pending_tasks().await;
        self.inner.entries.run_pending_tasks().await;

        let mut states = self.states();
        states.retain(|_, state| state.observers > 0 || state.fetching > 0);
        for state in states.values_mut() {
            state.generation += 1;
            state.error = None;
        }
    }

    /// Refetch every observed query that is stale and opted into focus refetch.
    ///
    /// Returns the number of queries refetched.
    pub async fn window_focused(&self) -> usize {
        let candidates: Vec<(QueryKey, ErasedFn, QueryOptions)> = self
            .states()
            .iter()
            .filter(|(_, state)| state.observers > 0)
            .filter_map(|(key, state)| {
                let (fetch, options) = state.refetch.as_ref()?;
                options
                    .refetch_on_window_focus
                    .then(|| (key.clone(), fetch.clone(), *options))
            })
            .collect();

        let now = Instant::now();
        let mut tasks = JoinSet::new();

        for (key, fetch, options) in candidates {
            let fresh = self
                .cached(&key)
                .await
                .is_some_and(|entry| !entry.is_stale(&options, now));
            if fresh {
                continue;
            }

            let client = self.clone();
            tasks.spawn(async move {
                // Failures are recorded on the key for snapshots.
                let _ = client.fetch_entry(&key, &fetch, &options).await;
            });
        }

        let refetched = tasks.len();
        debug!(refetched, "Window focused");
        while tasks.join_next().await.is_some() {}
        refetched
    }

    /// Evict every unobserved value whose garbage-collection window has passed.
    ///
    /// Returns the number of values evicted.
    pub async fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<QueryKey> = self
            .inner
            .entries
            .iter()
            .filter(|(key, entry)| self.is_collectable(key, entry, now))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in &expired {
            self.evict(key).await;
        }

        expired.len()
    }

    /// Run [`QueryClient::collect_garbage`] every `period` in the background.
    #[must_use]
    pub fn spawn_garbage_collector(&self, period: Duration) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let evicted = client.collect_garbage().await;
                if evicted > 0 {
                    debug!(evicted, "Collected unobserved queries");
                }
            }
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn states(&self) -> MutexGuard<'_, HashMap<QueryKey, KeyState>> {
        self.inner
            .states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached entry for `key`, evicting it first if it is collectable.
    async fn cached(&self, key: &QueryKey) -> Option<Arc<QueryEntry>> {
        let entry = self.inner.entries.get(key).await?;
        if self.is_collectable(key, &entry, Instant::now()) {
            self.evict(key).await;
            return None;
        }
        Some(entry)
    }

    fn is_collectable(&self, key: &QueryKey, entry: &QueryEntry, now: Instant) -> bool {
        let released_at = match self.states().get(key) {
            Some(state) if state.observers > 0 || state.fetching > 0 => return false,
            Some(state) => state.released_at,
            None => None,
        };

        let idle_since = released_at.map_or(entry.fetched_at, |released| {
            released.max(entry.fetched_at)
        });
        now >= idle_since + entry.gc_time
    }

    async fn evict(&self, key: &QueryKey) {
        debug!(key = %key, "Evicting unobserved query");
        self.inner.entries.invalidate(key).await;

        let mut states = self.states();
        if states
            .get(key)
            .is_some_and(|state| state.observers == 0 && state.fetching == 0)
        {
            states.remove(key);
        }
    }

    fn is_fetching(&self, key: &QueryKey) -> bool {
        self.states().get(key).is_some_and(|state| state.fetching > 0)
    }

    fn last_error(&self, key: &QueryKey) -> Option<Arc<ApiError>> {
        self.states().get(key).and_then(|state| state.error.clone())
    }

    fn generation(&self, key: &QueryKey) -> u64 {
        self.states().get(key).map_or(0, |state| state.generation)
    }

    /// Fetch `key` from the network, sharing the request with concurrent
    /// callers, and store the result.
    async fn fetch_entry(
        &self,
        key: &QueryKey,
        fetch: &ErasedFn,
        options: &QueryOptions,
    ) -> Result<Arc<QueryEntry>, Arc<ApiError>> {
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let generation = {
            let mut states = self.states();
            let state = states.entry(key.clone()).or_default();
            state.fetching += 1;
            state.generation
        };
        let _fetching = FetchGuard { client: self, key };

        let load = {
            let key = key.clone();
            let fetch = fetch.clone();
            let options = *options;
            async move {
                let data = fetch_with_retry(&key, &fetch, options.retry).await?;
                Ok::<_, ApiError>(Arc::new(QueryEntry {
                    data,
                    fetched_at: Instant::now(),
                    gc_time: options.gc_time,
                    invalidated: false,
                }))
            }
        };

        let slot = (key.clone(), generation);
        let result = self.inner.inflight.try_get_with(slot.clone(), load).await;
        self.inner.inflight.invalidate(&slot).await;

        let result = result.map(|entry| {
            if self.generation(key) == generation {
                entry
            } else {
                debug!(key = %key, "Query invalidated while fetching");
                Arc::new(entry.to_invalidated())
            }
        });

        if let Ok(entry) = &result {
            self.store(key, entry, epoch).await;
        }

        if let Some(state) = self.states().get_mut(key) {
            state.error = result.as_ref().err().cloned();
        }

        result
    }

    /// Cache a loaded entry unless the cache was cleared since the load
    /// began. An invalidated entry never replaces an existing one.
    async fn store(&self, key: &QueryKey, entry: &Arc<QueryEntry>, epoch: u64) {
        if self.inner.epoch.load(Ordering::SeqCst) != epoch {
            debug!(key = %key, "Cache cleared while fetching, discarding result");
            return;
        }

        if entry.invalidated && self.inner.entries.contains_key(key) {
            return;
        }

        self.inner.entries.insert(key.clone(), entry.clone()).await;
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.inner.entries.entry_count())
            .field("defaults", &self.inner.defaults)
            .finish_non_exhaustive()
    }
}

async fn fetch_with_retry(key: &QueryKey, fetch: &ErasedFn, retry: u32) -> Result<Erased, ApiError> {
    let mut attempt = 0;
    loop {
        match fetch().await {
            Ok(data) => return Ok(data),
            Err(err) if attempt < retry && err.is_retryable() => {
                let delay = retry_delay(attempt);
                attempt += 1;
                warn!(key = %key, attempt, ?delay, error = %err, "Query failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                debug!(key = %key, error = %err, "Query failed");
                return Err(err);
            }
        }
    }
}

// =============================================================================
// Query
// =============================================================================

/// A handle observing one key.
///
/// While any handle for a key is alive the key's value is never evicted.
pub struct Query<T> {
    client: QueryClient,
    key: QueryKey,
    options: QueryOptions,
    fetch: ErasedFn,
    _observer: Observer,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Default + Send + Sync + 'static> Query<T> {
    #[must_use]
    pub const fn key(&self) -> &QueryKey {
        &self.key
    }

    #[must_use]
    pub const fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Read the value, going to the network only when needed.
    ///
    /// A fresh value is returned from cache. A stale one is refetched unless
    /// `refetch_on_mount` is off, in which case it is returned flagged stale.
    pub async fn fetch(&self) -> QueryResult<T> {
        let now = Instant::now();

        match self.client.cached(&self.key).await {
            Some(entry) if !entry.is_stale(&self.options, now) => {
                debug!(key = %self.key, "Query cache hit");
                self.result(Some(entry), None, false)
            }
            Some(entry) if !self.options.refetch_on_mount && !entry.invalidated => {
                debug!(key = %self.key, "Serving stale query");
                self.result(Some(entry), None, false)
            }
            _ => self.refetch().await,
        }
    }

    /// Fetch from the network regardless of freshness.
    ///
    /// On failure the previous value, if any, is kept and reported with the
    /// error.
    pub async fn refetch(&self) -> QueryResult<T> {
        match self
            .client
            .fetch_entry(&self.key, &self.fetch, &self.options)
            .await
        {
            Ok(entry) => self.result(Some(entry), None, false),
            Err(err) => {
                let previous = self.client.cached(&self.key).await;
                self.result(previous, Some(err), false)
            }
        }
    }

    /// Current state without any network call.
    pub async fn snapshot(&self) -> QueryResult<T> {
        let entry = self.client.cached(&self.key).await;
        let error = self.client.last_error(&self.key);
        let is_fetching = self.client.is_fetching(&self.key);
        self.result(entry, error, is_fetching)
    }

    fn result(
        &self,
        entry: Option<Arc<QueryEntry>>,
        error: Option<Arc<ApiError>>,
        is_fetching: bool,
    ) -> QueryResult<T> {
        let is_stale = entry
            .as_ref()
            .is_some_and(|entry| entry.is_stale(&self.options, Instant::now()));

        let data = entry.and_then(|entry| match entry.data.clone().downcast::<T>() {
            Ok(data) => Some(data),
            Err(_) => {
                warn!(key = %self.key, "Cached value has a different type, ignoring it");
                None
            }
        });
        let has_data = data.is_some();

        QueryResult {
            data: data.unwrap_or_default(),
            error,
            is_loading: is_fetching && !has_data,
            is_fetching,
            is_stale,
            has_data,
        }
    }
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("key", &self.key)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Counts one fetch of a key as in flight until dropped, including when the
/// fetching future is cancelled.
struct FetchGuard<'a> {
    client: &'a QueryClient,
    key: &'a QueryKey,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.client.states().get_mut(self.key) {
            state.fetching = state.fetching.saturating_sub(1);
        }
    }
}

/// Registration of one handle on its key.
struct Observer {
    client: QueryClient,
    key: QueryKey,
}

impl Drop for Observer {
    fn drop(&mut self) {
        let mut states = self.client.states();
        if let Some(state) = states.get_mut(&self.key) {
            state.observers = state.observers.saturating_sub(1);
            if state.observers == 0 {
                state.released_at = Some(Instant::now());
            }
        }
    }
}
