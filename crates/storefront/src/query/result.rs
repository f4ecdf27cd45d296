//! What a query handle reports back.

use std::sync::Arc;

use crate::error::ApiError;

/// State of a cached read as seen by one handle.
#[derive(Debug)]
pub struct QueryResult<T> {
    /// Last fetched value, or the empty value of `T` when nothing was fetched.
    pub data: Arc<T>,
    /// Error of the most recent attempt, kept alongside any previous data.
    pub error: Option<Arc<ApiError>>,
    /// No data yet and a fetch is in flight.
    pub is_loading: bool,
    /// A fetch is in flight.
    pub is_fetching: bool,
    /// The data is older than the staleness window or was invalidated.
    pub is_stale: bool,
    /// Whether `data` came from the server rather than the empty default.
    pub has_data: bool,
}

impl<T> Clone for QueryResult<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_stale: self.is_stale,
            has_data: self.has_data,
        }
    }
}

impl<T> QueryResult<T> {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Data fetched without error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.has_data && self.error.is_none()
    }

    /// Turn into a `Result`, dropping any previous data on error.
    ///
    /// # Errors
    ///
    /// Returns the error of the most recent attempt.
    pub fn into_result(self) -> Result<Arc<T>, Arc<ApiError>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }
}
