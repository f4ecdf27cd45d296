//! Command implementations.

pub mod account;
pub mod catalog;

use std::sync::Arc;

use babynest_storefront::api::TransportError;
use babynest_storefront::query::QueryResult;
use babynest_storefront::{ApiError, ConfigError};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] TransportError),

    #[error("{0}")]
    Api(Arc<ApiError>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<ApiError> for CommandError {
    fn from(err: ApiError) -> Self {
        Self::Api(Arc::new(err))
    }
}

/// Unwrap a query result, failing on error.
fn data<T>(result: QueryResult<T>) -> Result<Arc<T>, CommandError> {
    result.into_result().map_err(CommandError::Api)
}

/// Print a value as pretty JSON on stdout.
#[allow(clippy::print_stdout)]
fn print_json(value: &impl Serialize) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
