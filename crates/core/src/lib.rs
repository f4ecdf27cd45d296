//! Babynest Core - Shared domain records.
//!
//! This crate provides the records exchanged with the Babynest marketplace API:
//! - `storefront` - API client, resource services and the query cache
//! - `cli` - Command-line front end over the storefront client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no caching.
//! Every record is sourced from the remote API; nothing here is authoritative
//! local state.
//!
//! # Modules
//!
//! - [`types`] - Id newtypes, status enums, entity records, request payloads
//!   and query parameter normalization

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
