//! Response envelope and pagination wrappers.
//!
//! Every API body has the shape `{ "success": .., "message": .., "data": .. }`.
//! Paginated listings nest a page object inside `data`.

use serde::{Deserialize, Serialize};

/// Body of every API response.
///
/// All fields are optional on the wire; `data` is absent on most mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Server-side success flag.
    #[serde(default)]
    pub success: Option<bool>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Payload.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Default for ApiResponse<T> {
    fn default() -> Self {
        Self {
            success: None,
            message: None,
            data: None,
        }
    }
}

impl<T: Default> ApiResponse<T> {
    /// Take the payload, falling back to the empty value of `T`.
    #[must_use]
    pub fn into_data(self) -> T {
        self.data.unwrap_or_default()
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Records on this page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// 1-based page number.
    #[serde(default = "first_page")]
    pub current_page: u32,
    /// Last available page.
    #[serde(default = "first_page")]
    pub last_page: u32,
    /// Page size.
    #[serde(default)]
    pub per_page: u32,
    /// Total records across all pages.
    #[serde(default)]
    pub total: u64,
}

const fn first_page() -> u32 {
    1
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            current_page: 1,
            last_page: 1,
            per_page: 0,
            total: 0,
        }
    }
}

impl<T> Paginated<T> {
    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    /// Whether the page holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_into_data_defaults_when_missing() {
        let body: ApiResponse<Vec<u32>> =
            serde_json::from_str(r#"{"success":true,"message":"ok"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("ok"));
        assert!(body.into_data().is_empty());
    }

    #[test]
    fn test_paginated_defaults() {
        let page: Paginated<u32> = serde_json::from_str(r#"{"data":[1,2]}"#).unwrap();
        assert_eq!(page.current_page, 1);
        assert!(!page.has_next());
        assert_eq!(page.data, vec![1, 2]);
    }

    #[test]
    fn test_paginated_has_next() {
        let page: Paginated<u32> =
            serde_json::from_str(r#"{"data":[],"current_page":2,"last_page":5}"#).unwrap();
        assert!(page.has_next());
        assert!(page.is_empty());
    }
}
