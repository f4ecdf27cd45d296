//! Listing parameters and their normalized query-string form.
//!
//! The same normalized pairs become both the request query string and the
//! cache key, so two parameter sets that send the same request also share a
//! cache entry.

use serde::{Deserialize, Serialize};

/// Parameters that render to query-string pairs.
///
/// Implementations must skip unset and blank values and trim free text, so
/// that equivalent parameter sets produce identical pairs.
pub trait QueryParams {
    /// Normalized `(name, value)` pairs.
    fn pairs(&self) -> Vec<(&'static str, String)>;
}

impl QueryParams for () {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim)
        && !value.is_empty()
    {
        pairs.push((name, value.to_owned()));
    }
}

fn push_page(pairs: &mut Vec<(&'static str, String)>, page: Option<u32>) {
    if let Some(page) = page {
        pairs.push(("page", page.to_string()));
    }
}

/// Plain page selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageParams {
    /// 1-based page number; `None` lets the server pick the first page.
    pub page: Option<u32>,
}

impl PageParams {
    /// Select a page.
    #[must_use]
    pub const fn page(page: u32) -> Self {
        Self { page: Some(page) }
    }
}

impl QueryParams for PageParams {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_page(&mut pairs, self.page);
        pairs
    }
}

/// Product listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductFilter {
    pub page: Option<u32>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Brand slug.
    pub brand: Option<String>,
    /// Sort key understood by the API (e.g. `price_asc`, `latest`).
    pub sort: Option<String>,
}

impl ProductFilter {
    /// Filter by a search term.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }
}

impl QueryParams for ProductFilter {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_page(&mut pairs, self.page);
        push_text(&mut pairs, "search", self.search.as_deref());
        push_text(&mut pairs, "category", self.category.as_deref());
        push_text(&mut pairs, "brand", self.brand.as_deref());
        push_text(&mut pairs, "sort", self.sort.as_deref());
        pairs
    }
}

/// Hospital listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HospitalFilter {
    pub page: Option<u32>,
    pub search: Option<String>,
}

impl QueryParams for HospitalFilter {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_page(&mut pairs, self.page);
        push_text(&mut pairs, "search", self.search.as_deref());
        pairs
    }
}
