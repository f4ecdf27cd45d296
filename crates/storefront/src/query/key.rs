//! Cache keys.

use std::collections::BTreeMap;
use std::fmt;

use babynest_core::QueryParams;

/// Identifies one cached read: a resource name plus normalized parameters.
///
/// Parameters are kept sorted, blank values are dropped and values are
/// trimmed, so equivalent requests share a key regardless of how their
/// parameters were assembled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    resource: String,
    params: BTreeMap<String, String>,
}

impl QueryKey {
    /// Key for a resource without parameters.
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add one parameter; blank values are ignored.
    #[must_use]
    pub fn param(mut self, name: &str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        let value = value.trim();
        if !value.is_empty() {
            self.params.insert(name.to_owned(), value.to_owned());
        }
        self
    }

    /// Add every pair of a listing filter.
    #[must_use]
    pub fn with(self, params: &impl QueryParams) -> Self {
        params
            .pairs()
            .into_iter()
            .fold(self, |key, (name, value)| key.param(name, value))
    }

    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource)?;
        if self.params.is_empty() {
            return Ok(());
        }

        f.write_str("{")?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("}")
    }
}
