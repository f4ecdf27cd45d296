//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BABYNEST_API_URL` - Base URL of the marketplace API
//!
//! ## Optional
//! - `BABYNEST_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `BABYNEST_API_TOKEN` - Initial bearer credential
//! - `BABYNEST_CLEAR_SESSION_ON_401` - Forget the credential when the API
//!   rejects it (default: false)
//! - `BABYNEST_QUERY_STALE_SECS` - Staleness window for cached reads (default: 600)
//! - `BABYNEST_QUERY_GC_SECS` - Garbage-collection window for unobserved reads
//!   (default: 600)
//! - `BABYNEST_QUERY_RETRY` - Retries for failed reads (default: 2)
//! - `BABYNEST_IMAGE_HOSTS` - Comma-separated image origins, `host[/path]`,
//!   with an optional leading `*.` wildcard

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::query::QueryOptions;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// HTTP adapter configuration
    pub api: ApiConfig,
    /// Default policy for cached reads
    pub query: QueryOptions,
    /// Image origins the rendering layer may load from
    pub images: ImageHosts,
}

/// HTTP adapter configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    pub base_url: Url,
    /// Client-side timeout for every request
    pub timeout: Duration,
    /// Bearer credential to start with
    pub token: Option<SecretString>,
    /// Clear the stored credential when an authenticated request gets a 401
    pub clear_session_on_unauthorized: bool,
}

impl ApiConfig {
    /// Configuration with defaults for everything but the base URL.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token: None,
            clear_session_on_unauthorized: false,
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "clear_session_on_unauthorized",
                &self.clear_session_on_unauthorized,
            )
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let base_url = env.required("BABYNEST_API_URL")?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("BABYNEST_API_URL".to_string(), e.to_string()))?;

        let api = ApiConfig {
            base_url,
            timeout: Duration::from_secs(
                env.parsed("BABYNEST_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            ),
            token: env.optional("BABYNEST_API_TOKEN").map(SecretString::from),
            clear_session_on_unauthorized: env.parsed("BABYNEST_CLEAR_SESSION_ON_401", false)?,
        };

        let defaults = QueryOptions::default();
        let query = QueryOptions {
            stale_time: Duration::from_secs(
                env.parsed("BABYNEST_QUERY_STALE_SECS", defaults.stale_time.as_secs())?,
            ),
            gc_time: Duration::from_secs(
                env.parsed("BABYNEST_QUERY_GC_SECS", defaults.gc_time.as_secs())?,
            ),
            retry: env.parsed("BABYNEST_QUERY_RETRY", defaults.retry)?,
            ..defaults
        };

        let images = env
            .optional("BABYNEST_IMAGE_HOSTS")
            .map(|raw| raw.parse::<ImageHosts>())
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("BABYNEST_IMAGE_HOSTS".to_string(), e))?
            .unwrap_or_default();

        Ok(Self { api, query, images })
    }
}

// =============================================================================
// Image Hosts
// =============================================================================

/// One allowed image origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePattern {
    /// Exact host, or `*.domain` for any subdomain of `domain`.
    pub hostname: String,
    /// Required path prefix, if any.
    pub path_prefix: Option<String>,
}

impl RemotePattern {
    fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };

        let host_ok = self.hostname.strip_prefix("*.").map_or_else(
            || host.eq_ignore_ascii_case(&self.hostname),
            |domain| {
                host.len() > domain.len() + 1
                    && host.to_ascii_lowercase().ends_with(&format!(".{}", domain.to_ascii_lowercase()))
            },
        );

        host_ok
            && self
                .path_prefix
                .as_deref()
                .is_none_or(|prefix| url.path().starts_with(prefix))
    }
}

/// Allow-list of image origins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageHosts {
    patterns: Vec<RemotePattern>,
}

impl ImageHosts {
    /// Whether `url` is an http(s) URL on an allowed origin.
    #[must_use]
    pub fn allows(&self, url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https") && self.patterns.iter().any(|p| p.matches(url))
    }

    #[must_use]
    pub fn patterns(&self) -> &[RemotePattern] {
        &self.patterns
    }
}

impl FromStr for ImageHosts {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let patterns = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (hostname, path_prefix) = match entry.split_once('/') {
                    Some((host, path)) => (host, Some(format!("/{path}"))),
                    None => (entry, None),
                };

                if hostname.is_empty() || hostname == "*." {
                    return Err(format!("invalid image host pattern '{entry}'"));
                }

                Ok(RemotePattern {
                    hostname: hostname.to_string(),
                    path_prefix,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BABYNEST_API_URL", "https://api.babynest.test/api/v1")]).unwrap();

        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert!(config.api.token.is_none());
        assert!(!config.api.clear_session_on_unauthorized);
        assert_eq!(config.query.stale_time, Duration::from_secs(600));
        assert_eq!(config.query.gc_time, Duration::from_secs(600));
        assert_eq!(config.query.retry, 2);
        assert!(config.images.patterns().is_empty());
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "BABYNEST_API_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("BABYNEST_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[
            ("BABYNEST_API_URL", "https://api.babynest.test"),
            ("BABYNEST_API_TIMEOUT_SECS", "ten"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "BABYNEST_API_TIMEOUT_SECS"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BABYNEST_API_URL", "https://api.babynest.test"),
            ("BABYNEST_API_TIMEOUT_SECS", "3"),
            ("BABYNEST_API_TOKEN", "tok-123"),
            ("BABYNEST_CLEAR_SESSION_ON_401", "true"),
            ("BABYNEST_QUERY_STALE_SECS", "60"),
            ("BABYNEST_QUERY_RETRY", "0"),
        ])
        .unwrap();

        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert_eq!(config.api.token.unwrap().expose_secret(), "tok-123");
        assert!(config.api.clear_session_on_unauthorized);
        assert_eq!(config.query.stale_time, Duration::from_secs(60));
        assert_eq!(config.query.gc_time, Duration::from_secs(600));
        assert_eq!(config.query.retry, 0);
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let mut config = ApiConfig::new(Url::parse("https://api.babynest.test").unwrap());
        config.token = Some(SecretString::from("super_secret_bearer_token"));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("api.babynest.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_bearer_token"));
    }

    #[test]
    fn test_image_hosts() {
        let hosts: ImageHosts = "cdn.babynest.test, *.amazonaws.com/babynest".parse().unwrap();
        let allowed = |raw: &str| hosts.allows(&Url::parse(raw).unwrap());

        assert!(allowed("https://cdn.babynest.test/p/1.jpg"));
        assert!(allowed("https://bucket.s3.amazonaws.com/babynest/x.png"));
        assert!(!allowed("https://bucket.s3.amazonaws.com/other/x.png"));
        assert!(!allowed("https://amazonaws.com/babynest/x.png"));
        assert!(!allowed("https://evil.test/p/1.jpg"));
        assert!(!allowed("ftp://cdn.babynest.test/p/1.jpg"));
    }

    #[test]
    fn test_image_hosts_rejects_bad_pattern() {
        assert!("*.".parse::<ImageHosts>().is_err());
        assert!("/path-only".parse::<ImageHosts>().is_err());
    }
}
