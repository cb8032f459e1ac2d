//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_API_URL` - Base URL of the catalog REST API (e.g. `https://api.example.com/api/`)
//!
//! ## Optional
//! - `CATALOG_API_TOKEN` - Static API token; when unset the token file is used
//! - `CURATOR_TOKEN_FILE` - Persistent token storage (default: `.curator/token.json`)
//! - `CATALOG_TIMEOUT_SECS` - HTTP timeout for catalog requests (default: 30)
//! - `CATALOG_SCAN_PAGE_SIZE` - Page size for full-collection scans (default: 100)
//! - `SEARCH_DEBOUNCE_MS` - Quiet period before a search fires (default: 1000)
//! - `CURATOR_HOST` - Bind address (default: 127.0.0.1)
//! - `CURATOR_PORT` - Listen port (default: 3001)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TOKEN_FILE: &str = ".curator/token.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SCAN_PAGE_SIZE: u32 = 100;
const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Catalog REST API configuration
    pub catalog: CatalogConfig,
    /// Search overlay configuration
    pub search: SearchConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Catalog REST API configuration.
///
/// Implements `Debug` manually to redact the static token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL, always ending in `/` so relative paths join beneath it
    pub api_url: Url,
    /// Static token (takes precedence over the token file)
    pub token: Option<SecretString>,
    /// Persistent token storage used when no static token is configured
    pub token_file: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
    /// Page size for full-collection scans
    pub scan_page_size: u32,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("api_url", &self.api_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_file", &self.token_file)
            .field("timeout", &self.timeout)
            .field("scan_page_size", &self.scan_page_size)
            .finish()
    }
}

/// Search overlay configuration.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Input must be quiet this long before a request fires
    pub debounce: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl AdminConfig {
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

        let host = get_env_or_default("CURATOR_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CURATOR_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("CURATOR_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CURATOR_PORT".to_string(), e.to_string()))?;

        let catalog = CatalogConfig::from_env()?;
        let search = SearchConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            catalog,
            search,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CatalogConfig {
    /// Build a configuration for `api_url` with every optional value defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an absolute URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_base_url(api_url)?,
            token: None,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            scan_page_size: DEFAULT_SCAN_PAGE_SIZE,
        })
    }

    /// Load catalog configuration from environment.
    ///
    /// Shared with the CLI, which talks to the same backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `CATALOG_API_URL` is missing or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(&get_required_env("CATALOG_API_URL")?)?;

        config.token = get_optional_env("CATALOG_API_TOKEN").map(|token| {
            // Placeholder tokens are reported, not rejected: the backend is the authority
            if let Err(e) = validate_secret_strength(&token, "CATALOG_API_TOKEN") {
                tracing::warn!("CATALOG_API_TOKEN validation warning: {e}");
            }
            SecretString::from(token)
        });
        config.token_file = token_file_from_env();
        config.timeout = Duration::from_secs(parse_env_or(
            "CATALOG_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        config.scan_page_size = parse_env_or("CATALOG_SCAN_PAGE_SIZE", DEFAULT_SCAN_PAGE_SIZE)?;
        if config.scan_page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_SCAN_PAGE_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }
}

impl SearchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            debounce: Duration::from_millis(parse_env_or(
                "SEARCH_DEBOUNCE_MS",
                DEFAULT_DEBOUNCE_MS,
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, forcing a trailing slash so `Url::join` keeps the path.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_API_URL".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "CATALOG_API_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Token file location from `CURATOR_TOKEN_FILE`, or the default.
///
/// Needs no other configuration, so token management works before the
/// catalog URL is set.
#[must_use]
pub fn token_file_from_env() -> PathBuf {
    get_optional_env("CURATOR_TOKEN_FILE")
        .map_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE), PathBuf::from)
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
