//! Checkout configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CHECKOUT_API_BASE_URL` - Base URL of the commerce backend REST API
//! - `CHECKOUT_API_TOKEN` - Backend API token (server-side only, high entropy)
//!
//! ## Optional
//! - `CHECKOUT_HTTP_TIMEOUT_SECS` - HTTP timeout for backend calls (default: 10)
//! - `CHECKOUT_CACHE_TTL_SECS` - TTL for cached catalog responses (default: 300)
//! - `ADDRESS_LOOKUP_BASE_URL` - Postal code directory base URL
//!   (default: <https://viacep.com.br/ws>)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default postal code directory (ViaCEP).
const DEFAULT_ADDRESS_LOOKUP_BASE_URL: &str = "https://viacep.com.br/ws";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Checkout application configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Commerce backend REST API configuration
    pub api: CheckoutApiConfig,
    /// Postal code directory configuration
    pub address_lookup: AddressLookupConfig,
}

/// Commerce backend API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CheckoutApiConfig {
    /// Base URL of the backend REST API (no trailing slash)
    pub base_url: String,
    /// Backend API token (server-side only)
    pub token: SecretString,
    /// Timeout for each HTTP request
    pub http_timeout: Duration,
    /// TTL for cached shipping option and payment method responses
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for CheckoutApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("http_timeout", &self.http_timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

/// Postal code directory configuration.
#[derive(Debug, Clone)]
pub struct AddressLookupConfig {
    /// Base URL of the directory (no trailing slash)
    pub base_url: String,
    /// Timeout for each lookup request
    pub http_timeout: Duration,
    /// TTL for cached lookups
    pub cache_ttl: Duration,
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API token fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_base_url("CHECKOUT_API_BASE_URL")?;
        let token = get_validated_secret("CHECKOUT_API_TOKEN")?;
        let http_timeout = get_duration_secs("CHECKOUT_HTTP_TIMEOUT_SECS", "10")?;
        let cache_ttl = get_duration_secs("CHECKOUT_CACHE_TTL_SECS", "300")?;

        let address_lookup_base_url = match std::env::var("ADDRESS_LOOKUP_BASE_URL") {
            Ok(value) => validate_base_url("ADDRESS_LOOKUP_BASE_URL", &value)?,
            Err(_) => DEFAULT_ADDRESS_LOOKUP_BASE_URL.to_string(),
        };

        Ok(Self {
            api: CheckoutApiConfig {
                base_url,
                token,
                http_timeout,
                cache_ttl,
            },
            address_lookup: AddressLookupConfig {
                base_url: address_lookup_base_url,
                http_timeout,
                cache_ttl,
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required base URL, validated and normalized (no trailing slash).
fn get_base_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    validate_base_url(key, &value)
}

/// Validate a base URL and strip any trailing slash.
fn validate_base_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }

    Ok(value.trim_end_matches('/').to_string())
}

/// Get a duration in seconds from an environment variable.
fn get_duration_secs(key: &str, default: &str) -> Result<Duration, ConfigError> {
    let secs = get_env_or_default(key, default)
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(Duration::from_secs(secs))
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
