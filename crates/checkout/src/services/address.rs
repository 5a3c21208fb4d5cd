//! Postal code lookup against a `ViaCEP`-compatible address directory.
//!
//! Brazilian storefronts prefill the address form from the CEP: the customer
//! types eight digits and the street, neighborhood, city and state come back
//! from the directory. The customer still owns the house number and
//! complement, so [`AddressLookupResult::apply_to`] never touches those.

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::AddressLookupConfig;
use crate::types::Address;
use jacaranda_core::PostalCode;

/// Errors that can occur when querying the address directory.
#[derive(Debug, thiserror::Error)]
pub enum AddressLookupError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Directory returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// No address is registered for the postal code.
    #[error("No address found for postal code: {0}")]
    NotFound(String),

    /// Failed to parse the directory response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Address data returned by the directory for one postal code.
///
/// Field names follow the `ViaCEP` wire format; all fields default to empty
/// because the directory omits what it does not know (some rural postal
/// codes carry only city and state).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressLookupResult {
    /// Canonical postal code, hyphenated (`"01310-100"`).
    #[serde(default)]
    pub cep: String,
    /// Street name.
    #[serde(default, rename = "logradouro")]
    pub street: String,
    /// Complement hint (e.g. "lado ímpar"). Informational only; never
    /// written into the customer's address.
    #[serde(default, rename = "complemento")]
    pub complement: String,
    /// Neighborhood.
    #[serde(default, rename = "bairro")]
    pub neighborhood: String,
    /// City.
    #[serde(default, rename = "localidade")]
    pub city: String,
    /// Two-letter state code.
    #[serde(default, rename = "uf")]
    pub region: String,
}

impl AddressLookupResult {
    /// Copy looked-up fields into an address form.
    ///
    /// Only fields the directory actually returned overwrite the form, so a
    /// partial result never blanks out what the customer already typed. The
    /// house number and complement always stay untouched.
    pub fn apply_to(&self, address: &mut Address) {
        if !self.cep.is_empty() {
            address.postal_code = self.cep.clone();
        }
        if !self.street.is_empty() {
            address.street = self.street.clone();
        }
        if !self.neighborhood.is_empty() {
            address.neighborhood = self.neighborhood.clone();
        }
        if !self.city.is_empty() {
            address.city = self.city.clone();
        }
        if !self.region.is_empty() {
            address.region = self.region.clone();
        }
    }
}

/// Postal code lookup, behind a trait so tests can substitute fakes.
#[async_trait]
pub trait AddressDirectory: Send + Sync {
    /// Look up the address registered for a postal code.
    ///
    /// # Errors
    ///
    /// Returns [`AddressLookupError::NotFound`] when the directory has no
    /// entry for the code, or a transport/parse error otherwise.
    async fn lookup(
        &self,
        postal_code: &PostalCode,
    ) -> Result<AddressLookupResult, AddressLookupError>;
}

/// HTTP client for a `ViaCEP`-compatible directory.
///
/// Lookups are cached for the configured TTL; postal code data changes
/// rarely enough that stale reads are harmless.
#[derive(Clone)]
pub struct AddressLookupClient {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, AddressLookupResult>,
}

impl AddressLookupClient {
    /// Create a new directory client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &AddressLookupConfig) -> Result<Self, AddressLookupError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            cache,
        })
    }
}

#[async_trait]
impl AddressDirectory for AddressLookupClient {
    #[instrument(skip(self), fields(postal_code = %postal_code))]
    async fn lookup(
        &self,
        postal_code: &PostalCode,
    ) -> Result<AddressLookupResult, AddressLookupError> {
        let cache_key = postal_code.digits().to_string();

        // Check cache
        if let Some(result) = self.cache.get(&cache_key).await {
            debug!("Cache hit for postal code lookup");
            return Ok(result);
        }

        let url = format!("{}/{}/json/", self.base_url, postal_code.digits());
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AddressLookupError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let response_text = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| AddressLookupError::Parse(e.to_string()))?;

        // ViaCEP signals an unknown code with {"erro": true} on a 200;
        // older deployments send the string "true"
        if is_error_payload(&value) {
            return Err(AddressLookupError::NotFound(postal_code.to_string()));
        }

        let result: AddressLookupResult =
            serde_json::from_value(value).map_err(|e| AddressLookupError::Parse(e.to_string()))?;

        self.cache.insert(cache_key, result.clone()).await;

        Ok(result)
    }
}

fn is_error_payload(value: &serde_json::Value) -> bool {
    value
        .get("erro")
        .is_some_and(|v| v.as_bool() == Some(true) || v.as_str() == Some("true"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn paulista_payload() -> &'static str {
        r#"{
            "cep": "01310-100",
            "logradouro": "Avenida Paulista",
            "complemento": "de 612 a 1510 - lado par",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308",
            "gia": "1004",
            "ddd": "11",
            "siafi": "7107"
        }"#
    }

    #[test]
    fn parses_directory_payload() {
        let result: AddressLookupResult = serde_json::from_str(paulista_payload()).unwrap();
        assert_eq!(result.cep, "01310-100");
        assert_eq!(result.street, "Avenida Paulista");
        assert_eq!(result.neighborhood, "Bela Vista");
        assert_eq!(result.city, "São Paulo");
        assert_eq!(result.region, "SP");
    }

    #[test]
    fn tolerates_partial_payload() {
        let body = r#"{"cep": "78890-000", "localidade": "Sorriso", "uf": "MT"}"#;
        let result: AddressLookupResult = serde_json::from_str(body).unwrap();
        assert!(result.street.is_empty());
        assert_eq!(result.city, "Sorriso");
    }

    #[test]
    fn detects_error_payload_in_both_shapes() {
        let boolean: serde_json::Value = serde_json::from_str(r#"{"erro": true}"#).unwrap();
        assert!(is_error_payload(&boolean));

        let string: serde_json::Value = serde_json::from_str(r#"{"erro": "true"}"#).unwrap();
        assert!(is_error_payload(&string));

        let ok: serde_json::Value = serde_json::from_str(paulista_payload()).unwrap();
        assert!(!is_error_payload(&ok));
    }

    #[test]
    fn apply_fills_looked_up_fields_and_keeps_user_input() {
        let result: AddressLookupResult = serde_json::from_str(paulista_payload()).unwrap();

        let mut address = Address {
            number: "1578".to_string(),
            complement: Some("Apto 42".to_string()),
            postal_code: "01310100".to_string(),
            ..Address::default()
        };
        result.apply_to(&mut address);

        assert_eq!(address.street, "Avenida Paulista");
        assert_eq!(address.neighborhood, "Bela Vista");
        assert_eq!(address.city, "São Paulo");
        assert_eq!(address.region, "SP");
        assert_eq!(address.postal_code, "01310-100");
        // Customer-owned fields survive
        assert_eq!(address.number, "1578");
        assert_eq!(address.complement.as_deref(), Some("Apto 42"));
    }

    #[test]
    fn apply_with_partial_result_keeps_existing_values() {
        let result = AddressLookupResult {
            cep: "78890-000".to_string(),
            city: "Sorriso".to_string(),
            region: "MT".to_string(),
            ..AddressLookupResult::default()
        };

        let mut address = Address {
            street: "Rua já digitada".to_string(),
            ..Address::default()
        };
        result.apply_to(&mut address);

        assert_eq!(address.street, "Rua já digitada");
        assert_eq!(address.city, "Sorriso");
    }
}
