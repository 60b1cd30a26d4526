//! Postal code lookup and the serviceable area
//!
//! Orders are only accepted from one city. The lookup fills street and
//! neighborhood from the postal code; the city/state it returns decide
//! whether the address is served at all.

use crate::error::LookupError;
use crate::format::digits_only;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Address returned by a postal code lookup
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressInfo {
    /// Street name
    pub street: String,
    /// Neighborhood
    pub neighborhood: String,
    /// City
    pub city: String,
    /// State (UF)
    pub state: String,
}

/// The city/state pair orders are accepted from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceArea {
    /// City, compared case-insensitively
    pub city: String,
    /// State code, compared upper-cased
    pub state: String,
}

impl ServiceArea {
    /// Create area
    #[must_use]
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
        }
    }

    /// Whether `city`/`state` fall inside this area
    #[must_use]
    pub fn contains(&self, city: &str, state: &str) -> bool {
        city.trim().to_lowercase() == self.city.trim().to_lowercase()
            && state.trim().to_uppercase() == self.state.trim().to_uppercase()
    }

    /// Message shown for addresses outside the area
    #[must_use]
    pub fn rejection_message(&self) -> String {
        format!("Atendemos apenas clientes em {}, {}", self.city, self.state)
    }
}

impl Default for ServiceArea {
    fn default() -> Self {
        Self::new("Campo Grande", "MS")
    }
}

/// Postal code to address resolution
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Resolve an 8-digit postal code
    ///
    /// # Errors
    /// - `LookupError::NotFound` if the code is unknown
    /// - `LookupError::Http` / `LookupError::Status` on transport failures
    async fn lookup(&self, cep: &str) -> Result<AddressInfo, LookupError>;
}

/// ViaCEP response body
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

impl ViaCepResponse {
    /// The service flags unknown codes with `"erro": true` (or `"true"`)
    fn is_error(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag == "true",
            _ => false,
        }
    }
}

/// Lookup backed by the ViaCEP web service
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    client: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    /// Create client for `base_url` (e.g. `https://viacep.com.br/ws`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create client sharing an existing HTTP client
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Request URL for `cep`
    #[must_use]
    pub fn url(&self, cep: &str) -> String {
        format!("{}/{}/json/", self.base_url, digits_only(cep))
    }
}

#[async_trait]
impl AddressLookup for ViaCepClient {
    async fn lookup(&self, cep: &str) -> Result<AddressInfo, LookupError> {
        let digits = digits_only(cep);
        if digits.len() != 8 {
            return Err(LookupError::InvalidCode(cep.to_string()));
        }

        let url = self.url(&digits);
        tracing::debug!(%url, "looking up postal code");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: ViaCepResponse = response.json().await?;
        if body.is_error() {
            return Err(LookupError::NotFound(digits));
        }

        Ok(AddressInfo {
            street: body.logradouro,
            neighborhood: body.bairro,
            city: body.localidade,
            state: body.uf,
        })
    }
}
