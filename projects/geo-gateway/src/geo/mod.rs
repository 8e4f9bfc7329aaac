use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod dadata;

pub use dadata::DadataClient;

/// Canonical postal address returned by both lookup routes.
///
/// Coordinates stay textual: the provider is the source of truth for their
/// format and they are relayed as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub city: String,
    pub street: String,
    pub house: String,
    #[serde(rename = "lat")]
    pub latitude: String,
    #[serde(rename = "lon")]
    pub longitude: String,
}

impl AddressRecord {
    /// Builds a record only when both city and street are known.
    pub fn resolved(
        city: String,
        street: String,
        house: String,
        latitude: String,
        longitude: String,
    ) -> Option<Self> {
        if city.is_empty() || street.is_empty() {
            return None;
        }
        Some(Self { city, street, house, latitude, longitude })
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status code: {0}")]
    Status(u16),

    #[error("error decoding provider response: {0}")]
    Decode(String),
}

/// Address lookups against an external geocoding service.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Free-text address suggestions. An empty result is not an error.
    async fn search_by_text(&self, query: &str) -> Result<Vec<AddressRecord>, ProviderError>;

    /// Addresses near a coordinate pair.
    async fn reverse_geocode(&self, lat: &str, lon: &str)
        -> Result<Vec<AddressRecord>, ProviderError>;
}
