use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::{AddressRecord, GeoProvider, ProviderError};
use crate::config::ProviderConfig;

const SUGGEST_ADDRESS_PATH: &str = "suggest/address";
const GEOLOCATE_ADDRESS_PATH: &str = "geolocate/address";

/// Client for the DaData suggestions API.
///
/// Holds one pooled HTTP client and the credentials for the lifetime of the
/// process.
pub struct DadataClient {
    http: Client,
    suggest_url: Url,
    geolocate_url: Url,
    api_key: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct SuggestionsEnvelope {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    #[serde(default)]
    data: Option<SuggestionData>,
}

#[derive(Debug, Default, Deserialize)]
struct SuggestionData {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    house: Option<String>,
    #[serde(default)]
    geo_lat: Option<String>,
    #[serde(default)]
    geo_lon: Option<String>,
}

impl SuggestionData {
    fn into_record(self) -> Option<AddressRecord> {
        AddressRecord::resolved(
            self.city.unwrap_or_default(),
            self.street.unwrap_or_default(),
            self.house.unwrap_or_default(),
            self.geo_lat.unwrap_or_default(),
            self.geo_lon.unwrap_or_default(),
        )
    }
}

impl DadataClient {
    pub fn new(cfg: &ProviderConfig) -> Result<Self> {
        let mut base = Url::parse(&cfg.base_url)
            .with_context(|| format!("Invalid provider base URL: {}", cfg.base_url))?;
        // Url::join drops the last segment unless the base ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("Failed to build provider HTTP client")?;

        Ok(Self {
            http,
            suggest_url: base.join(SUGGEST_ADDRESS_PATH)?,
            geolocate_url: base.join(GEOLOCATE_ADDRESS_PATH)?,
            api_key: cfg.api_key.clone(),
            secret_key: cfg.secret_key.clone(),
        })
    }

    async fn post_suggestions(
        &self,
        url: &Url,
        body: &Value,
        with_secret: bool,
    ) -> Result<Vec<AddressRecord>, ProviderError> {
        let mut request = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Token {}", self.api_key))
            .json(body);
        if with_secret && !self.secret_key.is_empty() {
            request = request.header("X-Secret", &self.secret_key);
        }

        let resp = request.send().await?;
        if resp.status() != StatusCode::OK {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        let bytes = resp.bytes().await?;
        let envelope: SuggestionsEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let total = envelope.suggestions.len();
        let records: Vec<AddressRecord> = envelope
            .suggestions
            .into_iter()
            .filter_map(|s| s.data.and_then(SuggestionData::into_record))
            .collect();
        tracing::debug!(
            url = %url,
            total,
            kept = records.len(),
            "Provider suggestions normalized"
        );
        Ok(records)
    }
}

/// Coordinates go out as JSON numbers when they parse as such; anything else
/// is passed through as a string for the provider to reject.
fn coordinate(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Number>(raw.trim())
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[async_trait]
impl GeoProvider for DadataClient {
    async fn search_by_text(&self, query: &str) -> Result<Vec<AddressRecord>, ProviderError> {
        self.post_suggestions(&self.suggest_url, &json!({ "query": query }), true)
            .await
    }

    async fn reverse_geocode(
        &self,
        lat: &str,
        lon: &str,
    ) -> Result<Vec<AddressRecord>, ProviderError> {
        let body = json!({ "lat": coordinate(lat), "lon": coordinate(lon) });
        self.post_suggestions(&self.geolocate_url, &body, false).await
    }
}
