use crate::domain::model::{Address, City, Province};
use crate::domain::ports::Geocoder;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl AddressComponent {
    fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

const CITY_COMPONENT_TYPES: [&str; 3] = ["locality", "postal_town", "sublocality"];

fn to_address(result: &GeocodeResult) -> Address {
    let components = &result.address_components;

    let city = CITY_COMPONENT_TYPES.iter().find_map(|kind| {
        components
            .iter()
            .find(|c| c.has_type(kind))
            .map(|c| City::new(None, c.long_name.clone(), None))
    });

    let province = components
        .iter()
        .find(|c| c.has_type("administrative_area_level_1"))
        .map(|c| Province::new(None, c.long_name.clone(), c.short_name.clone()));

    Address::new(city, province)
}

/// Geocoder backed by an HTTP endpoint speaking the Google Geocoding JSON format.
pub struct HttpGeocoder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    country: Option<String>,
}

impl HttpGeocoder {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
            country: None,
        }
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            country: None,
        })
    }

    /// Restrict results to one country (ISO 3166-1 alpha-2).
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn lookup(&self, postal_code: &str) -> Result<Option<Address>> {
        let mut params = vec![("address", postal_code.to_string())];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }
        if let Some(country) = &self.country {
            params.push(("components", format!("country:{}", country)));
        }

        tracing::debug!("Geocoding postal code '{}' via {}", postal_code, self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        let body: GeocodeResponse = response.json().await?;
        tracing::debug!(
            "Geocoder status {} with {} result(s)",
            body.status,
            body.results.len()
        );

        match body.status.as_str() {
            "OK" => Ok(body.results.first().map(to_address)),
            "ZERO_RESULTS" => Ok(None),
            status => Err(ServiceError::geocoder(format!(
                "status {}{}",
                status,
                body.error_message
                    .map(|m| format!(": {}", m))
                    .unwrap_or_default()
            ))),
        }
    }
}
