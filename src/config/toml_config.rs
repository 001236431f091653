use crate::adapters::{ConfiguredGeocoder, HttpGeocoder, StaticGeocoder};
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub geocoder: GeocoderConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// `http` or `static`.
    pub kind: String,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub country: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub postal_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<String>,
    pub verbose: Option<bool>,
}

impl TomlConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ServiceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ServiceError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("service.name", &self.service.name)?;

        if let Some(seed_file) = &self.store.seed_file {
            validation::validate_csv_path("store.seed_file", seed_file)?;
        }

        validation::validate_one_of("geocoder.kind", &self.geocoder.kind, &["http", "static"])?;
        match self.geocoder.kind.as_str() {
            "http" => {
                validation::validate_url("geocoder.endpoint", self.geocoder_endpoint())?;
                validation::validate_positive_number(
                    "geocoder.timeout_seconds",
                    self.geocoder_timeout().as_secs(),
                    1,
                )?;
            }
            _ => {
                let postal_file = validation::validate_required_field(
                    "geocoder.postal_file",
                    &self.geocoder.postal_file,
                )?;
                validation::validate_csv_path("geocoder.postal_file", postal_file)?;
            }
        }

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            validation::validate_one_of("logging.format", format, &["compact", "json"])?;
        }

        Ok(())
    }

    pub fn geocoder_endpoint(&self) -> &str {
        self.geocoder
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODER_ENDPOINT)
    }

    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(
            self.geocoder
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    /// The API key, unless it is empty or still an unresolved `${VAR}`.
    pub fn api_key(&self) -> Option<&str> {
        self.geocoder
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty() && !key.contains("${"))
    }

    pub fn seed_file(&self) -> Option<&str> {
        self.store.seed_file.as_deref()
    }

    pub fn log_format(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .unwrap_or("compact")
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn build_geocoder(&self) -> Result<ConfiguredGeocoder> {
        match self.geocoder.kind.as_str() {
            "http" => {
                if self.geocoder.api_key.is_some() && self.api_key().is_none() {
                    tracing::warn!("geocoder.api_key is set but unresolved; sending requests without a key");
                }
                let mut geocoder = HttpGeocoder::with_timeout(
                    self.geocoder_endpoint(),
                    self.api_key().map(str::to_string),
                    self.geocoder_timeout(),
                )?;
                if let Some(country) = &self.geocoder.country {
                    geocoder = geocoder.with_country(country.clone());
                }
                Ok(ConfiguredGeocoder::Http(geocoder))
            }
            "static" => {
                let path = validation::validate_required_field(
                    "geocoder.postal_file",
                    &self.geocoder.postal_file,
                )?;
                Ok(ConfiguredGeocoder::Static(StaticGeocoder::from_csv_path(
                    path,
                )?))
            }
            other => Err(ServiceError::InvalidConfigValueError {
                field: "geocoder.kind".to_string(),
                value: other.to_string(),
                reason: "Expected one of: http, static".to_string(),
            }),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
