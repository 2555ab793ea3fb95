//! Orphan connector configuration
//!
//! Deserialized from the host's JSON source configuration or loaded from
//! environment variables.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use url::Url;
use xavyo_isc_client::IscCredentials;

use crate::projection::IdentityKeyStrategy;

/// Connector configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanConnectorConfig {
    /// API base URL, e.g. `https://acme.api.identitynow.com`.
    #[serde(rename = "baseurl")]
    pub base_url: String,

    /// OAuth2 client id.
    pub client_id: String,

    /// OAuth2 client secret.
    #[serde(deserialize_with = "deserialize_secret")]
    pub client_secret: SecretString,

    /// Names of the sources whose orphan accounts are exposed.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Skip disabled accounts.
    #[serde(default)]
    pub only_enabled: bool,

    /// Mark this connector's own entitlements requestable on entitlement aggregation.
    #[serde(default)]
    pub make_entitlements_requestable: bool,

    /// How account identity and display keys are chosen.
    #[serde(default)]
    pub identity_key_strategy: IdentityKeyStrategy,

    /// Id of the source this connector is deployed as. Required for
    /// `make_entitlements_requestable`.
    #[serde(default)]
    pub connector_source_id: Option<String>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::new)
}

impl OrphanConnectorConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let base_url =
            reader("ISC_BASE_URL").map_err(|_| ConfigError::MissingVar("ISC_BASE_URL".into()))?;

        let client_id =
            reader("ISC_CLIENT_ID").map_err(|_| ConfigError::MissingVar("ISC_CLIENT_ID".into()))?;

        let client_secret = reader("ISC_CLIENT_SECRET")
            .map(SecretString::new)
            .map_err(|_| ConfigError::MissingVar("ISC_CLIENT_SECRET".into()))?;

        let sources = reader("ISC_SOURCES")
            .map_err(|_| ConfigError::MissingVar("ISC_SOURCES".into()))?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let only_enabled = parse_bool(&reader, "ISC_ONLY_ENABLED")?;
        let make_entitlements_requestable =
            parse_bool(&reader, "ISC_MAKE_ENTITLEMENTS_REQUESTABLE")?;

        let identity_key_strategy = match reader("ISC_IDENTITY_KEY_STRATEGY") {
            Ok(value) => value.parse::<IdentityKeyStrategy>().map_err(|e| {
                ConfigError::InvalidValue("ISC_IDENTITY_KEY_STRATEGY".into(), e)
            })?,
            Err(_) => IdentityKeyStrategy::default(),
        };

        let connector_source_id = reader("ISC_CONNECTOR_SOURCE_ID")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let config = Self {
            base_url,
            client_id,
            client_secret,
            sources,
            only_enabled,
            make_entitlements_requestable,
            identity_key_strategy,
            connector_source_id,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidValue("baseurl".into(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(
                "baseurl".into(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Invalid("clientId must not be empty".into()));
        }

        if self.client_secret.expose_secret().is_empty() {
            return Err(ConfigError::Invalid("clientSecret must not be empty".into()));
        }

        if self.sources.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "at least one source must be configured".into(),
            ));
        }

        Ok(())
    }

    /// Client credentials for the ISC API.
    pub fn credentials(&self) -> IscCredentials {
        IscCredentials::new(
            self.client_id.clone(),
            self.client_secret.expose_secret().clone(),
        )
    }
}

fn parse_bool<F>(reader: &F, key: &str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match reader(key) {
        Ok(value) => value
            .trim()
            .parse::<bool>()
            .map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string())),
        Err(_) => Ok(false),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("{0}")]
    Invalid(String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}
