//! Configuration loaded from an optional TOML file

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ConfigError};

/// How the query string is sent to the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMethod {
    /// `GET ?query=...`
    #[default]
    Get,
    /// `POST` with an `application/x-www-form-urlencoded` body
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LensConfig {
    pub endpoint: Option<String>,
    pub method: QueryMethod,
    pub timeout_secs: u64,
    pub user_agent: String,

    /// Local id of the class whose instances get their details fetched
    pub building_class: String,
    /// Detail rows whose object contains one of these are dropped
    pub excluded_detail_markers: Vec<String>,
    pub enrich_buildings: bool,
    /// Subjects per batched detail query
    pub detail_batch_size: usize,
    /// Detail queries in flight at once
    pub detail_concurrency: usize,

    pub default_format: String,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            method: QueryMethod::Get,
            timeout_secs: 30,
            user_agent: format!("sparqlens/{}", env!("CARGO_PKG_VERSION")),
            building_class: "Building".to_string(),
            excluded_detail_markers: vec!["#Building".to_string(), "#NamedIndividual".to_string()],
            enrich_buildings: true,
            detail_batch_size: 50,
            detail_concurrency: 4,
            default_format: "graph".to_string(),
        }
    }
}

impl LensConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detail_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "detail_batch_size must be at least 1".to_string(),
            ));
        }
        if self.detail_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "detail_concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Parse an endpoint URL, accepting only http and https
pub fn parse_endpoint(input: &str) -> Result<Url, ClientError> {
    let url = Url::parse(input.trim()).map_err(|err| ClientError::InvalidEndpoint {
        endpoint: input.to_string(),
        reason: err.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ClientError::UnsupportedScheme {
            scheme: scheme.to_string(),
        }),
    }
}
