//! HTTP client for a remote SPARQL endpoint
//!
//! Requires the `client` feature (needs reqwest)

use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use crate::config::{LensConfig, QueryMethod, parse_endpoint};
use crate::error::{ClientError, ConfigError, Result};
use crate::provider::SparqlSource;
use crate::response::SparqlResponse;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Sends queries to one endpoint. No retries, no authentication.
#[derive(Debug, Clone)]
pub struct EndpointClient {
    http: reqwest::Client,
    endpoint: Url,
    method: QueryMethod,
}

impl EndpointClient {
    pub fn new(endpoint: Url, config: &LensConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            endpoint,
            method: config.method,
        })
    }

    /// Build a client for the endpoint named in `config`
    pub fn from_config(config: &LensConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("no SPARQL endpoint configured".to_string()))?;
        Self::new(parse_endpoint(endpoint)?, config)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, query: &str) -> Result<String> {
        let endpoint = self.endpoint.as_str();
        let request = match self.method {
            QueryMethod::Get => self.http.get(self.endpoint.clone()).query(&[("query", query)]),
            QueryMethod::Post => self
                .http
                .post(self.endpoint.clone())
                .form(&[("query", query)]),
        };

        let response = request
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(endpoint, status = status.as_u16(), "endpoint answered");
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await.map_err(|err| ClientError::Body {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        })?;
        Ok(body)
    }
}

impl SparqlSource for EndpointClient {
    async fn select(&self, query: &str) -> Result<SparqlResponse> {
        let body = self.send(query).await?;
        Ok(SparqlResponse::from_json_str(&body)?)
    }
}
