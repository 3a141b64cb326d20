//! Error types for sparqlens-core
//!
//! Each concern has its own error enum; [`SparqlError`] wraps them so callers
//! can propagate any of them with `?`.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = SparqlError> = std::result::Result<T, E>;

/// Top-level error type
#[derive(Debug, Error)]
pub enum SparqlError {
    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    View(#[from] ViewError),
}

/// The endpoint answered with something that is not a usable results document
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to parse SPARQL results document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("SPARQL results document has no `results.bindings` array")]
    MissingBindings,

    #[error("binding {row} has no `{variable}` term")]
    MissingTerm { row: usize, variable: String },
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("IRI cannot be embedded in a SPARQL query: {iri}")]
    InvalidIri { iri: String },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint URL {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("unsupported endpoint scheme `{scheme}` (expected http or https)")]
    UnsupportedScheme { scheme: String },

    #[cfg(feature = "client")]
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[cfg(feature = "client")]
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("non-success status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("failed to read response body from {endpoint}: {reason}")]
    Body { endpoint: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("the {format} view needs a graph document")]
    NeedsGraph { format: &'static str },

    #[error("failed to serialize view data: {0}")]
    Serialize(#[from] serde_json::Error),
}
