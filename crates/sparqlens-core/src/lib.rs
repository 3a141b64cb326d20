//! # sparqlens-core
//!
//! Core library for turning SPARQL endpoint results into views.
//!
//! This library provides:
//! - URI tokenization and namespace indexing
//! - Triple-to-graph transformation with building detail enrichment
//! - Graph (Mermaid), JSON and table renderers behind a view controller
//!
//! ## Features
//!
//! - `client` (default): reqwest-backed [`EndpointClient`]
//!
//! ## Example
//!
//! ```
//! use sparqlens_core::{NamespaceRegistry, SparqlResponse, ViewController, ViewFormat};
//!
//! let raw = r#"{"results": {"bindings": [{
//!     "subject": {"type": "uri", "value": "ns#A"},
//!     "predicate": {"type": "uri", "value": "ns#rel"},
//!     "object": {"type": "uri", "value": "ns#B"}
//! }]}}"#;
//!
//! let response = SparqlResponse::from_json_str(raw)?;
//! let mut registry = NamespaceRegistry::new();
//! let document = sparqlens_core::build_graph(&response.triples()?, &Default::default(), &mut registry);
//!
//! let mut controller = ViewController::new();
//! controller.update(&document.into(), ViewFormat::Table);
//! assert!(controller.current().unwrap().content.contains("ns#A"));
//! # Ok::<(), sparqlens_core::SparqlError>(())
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod namespace;
pub mod provider;
pub mod query;
pub mod render;
pub mod response;
pub mod selection;
pub mod types;
pub mod uri;
pub mod view;

#[cfg(feature = "client")]
pub mod client;

// Re-export commonly used types
pub use types::{BuildingDetail, GraphDocument, GraphLink, GraphNode, Triple};

pub use config::{LensConfig, QueryMethod, parse_endpoint};
pub use error::{
    ClientError, ConfigError, QueryError, ResponseError, Result, SparqlError, ViewError,
};
pub use graph::{DetailMap, GraphBuilder, build_graph, key_value_document};
pub use namespace::NamespaceRegistry;
pub use provider::{EnrichmentOptions, ResponseProvider, SparqlSource};
pub use response::SparqlResponse;
pub use selection::{BatchTableIndex, CityObjectIndex, NodeSelection};
pub use uri::{TokenizedUri, tokenize_uri};
pub use view::{DispatchOutcome, RenderedView, ViewController, ViewData, ViewFormat};

#[cfg(feature = "client")]
pub use client::EndpointClient;
