//! Query orchestration: run a query, enrich buildings, build the document

use std::future::Future;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, error, info, warn};

use crate::config::LensConfig;
use crate::error::Result;
use crate::graph::{self, DetailMap, GraphDocument};
use crate::namespace::NamespaceRegistry;
use crate::query::{batched_detail_query, validate_iri};
use crate::response::SparqlResponse;

/// Anything that can answer a SELECT query with a results document
pub trait SparqlSource {
    fn select(&self, query: &str) -> impl Future<Output = Result<SparqlResponse>> + Send;
}

/// Which objects get their details fetched, and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentOptions {
    pub enabled: bool,
    pub building_class: String,
    pub excluded_detail_markers: Vec<String>,
    pub batch_size: usize,
    pub concurrency: usize,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self::from(&LensConfig::default())
    }
}

impl From<&LensConfig> for EnrichmentOptions {
    fn from(config: &LensConfig) -> Self {
        Self {
            enabled: config.enrich_buildings,
            building_class: config.building_class.clone(),
            excluded_detail_markers: config.excluded_detail_markers.clone(),
            batch_size: config.detail_batch_size.max(1),
            concurrency: config.detail_concurrency.max(1),
        }
    }
}

/// Owns the source, the namespace registry shared by successive queries of
/// a session, and the most recent response
pub struct ResponseProvider<S> {
    source: S,
    options: EnrichmentOptions,
    registry: NamespaceRegistry,
    response: Option<SparqlResponse>,
}

impl<S: SparqlSource + Sync> ResponseProvider<S> {
    pub fn new(source: S, options: EnrichmentOptions) -> Self {
        Self::with_registry(source, options, NamespaceRegistry::new())
    }

    pub fn with_registry(source: S, options: EnrichmentOptions, registry: NamespaceRegistry) -> Self {
        Self {
            source,
            options,
            registry,
            response: None,
        }
    }

    /// Run `query`, fetch details for every building it returns and build a
    /// graph document. Any failure leaves the previous response in place.
    pub async fn query_graph(&mut self, query: &str) -> Result<GraphDocument> {
        let response = self.run(query).await?;
        let triples = response.triples()?;

        let details = if self.options.enabled {
            let buildings = graph::building_objects(&triples, &self.options.building_class);
            self.building_details(&buildings).await?
        } else {
            DetailMap::new()
        };

        let document = graph::build_graph(&triples, &details, &mut self.registry);
        info!(
            triples = triples.len(),
            nodes = document.nodes.len(),
            links = document.links.len(),
            namespaces = document.legend.len(),
            "graph document built"
        );

        self.response = Some(response);
        Ok(document)
    }

    /// Run `query` and flatten its triples into a key/value document
    pub async fn query_key_value(&mut self, query: &str) -> Result<Map<String, JsonValue>> {
        let response = self.run(query).await?;
        let document = graph::key_value_document(&response.triples()?);
        self.response = Some(response);
        Ok(document)
    }

    /// Fetch the details of `buildings` with one VALUES query per batch,
    /// at most `concurrency` batches in flight
    pub async fn building_details(&self, buildings: &[&str]) -> Result<DetailMap> {
        let valid: Vec<&str> = buildings
            .iter()
            .copied()
            .filter(|iri| match validate_iri(iri) {
                Ok(_) => true,
                Err(err) => {
                    warn!(error = %err, "skipping building detail lookup");
                    false
                }
            })
            .collect();

        if valid.is_empty() {
            return Ok(DetailMap::new());
        }

        let queries = valid
            .chunks(self.options.batch_size)
            .map(batched_detail_query)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(
            buildings = valid.len(),
            batches = queries.len(),
            "fetching building details"
        );

        let responses: Vec<SparqlResponse> = stream::iter(queries.iter())
            .map(|query| self.source.select(query))
            .buffered(self.options.concurrency)
            .try_collect()
            .await
            .inspect_err(|err| error!(error = %err, "building detail query failed"))?;

        let mut details = DetailMap::new();
        for response in &responses {
            for (subject, rows) in
                graph::details_from_response(response, &self.options.excluded_detail_markers)?
            {
                details.entry(subject).or_default().extend(rows);
            }
        }
        Ok(details)
    }

    /// Build a document from a response obtained elsewhere, without enrichment
    pub fn graph_from_response(&mut self, response: SparqlResponse) -> Result<GraphDocument> {
        let triples = response.triples()?;
        let document = graph::build_graph(&triples, &DetailMap::new(), &mut self.registry);
        self.response = Some(response);
        Ok(document)
    }

    async fn run(&self, query: &str) -> Result<SparqlResponse> {
        debug!(query_bytes = query.len(), "querying endpoint");
        self.source
            .select(query)
            .await
            .inspect_err(|err| error!(error = %err, "endpoint query failed"))
    }

    pub fn last_response(&self) -> Option<&SparqlResponse> {
        self.response.as_ref()
    }

    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    pub fn reset_namespaces(&mut self) {
        self.registry.reset();
    }

    pub fn options(&self) -> &EnrichmentOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::{ClientError, SparqlError};
    use crate::response::{Binding, RdfTerm};

    const CORE: &str = "http://www.opengis.net/citygml/2.0/core#";
    const BLDG: &str = "http://www.opengis.net/citygml/building/2.0/building#Building";
    const LYON: &str = "https://example.org/lyon#";

    /// Answers the main query with city members and detail queries with one
    /// creation date per requested building
    struct FakeEndpoint {
        buildings: Vec<String>,
        queries: Mutex<Vec<String>>,
        fail_details: bool,
    }

    impl FakeEndpoint {
        fn new(count: usize) -> Self {
            Self {
                buildings: (0..count).map(|i| format!("{LYON}BU_{i}")).collect(),
                queries: Mutex::new(Vec::new()),
                fail_details: false,
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }

        fn respond(&self, query: &str) -> Result<SparqlResponse> {
            if query.contains("VALUES") {
                if self.fail_details {
                    return Err(SparqlError::Client(ClientError::Status {
                        endpoint: "http://fake/sparql".to_string(),
                        status: 503,
                    }));
                }
                let rows = self
                    .buildings
                    .iter()
                    .filter(|b| query.contains(&format!("<{b}>")))
                    .flat_map(|b| {
                        [
                            row(b, "http://www.w3.org/1999/02/22-rdf-syntax-ns#type", BLDG),
                            row(b, &format!("{CORE}creationDate"), "2017-01-14"),
                        ]
                    })
                    .collect();
                return Ok(SparqlResponse::from_bindings(vars(), rows));
            }

            let mut rows: Vec<Binding> = self
                .buildings
                .iter()
                .map(|b| {
                    let mut binding = row(
                        &format!("{LYON}CityModel_1"),
                        &format!("{CORE}cityObjectMember"),
                        b,
                    );
                    binding.insert("objectType".to_string(), RdfTerm::uri(BLDG));
                    binding
                })
                .collect();
            // the same building twice must only be fetched once
            if let Some(first) = rows.first().cloned() {
                rows.push(first);
            }
            Ok(SparqlResponse::from_bindings(vars(), rows))
        }
    }

    impl SparqlSource for FakeEndpoint {
        async fn select(&self, query: &str) -> Result<SparqlResponse> {
            self.queries.lock().unwrap().push(query.to_string());
            self.respond(query)
        }
    }

    fn vars() -> Vec<String> {
        vec!["subject".into(), "predicate".into(), "object".into()]
    }

    fn row(subject: &str, predicate: &str, object: &str) -> Binding {
        let mut binding = Binding::new();
        binding.insert("subject".to_string(), RdfTerm::uri(subject));
        binding.insert("predicate".to_string(), RdfTerm::uri(predicate));
        binding.insert("object".to_string(), RdfTerm::uri(object));
        binding
    }

    fn options(batch_size: usize) -> EnrichmentOptions {
        EnrichmentOptions {
            batch_size,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn graph_query_enriches_buildings_in_batches() {
        let mut provider = ResponseProvider::new(FakeEndpoint::new(5), options(2));
        let document = provider.query_graph("SELECT * WHERE { ?s ?p ?o }").await.unwrap();

        // main query plus ceil(5 / 2) detail batches
        let queries = provider.source().queries();
        assert_eq!(queries.len(), 4);
        assert_eq!(queries.iter().filter(|q| q.contains("VALUES")).count(), 3);

        // city model, five buildings, one shared creation date
        assert_eq!(document.nodes.len(), 7);
        assert!(document.node("2017-01-14").is_some());
        // six base links (one duplicate row), five detail links plus one for the duplicate
        assert_eq!(document.links.len(), 12);
        assert!(
            document
                .links
                .iter()
                .all(|link| !link.target.contains("Building"))
        );
        assert!(provider.last_response().is_some());
    }

    #[tokio::test]
    async fn enrichment_can_be_disabled() {
        let options = EnrichmentOptions {
            enabled: false,
            ..Default::default()
        };
        let mut provider = ResponseProvider::new(FakeEndpoint::new(3), options);
        let document = provider.query_graph("SELECT").await.unwrap();

        assert_eq!(provider.source().queries().len(), 1);
        assert_eq!(document.nodes.len(), 4);
        assert_eq!(document.links.len(), 4);
    }

    #[tokio::test]
    async fn registry_accumulates_across_queries_until_reset() {
        let mut provider = ResponseProvider::with_registry(
            FakeEndpoint::new(1),
            options(10),
            NamespaceRegistry::seeded(["http://seeded.example/#"]),
        );

        let first = provider.query_graph("SELECT").await.unwrap();
        assert_eq!(first.legend[0], "http://seeded.example/#");
        let city_model = first.node(&format!("{LYON}CityModel_1")).unwrap();
        assert_ne!(city_model.namespace, 0);

        provider.reset_namespaces();
        let second = provider.query_graph("SELECT").await.unwrap();
        assert!(!second.legend.contains(&"http://seeded.example/#".to_string()));
    }

    #[tokio::test]
    async fn failing_detail_batch_aborts_the_document() {
        let mut endpoint = FakeEndpoint::new(2);
        endpoint.fail_details = true;
        let mut provider = ResponseProvider::new(endpoint, options(1));

        let result = provider.query_graph("SELECT").await;
        assert!(matches!(
            result,
            Err(SparqlError::Client(ClientError::Status { status: 503, .. }))
        ));
        assert!(provider.last_response().is_none());
    }

    #[tokio::test]
    async fn key_value_query_flattens_predicates() {
        let mut provider = ResponseProvider::new(FakeEndpoint::new(1), options(10));
        let document = provider.query_key_value("SELECT").await.unwrap();
        assert_eq!(document["cityObjectMember"], format!("{LYON}BU_0"));
        assert_eq!(provider.source().queries().len(), 1);
    }

    #[tokio::test]
    async fn invalid_building_iris_are_skipped() {
        let provider = ResponseProvider::new(FakeEndpoint::new(1), options(10));
        let details = provider
            .building_details(&["not an iri", "also <bad>"])
            .await
            .unwrap();
        assert!(details.is_empty());
        assert!(provider.source().queries().is_empty());
    }
}
