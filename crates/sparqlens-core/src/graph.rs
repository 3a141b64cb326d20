//! Turning SPARQL result triples into graph and key/value documents

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::error::ResponseError;
use crate::namespace::NamespaceRegistry;
use crate::response::{OBJECT_VAR, PREDICATE_VAR, SUBJECT_VAR, SparqlResponse};
use crate::uri::local_id;

// Re-export types from the types module
pub use crate::types::{BuildingDetail, GraphDocument, GraphLink, GraphNode, Triple};

/// Details fetched per building URI
pub type DetailMap = HashMap<String, Vec<BuildingDetail>>;

/// Build a graph document from triples, assigning namespace indices from a
/// caller-owned registry
pub struct GraphBuilder<'r> {
    registry: &'r mut NamespaceRegistry,
    nodes: Vec<GraphNode>,
    positions: HashMap<String, usize>,
    links: Vec<GraphLink>,
}

impl<'r> GraphBuilder<'r> {
    pub fn new(registry: &'r mut NamespaceRegistry) -> Self {
        Self {
            registry,
            nodes: Vec::new(),
            positions: HashMap::new(),
            links: Vec::new(),
        }
    }

    /// Add one triple and the details fetched for its object
    pub fn ingest_triple(&mut self, triple: &Triple, details: &[BuildingDetail]) {
        for detail in details {
            self.ensure_node(&detail.value, &detail.value);
        }

        self.ensure_node(&triple.subject, &triple.subject);
        let object_class = triple.object_type.as_deref().unwrap_or(&triple.object);
        self.ensure_node(&triple.object, object_class);

        for detail in details {
            self.links.push(GraphLink {
                source: detail.value.clone(),
                target: triple.object.clone(),
                label: detail.label.clone(),
            });
        }
        self.links.push(GraphLink {
            source: triple.subject.clone(),
            target: triple.object.clone(),
            label: triple.predicate.clone(),
        });
    }

    pub fn ingest_all(&mut self, triples: &[Triple], details: &DetailMap) {
        for triple in triples {
            let for_object = details
                .get(&triple.object)
                .map(Vec::as_slice)
                .unwrap_or_default();
            self.ingest_triple(triple, for_object);
        }
    }

    /// Insert a node unless one with `id` exists; `namespace_source` is the
    /// URI whose namespace colors the node
    fn ensure_node(&mut self, id: &str, namespace_source: &str) {
        if self.positions.contains_key(id) {
            return;
        }
        let namespace = self.registry.index_of(namespace_source);
        self.positions.insert(id.to_string(), self.nodes.len());
        self.nodes.push(GraphNode {
            id: id.to_string(),
            namespace,
        });
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Finish the document; the legend is the registry as it stands now
    pub fn into_document(self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes,
            links: self.links,
            legend: self.registry.snapshot(),
        }
    }
}

/// Build a document in one go
pub fn build_graph(
    triples: &[Triple],
    details: &DetailMap,
    registry: &mut NamespaceRegistry,
) -> GraphDocument {
    let mut builder = GraphBuilder::new(registry);
    builder.ingest_all(triples, details);
    builder.into_document()
}

/// Whether the triple's object is an instance of `building_class`
pub fn is_building(triple: &Triple, building_class: &str) -> bool {
    triple
        .object_type
        .as_deref()
        .is_some_and(|class| local_id(class) == building_class)
}

/// Distinct building objects in first-seen order
pub fn building_objects<'t>(triples: &'t [Triple], building_class: &str) -> Vec<&'t str> {
    let mut seen = std::collections::HashSet::new();
    triples
        .iter()
        .filter(|triple| is_building(triple, building_class))
        .map(|triple| triple.object.as_str())
        .filter(|object| seen.insert(*object))
        .collect()
}

/// Group `?subject ?predicate ?object` detail rows by subject, dropping rows
/// whose object contains one of `excluded`
pub fn details_from_response(
    response: &SparqlResponse,
    excluded: &[String],
) -> Result<DetailMap, ResponseError> {
    let mut details = DetailMap::new();

    for (row, binding) in response.bindings()?.iter().enumerate() {
        let term = |variable: &str| {
            binding
                .get(variable)
                .map(|term| term.value.as_str())
                .ok_or_else(|| ResponseError::MissingTerm {
                    row,
                    variable: variable.to_string(),
                })
        };
        let subject = term(SUBJECT_VAR)?;
        let predicate = term(PREDICATE_VAR)?;
        let object = term(OBJECT_VAR)?;

        if excluded.iter().any(|marker| object.contains(marker.as_str())) {
            continue;
        }

        details
            .entry(subject.to_string())
            .or_default()
            .push(BuildingDetail {
                value: object.to_string(),
                label: predicate.to_string(),
            });
    }

    Ok(details)
}

/// Flatten triples into `{predicate local id: object value}`; later triples
/// overwrite earlier ones sharing a predicate id
pub fn key_value_document(triples: &[Triple]) -> Map<String, JsonValue> {
    let mut document = Map::new();
    for triple in triples {
        document.insert(
            local_id(&triple.predicate).to_string(),
            JsonValue::String(triple.object.clone()),
        );
    }
    document
}
