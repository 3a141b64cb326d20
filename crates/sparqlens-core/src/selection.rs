//! Node selection: map a clicked graph node back to its city object

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::error::QueryError;
use crate::query::subject_detail_query;
use crate::uri::local_id;

/// Batch table attribute holding the city object id
pub const CITY_OBJECT_KEY: &str = "gml_id";

/// What the host needs after a node was selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSelection {
    pub node_id: String,
    /// Local id of the node, matched against the batch table
    pub companion_id: String,
    pub key: &'static str,
    /// Follow-up query for every statement about the node
    pub detail_query: String,
}

impl NodeSelection {
    pub fn from_node_id(node_id: &str) -> Result<Self, QueryError> {
        Ok(Self {
            node_id: node_id.to_string(),
            companion_id: local_id(node_id).to_string(),
            key: CITY_OBJECT_KEY,
            detail_query: subject_detail_query(node_id)?,
        })
    }
}

/// The table of city objects loaded alongside the graph, searchable by
/// batch table attribute
pub trait CityObjectIndex {
    type Object;

    fn find_by_attribute(&self, key: &str, value: &str) -> Option<&Self::Object>;

    fn find_selected(&self, selection: &NodeSelection) -> Option<&Self::Object> {
        self.find_by_attribute(selection.key, &selection.companion_id)
    }
}

/// A batch table held in memory: one attribute map per city object
#[derive(Debug, Clone, Default)]
pub struct BatchTableIndex<T> {
    rows: Vec<(HashMap<String, String>, T)>,
}

impl<T> BatchTableIndex<T> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn insert(&mut self, attributes: HashMap<String, String>, object: T) {
        self.rows.push((attributes, object));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl BatchTableIndex<Map<String, JsonValue>> {
    /// One city object per row; non-string attributes match on their JSON text
    pub fn from_rows(rows: impl IntoIterator<Item = Map<String, JsonValue>>) -> Self {
        let mut index = Self::new();
        for row in rows {
            let attributes = row
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        JsonValue::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), value)
                })
                .collect();
            index.insert(attributes, row);
        }
        index
    }
}

impl<T> CityObjectIndex for BatchTableIndex<T> {
    type Object = T;

    fn find_by_attribute(&self, key: &str, value: &str) -> Option<&T> {
        self.rows
            .iter()
            .find(|(attributes, _)| attributes.get(key).is_some_and(|v| v == value))
            .map(|(_, object)| object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(gml_id: &str) -> HashMap<String, String> {
        HashMap::from([(CITY_OBJECT_KEY.to_string(), gml_id.to_string())])
    }

    #[test]
    fn selection_uses_local_id() {
        let selection = NodeSelection::from_node_id(
            "https://github.com/VCityTeam/UD-Graph/LYON_1ER_BATI_2015-20_bldg-patched#BU_69381AB243",
        )
        .unwrap();
        assert_eq!(selection.companion_id, "BU_69381AB243");
        assert_eq!(selection.key, "gml_id");
        assert!(selection.detail_query.contains("FILTER(?subject = <https://github.com/VCityTeam/UD-Graph/LYON_1ER_BATI_2015-20_bldg-patched#BU_69381AB243>)"));
    }

    #[test]
    fn literal_nodes_cannot_be_queried() {
        assert!(NodeSelection::from_node_id("2017 01 14").is_err());
    }

    #[test]
    fn finds_selected_city_object() {
        let mut index = BatchTableIndex::new();
        index.insert(attributes("BU_1"), "tile 3 / object 12");
        index.insert(attributes("BU_2"), "tile 3 / object 13");

        let selection = NodeSelection::from_node_id("https://example.org/lyon#BU_2").unwrap();
        assert_eq!(index.find_selected(&selection), Some(&"tile 3 / object 13"));

        let missing = NodeSelection::from_node_id("https://example.org/lyon#BU_9").unwrap();
        assert_eq!(index.find_selected(&missing), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn indexes_json_rows() {
        let rows: Vec<Map<String, JsonValue>> = serde_json::from_str(
            r#"[{"gml_id": "BU_1", "height": 12.5}, {"gml_id": "BU_2", "storeys": 3}]"#,
        )
        .unwrap();
        let index = BatchTableIndex::from_rows(rows);

        let selection = NodeSelection::from_node_id("https://example.org/lyon#BU_2").unwrap();
        let row = index.find_selected(&selection).unwrap();
        assert_eq!(row["storeys"], 3);
        assert_eq!(
            index.find_by_attribute("height", "12.5").map(|row| &row["gml_id"]),
            Some(&JsonValue::from("BU_1"))
        );
    }
}
