//! SPARQL 1.1 JSON results documents

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ResponseError;
use crate::types::Triple;

pub const SUBJECT_VAR: &str = "subject";
pub const PREDICATE_VAR: &str = "predicate";
pub const OBJECT_VAR: &str = "object";
pub const SUBJECT_TYPE_VAR: &str = "subjectType";
pub const OBJECT_TYPE_VAR: &str = "objectType";

/// A single RDF term in a result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfTerm {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl RdfTerm {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".to_string(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn is_uri(&self) -> bool {
        self.kind == "uri"
    }
}

/// Variable name to term, one per result row
pub type Binding = HashMap<String, RdfTerm>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Vec<Binding>>,
}

/// A parsed results document.
///
/// `results.bindings` is optional at the serde level so that a document
/// missing it surfaces as [`ResponseError::MissingBindings`] when the rows
/// are read, not as an opaque parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparqlResponse {
    #[serde(default)]
    pub head: Head,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Results>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
}

impl SparqlResponse {
    pub fn from_json_str(raw: &str) -> Result<Self, ResponseError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_bindings(vars: Vec<String>, bindings: Vec<Binding>) -> Self {
        Self {
            head: Head { vars },
            results: Some(Results {
                bindings: Some(bindings),
            }),
            boolean: None,
        }
    }

    pub fn bindings(&self) -> Result<&[Binding], ResponseError> {
        self.results
            .as_ref()
            .and_then(|results| results.bindings.as_deref())
            .ok_or(ResponseError::MissingBindings)
    }

    /// Read every row as a triple over `?subject ?predicate ?object`
    pub fn triples(&self) -> Result<Vec<Triple>, ResponseError> {
        self.bindings()?
            .iter()
            .enumerate()
            .map(|(row, binding)| triple_from_binding(row, binding))
            .collect()
    }
}

pub fn triple_from_binding(row: usize, binding: &Binding) -> Result<Triple, ResponseError> {
    let required = |variable: &str| {
        binding
            .get(variable)
            .map(|term| term.value.clone())
            .ok_or_else(|| ResponseError::MissingTerm {
                row,
                variable: variable.to_string(),
            })
    };
    let optional = |variable: &str| binding.get(variable).map(|term| term.value.clone());

    Ok(Triple {
        subject: required(SUBJECT_VAR)?,
        predicate: required(PREDICATE_VAR)?,
        object: required(OBJECT_VAR)?,
        subject_type: optional(SUBJECT_TYPE_VAR),
        object_type: optional(OBJECT_TYPE_VAR),
    })
}
