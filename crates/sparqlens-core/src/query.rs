//! SPARQL query text used by the response provider and node selection

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::QueryError;

/// Returns every CityGML city object of the city model together with the
/// class of the subject and of the object.
pub const DEFAULT_QUERY: &str = r#"PREFIX rdf:  <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX owl:  <http://www.w3.org/2002/07/owl#>
PREFIX xsd:  <http://www.w3.org/2001/XMLSchema#>
PREFIX gmlowl:  <http://www.opengis.net/ont/gml#>
PREFIX units: <http://www.opengis.net/def/uom/OGC/1.0/>
PREFIX geo: <http://www.opengis.net/ont/geosparql#>
PREFIX geof: <http://www.opengis.net/def/function/geosparql/>
PREFIX strdf: <http://strdf.di.uoa.gr/ontology#>
PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX core: <http://www.opengis.net/citygml/2.0/core#>
PREFIX bldg: <http://www.opengis.net/citygml/building/2.0/building#>

# Return all CityGML City Objects
SELECT *
WHERE {
  ?subject a core:CityModel ;
    ?predicate ?object .
  ?subject a ?subjectType .
  ?object a bldg:Building .
  ?object a ?objectType .

  FILTER(?subjectType != <http://www.w3.org/2002/07/owl#NamedIndividual>)
  FILTER(?objectType != <http://www.w3.org/2002/07/owl#NamedIndividual>)
}"#;

// Characters excluded from IRIREF by the SPARQL grammar
static RE_IRIREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^<>"{}|^`\\\x00-\x20]+$"#).expect("valid IRIREF regex"));

/// Check that `iri` can be written as `<iri>` inside a query
pub fn validate_iri(iri: &str) -> Result<&str, QueryError> {
    if RE_IRIREF.is_match(iri) {
        Ok(iri)
    } else {
        Err(QueryError::InvalidIri {
            iri: iri.to_string(),
        })
    }
}

/// All statements about a single subject
pub fn subject_detail_query(subject: &str) -> Result<String, QueryError> {
    let subject = validate_iri(subject)?;
    Ok(format!(
        "SELECT ?subject ?predicate ?object\nWHERE {{\n  ?subject ?predicate ?object .\n  FILTER(?subject = <{subject}>)\n}}"
    ))
}

/// All statements about any of `subjects`, in one round trip
pub fn batched_detail_query<S: AsRef<str>>(subjects: &[S]) -> Result<String, QueryError> {
    let mut values = String::new();
    for subject in subjects {
        let subject = validate_iri(subject.as_ref())?;
        values.push_str("    <");
        values.push_str(subject);
        values.push_str(">\n");
    }

    Ok(format!(
        "SELECT ?subject ?predicate ?object\nWHERE {{\n  VALUES ?subject {{\n{values}  }}\n  ?subject ?predicate ?object .\n}}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_selects_city_objects() {
        assert!(DEFAULT_QUERY.contains("?subject a core:CityModel"));
        assert!(DEFAULT_QUERY.contains("?objectType"));
    }

    #[test]
    fn accepts_ordinary_iris() {
        assert!(validate_iri("https://github.com/VCityTeam/UD-Graph/LYON_1ER_BATI_2015-20_bldg-patched#BU_1").is_ok());
        assert!(validate_iri("urn:uuid:1234").is_ok());
    }

    #[test]
    fn rejects_iris_that_break_out_of_brackets() {
        for iri in ["", "a b", "x> . ?s ?p ?o <y", "a\"b", "a{b}", "a\nb"] {
            assert!(validate_iri(iri).is_err(), "{iri:?} should be rejected");
        }
    }

    #[test]
    fn subject_query_filters_on_subject() {
        let query = subject_detail_query("https://example.org/lyon#BU_1").unwrap();
        assert!(query.contains("FILTER(?subject = <https://example.org/lyon#BU_1>)"));
    }

    #[test]
    fn batched_query_lists_every_subject() {
        let query = batched_detail_query(&["https://example.org/a#1", "https://example.org/a#2"])
            .unwrap();
        assert!(query.contains("VALUES ?subject {"));
        assert!(query.contains("<https://example.org/a#1>"));
        assert!(query.contains("<https://example.org/a#2>"));
        assert!(query.contains("?subject ?predicate ?object ."));
    }

    #[test]
    fn batched_query_rejects_bad_member() {
        let result = batched_detail_query(&["https://example.org/a#1", "bad iri"]);
        assert!(matches!(result, Err(QueryError::InvalidIri { iri }) if iri == "bad iri"));
    }
}
