//! URI tokenization into namespace and local id

use serde::Serialize;

/// A URI split into the namespace prefix and the local identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenizedUri<'a> {
    pub namespace: &'a str,
    pub id: &'a str,
}

/// Split a URI on its last `#`, or failing that on its last `/`.
///
/// The separator stays on the namespace side, so `namespace + id` is always
/// the original string. A string without either separator is all id.
pub fn tokenize_uri(uri: &str) -> TokenizedUri<'_> {
    let split_at = uri
        .rfind('#')
        .or_else(|| uri.rfind('/'))
        .map(|pos| pos + 1)
        .unwrap_or(0);

    let (namespace, id) = uri.split_at(split_at);
    TokenizedUri { namespace, id }
}

/// Local id of a URI
pub fn local_id(uri: &str) -> &str {
    tokenize_uri(uri).id
}

/// Namespace of a URI
pub fn namespace_of(uri: &str) -> &str {
    tokenize_uri(uri).namespace
}
