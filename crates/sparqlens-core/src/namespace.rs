//! Namespace registry used to color graph nodes and build the legend

use std::collections::HashMap;

use crate::uri::namespace_of;

/// Ordered, deduplicated set of namespaces.
///
/// The index of a namespace is the position at which it was first seen.
/// The registry is owned by whoever drives the queries and is passed into
/// the graph builder, so its history is explicit and can be reset.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    namespaces: Vec<String>,
    positions: HashMap<String, usize>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with `namespaces` in order
    pub fn seeded<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        registry.seed(namespaces);
        registry
    }

    /// Index of the namespace of `uri`, registering it if unseen
    pub fn index_of(&mut self, uri: &str) -> usize {
        self.insert(namespace_of(uri))
    }

    /// Index of `namespace` itself, registering it if unseen
    pub fn insert(&mut self, namespace: &str) -> usize {
        if let Some(&position) = self.positions.get(namespace) {
            return position;
        }
        let position = self.namespaces.len();
        self.namespaces.push(namespace.to_string());
        self.positions.insert(namespace.to_string(), position);
        position
    }

    /// Look up a namespace without registering it
    pub fn position(&self, namespace: &str) -> Option<usize> {
        self.positions.get(namespace).copied()
    }

    /// Append namespaces in order, skipping ones already present
    pub fn seed<I, S>(&mut self, namespaces: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for namespace in namespaces {
            let namespace = namespace.into();
            self.insert(&namespace);
        }
    }

    /// Forget every namespace seen so far
    pub fn reset(&mut self) {
        self.namespaces.clear();
        self.positions.clear();
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.namespaces.clone()
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_namespace_same_index() {
        let mut registry = NamespaceRegistry::new();
        let first = registry.index_of("http://example.com/ns#A");
        let second = registry.index_of("http://example.com/ns#B");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn indices_follow_first_seen_order() {
        let mut registry = NamespaceRegistry::new();
        let uris = [
            "http://c.example/ns#x",
            "http://a.example/ns#x",
            "http://c.example/ns#y",
            "http://b.example/path/z",
        ];
        let indices: Vec<usize> = uris.iter().map(|uri| registry.index_of(uri)).collect();

        assert_eq!(indices, vec![0, 1, 0, 2]);
        assert_eq!(
            registry.namespaces(),
            &[
                "http://c.example/ns#".to_string(),
                "http://a.example/ns#".to_string(),
                "http://b.example/path/".to_string(),
            ]
        );
    }

    #[test]
    fn accumulates_until_reset() {
        let mut registry = NamespaceRegistry::new();
        registry.index_of("a#1");
        registry.index_of("b#1");
        assert_eq!(registry.index_of("b#2"), 1);

        registry.reset();
        assert!(registry.is_empty());
        assert_eq!(registry.index_of("b#2"), 0);
        assert_eq!(registry.position("a#"), None);
    }

    #[test]
    fn seeding_fixes_order() {
        let mut registry = NamespaceRegistry::seeded(["b#", "a#", "b#"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.index_of("a#thing"), 1);
        assert_eq!(registry.index_of("c#thing"), 2);
        assert_eq!(registry.snapshot(), vec!["b#", "a#", "c#"]);
    }

    #[test]
    fn empty_namespace_is_a_namespace() {
        let mut registry = NamespaceRegistry::new();
        assert_eq!(registry.index_of("literal value"), 0);
        assert_eq!(registry.namespaces(), &[String::new()]);
    }
}
