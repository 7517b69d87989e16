//! In-memory triple store.
//!
//! Set semantics (re-adding a triple is a no-op), insertion order retained for
//! serialization, and two point indexes:
//!
//! - `(predicate, object) -> subjects`, used to walk hierarchies upwards-down
//!   (`?s rdfs:subPropertyOf <p>`), and
//! - `(subject, predicate) -> objects`, used for attribute lookups
//!   (`<s> rdfs:isDefinedBy ?o`).
//!
//! Nothing is ever removed.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{RdfNode, RdfObject, Triple};

#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
    by_predicate_object: HashMap<(String, RdfObject), Vec<usize>>,
    by_subject_predicate: HashMap<(RdfNode, String), Vec<usize>>,
    prefixes: BTreeMap<String, String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Insert a triple. Returns `false` when it was already present.
    pub fn add(
        &mut self,
        subject: impl Into<RdfNode>,
        predicate: &str,
        object: impl Into<RdfObject>,
    ) -> bool {
        let triple = Triple {
            subject: subject.into(),
            predicate: predicate.to_string(),
            object: object.into(),
        };
        if self.seen.contains(&triple) {
            return false;
        }

        let index = self.triples.len();
        self.by_predicate_object
            .entry((triple.predicate.clone(), triple.object.clone()))
            .or_default()
            .push(index);
        self.by_subject_predicate
            .entry((triple.subject.clone(), triple.predicate.clone()))
            .or_default()
            .push(index);
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    pub fn contains(&self, subject: &RdfNode, predicate: &str, object: &RdfObject) -> bool {
        self.seen.contains(&Triple {
            subject: subject.clone(),
            predicate: predicate.to_string(),
            object: object.clone(),
        })
    }

    /// Subjects `s` with `(s, predicate, object)` in the graph, in insertion order.
    pub fn subjects_with<'a>(
        &'a self,
        predicate: &str,
        object: &RdfObject,
    ) -> impl Iterator<Item = &'a RdfNode> + 'a {
        self.by_predicate_object
            .get(&(predicate.to_string(), object.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.triples[i].subject)
    }

    /// Objects `o` with `(subject, predicate, o)` in the graph, in insertion order.
    pub fn objects_of<'a>(
        &'a self,
        subject: &RdfNode,
        predicate: &str,
    ) -> impl Iterator<Item = &'a RdfObject> + 'a {
        self.by_subject_predicate
            .get(&(subject.clone(), predicate.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.triples[i].object)
    }

    /// First object of `(subject, predicate, ?)`.
    pub fn value_of(&self, subject: &RdfNode, predicate: &str) -> Option<&RdfObject> {
        self.objects_of(subject, predicate).next()
    }

    /// All triples using `predicate`, in insertion order.
    pub fn triples_with_predicate<'a>(
        &'a self,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| t.predicate == predicate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Bind (or rebind) a serialization prefix.
    pub fn bind_prefix(&mut self, prefix: &str, namespace: &str) {
        self.prefixes
            .insert(prefix.to_string(), namespace.to_string());
    }

    pub fn prefix_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(p, ns)| (p.as_str(), ns.as_str()))
    }
}

impl From<&str> for RdfNode {
    fn from(value: &str) -> Self {
        RdfNode::Iri(value.to_string())
    }
}

impl From<String> for RdfNode {
    fn from(value: String) -> Self {
        RdfNode::Iri(value)
    }
}

impl From<&RdfNode> for RdfNode {
    fn from(value: &RdfNode) -> Self {
        value.clone()
    }
}

impl From<&RdfNode> for RdfObject {
    fn from(value: &RdfNode) -> Self {
        RdfObject::Node(value.clone())
    }
}
