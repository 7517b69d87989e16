//! Parent-key propagation into item classes.
//!
//! For each declared key `k` the owner's leaf defined by `k` is located among
//! the direct subproperties of the owner's holder property. Owners that are
//! themselves item classes only carry `Parent_k`, so that name is tried next.
//! The item gets its own `Parent_k` leaf, typed like the parent's, declared
//! `owl:equivalentProperty` to it.

use ontotap_rdf::{vocab, Graph, RdfNode, RdfObject};

use crate::compile::Compiler;
use crate::diagnostics::{codes, Diagnostic};
use crate::synth::{scalar_for_range, Anchor};

#[derive(Debug, Clone)]
pub(crate) struct PendingLink {
    pub owner: Anchor,
    pub item: Anchor,
    pub path: Vec<String>,
    /// 1 for arrays directly on the stream.
    pub depth: usize,
}

/// Direct subproperty of `parent_property` whose `rdfs:isDefinedBy` is `name`.
pub fn find_defined_subproperty<'g>(graph: &'g Graph, parent_property: &RdfNode, name: &str) -> Option<&'g RdfNode> {
    graph
        .subjects_with(vocab::RDFS_SUBPROPERTY_OF, &RdfObject::from(parent_property))
        .find(|candidate| {
            graph
                .objects_of(candidate, vocab::RDFS_IS_DEFINED_BY)
                .any(|o| o.lexical() == Some(name))
        })
}

impl Compiler<'_> {
    pub(crate) fn link_parent_keys(&mut self, stream: &str, link: &PendingLink, keys: &[String]) {
        for key in keys {
            let parent_name = format!("Parent_{key}");
            let found = find_defined_subproperty(&*self.graph, &link.owner.property, key)
                .or_else(|| {
                    (link.depth > 1)
                        .then(|| find_defined_subproperty(&*self.graph, &link.owner.property, &parent_name))
                        .flatten()
                })
                .cloned();

            let Some(parent_key) = found else {
                self.report(
                    Diagnostic::warning(
                        codes::KEY_UNRESOLVED,
                        format!(
                            "key `{key}` has no property on `{}`; `{}` gets no `{parent_name}` link",
                            link.owner.label, link.item.label
                        ),
                    )
                    .in_stream(stream)
                    .on_field(key),
                );
                continue;
            };

            let ty = self
                .graph
                .value_of(&parent_key, vocab::RDFS_RANGE)
                .and_then(RdfObject::as_iri)
                .map(scalar_for_range)
                .unwrap_or(ontotap_catalog::ScalarType::String);
            let mut path = link.path.clone();
            path.push(parent_name.clone());
            let property = self.create_subproperty(&path, "parent_key", &link.item, &parent_name, &ty, false);
            self.graph.add(&property, vocab::OWL_EQUIVALENT_PROPERTY, &parent_key);
            self.stats.key_links += 1;
            tracing::debug!(key = %key, item = %link.item.label, "linked parent key");
        }
    }
}
