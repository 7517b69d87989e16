//! Class/property synthesis.
//!
//! Shapes written (all IRIs minted in the platform namespace):
//! - anchor class: `owl:Class`, `rdfs:label`@en, `rdfs:subClassOf` parent,
//!   `rdfs:isDefinedBy` label;
//! - holder property: `owl:DatatypeProperty`, label `<Label>Property`@en,
//!   `rdfs:domain` the class, `rdfs:subPropertyOf` the parent property;
//! - leaf property: `owl:DatatypeProperty`, label/defined-by the field name,
//!   `rdfs:domain` the owner class, `rdfs:range` an XSD type,
//!   `rdfs:subPropertyOf` the owner's holder property.

use ontotap_catalog::ScalarType;
use ontotap_rdf::{vocab, RdfLiteral, RdfNode, RdfObject};

use crate::compile::Compiler;

/// A class together with the holder property its fields hang from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub class: RdfNode,
    pub property: RdfNode,
    pub label: String,
}

pub fn xsd_range(ty: &ScalarType) -> &'static str {
    match ty {
        ScalarType::String => vocab::XSD_STRING,
        ScalarType::Integer => vocab::XSD_INTEGER,
        ScalarType::Boolean => vocab::XSD_BOOLEAN,
        ScalarType::Number => vocab::XSD_DECIMAL,
        ScalarType::Other(_) => vocab::XSD_STRING,
    }
}

/// Inverse of [`xsd_range`]; anything unrecognised reads back as a string.
pub fn scalar_for_range(iri: &str) -> ScalarType {
    match iri {
        vocab::XSD_INTEGER => ScalarType::Integer,
        vocab::XSD_BOOLEAN => ScalarType::Boolean,
        vocab::XSD_DECIMAL => ScalarType::Number,
        _ => ScalarType::String,
    }
}

impl Compiler<'_> {
    pub fn create_class_property(
        &mut self,
        path: &[String],
        label: &str,
        parent_class: &RdfNode,
        parent_property: &RdfNode,
    ) -> Anchor {
        let class = self.mint(path, "class");
        self.graph.add(&class, vocab::RDF_TYPE, RdfObject::iri(vocab::OWL_CLASS));
        self.graph.add(&class, vocab::RDFS_LABEL, RdfLiteral::lang(label, "en"));
        self.graph.add(&class, vocab::RDFS_SUBCLASS_OF, parent_class);
        self.graph.add(&class, vocab::RDFS_IS_DEFINED_BY, RdfLiteral::plain(label));

        let property = self.mint(path, "property");
        self.graph
            .add(&property, vocab::RDF_TYPE, RdfObject::iri(vocab::OWL_DATATYPE_PROPERTY));
        self.graph
            .add(&property, vocab::RDFS_LABEL, RdfLiteral::lang(format!("{label}Property"), "en"));
        self.graph.add(&property, vocab::RDFS_DOMAIN, &class);
        self.graph.add(&property, vocab::RDFS_SUBPROPERTY_OF, parent_property);

        self.stats.classes += 1;
        self.stats.datatype_properties += 1;

        Anchor {
            class,
            property,
            label: label.to_string(),
        }
    }

    /// Leaf datatype property `field_name` on `owner`.
    ///
    /// `role` separates leaves that share a path, e.g. a field literally named
    /// `Parent_id` and the key link of the same name.
    pub fn create_subproperty(
        &mut self,
        path: &[String],
        role: &str,
        owner: &Anchor,
        field_name: &str,
        ty: &ScalarType,
        is_primary_key: bool,
    ) -> RdfNode {
        let property = self.mint(path, role);
        self.graph
            .add(&property, vocab::RDF_TYPE, RdfObject::iri(vocab::OWL_DATATYPE_PROPERTY));
        self.graph.add(&property, vocab::RDFS_SUBPROPERTY_OF, &owner.property);
        self.graph.add(&property, vocab::RDFS_LABEL, RdfLiteral::plain(field_name));
        self.graph.add(&property, vocab::RDFS_DOMAIN, &owner.class);
        self.graph.add(&property, vocab::RDFS_RANGE, RdfObject::iri(xsd_range(ty)));
        self.graph
            .add(&property, vocab::RDFS_IS_DEFINED_BY, RdfLiteral::plain(field_name));
        if is_primary_key {
            let predicate = self.config.primary_key_predicate();
            self.graph
                .add(&property, &predicate, RdfLiteral::typed("true", vocab::XSD_BOOLEAN));
        }
        self.stats.datatype_properties += 1;
        property
    }

    /// `has<Field>Item` object property from `owner` to `item`.
    pub fn create_has_item(
        &mut self,
        path: &[String],
        label: &str,
        owner: &Anchor,
        item: &Anchor,
        relationship: &RdfNode,
    ) -> RdfNode {
        let property = self.mint(path, "has_item");
        self.graph
            .add(&property, vocab::RDF_TYPE, RdfObject::iri(vocab::OWL_OBJECT_PROPERTY));
        self.graph.add(&property, vocab::RDFS_LABEL, RdfLiteral::lang(label, "en"));
        self.graph.add(&property, vocab::RDFS_DOMAIN, &owner.class);
        self.graph.add(&property, vocab::RDFS_RANGE, &item.class);
        self.graph.add(&property, vocab::RDFS_SUBPROPERTY_OF, relationship);
        self.stats.object_properties += 1;
        property
    }

    pub fn attach_query(&mut self, class: &RdfNode, sql: String) {
        let predicate = self.config.query_predicate();
        if self.graph.add(class, &predicate, RdfLiteral::typed(sql, vocab::XSD_STRING)) {
            self.stats.queries += 1;
        }
    }
}
