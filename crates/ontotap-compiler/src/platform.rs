//! Platform categories and the per-platform skeleton.
//!
//! Categories are the direct subclasses of the configured root category. A
//! compiled platform hangs off one of them:
//!
//! ```text
//! <category> <- subClassOf - <platform class>
//!                               <- subClassOf - <P>PlatformField   (root field class)
//! <P>Property          domain <P>PlatformField                     (root holder property)
//! <P>Relationship      domain <platform class>, range <P>PlatformField
//! ```

use ontotap_rdf::{local_name, vocab, Graph, RdfLiteral, RdfNode, RdfObject};

use crate::compile::Compiler;
use crate::config::CompileConfig;
use crate::naming::platform_type_name;
use crate::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub iri: RdfNode,
    pub label: String,
}

/// Which category the platform is filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChoice {
    /// An existing category, by IRI or label.
    Existing(String),
    /// Create `<name>Platform` under the root category.
    New(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformAnchors {
    pub name: String,
    pub namespace: String,
    pub prefix: String,
    pub category: RdfNode,
    pub platform_class: RdfNode,
    pub field_class: RdfNode,
    pub field_property: RdfNode,
    pub relationship: RdfNode,
}

/// Direct subclasses of `root_category`, labelled (falling back to the IRI's
/// local name).
pub fn categories(graph: &Graph, root_category: &str) -> Vec<Category> {
    let root = RdfObject::iri(root_category);
    graph
        .subjects_with(vocab::RDFS_SUBCLASS_OF, &root)
        .map(|iri| {
            let label = graph
                .value_of(iri, vocab::RDFS_LABEL)
                .and_then(RdfObject::lexical)
                .map(str::to_string)
                .unwrap_or_else(|| iri.as_iri().map(local_name).unwrap_or_else(|| iri.to_string()));
            Category {
                iri: iri.clone(),
                label,
            }
        })
        .collect()
}

/// `google ads` -> `GoogleAds`; each segment capitalized, rest lowercased.
fn namespace_segment(platform: &str) -> String {
    platform
        .trim()
        .split([' ', '-', '_'])
        .filter(|s| !s.is_empty())
        .map(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn platform_namespace(config: &CompileConfig, platform: &str) -> String {
    format!("{}{}#", config.platform_namespace_root, namespace_segment(platform))
}

/// Turtle prefix for the platform namespace: the lowercased name with anything
/// outside `[a-z0-9_]` replaced.
pub fn platform_prefix(platform: &str) -> String {
    let mut prefix: String = platform
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !prefix.starts_with(|c: char| c.is_ascii_alphabetic()) {
        prefix.insert(0, 'p');
    }
    prefix
}

impl Compiler<'_> {
    pub fn resolve_category(&mut self, choice: &CategoryChoice) -> Result<RdfNode, CompileError> {
        let root = self.config.root_category.clone();
        match choice {
            CategoryChoice::Existing(requested) => {
                let known = categories(&*self.graph, &root);
                if let Some(c) = known.iter().find(|c| c.iri.as_iri() == Some(requested.as_str())) {
                    return Ok(c.iri.clone());
                }
                let matches: Vec<&Category> = known
                    .iter()
                    .filter(|c| c.label.eq_ignore_ascii_case(requested.trim()))
                    .collect();
                match matches.as_slice() {
                    [one] => Ok(one.iri.clone()),
                    [] => Err(CompileError::UnknownCategory {
                        requested: requested.clone(),
                        available: if known.is_empty() {
                            "none".to_string()
                        } else {
                            known.iter().map(|c| c.label.as_str()).collect::<Vec<_>>().join(", ")
                        },
                    }),
                    many => Err(CompileError::AmbiguousCategory {
                        requested: requested.clone(),
                        matches: many.iter().map(|c| c.iri.to_string()).collect::<Vec<_>>().join(", "),
                    }),
                }
            }
            CategoryChoice::New(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(CompileError::EmptyCategory);
                }
                let base = self.config.base_namespace.clone();
                let iri = self.mint_in(&base, &["category", name]);
                self.graph.add(&iri, vocab::RDF_TYPE, RdfObject::iri(vocab::OWL_CLASS));
                self.graph
                    .add(&iri, vocab::RDFS_LABEL, RdfLiteral::lang(format!("{name}Platform"), "en"));
                self.graph.add(&iri, vocab::RDFS_SUBCLASS_OF, RdfObject::iri(root));
                self.stats.classes += 1;
                tracing::info!(category = %iri, "created platform category {name}Platform");
                Ok(iri)
            }
        }
    }

    /// Write the platform class, its root field class, root property and
    /// relationship, and bind the output prefixes.
    pub fn initialize_platform(&mut self, platform: &str, category: &RdfNode) -> PlatformAnchors {
        let prefix = platform_prefix(platform);
        let base = self.config.base_namespace.clone();
        let namespace = self.namespace.clone();
        self.graph.bind_prefix("", &base);
        self.graph.bind_prefix(&prefix, &namespace);

        let type_name = platform_type_name(platform);
        let scope = vec!["platform".to_string()];

        let platform_class = self.mint(&scope, "class");
        self.graph.add(&platform_class, vocab::RDF_TYPE, RdfObject::iri(vocab::OWL_CLASS));
        self.graph.add(&platform_class, vocab::RDFS_SUBCLASS_OF, category);
        self.graph.add(&platform_class, vocab::RDFS_LABEL, RdfLiteral::lang(platform, "en"));

        let field_class = self.mint(&scope, "field_class");
        self.graph.add(&field_class, vocab::RDF_TYPE, RdfObject::iri(vocab::OWL_CLASS));
        self.graph.add(
            &field_class,
            vocab::RDFS_LABEL,
            RdfLiteral::lang(format!("{type_name}PlatformField"), "en"),
        );
        self.graph.add(&field_class, vocab::RDFS_SUBCLASS_OF, &platform_class);

        let field_property = self.mint(&scope, "property");
        self.graph
            .add(&field_property, vocab::RDF_TYPE, RdfObject::iri(vocab::OWL_DATATYPE_PROPERTY));
        self.graph.add(
            &field_property,
            vocab::RDFS_LABEL,
            RdfLiteral::lang(format!("{type_name}Property"), "en"),
        );
        self.graph.add(&field_property, vocab::RDFS_DOMAIN, &field_class);

        let relationship = self.mint(&scope, "relationship");
        self.graph
            .add(&relationship, vocab::RDF_TYPE, RdfObject::iri(vocab::OWL_OBJECT_PROPERTY));
        self.graph.add(
            &relationship,
            vocab::RDFS_LABEL,
            RdfLiteral::lang(format!("{platform}Relationship"), "en"),
        );
        self.graph.add(&relationship, vocab::RDFS_DOMAIN, &platform_class);
        self.graph.add(&relationship, vocab::RDFS_RANGE, &field_class);

        self.stats.classes += 2;
        self.stats.datatype_properties += 1;
        self.stats.object_properties += 1;
        tracing::info!(platform, namespace = %namespace, "initialized platform");

        PlatformAnchors {
            name: platform.to_string(),
            namespace,
            prefix,
            category: category.clone(),
            platform_class,
            field_class,
            field_property,
            relationship,
        }
    }
}
