//! RDF graph plumbing for ontotap (boundary adapter).
//!
//! This crate sits at the **I/O boundary** of the compiler:
//!
//! - It loads the externally maintained base ontology (Turtle, N-Triples, RDF/XML).
//! - It holds the in-memory triple set every compiler component mutates.
//! - It writes the finished graph back out as Turtle.
//!
//! Parsing is delegated to **Sophia**; every parsed term is normalised into the
//! small owned term model below so that the rest of the workspace never touches
//! Sophia's borrowed term types.

pub mod graph;
pub mod turtle;
pub mod vocab;

pub use graph::Graph;

use sophia::api::prelude::*;
// The crate's own `Triple` struct shadows the trait from the prelude.
use sophia::api::triple::Triple as _;
use std::fmt;
use std::path::Path;

// ============================================================================
// RDF term model
// ============================================================================

/// Subject-position term (IRI or blank node).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RdfNode {
    Iri(String),
    BlankNode(String),
}

impl RdfNode {
    pub fn iri(iri: impl Into<String>) -> Self {
        RdfNode::Iri(iri.into())
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            RdfNode::Iri(iri) => Some(iri),
            RdfNode::BlankNode(_) => None,
        }
    }
}

impl fmt::Display for RdfNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfNode::Iri(iri) => write!(f, "<{iri}>"),
            RdfNode::BlankNode(bn) => write!(f, "_:{bn}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RdfLiteral {
    pub lexical: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl RdfLiteral {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn lang(lexical: impl Into<String>, language: &str) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.to_string()),
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: &str) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype.to_string()),
            language: None,
        }
    }
}

/// Object-position term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RdfObject {
    Node(RdfNode),
    Literal(RdfLiteral),
}

impl RdfObject {
    pub fn iri(iri: impl Into<String>) -> Self {
        RdfObject::Node(RdfNode::Iri(iri.into()))
    }

    pub fn as_node(&self) -> Option<&RdfNode> {
        match self {
            RdfObject::Node(node) => Some(node),
            RdfObject::Literal(_) => None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        self.as_node().and_then(RdfNode::as_iri)
    }

    pub fn as_literal(&self) -> Option<&RdfLiteral> {
        match self {
            RdfObject::Literal(lit) => Some(lit),
            RdfObject::Node(_) => None,
        }
    }

    /// Lexical form of a literal, or `None` for nodes.
    pub fn lexical(&self) -> Option<&str> {
        self.as_literal().map(|lit| lit.lexical.as_str())
    }
}

impl From<RdfNode> for RdfObject {
    fn from(value: RdfNode) -> Self {
        RdfObject::Node(value)
    }
}

impl From<RdfLiteral> for RdfObject {
    fn from(value: RdfLiteral) -> Self {
        RdfObject::Literal(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: RdfNode,
    pub predicate: String,
    pub object: RdfObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    RdfXml,
}

impl RdfFormat {
    pub fn from_path(path: &Path) -> Result<Self, GraphError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "nt" | "ntriples" => Ok(RdfFormat::NTriples),
            "ttl" | "turtle" => Ok(RdfFormat::Turtle),
            "rdf" | "owl" | "xml" => Ok(RdfFormat::RdfXml),
            other => Err(GraphError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unsupported format: .{0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct RdfSinkError {
    message: String,
}

impl From<GraphError> for RdfSinkError {
    fn from(value: GraphError) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Last path/fragment segment of an IRI.
pub fn local_name(iri: &str) -> String {
    iri.rsplit(['#', '/']).next().unwrap_or(iri).to_string()
}

fn unescape_rdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parse the N-Triples display form Sophia produces for a term.
pub(crate) fn parse_term_display(term: &str) -> Result<RdfObject, GraphError> {
    let s = term.trim();

    if let Some(rest) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(RdfObject::iri(rest));
    }

    if let Some(rest) = s.strip_prefix("_:") {
        return Ok(RdfObject::Node(RdfNode::BlankNode(rest.to_string())));
    }

    if s.starts_with('"') {
        let mut end_quote = None;
        let mut prev_was_escape = false;
        for (i, ch) in s.char_indices().skip(1) {
            if ch == '"' && !prev_was_escape {
                end_quote = Some(i);
                break;
            }
            prev_was_escape = ch == '\\' && !prev_was_escape;
        }
        let Some(end) = end_quote else {
            return Err(GraphError::Parse(format!(
                "invalid literal term (missing closing quote): {s}"
            )));
        };

        let lexical = unescape_rdf_string(&s[1..end]);
        let rest = s[end + 1..].trim();

        let mut language = None;
        let mut datatype = None;
        if let Some(lang) = rest.strip_prefix('@') {
            language = Some(lang.to_string());
        } else if let Some(dt) = rest.strip_prefix("^^") {
            let dt = dt.trim();
            if let Some(dt_iri) = dt.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
                datatype = Some(dt_iri.to_string());
            } else if !dt.is_empty() {
                datatype = Some(dt.to_string());
            }
        }

        return Ok(RdfObject::Literal(RdfLiteral {
            lexical,
            datatype,
            language,
        }));
    }

    Err(GraphError::Parse(format!("unsupported RDF term form: {s}")))
}

fn parse_node_term_display(term: &str) -> Result<RdfNode, GraphError> {
    match parse_term_display(term)? {
        RdfObject::Node(node) => Ok(node),
        RdfObject::Literal(_) => Err(GraphError::Parse(format!(
            "expected IRI/blank node, got literal: {term}"
        ))),
    }
}

fn push_display_triple(
    graph: &mut Graph,
    subject: &str,
    predicate: &str,
    object: &str,
) -> Result<(), RdfSinkError> {
    let subject = parse_node_term_display(subject)?;
    let RdfNode::Iri(predicate) = parse_node_term_display(predicate)? else {
        return Ok(());
    };
    let object = parse_term_display(object)?;
    graph.add(subject, &predicate, object);
    Ok(())
}

/// Parse an RDF document into a fresh [`Graph`].
///
/// `@prefix`/`PREFIX` declarations of Turtle input are retained so the
/// serializer can reuse them.
pub fn parse_graph(text: &str, format: RdfFormat) -> Result<Graph, GraphError> {
    let mut graph = Graph::new();
    let reader = std::io::BufReader::new(std::io::Cursor::new(text.as_bytes()));

    match format {
        RdfFormat::NTriples => {
            let mut parser = sophia::turtle::parser::nt::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| -> Result<(), RdfSinkError> {
                    push_display_triple(
                        &mut graph,
                        &t.s().to_string(),
                        &t.p().to_string(),
                        &t.o().to_string(),
                    )
                })
                .map_err(|e| GraphError::Parse(format!("failed to parse N-Triples: {e}")))?;
        }
        RdfFormat::Turtle => {
            for (prefix, namespace) in turtle::scan_prefix_declarations(text) {
                graph.bind_prefix(&prefix, &namespace);
            }
            let mut parser = sophia::turtle::parser::turtle::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| -> Result<(), RdfSinkError> {
                    push_display_triple(
                        &mut graph,
                        &t.s().to_string(),
                        &t.p().to_string(),
                        &t.o().to_string(),
                    )
                })
                .map_err(|e| GraphError::Parse(format!("failed to parse Turtle: {e}")))?;
        }
        RdfFormat::RdfXml => {
            let mut parser = sophia::xml::parser::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| -> Result<(), RdfSinkError> {
                    push_display_triple(
                        &mut graph,
                        &t.s().to_string(),
                        &t.p().to_string(),
                        &t.o().to_string(),
                    )
                })
                .map_err(|e| GraphError::Parse(format!("failed to parse RDF/XML: {e}")))?;
        }
    }

    tracing::debug!(triples = graph.len(), "parsed RDF document");
    Ok(graph)
}

/// Load a graph from disk, picking the syntax from the file extension.
pub fn load_graph_file(path: &Path) -> Result<Graph, GraphError> {
    let format = RdfFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    parse_graph(&text, format)
}

/// Serialize `graph` as Turtle and write it to `path`.
pub fn write_turtle_file(graph: &Graph, path: &Path) -> Result<(), GraphError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, turtle::to_turtle(graph))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TTL: &str = r#"
@prefix : <https://www.cohesyve.com/ontologies/combined#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

:maduz-holot-kogit-sojal a owl:Class ;
    rdfs:label "Platform"@en .

:payments a owl:Class ;
    rdfs:label "PaymentsPlatform"@en ;
    rdfs:subClassOf :maduz-holot-kogit-sojal .
"#;

    #[test]
    fn parses_turtle_into_graph() {
        let graph = parse_graph(SAMPLE_TTL, RdfFormat::Turtle).expect("turtle");
        assert_eq!(graph.len(), 5);

        let root = RdfObject::iri("https://www.cohesyve.com/ontologies/combined#maduz-holot-kogit-sojal");
        let subs: Vec<_> = graph.subjects_with(vocab::RDFS_SUBCLASS_OF, &root).collect();
        assert_eq!(subs.len(), 1);

        let label = graph
            .value_of(subs[0], vocab::RDFS_LABEL)
            .and_then(RdfObject::as_literal)
            .expect("label");
        assert_eq!(label.lexical, "PaymentsPlatform");
        assert_eq!(label.language.as_deref(), Some("en"));
    }

    #[test]
    fn parses_multi_line_literals_with_accents() {
        let text = "@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
                    <urn:a> rdfs:comment \"\"\"first line\nL'été est chaud\"\"\" .\n";
        let graph = parse_graph(text, RdfFormat::Turtle).expect("turtle");
        let comment = graph
            .value_of(&RdfNode::iri("urn:a"), "http://www.w3.org/2000/01/rdf-schema#comment")
            .and_then(RdfObject::lexical)
            .expect("comment");
        assert_eq!(comment, "first line\nL'été est chaud");
    }

    #[test]
    fn keeps_declared_prefixes() {
        let graph = parse_graph(SAMPLE_TTL, RdfFormat::Turtle).expect("turtle");
        assert_eq!(
            graph.prefix_namespace(""),
            Some("https://www.cohesyve.com/ontologies/combined#")
        );
    }

    #[test]
    fn literal_display_form_round_trips_escapes() {
        let obj = parse_term_display(r#""a \"quoted\"\nline"^^<http://www.w3.org/2001/XMLSchema#string>"#)
            .expect("literal");
        let lit = obj.as_literal().expect("literal");
        assert_eq!(lit.lexical, "a \"quoted\"\nline");
        assert_eq!(lit.datatype.as_deref(), Some(vocab::XSD_STRING));
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = RdfFormat::from_path(Path::new("base.json")).unwrap_err();
        assert!(matches!(err, GraphError::UnsupportedFormat(ext) if ext == "json"));
    }

    #[test]
    fn invalid_turtle_is_a_parse_error() {
        let err = parse_graph("@prefix : <x> .\n:a :b", RdfFormat::Turtle).unwrap_err();
        assert!(matches!(err, GraphError::Parse(_)));
    }
}
