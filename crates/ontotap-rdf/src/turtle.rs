//! Turtle output.
//!
//! Subjects are written in first-seen order with their predicates grouped
//! (`;`) and repeated objects folded (`,`), so a base ontology that is loaded
//! and re-written keeps its original reading order with the compiled triples
//! appended after it.

use std::collections::HashMap;
use std::fmt::Write;

use crate::{vocab, Graph, RdfLiteral, RdfNode, RdfObject, Triple};

/// Extract `@prefix p: <ns> .` / `PREFIX p: <ns>` declarations from Turtle text.
pub fn scan_prefix_declarations(text: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        let rest = if let Some(rest) = line.strip_prefix("@prefix") {
            rest
        } else if let Some(rest) = line
            .get(..6)
            .filter(|head| head.eq_ignore_ascii_case("prefix"))
            .map(|_| &line[6..])
        {
            rest
        } else {
            continue;
        };

        let rest = rest.trim();
        let Some((prefix, tail)) = rest.split_once(':') else {
            continue;
        };
        let tail = tail.trim();
        let Some(ns) = tail
            .strip_prefix('<')
            .and_then(|t| t.split_once('>'))
            .map(|(ns, _)| ns)
        else {
            continue;
        };
        out.push((prefix.trim().to_string(), ns.to_string()));
    }
    out
}

fn is_pn_local(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => chars
            .clone()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !local.ends_with('.'),
        Some(_) => false,
    }
}

struct PrefixTable {
    // Longest namespace first so the most specific prefix wins.
    entries: Vec<(String, String)>,
}

impl PrefixTable {
    fn new(graph: &Graph) -> Self {
        let mut by_prefix: HashMap<String, String> = vocab::STANDARD_PREFIXES
            .iter()
            .map(|(p, ns)| (p.to_string(), ns.to_string()))
            .collect();
        for (prefix, ns) in graph.prefixes() {
            by_prefix.insert(prefix.to_string(), ns.to_string());
        }
        let mut entries: Vec<(String, String)> = by_prefix.into_iter().collect();
        entries.sort_by(|(pa, na), (pb, nb)| nb.len().cmp(&na.len()).then(pa.cmp(pb)));
        Self { entries }
    }

    fn compact(&self, iri: &str) -> Option<String> {
        self.entries.iter().find_map(|(prefix, ns)| {
            let local = iri.strip_prefix(ns.as_str())?;
            is_pn_local(local).then(|| format!("{prefix}:{local}"))
        })
    }

    fn iri(&self, iri: &str) -> String {
        self.compact(iri).unwrap_or_else(|| format!("<{iri}>"))
    }

    fn header(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        let mut out = String::new();
        for (prefix, ns) in sorted {
            let _ = writeln!(out, "@prefix {prefix}: <{ns}> .");
        }
        out
    }
}

fn escape_short(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn escape_long(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn literal(prefixes: &PrefixTable, lit: &RdfLiteral) -> String {
    let body = if lit.lexical.contains('\n') {
        format!("\"\"\"{}\"\"\"", escape_long(&lit.lexical))
    } else {
        format!("\"{}\"", escape_short(&lit.lexical))
    };
    match (&lit.language, &lit.datatype) {
        (Some(lang), _) => format!("{body}@{lang}"),
        (None, Some(dt)) => format!("{body}^^{}", prefixes.iri(dt)),
        (None, None) => body,
    }
}

fn node(prefixes: &PrefixTable, node: &RdfNode) -> String {
    match node {
        RdfNode::Iri(iri) => prefixes.iri(iri),
        RdfNode::BlankNode(bn) => format!("_:{bn}"),
    }
}

fn object(prefixes: &PrefixTable, obj: &RdfObject) -> String {
    match obj {
        RdfObject::Node(n) => node(prefixes, n),
        RdfObject::Literal(lit) => literal(prefixes, lit),
    }
}

/// Serialize the whole graph as Turtle.
pub fn to_turtle(graph: &Graph) -> String {
    let prefixes = PrefixTable::new(graph);

    let mut subjects: Vec<&RdfNode> = Vec::new();
    let mut by_subject: HashMap<&RdfNode, Vec<&Triple>> = HashMap::new();
    for t in graph.iter() {
        let entry = by_subject.entry(&t.subject).or_default();
        if entry.is_empty() {
            subjects.push(&t.subject);
        }
        entry.push(t);
    }

    let mut out = prefixes.header();
    for subject in subjects {
        let triples = &by_subject[subject];

        // rdf:type first, then predicates in first-seen order.
        let mut predicates: Vec<&str> = Vec::new();
        if triples.iter().any(|t| t.predicate == vocab::RDF_TYPE) {
            predicates.push(vocab::RDF_TYPE);
        }
        for t in triples {
            if !predicates.contains(&t.predicate.as_str()) {
                predicates.push(&t.predicate);
            }
        }

        out.push('\n');
        out.push_str(&node(&prefixes, subject));
        for (i, predicate) in predicates.iter().enumerate() {
            let objects: Vec<String> = triples
                .iter()
                .filter(|t| t.predicate == *predicate)
                .map(|t| object(&prefixes, &t.object))
                .collect();
            let predicate_text = if *predicate == vocab::RDF_TYPE {
                "a".to_string()
            } else {
                prefixes.iri(predicate)
            };
            let sep = if i == 0 { " " } else { " ;\n    " };
            let _ = write!(out, "{sep}{predicate_text} {}", objects.join(",\n        "));
        }
        out.push_str(" .\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_graph, RdfFormat};

    #[test]
    fn scans_both_prefix_syntaxes() {
        let text = "@prefix ex: <http://example.org/> .\nPREFIX : <http://base.org/#>\n";
        let prefixes = scan_prefix_declarations(text);
        assert_eq!(
            prefixes,
            vec![
                ("ex".to_string(), "http://example.org/".to_string()),
                ("".to_string(), "http://base.org/#".to_string()),
            ]
        );
    }

    #[test]
    fn non_ascii_lines_are_not_prefix_declarations() {
        let text = "@prefix ex: <http://example.org/> .\nL'été est chaud\nPréfixe: <x>\n";
        let prefixes = scan_prefix_declarations(text);
        assert_eq!(prefixes, vec![("ex".to_string(), "http://example.org/".to_string())]);
    }

    #[test]
    fn compacts_slug_local_names() {
        let mut g = Graph::new();
        g.bind_prefix("razorpay", "https://example.org/Platforms/Razorpay#");
        g.add(
            "https://example.org/Platforms/Razorpay#abcde-fghij-klmno-pqrst",
            vocab::RDF_TYPE,
            RdfObject::iri(vocab::OWL_CLASS),
        );
        let ttl = to_turtle(&g);
        assert!(ttl.contains("razorpay:abcde-fghij-klmno-pqrst a owl:Class ."));
    }

    #[test]
    fn multi_line_literals_use_long_strings() {
        let mut g = Graph::new();
        g.add(
            "urn:x:c",
            "urn:x:query",
            RdfLiteral::typed("SELECT\n  \"a\"", vocab::XSD_STRING),
        );
        let ttl = to_turtle(&g);
        assert!(ttl.contains("\"\"\"SELECT\n  \\\"a\\\"\"\"\"^^xsd:string"));
    }

    #[test]
    fn output_parses_back_to_the_same_triples() {
        let mut g = Graph::new();
        g.bind_prefix("", "https://base.example/combined#");
        g.add(
            "https://base.example/combined#cls",
            vocab::RDFS_LABEL,
            RdfLiteral::lang("Thing", "en"),
        );
        g.add(
            "https://base.example/combined#cls",
            "https://base.example/combined#query",
            RdfLiteral::typed("SELECT 1\nFROM t", vocab::XSD_STRING),
        );
        g.add(
            "https://base.example/combined#cls",
            vocab::RDF_TYPE,
            RdfObject::iri(vocab::OWL_CLASS),
        );

        let reparsed = parse_graph(&to_turtle(&g), RdfFormat::Turtle).expect("reparse");
        assert_eq!(reparsed.len(), 3);
        let subject = RdfNode::iri("https://base.example/combined#cls");
        assert_eq!(
            reparsed
                .value_of(&subject, vocab::RDFS_LABEL)
                .and_then(RdfObject::lexical),
            Some("Thing")
        );
        assert!(reparsed
            .objects_of(&subject, "https://base.example/combined#query")
            .any(|o| o.lexical() == Some("SELECT 1\nFROM t")));
    }

    proptest::proptest! {
        #[test]
        fn literal_escaping_survives_reparse(text in "[a-zA-Z0-9 _\"\\\\\n]{0,40}") {
            let mut g = Graph::new();
            g.add("urn:x:s", "urn:x:p", RdfLiteral::plain(text.clone()));
            let reparsed = parse_graph(&to_turtle(&g), RdfFormat::Turtle).expect("reparse");
            let subject = RdfNode::iri("urn:x:s");
            proptest::prop_assert_eq!(
                reparsed.value_of(&subject, "urn:x:p").and_then(RdfObject::lexical),
                Some(text.as_str())
            );
        }
    }
}
