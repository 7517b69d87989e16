use ontotap_rdf::{load_graph_file, vocab, write_turtle_file, GraphError, RdfNode, RdfObject};

const BASE_TTL: &str = r#"@prefix : <https://www.cohesyve.com/ontologies/combined#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

:maduz-holot-kogit-sojal a owl:Class ;
    rdfs:label "Platform"@en .

:commerce a owl:Class ;
    rdfs:label "CommercePlatform"@en ;
    rdfs:subClassOf :maduz-holot-kogit-sojal .
"#;

#[test]
fn load_write_load_keeps_triples_and_prefixes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("base.ttl");
    std::fs::write(&input, BASE_TTL).expect("write base");

    let graph = load_graph_file(&input).expect("load");
    let output = dir.path().join("nested").join("out.ttl");
    write_turtle_file(&graph, &output).expect("write");

    let written = std::fs::read_to_string(&output).expect("read back");
    assert!(written.contains("@prefix : <https://www.cohesyve.com/ontologies/combined#> ."));
    assert!(written.contains(":commerce a owl:Class"));

    let reloaded = load_graph_file(&output).expect("reload");
    assert_eq!(reloaded.len(), graph.len());
    assert!(reloaded.contains(
        &RdfNode::iri("https://www.cohesyve.com/ontologies/combined#commerce"),
        vocab::RDFS_SUBCLASS_OF,
        &RdfObject::iri("https://www.cohesyve.com/ontologies/combined#maduz-holot-kogit-sojal"),
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_graph_file(&dir.path().join("absent.ttl")).unwrap_err();
    assert!(matches!(err, GraphError::Io(_)));
}
