//! Workspace-level pipeline tests: base ontology + catalog on disk, compile,
//! write Turtle, reload, and report.

use ontotap_catalog::Catalog;
use ontotap_compiler::{compile, CategoryChoice, CompileConfig, CompileRequest};
use ontotap_rdf::{load_graph_file, vocab, write_turtle_file, RdfLiteral, RdfObject};
use ontotap_report::Report;

const BASE_TTL: &str = r#"@prefix : <https://www.cohesyve.com/ontologies/combined#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

:maduz-holot-kogit-sojal a owl:Class ;
    rdfs:label "Platform"@en .

:ads-category a owl:Class ;
    rdfs:subClassOf :maduz-holot-kogit-sojal ;
    rdfs:label "AdvertisingPlatform"@en .
"#;

const CATALOG: &str = r#"{
  "streams": [
    {
      "stream": "campaigns",
      "key_properties": ["id"],
      "schema": {
        "properties": {
          "id": {"type": ["null", "integer"]},
          "name": {"type": "string"},
          "active": {"type": "boolean"},
          "budget": {"type": ["null", "number"]}
        }
      }
    },
    {
      "stream": "ad_groups",
      "key_properties": ["id"],
      "schema": {
        "properties": {
          "id": {"type": "integer"},
          "keywords": {
            "type": "array",
            "items": {
              "type": "object",
              "properties": {"text": {"type": "string"}, "bid": {"type": "number"}}
            }
          }
        }
      }
    }
  ]
}"#;

struct Pipeline {
    _dir: tempfile::TempDir,
    out: std::path::PathBuf,
    config: CompileConfig,
}

fn run_pipeline(platform: &str, category: CategoryChoice) -> Pipeline {
    let dir = tempfile::tempdir().expect("tempdir");
    let base_path = dir.path().join("base.ttl");
    let catalog_path = dir.path().join("catalog.json");
    std::fs::write(&base_path, BASE_TTL).expect("write base");
    std::fs::write(&catalog_path, CATALOG).expect("write catalog");

    let config = CompileConfig::default();
    let graph = load_graph_file(&base_path).expect("load base");
    let catalog = Catalog::from_file(&catalog_path).expect("load catalog");
    let request = CompileRequest {
        platform: platform.to_string(),
        tap: format!("tap_{}", platform.to_lowercase().replace(' ', "_")),
        category,
    };

    let outcome = compile(graph, &catalog, &request, &config).expect("compile");
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);

    let out = dir.path().join("out/ontology.ttl");
    write_turtle_file(&outcome.graph, &out).expect("write turtle");
    Pipeline {
        _dir: dir,
        out,
        config,
    }
}

#[test]
fn compiled_ontology_survives_a_turtle_round_trip() {
    let p = run_pipeline("Google Ads", CategoryChoice::Existing("AdvertisingPlatform".to_string()));
    let graph = load_graph_file(&p.out).expect("reload");

    let query = p.config.query_predicate();
    let queries: Vec<&str> = graph
        .triples_with_predicate(&query)
        .filter_map(|t| t.object.lexical())
        .collect();
    // Campaign, AdGroup, AdGroupKeywordItem.
    assert_eq!(queries.len(), 3);
    assert!(queries
        .iter()
        .any(|q| q.contains("`cohesyve-us.#database_id.tap_google_ads__campaigns`")));
    assert!(queries.iter().any(|q| q.contains("UNNEST")));

    let equivalent = graph.triples_with_predicate(vocab::OWL_EQUIVALENT_PROPERTY).count();
    assert_eq!(equivalent, 1);

    // Base triples are still there.
    let base_label = RdfObject::from(RdfLiteral::lang("AdvertisingPlatform", "en"));
    assert!(graph.subjects_with(vocab::RDFS_LABEL, &base_label).next().is_some());
}

#[test]
fn report_lists_every_leaf_of_the_reloaded_ontology() {
    let p = run_pipeline("Google Ads", CategoryChoice::Existing("AdvertisingPlatform".to_string()));
    let graph = load_graph_file(&p.out).expect("reload");
    let report = Report::from_graph(&graph, &p.config.primary_key_predicate());

    assert_eq!(report.platforms.len(), 1);
    let section = &report.platforms[0];
    assert_eq!(section.label, "GoogleAdsPlatformField");

    let campaign = section
        .entities
        .iter()
        .find(|e| e.label == "Campaign")
        .expect("campaign entity");
    let columns: Vec<(&str, &str, bool)> = campaign
        .data_points
        .iter()
        .map(|d| (d.name.as_str(), d.range.as_str(), d.is_primary_key))
        .collect();
    assert_eq!(columns.len(), 4);
    assert!(columns.contains(&("id", "integer", true)));
    assert!(columns.contains(&("name", "string", false)));
    assert!(columns.contains(&("active", "boolean", false)));
    assert!(columns.contains(&("budget", "decimal", false)));

    let keyword = section
        .entities
        .iter()
        .find(|e| e.label == "AdGroupKeywordItem")
        .expect("keyword item entity");
    let names: Vec<&str> = keyword.data_points.iter().map(|d| d.name.as_str()).collect();
    assert!(names.contains(&"text"));
    assert!(names.contains(&"bid"));
    assert!(names.contains(&"Parent_id"));

    // 4 campaign leaves + 1 ad group leaf + 3 keyword leaves.
    assert_eq!(report.data_point_count(), 8);

    let csv_dir = p.out.parent().expect("out dir").join("csv");
    let written = report.write_per_platform(&csv_dir).expect("write csv");
    assert_eq!(written.len(), 1);
    let csv = std::fs::read_to_string(&written[0]).expect("read csv");
    assert!(csv.starts_with("Entity,Property Name,Property Definition,Property Type,Is Primary Key"));
    assert!(csv.contains("Campaign,id,id,integer,true"));
}

#[test]
fn new_category_is_persisted() {
    let p = run_pipeline("Hubspot", CategoryChoice::New("Crm".to_string()));
    let graph = load_graph_file(&p.out).expect("reload");
    let categories = ontotap_compiler::categories(&graph, &p.config.root_category);
    let labels: Vec<&str> = categories.iter().map(|c| c.label.as_str()).collect();
    assert!(labels.contains(&"AdvertisingPlatform"));
    assert!(labels.contains(&"CrmPlatform"));
}
