//! Data-point inventory over compiled ontologies.
//!
//! A *platform* here is any class whose label contains `PlatformField` (the
//! root field class of a compiled platform). Its *entities* are the classes
//! directly under it that carry a label and an `rdfs:isDefinedBy`, and an
//! entity's data points are the datatype properties whose `rdfs:domain` is
//! that entity and which carry a range and a definition (holder properties
//! have neither, so they drop out).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use ontotap_rdf::{local_name, vocab, Graph, RdfNode, RdfObject};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

const PLATFORM_MARKER: &str = "PlatformField";
const MAX_NAME_LEN: usize = 31;

const ENTITY_HEADER: [&str; 5] = [
    "Entity",
    "Property Name",
    "Property Definition",
    "Property Type",
    "Is Primary Key",
];
const MERGED_HEADER: [&str; 6] = [
    "Platform",
    "Entity",
    "Property Name",
    "Property Definition",
    "Property Type",
    "Is Primary Key",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPoint {
    pub name: String,
    pub definition: String,
    /// Local name of the range datatype (`integer`, `string`, ...).
    pub range: String,
    pub is_primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub label: String,
    pub definition: String,
    pub data_points: Vec<DataPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSection {
    pub label: String,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub platforms: Vec<PlatformSection>,
}

#[derive(Serialize)]
struct EntityRow<'r> {
    #[serde(rename = "Entity")]
    entity: &'r str,
    #[serde(rename = "Property Name")]
    name: &'r str,
    #[serde(rename = "Property Definition")]
    definition: &'r str,
    #[serde(rename = "Property Type")]
    range: &'r str,
    #[serde(rename = "Is Primary Key")]
    is_primary_key: bool,
}

// `csv` cannot serialize flattened structs, so the columns are repeated.
#[derive(Serialize)]
struct MergedRow<'r> {
    #[serde(rename = "Platform")]
    platform: &'r str,
    #[serde(rename = "Entity")]
    entity: &'r str,
    #[serde(rename = "Property Name")]
    name: &'r str,
    #[serde(rename = "Property Definition")]
    definition: &'r str,
    #[serde(rename = "Property Type")]
    range: &'r str,
    #[serde(rename = "Is Primary Key")]
    is_primary_key: bool,
}

fn lexical<'g>(graph: &'g Graph, node: &RdfNode, predicate: &str) -> Option<&'g str> {
    graph.value_of(node, predicate).and_then(RdfObject::lexical)
}

fn data_points(graph: &Graph, entity: &RdfNode, primary_key_predicate: &str) -> Vec<DataPoint> {
    graph
        .subjects_with(vocab::RDFS_DOMAIN, &RdfObject::from(entity))
        .filter(|p| {
            graph.contains(p, vocab::RDF_TYPE, &RdfObject::iri(vocab::OWL_DATATYPE_PROPERTY))
        })
        .filter_map(|p| {
            let name = lexical(graph, p, vocab::RDFS_LABEL)?;
            let definition = lexical(graph, p, vocab::RDFS_IS_DEFINED_BY)?;
            let range = graph.value_of(p, vocab::RDFS_RANGE)?.as_iri()?;
            Some(DataPoint {
                name: name.to_string(),
                definition: definition.to_string(),
                range: local_name(range),
                is_primary_key: lexical(graph, p, primary_key_predicate) == Some("true"),
            })
        })
        .collect()
}

impl Report {
    /// Collect every platform section in `graph`, in graph order.
    pub fn from_graph(graph: &Graph, primary_key_predicate: &str) -> Self {
        let mut platforms: Vec<PlatformSection> = Vec::new();
        let mut by_label: HashMap<String, usize> = HashMap::new();

        for t in graph.triples_with_predicate(vocab::RDFS_SUBCLASS_OF) {
            let Some(parent) = t.object.as_node() else {
                continue;
            };
            let Some(parent_label) = lexical(graph, parent, vocab::RDFS_LABEL) else {
                continue;
            };
            if !parent_label.contains(PLATFORM_MARKER) {
                continue;
            }
            let entity = &t.subject;
            if !graph.contains(entity, vocab::RDF_TYPE, &RdfObject::iri(vocab::OWL_CLASS)) {
                continue;
            }
            let (Some(label), Some(definition)) = (
                lexical(graph, entity, vocab::RDFS_LABEL),
                lexical(graph, entity, vocab::RDFS_IS_DEFINED_BY),
            ) else {
                continue;
            };

            let index = *by_label.entry(parent_label.to_string()).or_insert_with(|| {
                platforms.push(PlatformSection {
                    label: parent_label.to_string(),
                    entities: Vec::new(),
                });
                platforms.len() - 1
            });
            let section = &mut platforms[index];
            if section.entities.iter().any(|e| e.label == label) {
                continue;
            }
            section.entities.push(Entity {
                label: label.to_string(),
                definition: definition.to_string(),
                data_points: data_points(graph, entity, primary_key_predicate),
            });
        }

        tracing::debug!(platforms = platforms.len(), "built data-point report");
        Report { platforms }
    }

    pub fn data_point_count(&self) -> usize {
        self.platforms
            .iter()
            .flat_map(|p| &p.entities)
            .map(|e| e.data_points.len())
            .sum()
    }

    /// One CSV per platform section in `dir`; returns the written paths.
    pub fn write_per_platform(&self, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.platforms.len());
        let mut taken = HashSet::new();
        for section in &self.platforms {
            let path = dir.join(format!("{}.csv", unique_stem(&section.label, &mut taken)));
            let mut writer = headed_writer(&path, &ENTITY_HEADER)?;
            for entity in &section.entities {
                for dp in &entity.data_points {
                    writer.serialize(row(entity, dp))?;
                }
            }
            writer.flush()?;
            tracing::info!(path = %path.display(), "wrote platform report");
            written.push(path);
        }
        Ok(written)
    }

    /// All sections in one CSV with a leading `Platform` column.
    pub fn write_merged(&self, path: &Path) -> Result<(), ReportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = headed_writer(path, &MERGED_HEADER)?;
        for section in &self.platforms {
            for entity in &section.entities {
                for dp in &entity.data_points {
                    writer.serialize(MergedRow {
                        platform: &section.label,
                        entity: &entity.label,
                        name: &dp.name,
                        definition: &dp.definition,
                        range: &dp.range,
                        is_primary_key: dp.is_primary_key,
                    })?;
                }
            }
        }
        writer.flush()?;
        tracing::info!(path = %path.display(), "wrote merged report");
        Ok(())
    }
}

/// CSV writer whose header row is present even when no record follows.
fn headed_writer(path: &Path, header: &[&str]) -> Result<csv::Writer<std::fs::File>, ReportError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(header)?;
    Ok(writer)
}

fn row<'r>(entity: &'r Entity, dp: &'r DataPoint) -> EntityRow<'r> {
    EntityRow {
        entity: &entity.label,
        name: &dp.name,
        definition: &dp.definition,
        range: &dp.range,
        is_primary_key: dp.is_primary_key,
    }
}

/// Section label trimmed to 31 characters with path separators replaced.
pub fn file_stem(label: &str) -> String {
    label
        .chars()
        .take(MAX_NAME_LEN)
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// [`file_stem`], suffixed `_2`, `_3`, ... (still within 31 characters) when
/// an earlier section already took the stem.
fn unique_stem(label: &str, taken: &mut HashSet<String>) -> String {
    let stem = file_stem(label);
    if taken.insert(stem.clone()) {
        return stem;
    }
    let mut n = 2;
    loop {
        let suffix = format!("_{n}");
        let head: String = stem.chars().take(MAX_NAME_LEN - suffix.len()).collect();
        let candidate = format!("{head}{suffix}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
