//! Compiler configuration.
//!
//! Every field has a default, so a JSON config file only needs to name what it
//! overrides:
//!
//! ```json
//! { "ids": "random", "sql": { "project": "analytics-eu", "nested_style": "independent" } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::naming::NamingPolicy;
use crate::CompileError;

pub const DEFAULT_BASE_NAMESPACE: &str = "https://www.cohesyve.com/ontologies/combined#";
pub const DEFAULT_PLATFORM_NAMESPACE_ROOT: &str = "https://www.cohesyve.com/ontologies/Platforms/";
pub const DEFAULT_ROOT_CATEGORY: &str =
    "https://www.cohesyve.com/ontologies/combined#maduz-holot-kogit-sojal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Local names derived from the structural path; reproducible.
    #[default]
    Structural,
    /// Local names drawn from the thread RNG.
    Random,
}

/// How arrays nested more than one level deep are flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedSqlStyle {
    /// One CTE per enclosing level; the innermost array is unnested from the
    /// previous level's items.
    #[default]
    Chained,
    /// Every level unnests its own field straight from the stream table.
    Independent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    pub project: String,
    pub database_placeholder: String,
    pub cutoff_placeholder: String,
    pub timestamp_column: String,
    pub source_alias: String,
    pub nested_style: NestedSqlStyle,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            project: "cohesyve-us".to_string(),
            database_placeholder: "#database_id".to_string(),
            cutoff_placeholder: "#cutoff_timestamp".to_string(),
            timestamp_column: "_time_loaded".to_string(),
            source_alias: "t".to_string(),
            nested_style: NestedSqlStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Namespace of the shared ontology; also hosts `query`/`isPrimaryKey`
    /// and newly created categories.
    pub base_namespace: String,
    /// Platform namespaces are `<root><PlatformName>#`.
    pub platform_namespace_root: String,
    /// Class whose direct subclasses are the platform categories.
    pub root_category: String,
    pub naming: NamingPolicy,
    pub ids: IdStrategy,
    pub sql: SqlConfig,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            base_namespace: DEFAULT_BASE_NAMESPACE.to_string(),
            platform_namespace_root: DEFAULT_PLATFORM_NAMESPACE_ROOT.to_string(),
            root_category: DEFAULT_ROOT_CATEGORY.to_string(),
            naming: NamingPolicy::default(),
            ids: IdStrategy::default(),
            sql: SqlConfig::default(),
        }
    }
}

impl CompileConfig {
    pub fn from_json_str(text: &str) -> Result<Self, CompileError> {
        serde_json::from_str(text).map_err(CompileError::Config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CompileError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Annotation carrying a class's flattening SQL.
    pub fn query_predicate(&self) -> String {
        format!("{}query", self.base_namespace)
    }

    pub fn primary_key_predicate(&self) -> String {
        format!("{}isPrimaryKey", self.base_namespace)
    }
}
