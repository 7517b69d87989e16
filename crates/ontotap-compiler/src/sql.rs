//! Flattening SQL (BigQuery dialect) attached to every compiled class.
//!
//! Raw tap tables store nested values as JSON text written with Python-style
//! booleans (`True`/`False`), so every array read from the stream table goes
//! through `REPLACE` before `JSON_EXTRACT_ARRAY`. The `#database_id` and
//! `#cutoff_timestamp` placeholders are left for the loader to substitute.

use ontotap_catalog::{Field, SchemaNode};

use crate::config::SqlConfig;

/// One enclosing array level: the array field and its item schema.
#[derive(Debug, Clone, Copy)]
pub struct NestLevel<'s> {
    pub field: &'s str,
    pub item: &'s SchemaNode,
}

#[derive(Debug, Clone, Copy)]
pub struct SqlSynthesizer<'a> {
    config: &'a SqlConfig,
    tap: &'a str,
}

fn dedup(columns: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for c in columns {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

fn safe_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn unnest_alias(field: &str) -> String {
    format!("unnested_{}", safe_identifier(field))
}

fn render_select(columns: Vec<String>, from: &str, join: Option<&str>, filter: Option<&str>) -> String {
    let mut out = format!("SELECT\n  {}\nFROM\n  {from}", dedup(columns).join(",\n  "));
    for line in [join, filter].into_iter().flatten() {
        out.push('\n');
        out.push_str(line);
    }
    out
}

fn indent(body: &str) -> String {
    body.lines()
        .map(|l| format!("  {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Columns produced by one unnested item (`source` is the unnest alias).
fn item_columns(field: &str, item: &SchemaNode, source: &str) -> Vec<String> {
    match item {
        SchemaNode::Object(subs) if !subs.is_empty() => subs
            .iter()
            .map(|sub| {
                format!(
                    "SAFE_CAST(JSON_EXTRACT_SCALAR({source}, '$.{name}') AS STRING) AS `{name}`",
                    name = sub.name
                )
            })
            .collect(),
        SchemaNode::Object(_) => vec![format!("SAFE_CAST({source} AS STRING) AS `{field}_object_value`")],
        _ => vec![format!("SAFE_CAST({source} AS STRING) AS `{field}_value`")],
    }
}

impl<'a> SqlSynthesizer<'a> {
    pub fn new(config: &'a SqlConfig, tap: &'a str) -> Self {
        Self { config, tap }
    }

    /// `` `<project>.<database>.<tap>__<entity>` `` with the entity lowercased.
    pub fn source_table(&self, entity: &str) -> String {
        format!(
            "`{}.{}.{}__{}`",
            self.config.project,
            self.config.database_placeholder,
            self.tap,
            entity.to_lowercase()
        )
    }

    fn from_stream(&self, entity: &str) -> String {
        format!("{} AS {}", self.source_table(entity), self.config.source_alias)
    }

    fn timestamp(&self, alias: &str) -> String {
        format!("{alias}.{}", self.config.timestamp_column)
    }

    fn cutoff_filter(&self) -> String {
        format!(
            "WHERE date({}) >= date('{}')",
            self.timestamp(&self.config.source_alias),
            self.config.cutoff_placeholder
        )
    }

    fn unnest_from_stream(&self, field: &str, alias: &str) -> String {
        format!(
            "LEFT JOIN UNNEST(COALESCE(JSON_EXTRACT_ARRAY(REPLACE(REPLACE({}.`{field}`, 'True', 'true'), 'False', 'false')), [])) AS {alias}",
            self.config.source_alias
        )
    }

    fn unnest_from_item(previous: &str, field: &str, alias: &str) -> String {
        format!("LEFT JOIN UNNEST(COALESCE(JSON_EXTRACT_ARRAY({previous}.`_item`, '$.{field}'), [])) AS {alias}")
    }

    /// Query for the stream's own record class.
    ///
    /// Scalars are selected as-is, each sub-field of a top-level object is
    /// pulled out with a JSON path and arrays are left to their item classes.
    pub fn root_query(&self, entity: &str, fields: &[Field], key_properties: &[String]) -> String {
        let t = &self.config.source_alias;
        let mut columns = Vec::new();
        for field in fields {
            match &field.node {
                SchemaNode::Scalar(_) => columns.push(format!("{t}.`{0}` AS `{0}`", field.name)),
                SchemaNode::Object(subs) => {
                    for sub in subs {
                        columns.push(format!(
                            "SAFE_CAST(JSON_EXTRACT_SCALAR({t}.`{obj}`, '$.{sub}') AS STRING) AS `{obj}_{sub}`",
                            obj = field.name,
                            sub = sub.name
                        ));
                    }
                }
                SchemaNode::Array(_) => {}
            }
        }

        if columns.is_empty() {
            columns = key_properties
                .iter()
                .map(|k| format!("{t}.`{k}` AS `{k}`"))
                .collect();
            if columns.is_empty() {
                columns.push("1".to_string());
            }
        }

        let declares_timestamp = fields.iter().any(|f| {
            f.name == self.config.timestamp_column && matches!(f.node, SchemaNode::Scalar(_))
        });
        if !declares_timestamp {
            columns.push(self.timestamp(t));
        }

        render_select(columns, &self.from_stream(entity), None, Some(&self.cutoff_filter()))
    }

    /// Query for the items of a top-level array `field`, one row per item.
    pub fn nested_query(&self, entity: &str, field: &str, item: &SchemaNode, parent_keys: &[String]) -> String {
        let t = &self.config.source_alias;
        let alias = unnest_alias(field);

        let mut columns: Vec<String> = parent_keys
            .iter()
            .map(|k| format!("{t}.`{k}` AS `Parent_{k}`"))
            .collect();
        columns.extend(item_columns(field, item, &alias));
        columns.push(self.timestamp(t));

        render_select(
            columns,
            &self.from_stream(entity),
            Some(&self.unnest_from_stream(field, &alias)),
            Some(&self.cutoff_filter()),
        )
    }

    /// Query for an array nested inside other arrays.
    ///
    /// `outer` names the enclosing array fields from the stream root inward.
    /// Each enclosing level becomes a `level_<n>` CTE that carries the parent
    /// keys, the timestamp and the raw item (`_item`); the innermost array is
    /// unnested from the last CTE. With no enclosing levels this is
    /// [`Self::nested_query`].
    pub fn chained_nested_query(
        &self,
        entity: &str,
        outer: &[&str],
        innermost: NestLevel<'_>,
        parent_keys: &[String],
    ) -> String {
        let Some((first, rest)) = outer.split_first() else {
            return self.nested_query(entity, innermost.field, innermost.item, parent_keys);
        };
        let t = &self.config.source_alias;

        let mut ctes: Vec<String> = Vec::with_capacity(outer.len());

        let alias = format!("{}_1", unnest_alias(first));
        let mut columns: Vec<String> = parent_keys
            .iter()
            .map(|k| format!("{t}.`{k}` AS `Parent_{k}`"))
            .collect();
        columns.push(format!("{alias} AS `_item`"));
        columns.push(self.timestamp(t));
        ctes.push(render_select(
            columns,
            &self.from_stream(entity),
            Some(&self.unnest_from_stream(first, &alias)),
            Some(&self.cutoff_filter()),
        ));

        for (i, field) in rest.iter().enumerate() {
            let previous = format!("l{}", i + 1);
            let alias = format!("{}_{}", unnest_alias(field), i + 2);
            let mut columns: Vec<String> = parent_keys
                .iter()
                .map(|k| format!("{previous}.`Parent_{k}`"))
                .collect();
            columns.push(format!("{alias} AS `_item`"));
            columns.push(self.timestamp(&previous));
            ctes.push(render_select(
                columns,
                &format!("level_{} AS {previous}", i + 1),
                Some(&Self::unnest_from_item(&previous, field, &alias)),
                None,
            ));
        }

        let depth = outer.len();
        let previous = format!("l{depth}");
        let alias = format!("{}_{}", unnest_alias(innermost.field), depth + 1);
        let mut columns: Vec<String> = parent_keys
            .iter()
            .map(|k| format!("{previous}.`Parent_{k}`"))
            .collect();
        columns.extend(item_columns(innermost.field, innermost.item, &alias));
        columns.push(self.timestamp(&previous));
        let last = render_select(
            columns,
            &format!("level_{depth} AS {previous}"),
            Some(&Self::unnest_from_item(&previous, innermost.field, &alias)),
            None,
        );

        let ctes: Vec<String> = ctes
            .iter()
            .enumerate()
            .map(|(i, body)| format!("level_{} AS (\n{}\n)", i + 1, indent(body)))
            .collect();
        format!("WITH\n{}\n{last}", ctes.join(",\n"))
    }
}
