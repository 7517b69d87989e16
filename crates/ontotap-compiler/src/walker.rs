//! Recursive descent over a stream's schema tree.
//!
//! Each stream becomes an anchor under the platform's root field class. Its
//! scalar fields become leaves and its arrays become item classes, which
//! recurse. Top-level objects are only flattened by the SQL.

use ontotap_catalog::{Field, ScalarType, SchemaNode, Stream};

use crate::compile::Compiler;
use crate::config::NestedSqlStyle;
use crate::diagnostics::{codes, Diagnostic};
use crate::link::PendingLink;
use crate::naming::type_name;
use crate::platform::PlatformAnchors;
use crate::sql::NestLevel;
use crate::synth::Anchor;

/// What the array processor needs to know about the enclosing stream.
struct StreamScope<'s> {
    name: &'s str,
    key_properties: &'s [String],
    /// Key links, queued outermost array first and resolved once every field
    /// of the stream exists.
    links: Vec<PendingLink>,
}

fn child_path(path: &[String], segment: &str) -> Vec<String> {
    let mut out = path.to_vec();
    out.push(segment.to_string());
    out
}

fn contains_array(fields: &[Field]) -> bool {
    fields.iter().any(|f| match &f.node {
        SchemaNode::Array(_) => true,
        SchemaNode::Object(inner) => contains_array(inner),
        SchemaNode::Scalar(_) => false,
    })
}

impl Compiler<'_> {
    pub(crate) fn compile_stream(&mut self, stream: &Stream, platform: &PlatformAnchors) {
        let Some(name) = stream.name.as_deref() else {
            self.report(Diagnostic::warning(
                codes::STREAM_UNNAMED,
                "catalog entry has no `stream` name; skipped",
            ));
            return;
        };
        if !self.seen_streams.insert(name.to_string()) {
            self.report(
                Diagnostic::warning(
                    codes::STREAM_DUPLICATE,
                    format!("stream `{name}` appears more than once in the catalog; later entry skipped"),
                )
                .in_stream(name),
            );
            return;
        }
        tracing::info!(stream = name, fields = stream.fields.len(), "compiling stream");
        self.stats.streams += 1;

        let label = type_name(name, &self.config.naming);
        let path = vec!["stream".to_string(), name.to_string()];
        let anchor = self.create_class_property(&path, &label, &platform.field_class, &platform.field_property);

        if stream.fields.is_empty() {
            self.report(
                Diagnostic::warning(
                    codes::STREAM_EMPTY,
                    format!("stream `{name}` declares no properties; class created without fields or query"),
                )
                .in_stream(name),
            );
            return;
        }

        let mut scope = StreamScope {
            name,
            key_properties: &stream.key_properties,
            links: Vec::new(),
        };
        for field in &stream.fields {
            let field_path = child_path(&path, &field.name);
            match &field.node {
                SchemaNode::Scalar(ty) => {
                    self.create_subproperty(
                        &field_path,
                        "leaf",
                        &anchor,
                        &field.name,
                        ty,
                        stream.is_key(&field.name),
                    );
                }
                SchemaNode::Object(_) => self.report(
                    Diagnostic::info(
                        codes::OBJECT_FLATTENED_IN_SQL,
                        format!("object `{}` is flattened in the stream query only", field.name),
                    )
                    .in_stream(name)
                    .on_field(&field.name),
                ),
                SchemaNode::Array(items) => {
                    self.process_array(&mut scope, platform, &anchor, &path, &field.name, items.as_deref(), &[]);
                }
            }
        }

        let query = self.sql().root_query(name, &stream.fields, &stream.key_properties);
        self.attach_query(&anchor.class, query);

        for link in std::mem::take(&mut scope.links) {
            self.link_parent_keys(name, &link, scope.key_properties);
        }
    }

    /// Item class, has-item link, item fields and item query for one array;
    /// its key links are queued on `scope`. `outer` lists the enclosing array
    /// fields, stream root first.
    #[allow(clippy::too_many_arguments)]
    fn process_array(
        &mut self,
        scope: &mut StreamScope<'_>,
        platform: &PlatformAnchors,
        owner: &Anchor,
        owner_path: &[String],
        field: &str,
        items: Option<&SchemaNode>,
        outer: &[&str],
    ) {
        let Some(item) = items else {
            self.report(
                Diagnostic::warning(
                    codes::ARRAY_WITHOUT_ITEMS,
                    format!("array `{field}` has no item schema; skipped"),
                )
                .in_stream(scope.name)
                .on_field(field),
            );
            return;
        };

        let path = child_path(owner_path, field);
        let field_type = type_name(field, &self.config.naming);
        let label = format!("{}{field_type}Item", owner.label);
        let item_anchor = self.create_class_property(&path, &label, &platform.field_class, &owner.property);
        self.create_has_item(
            &path,
            &format!("has{field_type}Item"),
            owner,
            &item_anchor,
            &platform.relationship,
        );

        scope.links.push(PendingLink {
            owner: owner.clone(),
            item: item_anchor.clone(),
            path: path.clone(),
            depth: outer.len() + 1,
        });

        let mut nested_outer: Vec<&str> = outer.to_vec();
        nested_outer.push(field);

        match item {
            SchemaNode::Object(subs) if !subs.is_empty() => {
                for sub in subs {
                    let sub_path = child_path(&path, &sub.name);
                    match &sub.node {
                        SchemaNode::Array(inner) => self.process_array(
                            scope,
                            platform,
                            &item_anchor,
                            &path,
                            &sub.name,
                            inner.as_deref(),
                            &nested_outer,
                        ),
                        SchemaNode::Object(inner) => {
                            if contains_array(inner) {
                                self.report(
                                    Diagnostic::info(
                                        codes::NESTED_OBJECT_COLLAPSED,
                                        format!(
                                            "object `{}` inside `{field}` items is kept as one value; its arrays are not decomposed",
                                            sub.name
                                        ),
                                    )
                                    .in_stream(scope.name)
                                    .on_field(&sub.name),
                                );
                            }
                            self.create_subproperty(
                                &sub_path,
                                "leaf",
                                &item_anchor,
                                &sub.name,
                                &ScalarType::Other("object".to_string()),
                                false,
                            );
                        }
                        SchemaNode::Scalar(ty) => {
                            self.create_subproperty(&sub_path, "leaf", &item_anchor, &sub.name, ty, false);
                        }
                    }
                }
            }
            SchemaNode::Object(_) => {
                self.report(
                    Diagnostic::warning(
                        codes::OBJECT_ITEMS_WITHOUT_FIELDS,
                        format!("array `{field}` holds objects without declared properties; using a placeholder value"),
                    )
                    .in_stream(scope.name)
                    .on_field(field),
                );
                let placeholder = format!("{field}_object_value");
                self.create_subproperty(
                    &child_path(&path, &placeholder),
                    "leaf",
                    &item_anchor,
                    &placeholder,
                    &ScalarType::String,
                    false,
                );
            }
            SchemaNode::Scalar(ty) => {
                let value = format!("{field_type}Value");
                self.create_subproperty(&child_path(&path, &value), "leaf", &item_anchor, &value, ty, false);
            }
            SchemaNode::Array(_) => {
                let value = format!("{field_type}Value");
                self.create_subproperty(
                    &child_path(&path, &value),
                    "leaf",
                    &item_anchor,
                    &value,
                    &ScalarType::Other("array".to_string()),
                    false,
                );
            }
        }

        let sql = self.sql();
        let query = match self.config.sql.nested_style {
            NestedSqlStyle::Chained => sql.chained_nested_query(
                scope.name,
                outer,
                NestLevel { field, item },
                scope.key_properties,
            ),
            NestedSqlStyle::Independent => sql.nested_query(scope.name, field, item, scope.key_properties),
        };
        self.attach_query(&item_anchor.class, query);
    }
}
