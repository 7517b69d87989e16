//! Recoverable compile findings.
//!
//! Anything the compiler skips or degrades is recorded here and also logged
//! through `tracing`, so a run can be audited after the fact with
//! `--diagnostics out.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

pub mod codes {
    pub const CATALOG_EMPTY: &str = "catalog_without_streams";
    pub const STREAM_UNNAMED: &str = "stream_missing_name";
    pub const STREAM_EMPTY: &str = "stream_without_properties";
    pub const STREAM_DUPLICATE: &str = "stream_duplicate_name";
    pub const OBJECT_FLATTENED_IN_SQL: &str = "object_field_sql_only";
    pub const ARRAY_WITHOUT_ITEMS: &str = "array_without_items";
    pub const OBJECT_ITEMS_WITHOUT_FIELDS: &str = "object_items_without_properties";
    pub const NESTED_OBJECT_COLLAPSED: &str = "nested_object_collapsed";
    pub const KEY_UNRESOLVED: &str = "parent_key_unresolved";
}

impl Diagnostic {
    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            code: code.to_string(),
            message: message.into(),
            stream: None,
            field: None,
        }
    }

    pub fn info(code: &str, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            ..Self::warning(code, message)
        }
    }

    pub fn in_stream(mut self, stream: &str) -> Self {
        self.stream = Some(stream.to_string());
        self
    }

    pub fn on_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub(crate) fn log(&self) {
        let stream = self.stream.as_deref().unwrap_or("-");
        let field = self.field.as_deref().unwrap_or("-");
        match self.level {
            DiagnosticLevel::Warning => {
                tracing::warn!(code = %self.code, stream, field, "{}", self.message)
            }
            DiagnosticLevel::Info => {
                tracing::info!(code = %self.code, stream, field, "{}", self.message)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticSummary {
    pub warning_count: usize,
    pub info_count: usize,
}

/// Serialized form of a run's diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub version: String,
    pub generated_at_unix_secs: u64,
    pub platform: String,
    pub summary: DiagnosticSummary,
    pub diagnostics: Vec<Diagnostic>,
}

fn now_unix_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl DiagnosticReport {
    pub fn new(platform: &str, diagnostics: &[Diagnostic]) -> Self {
        let mut summary = DiagnosticSummary::default();
        for d in diagnostics {
            match d.level {
                DiagnosticLevel::Warning => summary.warning_count += 1,
                DiagnosticLevel::Info => summary.info_count += 1,
            }
        }
        Self {
            version: "diagnostics_v1".to_string(),
            generated_at_unix_secs: now_unix_secs(),
            platform: platform.to_string(),
            summary,
            diagnostics: diagnostics.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_like_a_finding_record() {
        let d = Diagnostic::warning(codes::ARRAY_WITHOUT_ITEMS, "array `tags` has no item schema")
            .in_stream("orders")
            .on_field("tags");
        let json = serde_json::to_value(&d).expect("json");
        assert_eq!(json["level"], "warning");
        assert_eq!(json["code"], "array_without_items");
        assert_eq!(json["stream"], "orders");
        assert_eq!(json["field"], "tags");

        let bare = serde_json::to_value(Diagnostic::info(codes::CATALOG_EMPTY, "x")).expect("json");
        assert_eq!(bare["level"], "info");
        assert!(bare.get("stream").is_none());
    }

    #[test]
    fn report_counts_levels() {
        let report = DiagnosticReport::new(
            "Razorpay",
            &[
                Diagnostic::warning(codes::KEY_UNRESOLVED, "a"),
                Diagnostic::warning(codes::STREAM_EMPTY, "b"),
                Diagnostic::info(codes::OBJECT_FLATTENED_IN_SQL, "c"),
            ],
        );
        assert_eq!(report.summary.warning_count, 2);
        assert_eq!(report.summary.info_count, 1);
        assert_eq!(report.diagnostics.len(), 3);
    }
}
