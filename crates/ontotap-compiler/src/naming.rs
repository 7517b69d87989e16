//! Type-name normalization for source names (`customer_orders` -> `CustomerOrder`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingPolicy {
    /// Strip one trailing `s` before splitting. Naive on purpose: `addresses`
    /// becomes `Addresse`.
    pub singularize: bool,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self { singularize: true }
    }
}

/// `abc` -> `Abc`, `ABC` -> `Abc`.
fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn upper_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn join_segments(raw: &str) -> String {
    let mut parts = raw.split(['_', '-', ' ']);
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        out.push_str(&capitalize(part));
    }
    upper_first(&out)
}

/// Normalize a stream or field name into a type-name fragment.
pub fn type_name(raw: &str, policy: &NamingPolicy) -> String {
    let base = if policy.singularize && raw.len() > 1 {
        raw.strip_suffix('s').unwrap_or(raw)
    } else {
        raw
    };
    join_segments(base)
}

/// Platform names are never singularized.
pub fn platform_type_name(raw: &str) -> String {
    join_segments(raw.trim())
}
