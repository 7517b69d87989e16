//! Catalog-to-ontology compiler.
//!
//! Given a base ontology graph and a stream catalog, this crate grows the
//! graph with one platform skeleton and, per stream, a class tree:
//!
//! - a record class and holder property per stream (under the platform's
//!   root field class);
//! - one leaf datatype property per scalar field, typed by XSD range, with
//!   key fields flagged `isPrimaryKey`;
//! - an item class per array (recursively), reachable through a
//!   `has<Field>Item` object property and linked back to the stream keys via
//!   `Parent_<key>` properties declared `owl:equivalentProperty` to the
//!   parent's;
//! - a BigQuery flattening query on every class.
//!
//! The walk is a single synchronous pass threading one `&mut Graph` through
//! a [`Compiler`]. Recoverable problems become [`Diagnostic`]s.

pub mod compile;
pub mod config;
pub mod diagnostics;
mod error;
pub mod ids;
pub mod link;
pub mod naming;
pub mod platform;
pub mod sql;
pub mod synth;
mod walker;

pub use compile::{compile, CompileOutcome, CompileRequest, CompileStats, Compiler};
pub use config::{CompileConfig, IdStrategy, NestedSqlStyle, SqlConfig};
pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticReport};
pub use error::CompileError;
pub use naming::{type_name, NamingPolicy};
pub use platform::{categories, Category, CategoryChoice, PlatformAnchors};
pub use synth::Anchor;
