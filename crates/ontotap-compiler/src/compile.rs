//! Compile entry point.
//!
//! [`compile`] takes ownership of the base graph, adds the platform skeleton
//! and one class tree per stream, and hands the grown graph back together
//! with the diagnostics collected on the way. Nothing here prompts or touches
//! the filesystem.

use std::collections::HashSet;

use ontotap_catalog::Catalog;
use ontotap_rdf::{Graph, RdfNode};
use serde::Serialize;

use crate::config::{CompileConfig, IdStrategy};
use crate::diagnostics::{codes, Diagnostic};
use crate::ids::{RandomSlugs, SlugMinter, StructuralSlugs};
use crate::platform::{platform_namespace, CategoryChoice, PlatformAnchors};
use crate::sql::SqlSynthesizer;
use crate::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    /// Display name of the platform (`Razorpay`, `google ads`).
    pub platform: String,
    /// Tap identifier used in source table names (`tap_razorpay`).
    pub tap: String,
    pub category: CategoryChoice,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileStats {
    pub streams: usize,
    pub classes: usize,
    pub datatype_properties: usize,
    pub object_properties: usize,
    pub queries: usize,
    pub key_links: usize,
    pub triples_added: usize,
}

#[derive(Debug)]
pub struct CompileOutcome {
    pub graph: Graph,
    pub platform: PlatformAnchors,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: CompileStats,
}

/// Per-run state threaded through the recursive descent.
pub struct Compiler<'a> {
    pub(crate) graph: &'a mut Graph,
    pub(crate) config: &'a CompileConfig,
    minter: Box<dyn SlugMinter>,
    pub(crate) namespace: String,
    tap: String,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) stats: CompileStats,
    /// Stream names already compiled; identifiers derive from them.
    pub(crate) seen_streams: HashSet<String>,
}

impl<'a> Compiler<'a> {
    pub fn new(graph: &'a mut Graph, config: &'a CompileConfig, platform: &str, tap: &str) -> Self {
        let minter: Box<dyn SlugMinter> = match config.ids {
            IdStrategy::Structural => Box::new(StructuralSlugs::new(platform)),
            IdStrategy::Random => Box::new(RandomSlugs::new()),
        };
        Self::with_minter(graph, config, platform, tap, minter)
    }

    pub fn with_minter(
        graph: &'a mut Graph,
        config: &'a CompileConfig,
        platform: &str,
        tap: &str,
        minter: Box<dyn SlugMinter>,
    ) -> Self {
        Self {
            graph,
            config,
            minter,
            namespace: platform_namespace(config, platform),
            tap: tap.to_string(),
            diagnostics: Vec::new(),
            stats: CompileStats::default(),
            seen_streams: HashSet::new(),
        }
    }

    pub(crate) fn sql(&self) -> SqlSynthesizer<'_> {
        SqlSynthesizer::new(&self.config.sql, &self.tap)
    }

    /// New IRI in `namespace` for the node at `path`.
    pub(crate) fn mint_in(&mut self, namespace: &str, path: &[&str]) -> RdfNode {
        let node = RdfNode::iri(format!("{namespace}{}", self.minter.mint(path)));
        tracing::debug!(node = %node, path = %path.join("/"), "minted");
        node
    }

    /// New IRI in the platform namespace for `path` + `role`.
    pub(crate) fn mint(&mut self, path: &[String], role: &str) -> RdfNode {
        let mut segments: Vec<&str> = path.iter().map(String::as_str).collect();
        segments.push(role);
        let namespace = self.namespace.clone();
        self.mint_in(&namespace, &segments)
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn stats(&self) -> &CompileStats {
        &self.stats
    }

    /// Compile every stream of `catalog` under an initialized platform.
    pub fn compile_catalog(&mut self, catalog: &Catalog, platform: &PlatformAnchors) {
        if catalog.streams.is_empty() {
            self.report(Diagnostic::warning(
                codes::CATALOG_EMPTY,
                "catalog has no streams; only the platform skeleton was written",
            ));
        }
        for stream in &catalog.streams {
            self.compile_stream(stream, platform);
        }
    }

    fn finish(self) -> (Vec<Diagnostic>, CompileStats) {
        (self.diagnostics, self.stats)
    }
}

/// Compile `catalog` into `graph` for one platform.
pub fn compile(
    mut graph: Graph,
    catalog: &Catalog,
    request: &CompileRequest,
    config: &CompileConfig,
) -> Result<CompileOutcome, CompileError> {
    let platform_name = request.platform.trim();
    if platform_name.is_empty() {
        return Err(CompileError::EmptyPlatform);
    }

    let before = graph.len();
    let mut compiler = Compiler::new(&mut graph, config, platform_name, &request.tap);
    let category = compiler.resolve_category(&request.category)?;
    let platform = compiler.initialize_platform(platform_name, &category);
    compiler.compile_catalog(catalog, &platform);
    let (diagnostics, mut stats) = compiler.finish();
    stats.triples_added = graph.len() - before;

    tracing::info!(
        platform = platform_name,
        streams = stats.streams,
        classes = stats.classes,
        triples = stats.triples_added,
        diagnostics = diagnostics.len(),
        "compiled catalog"
    );

    Ok(CompileOutcome {
        graph,
        platform,
        diagnostics,
        stats,
    })
}
