//! `ontotap` command-line interface.
//!
//! - `compile`: base ontology + stream catalog -> grown ontology (Turtle)
//! - `categories`: list the platform categories a base ontology offers
//! - `report`: data-point inventory (CSV) over a compiled ontology

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ontotap_catalog::Catalog;
use ontotap_compiler::{
    categories, compile, CategoryChoice, CompileConfig, CompileRequest, Diagnostic,
    DiagnosticLevel, DiagnosticReport, IdStrategy,
};
use ontotap_rdf::{load_graph_file, write_turtle_file};
use ontotap_report::Report;

#[derive(Parser)]
#[command(name = "ontotap")]
#[command(author, version, about = "Compile tap stream catalogs into a platform ontology")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a stream catalog into the base ontology for one platform.
    Compile(CompileArgs),

    /// List the platform categories of a base ontology.
    Categories {
        /// Base ontology (Turtle, N-Triples or RDF/XML)
        #[arg(long)]
        base: PathBuf,
        /// Compiler config JSON (for the root category IRI)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Export the data points of a compiled ontology as CSV.
    Report {
        /// Compiled ontology
        #[arg(long)]
        input: PathBuf,
        /// Output directory (one CSV per platform), or file with `--merged`
        #[arg(long)]
        out: PathBuf,
        /// Write a single CSV with a leading `Platform` column
        #[arg(long)]
        merged: bool,
        /// Compiler config JSON (for the `isPrimaryKey` namespace)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("category_choice")
        .required(true)
        .args(["category", "new_category"])
))]
struct CompileArgs {
    /// Base ontology (Turtle, N-Triples or RDF/XML)
    #[arg(long)]
    base: PathBuf,
    /// Singer-style stream catalog JSON
    #[arg(long)]
    catalog: PathBuf,
    /// Output ontology (Turtle)
    #[arg(long)]
    out: PathBuf,
    /// Platform display name
    #[arg(long)]
    platform: String,
    /// Tap identifier used in source table names
    #[arg(long)]
    tap: String,
    /// Existing category, by label or IRI
    #[arg(long)]
    category: Option<String>,
    /// Create a new category `<name>Platform` under the root category
    #[arg(long)]
    new_category: Option<String>,
    /// Compiler config JSON
    #[arg(long)]
    config: Option<PathBuf>,
    /// Mint random local names instead of structural ones
    #[arg(long)]
    random_ids: bool,
    /// Keep stream and field names plural
    #[arg(long)]
    no_singularize: bool,
    /// Write the diagnostics of this run as JSON
    #[arg(long)]
    diagnostics: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let directives = ["ontotap", "ontotap_rdf", "ontotap_catalog", "ontotap_compiler", "ontotap_report"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile(args) => cmd_compile(&args),
        Commands::Categories { base, config } => cmd_categories(&base, config.as_deref()),
        Commands::Report {
            input,
            out,
            merged,
            config,
        } => cmd_report(&input, &out, merged, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<CompileConfig> {
    match path {
        Some(path) => CompileConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(CompileConfig::default()),
    }
}

fn print_diagnostic(d: &Diagnostic) {
    let level = match d.level {
        DiagnosticLevel::Warning => "warning".yellow().bold(),
        DiagnosticLevel::Info => "info".blue().bold(),
    };
    let location = match (&d.stream, &d.field) {
        (Some(stream), Some(field)) => format!(" [{stream}.{field}]"),
        (Some(stream), None) => format!(" [{stream}]"),
        _ => String::new(),
    };
    println!("  {level} {}{}: {}", d.code.dimmed(), location, d.message);
}

fn cmd_compile(args: &CompileArgs) -> Result<()> {
    println!(
        "{} {} for {}",
        "Compiling".green().bold(),
        args.catalog.display(),
        args.platform
    );

    let mut config = load_config(args.config.as_deref())?;
    if args.random_ids {
        config.ids = IdStrategy::Random;
    }
    if args.no_singularize {
        config.naming.singularize = false;
    }

    let graph = load_graph_file(&args.base)
        .with_context(|| format!("failed to load base ontology {}", args.base.display()))?;
    let catalog = Catalog::from_file(&args.catalog)
        .with_context(|| format!("failed to load catalog {}", args.catalog.display()))?;

    let category = match (&args.category, &args.new_category) {
        (_, Some(name)) => CategoryChoice::New(name.clone()),
        (Some(existing), None) => CategoryChoice::Existing(existing.clone()),
        (None, None) => return Err(anyhow!("either --category or --new-category is required")),
    };
    let request = CompileRequest {
        platform: args.platform.clone(),
        tap: args.tap.clone(),
        category,
    };

    let outcome = compile(graph, &catalog, &request, &config)
        .with_context(|| format!("failed to compile platform `{}`", args.platform))?;

    for d in &outcome.diagnostics {
        print_diagnostic(d);
    }

    write_turtle_file(&outcome.graph, &args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    if let Some(path) = &args.diagnostics {
        let report = DiagnosticReport::new(&outcome.platform.name, &outcome.diagnostics);
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write diagnostics {}", path.display()))?;
        println!("  {} diagnostics {}", "→".cyan(), path.display());
    }

    let stats = &outcome.stats;
    println!(
        "  {} {} streams, {} classes, {} datatype / {} object properties, {} queries, {} key links",
        "✓".green(),
        stats.streams,
        stats.classes,
        stats.datatype_properties,
        stats.object_properties,
        stats.queries,
        stats.key_links
    );
    println!(
        "  {} {} (+{} triples, {} total)",
        "→".cyan(),
        args.out.display(),
        stats.triples_added,
        outcome.graph.len()
    );
    Ok(())
}

fn cmd_categories(base: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let graph = load_graph_file(base)
        .with_context(|| format!("failed to load base ontology {}", base.display()))?;

    let found = categories(&graph, &config.root_category);
    if found.is_empty() {
        println!(
            "{} no categories under {}",
            "Note:".yellow().bold(),
            config.root_category
        );
        return Ok(());
    }

    println!("{} ({})", "Categories".green().bold(), found.len());
    for (i, category) in found.iter().enumerate() {
        println!("  {:>3}. {}  {}", i + 1, category.label.bold(), category.iri.to_string().dimmed());
    }
    Ok(())
}

fn cmd_report(input: &Path, out: &Path, merged: bool, config: Option<&Path>) -> Result<()> {
    println!("{} {}", "Reporting".green().bold(), input.display());

    let config = load_config(config)?;
    let graph = load_graph_file(input)
        .with_context(|| format!("failed to load ontology {}", input.display()))?;
    let report = Report::from_graph(&graph, &config.primary_key_predicate());

    if report.platforms.is_empty() {
        println!("{} no platform sections found", "Note:".yellow().bold());
    }

    if merged {
        report
            .write_merged(out)
            .with_context(|| format!("failed to write {}", out.display()))?;
        println!("  {} {}", "→".cyan(), out.display());
    } else {
        let written = report
            .write_per_platform(out)
            .with_context(|| format!("failed to write reports under {}", out.display()))?;
        for path in written {
            println!("  {} {}", "→".cyan(), path.display());
        }
    }

    println!(
        "  {} {} platforms, {} data points",
        "✓".green(),
        report.platforms.len(),
        report.data_point_count()
    );
    Ok(())
}
