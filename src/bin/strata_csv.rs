//! strata-csv: project one collection of an export to CSV
//!
//! Usage:
//!   # Export users with default settings
//!   strata-csv export.json users
//!
//!   # Export only specific fields to a chosen file
//!   strata-csv export.json users --include-fields email,display_name -o users.csv
//!
//!   # Keep nested objects as JSON strings instead of flattening
//!   strata-csv export.json users --no-flatten
//!
//!   # Only fields present in at least 80% of documents, shape cluster 2 only
//!   strata-csv export.json users --min-coverage 80 --shape 2

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeSet;
use strata::collate::Export;
use strata::project::{project, select_collection, write_csv, ProjectionPolicy};

#[derive(Parser, Debug)]
#[command(name = "strata-csv")]
#[command(about = "Project a collection to CSV with a fixed schema", long_about = None)]
struct Args {
    /// Export JSON file produced by strata-collate
    export: String,

    /// Collection to project
    collection: String,

    /// Output CSV file (defaults to <collection>_export.csv)
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// Include internal fields (_key, _document_id, ...)
    #[arg(long)]
    include_internal: bool,

    /// Comma-separated list of fields to include
    #[arg(long)]
    include_fields: Option<String>,

    /// Comma-separated list of fields to exclude
    #[arg(long)]
    exclude_fields: Option<String>,

    /// Do not flatten nested objects (serialize them to JSON strings)
    #[arg(long)]
    no_flatten: bool,

    /// Drop fields present in fewer than this percentage of documents
    #[arg(long, default_value_t = 0.0)]
    min_coverage: f64,

    /// Restrict to one shape cluster (1-based, see strata-shapes)
    #[arg(long)]
    shape: Option<usize>,
}

fn parse_field_list(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let content = std::fs::read_to_string(&args.export)
        .with_context(|| format!("Failed to read {}", args.export))?;
    let export: Export =
        serde_json::from_str(&content).context("Failed to parse export JSON")?;

    let documents = select_collection(&export, &args.collection)?;
    eprintln!(
        "Exporting {} documents from '{}' collection...",
        documents.len(),
        args.collection
    );

    let policy = ProjectionPolicy {
        exclude_internal: !args.include_internal,
        include_fields: args.include_fields.as_deref().map(parse_field_list),
        exclude_fields: args.exclude_fields.as_deref().map(parse_field_list),
        flatten_nested: !args.no_flatten,
        min_field_coverage: args.min_coverage,
        shape_filter: args.shape,
    };

    let projection = project(documents, &policy)?;

    if !projection.missing_fields.is_empty() {
        eprintln!(
            "Warning: these fields were not found: {:?}",
            projection.missing_fields
        );
    }

    let output_path = args
        .output
        .unwrap_or_else(|| format!("{}_export.csv", args.collection));

    eprintln!(
        "Exporting {} fields: {:?}",
        projection.fields.len(),
        projection.fields
    );

    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path))?;
    write_csv(&projection, file)?;

    eprintln!("Successfully exported to {}", output_path);
    Ok(())
}
