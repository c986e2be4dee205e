//! strata-shapes: report the structural variants of a collection
//!
//! Reads an export JSON produced by strata-collate and prints the shape
//! clusters of one collection (first-seen order) plus a field coverage
//! table (descending by coverage).
//!
//! Usage:
//!   strata-shapes export.json users
//!   strata-shapes export.json users --include-internal

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use strata::collate::Export;
use strata::{select_collection, shape};

#[derive(Parser, Debug)]
#[command(name = "strata-shapes")]
#[command(about = "Report shape clusters and field coverage for a collection", long_about = None)]
struct Args {
    /// Export JSON file produced by strata-collate
    export: String,

    /// Collection to analyze
    collection: String,

    /// Include internal fields (_key, _document_id, ...) in the analysis
    #[arg(long)]
    include_internal: bool,
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
    let exclude_internal = !args.include_internal;

    println!("Collection: {} ({} documents)", args.collection, documents.len());

    let clusters = shape::cluster(documents, exclude_internal);
    println!("\nShape clusters ({} variants):", clusters.len());
    for (index, (signature, positions)) in clusters.iter().enumerate() {
        println!(
            "  [{}] {} documents: {}",
            index + 1,
            positions.len(),
            signature.join(", ")
        );
    }

    println!("\nField coverage:");
    for (field, pct) in shape::coverage(documents, exclude_internal) {
        println!("  {:>6.1}%  {}", pct, field);
    }

    Ok(())
}
