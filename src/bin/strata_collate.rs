//! strata-collate: group raw export records into named collections
//!
//! Reads record files produced by an export-format parser (JSON arrays or
//! newline-delimited JSON, one object per record), resolves each record's
//! identity key, and writes the grouped result as a single JSON document.
//!
//! Usage:
//!   # Collate one record file to stdout
//!   strata-collate records.jsonl
//!
//!   # Collate many files into an export file
//!   strata-collate dump/output-*.json --output export.json

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::io::Write;
use strata::collate::{collate, Document, Export};

#[derive(Parser, Debug)]
#[command(name = "strata-collate")]
#[command(about = "Group raw export records into named collections", long_about = None)]
struct Args {
    /// Record files (JSON array or NDJSON of record objects)
    #[arg(value_name = "FILES", required = true)]
    inputs: Vec<String>,

    /// Output file for the export JSON (stdout if omitted)
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,
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

    let mut records: Vec<Document> = Vec::new();
    let mut files_processed = 0;

    for path in &args.inputs {
        // A single unreadable or unparseable file must not abort the run
        match read_records(path) {
            Ok(mut file_records) => {
                eprintln!("Parsed {} records from {}", file_records.len(), path);
                records.append(&mut file_records);
                files_processed += 1;
            }
            Err(err) => {
                eprintln!("Error parsing {}: {:#}", path, err);
            }
        }
    }

    let total = records.len();
    let collated = collate(records);

    eprintln!("Total records parsed: {}", total);
    eprintln!("Collections found: {:?}", collated.collections.keys().collect::<Vec<_>>());
    for (name, docs) in &collated.collections {
        eprintln!("  {}: {} documents", name, docs.len());
    }
    if !collated.orphaned.is_empty() {
        eprintln!(
            "Found {} orphaned documents (without clear collection path)",
            collated.orphaned.len()
        );
    }

    let export = Export::from_collated(collated, files_processed);

    let output = if args.compact {
        serde_json::to_string(&export)?
    } else {
        serde_json::to_string_pretty(&export)?
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, output)
                .with_context(|| format!("Failed to write {}", path))?;
            eprintln!("Wrote export to {}", path);
        }
        None => {
            let mut stdout = std::io::stdout();
            writeln!(stdout, "{}", output)?;
        }
    }

    Ok(())
}

/// Parse records from a file using SIMD-accelerated JSON parsing when
/// possible, falling back to line-by-line serde_json for NDJSON.
fn read_records(path: &str) -> Result<Vec<Document>> {
    let mut content = std::fs::read(path).context("Failed to read file")?;
    let mut records = Vec::new();

    // Try SIMD parsing first (faster) - use OwnedValue to avoid borrow issues
    match simd_json::to_owned_value(&mut content) {
        Ok(simd_json::OwnedValue::Array(arr)) => {
            for elem in arr.iter() {
                // Convert simd_json value to serde_json::Value
                let json_str = simd_json::to_string(elem)?;
                let value: Value = serde_json::from_str(&json_str)?;
                push_record(value, &mut records);
            }
        }
        Ok(elem) => {
            let json_str = simd_json::to_string(&elem)?;
            let value: Value = serde_json::from_str(&json_str)?;
            push_record(value, &mut records);
        }
        Err(_) => {
            // Fallback to serde_json for NDJSON or malformed input
            let content_str = String::from_utf8_lossy(&content);
            for line in content_str.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let value: Value =
                    serde_json::from_str(line).context("Failed to parse JSON line")?;
                push_record(value, &mut records);
            }
        }
    }

    Ok(records)
}

fn push_record(value: Value, records: &mut Vec<Document>) {
    match value {
        Value::Object(map) => records.push(map),
        other => {
            tracing::warn!("skipping non-object record: {}", other);
        }
    }
}
