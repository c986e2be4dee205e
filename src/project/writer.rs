use crate::project::engine::Projection;
use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;

/// Write a projection as CSV: selected fields as the header, then one
/// record per row. Cell rendering: strings are written verbatim (the csv
/// crate handles quoting), null becomes the empty cell, and any array or
/// object value that survived projection is serialized to compact JSON.
pub fn write_csv<W: Write>(projection: &Projection, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(&projection.fields)
        .context("Failed to write CSV header")?;

    for row in &projection.rows {
        let record: Vec<String> = projection
            .fields
            .iter()
            .map(|field| row.get(field).map(render_cell).unwrap_or_default())
            .collect();

        csv_writer
            .write_record(&record)
            .context("Failed to write CSV row")?;
    }

    csv_writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Arrays and inline objects fall back to their JSON text
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
