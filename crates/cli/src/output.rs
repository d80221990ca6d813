//! Rendering of command results

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Bordered table
    #[default]
    Table,
    /// Pretty-printed JSON, for scripts
    Json,
    /// Tab-separated lines
    Plain,
}

/// A command result with named columns
pub trait Record: Serialize {
    const COLUMNS: &'static [&'static str];

    /// Cell values in `COLUMNS` order
    fn cells(&self) -> Vec<String>;
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

/// Render records one per row
pub fn render_records<T: Record>(records: &[T], format: OutputFormat) -> serde_json::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(records)?,
        OutputFormat::Table if records.is_empty() => "(none)".to_string(),
        OutputFormat::Table => {
            let mut table = new_table(T::COLUMNS);
            for record in records {
                table.add_row(record.cells());
            }
            table.to_string()
        }
        OutputFormat::Plain => records
            .iter()
            .map(|r| r.cells().join("\t"))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

/// Render a single record with one line per column
pub fn render_record<T: Record>(record: &T, format: OutputFormat) -> serde_json::Result<String> {
    let fields = T::COLUMNS.iter().zip(record.cells());
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(record)?,
        OutputFormat::Table => {
            let mut table = new_table(&["Field", "Value"]);
            for (column, value) in fields {
                table.add_row(vec![column.to_string(), value]);
            }
            table.to_string()
        }
        OutputFormat::Plain => fields
            .map(|(column, value)| format!("{}\t{}", column, value))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

pub fn print_done(message: &str) {
    println!("done: {}", message);
}

pub fn print_error(message: &str) {
    eprintln!("error: {}", message);
}
