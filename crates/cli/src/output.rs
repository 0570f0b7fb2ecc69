// SPDX-License-Identifier: MIT

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Format-branch helper for single-value commands (config get/list, etc.).
///
/// Renders as JSON when `format` is `Json`, otherwise calls `text_fn`.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    data: &T,
    text_fn: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Table => text_fn(),
    }
    Ok(())
}

/// Renders a list of rows (each a map of column name to stringified value,
/// as produced by `Store::execute_query`) as an aligned text table, or as a
/// pretty JSON array.
pub fn print_rows(format: OutputFormat, rows: &[std::collections::BTreeMap<String, serde_json::Value>]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("(no rows)");
                return Ok(());
            }
            let columns: Vec<&String> = rows[0].keys().collect();
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|row| columns.iter().map(|c| render_cell(row.get(*c))).collect())
                .collect();

            let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
            for row in &cells {
                for (i, cell) in row.iter().enumerate() {
                    widths[i] = widths[i].max(cell.len());
                }
            }

            let header: Vec<String> = columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| crate::color::header(&format!("{:<width$}", c, width = w)))
                .collect();
            println!("{}", header.join("  "));

            for row in &cells {
                let line: Vec<String> =
                    row.iter().zip(&widths).map(|(cell, w)| format!("{:<width$}", cell, width = w)).collect();
                println!("{}", line.join("  "));
            }
            println!("\n({} row{})", rows.len(), if rows.len() == 1 { "" } else { "s" });
        }
    }
    Ok(())
}

fn render_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => "-".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
