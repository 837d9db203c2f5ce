//! Output formatting: table, JSON, plain.
//!
//! Table uses `tabled`, JSON serializes the original data via serde,
//! plain emits one identifier per line.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::OutputFormat;

/// Render a list of items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    if rows.is_empty() {
        return "(none)".to_owned();
    }
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("serialization error: {e}"))
}
