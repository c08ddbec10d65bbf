//! Terminal formatting for a built indicator.

use crate::indicator::Indicator;

/// Width of each value column in the preview table.
const CELL_WIDTH: usize = 14;

/// Header block: identity, period bounds, shape.
pub fn format_summary(indicator: &Indicator) -> String {
    let mut out = String::new();
    let (rows, cols) = indicator.table().shape();

    out.push_str(&format!(
        "=== {} ({}) ===\n",
        indicator.description().unwrap_or("(no description)"),
        indicator.code().unwrap_or("?")
    ));
    out.push_str(&format!(
        "Periodicity: {} | {} .. {}\n",
        indicator.periodicity().unwrap_or("?"),
        indicator.first_period().unwrap_or("?"),
        indicator.last_period().unwrap_or("?"),
    ));
    if let Some(unit) = indicator.unit() {
        out.push_str(&format!("Unit: {unit}\n"));
    }
    out.push_str(&format!("Geo level: {}\n", indicator.geo_level().unwrap_or("?")));
    out.push_str(&format!(
        "Table: {rows} periods x {cols} columns ({} values)\n",
        indicator.table().count_values()
    ));
    out.push_str(&format!("Columns: {}\n", indicator.table().column_names().join(" / ")));
    out
}

/// First `max_rows` periods of the table, one text column per table column.
pub fn format_preview(indicator: &Indicator, max_rows: usize) -> String {
    let table = indicator.table();
    let (rows, cols) = table.shape();
    let mut out = String::new();

    out.push_str(&format!("{:<12}", table.row_axis_name()));
    for col in table.columns() {
        out.push_str(&format!(" {:>CELL_WIDTH$}", truncate(&col.join("/"), CELL_WIDTH)));
    }
    out.push('\n');

    for (row, period) in table.rows().iter().enumerate().take(max_rows) {
        out.push_str(&format!("{:<12}", period.to_string()));
        for col in 0..cols {
            let cell = table
                .cell(row, col)
                .map(|v| format!("{v}"))
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(" {cell:>CELL_WIDTH$}"));
        }
        out.push('\n');
    }
    if rows > max_rows {
        out.push_str(&format!("... {} more periods\n", rows - max_rows));
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}
