//! Rendering of query outcomes as transcript markdown.

use sqlbook_types::QueryOutcome;

/// Render an outcome as the body of a `Result` entry.
///
/// Rows become a markdown table; statements without rows report the
/// affected-row count instead.
pub fn format_outcome(outcome: &QueryOutcome) -> String {
    if outcome.rows.is_empty() {
        return format!(
            "_Query executed successfully. Rows affected: {}_",
            outcome.rows_affected
        );
    }
    format_table(&outcome.columns, &outcome.rows)
}

fn format_table(columns: &[String], rows: &[Vec<Option<String>>]) -> String {
    let header = format!("| {} |", columns.join(" | "));
    let separator = format!(
        "| {} |",
        columns.iter().map(|_| "---").collect::<Vec<_>>().join(" | ")
    );

    let mut lines = vec![header, separator];
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .map(|value| match value {
                Some(v) => escape_cell(v),
                None => "NULL".to_string(),
            })
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines.join("\n")
}

/// Keep a value on one table line: pipes are escaped, line breaks become `<br>`.
///
/// A raw newline could also start a line with `## ` and split the entry.
fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}
