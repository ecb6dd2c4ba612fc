//! Query execution results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of a successfully executed statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Column names, in result order. Empty when no rows came back.
    pub columns: Vec<String>,
    /// Text values per row; `None` is SQL NULL.
    pub rows: Vec<Vec<Option<String>>>,
    /// Rows affected as reported by the server.
    pub rows_affected: u64,
}

impl QueryOutcome {
    /// Rows as JSON objects keyed by column name.
    pub fn json_rows(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, val)| {
                        let val = match val {
                            Some(v) => Value::String(v.clone()),
                            None => Value::Null,
                        };
                        (col.clone(), val)
                    })
                    .collect()
            })
            .collect()
    }

    /// Row count to report: returned rows if any, else rows affected.
    pub fn row_count(&self) -> u64 {
        if self.rows.is_empty() {
            self.rows_affected
        } else {
            self.rows.len() as u64
        }
    }
}
