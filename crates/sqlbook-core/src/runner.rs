//! Execute a query and record it in the session transcript.

use crate::executor::QueryExecutor;
use crate::format::format_outcome;
use crate::store::TranscriptStore;
use crate::{Result, SqlbookError};
use sqlbook_types::{EntryKind, QueryOutcome};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// What happened to a submitted query. Both variants were recorded.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Success {
        outcome: QueryOutcome,
        /// Body of the `Result` entry that was appended.
        markdown: String,
    },
    Failed {
        error: String,
    },
}

/// Runs queries for sessions: query entry, execution, result or error entry.
pub struct QueryRunner {
    store: Arc<TranscriptStore>,
    executor: Arc<dyn QueryExecutor>,
    timeout: Duration,
}

impl QueryRunner {
    pub fn new(
        store: Arc<TranscriptStore>,
        executor: Arc<dyn QueryExecutor>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            executor,
            timeout,
        }
    }

    /// Record `sql` in the session, run it on the session's database, and
    /// record the result or the failure.
    ///
    /// Execution failures are not errors here: they become `Error` entries and
    /// come back as [`RunOutcome::Failed`]. Errors are returned only when the
    /// transcript itself cannot be written.
    pub async fn run(&self, session_id: &str, sql: &str) -> Result<RunOutcome> {
        if sql.trim().is_empty() {
            return Err(SqlbookError::MalformedInput("Missing sql".to_string()));
        }

        self.store.append(session_id, EntryKind::Query, sql, None)?;
        let database = self.store.session_database(session_id)?;

        let execution = self.executor.execute(&database, sql);
        let result = tokio::time::timeout(self.timeout, execution).await;
        match result {
            Ok(Ok(outcome)) => {
                let markdown = format_outcome(&outcome);
                self.store
                    .append(session_id, EntryKind::Result, &markdown, None)?;
                info!(
                    target: "sqlbook::query",
                    "Query in {} on {} returned {} row(s)",
                    session_id,
                    database,
                    outcome.row_count()
                );
                Ok(RunOutcome::Success { outcome, markdown })
            }
            Ok(Err(e)) => self.record_failure(session_id, e.0),
            Err(_) => self.record_failure(
                session_id,
                format!("Query timed out after {}s", self.timeout.as_secs()),
            ),
        }
    }

    fn record_failure(&self, session_id: &str, error: String) -> Result<RunOutcome> {
        warn!(target: "sqlbook::query", "Query in {} failed: {}", session_id, error);
        let text = if error.trim().is_empty() {
            "Unknown database error".to_string()
        } else {
            error
        };
        self.store.append(session_id, EntryKind::Error, &text, None)?;
        Ok(RunOutcome::Failed { error: text })
    }
}
