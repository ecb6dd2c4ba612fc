//! Session metadata types.

use serde::{Deserialize, Serialize};

/// Reserved id of the cross-session saved-query store.
pub const GENERAL_STORE_ID: &str = "_general_queries";

/// Database a session is bound to when none was recorded.
pub const DEFAULT_DATABASE: &str = "learning_db";

/// Summary of a session for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Creation millis plus sanitized name (e.g. `1718000000000_demo`).
    pub id: String,
    /// Title line of the document.
    pub name: String,
    /// Last-modified time of the document, in Unix milliseconds.
    pub timestamp: i64,
    /// Human-readable age of `timestamp` (e.g. "hace 5 min").
    pub relative_time: String,
}
