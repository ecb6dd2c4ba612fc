//! Transcript store: owns the persisted document of every session.
//!
//! Addressing uses the indices produced by [`parser::parse`], and mutations
//! splice the document at the byte span the parser recorded for the entry.
//! Indices are only meaningful against the document they were parsed from;
//! callers that hold on to an index across requests should pass the
//! revision they parsed so a concurrent change is reported instead of
//! silently hitting another entry.
//!
//! There is no locking: concurrent writers to one session race, last write wins.

use crate::blob::{BlobStore, MemoryBlobStore};
use crate::codec;
use crate::paginator::{self, DEFAULT_PAGE_SIZE};
use crate::parser;
use crate::relative_time::format_relative_time;
use crate::{Result, SqlbookError};
use chrono::Utc;
use sqlbook_types::{
    document_revision, Entry, EntryKind, SessionSummary, TranscriptView, DEFAULT_DATABASE,
    GENERAL_STORE_ID,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Title given to the general saved-query document when it is first created.
pub const GENERAL_STORE_TITLE: &str = "Saved Queries";

/// Settings for the transcript store.
#[derive(Debug, Clone)]
pub struct TranscriptStoreConfig {
    /// Database recorded for sessions created without one.
    pub default_database: String,
    /// Entries per page before a new query opens a fresh page (0 disables).
    pub page_size: usize,
}

impl Default for TranscriptStoreConfig {
    fn default() -> Self {
        Self {
            default_database: DEFAULT_DATABASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// New content for an existing entry.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub content: String,
    /// Saved query name; when absent a saved query's content is written verbatim.
    pub name: Option<String>,
    /// Revision the caller's index was computed against.
    pub revision: Option<String>,
}

/// Session documents on top of a [`BlobStore`].
pub struct TranscriptStore {
    blobs: Arc<dyn BlobStore>,
    config: TranscriptStoreConfig,
}

impl TranscriptStore {
    pub fn new(blobs: Arc<dyn BlobStore>, config: TranscriptStoreConfig) -> Self {
        Self { blobs, config }
    }

    /// A store that keeps everything in memory.
    pub fn in_memory(config: TranscriptStoreConfig) -> Self {
        Self::new(Arc::new(MemoryBlobStore::new()), config)
    }

    pub fn config(&self) -> &TranscriptStoreConfig {
        &self.config
    }

    /// Create a session document and return its id.
    pub fn create(&self, name: &str, database: Option<&str>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SqlbookError::MalformedInput("Name is required".to_string()));
        }
        if name.contains('\n') {
            return Err(SqlbookError::MalformedInput(
                "Name must be a single line".to_string(),
            ));
        }
        let database = database
            .map(str::trim)
            .filter(|db| !db.is_empty())
            .unwrap_or(&self.config.default_database);
        if database.contains('\n') || database.contains("-->") {
            return Err(SqlbookError::MalformedInput(format!(
                "Invalid database name: {database:?}"
            )));
        }

        let id = format!("{}_{}", Utc::now().timestamp_millis(), sanitize_name(name));
        self.blobs.write(&id, &initial_document(name, database))?;

        info!(target: "sqlbook::store", "Created session {} (database: {})", id, database);
        Ok(id)
    }

    /// All sessions except reserved documents, most recently modified first.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let now = Utc::now();
        let mut sessions = Vec::new();

        for blob in self.blobs.list()? {
            if blob.name.starts_with('_') {
                continue;
            }
            let Some(content) = self.blobs.read(&blob.name)? else {
                continue;
            };
            let name = parser::parse_title(&content).unwrap_or_else(|| blob.name.clone());
            sessions.push(SessionSummary {
                id: blob.name,
                name,
                timestamp: blob.modified.timestamp_millis(),
                relative_time: format_relative_time(blob.modified, now),
            });
        }

        sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(sessions)
    }

    /// Database the session's queries run against.
    ///
    /// Falls back to the default database when the session or its metadata
    /// comment is missing.
    pub fn session_database(&self, id: &str) -> Result<String> {
        validate_id(id)?;
        let database = self
            .blobs
            .read(id)?
            .and_then(|content| parser::parse_database(&content));
        Ok(database.unwrap_or_else(|| self.config.default_database.clone()))
    }

    /// Full document text.
    pub fn read_all(&self, id: &str) -> Result<String> {
        validate_id(id)?;
        self.blobs
            .read(id)?
            .ok_or_else(|| SqlbookError::SessionNotFound(id.to_string()))
    }

    /// Full document text, or an empty string if the session does not exist.
    pub fn read_or_empty(&self, id: &str) -> Result<String> {
        validate_id(id)?;
        Ok(self.blobs.read(id)?.unwrap_or_default())
    }

    /// Parsed and paginated view of a document. Absent documents are empty.
    pub fn view(&self, id: &str) -> Result<TranscriptView> {
        let content = self.read_or_empty(id)?;
        Ok(build_view(&content))
    }

    /// Append an entry.
    ///
    /// A query is preceded by a page break when the current page is full.
    pub fn append(
        &self,
        id: &str,
        kind: EntryKind,
        content: &str,
        name: Option<&str>,
    ) -> Result<()> {
        if kind != EntryKind::PageBreak && content.trim().is_empty() {
            return Err(SqlbookError::MalformedInput("Content is required".to_string()));
        }
        let current = self.read_all(id)?;

        let mut block = String::new();
        if kind == EntryKind::Query && self.page_is_full(&current) {
            debug!(target: "sqlbook::store", "Page full in {}, inserting page break", id);
            block.push_str(&codec::encode(EntryKind::PageBreak, "", None));
        }
        block.push_str(&codec::encode(kind, content, name));

        self.blobs.append(id, &block)?;
        debug!(target: "sqlbook::store", "Appended {} entry to {}", kind, id);
        Ok(())
    }

    /// Append to the general saved-query document, creating it on first use.
    pub fn append_general(&self, kind: EntryKind, content: &str, name: Option<&str>) -> Result<()> {
        if self.blobs.read(GENERAL_STORE_ID)?.is_none() {
            self.blobs.write(
                GENERAL_STORE_ID,
                &initial_document(GENERAL_STORE_TITLE, &self.config.default_database),
            )?;
            info!(target: "sqlbook::store", "Created general saved-query store");
        }
        self.append(GENERAL_STORE_ID, kind, content, name)
    }

    /// Whether the next query appended to `id` would open a new page.
    pub fn needs_page_break(&self, id: &str) -> Result<bool> {
        let current = self.read_all(id)?;
        Ok(self.page_is_full(&current))
    }

    /// Close the current page explicitly.
    pub fn insert_page_break(&self, id: &str) -> Result<()> {
        self.append(id, EntryKind::PageBreak, "", None)
    }

    /// Replace the title line, or prepend one if the document has none.
    pub fn update_title(&self, id: &str, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() || title.contains('\n') {
            return Err(SqlbookError::MalformedInput(
                "Title must be a single non-empty line".to_string(),
            ));
        }
        let content = self.read_all(id)?;
        let heading = format!("# {title}");
        let mut lines: Vec<&str> = content.split('\n').collect();

        if lines.first().is_some_and(|line| line.starts_with("# ")) {
            lines[0] = &heading;
        } else {
            lines.insert(0, "");
            lines.insert(0, &heading);
        }

        self.blobs.write(id, &lines.join("\n"))?;
        info!(target: "sqlbook::store", "Renamed session {} to {:?}", id, title);
        Ok(())
    }

    /// Rewrite the content of a note, diagram, or saved query.
    pub fn update_entry(&self, id: &str, index: usize, update: &EntryUpdate) -> Result<()> {
        if update.content.trim().is_empty() {
            return Err(SqlbookError::MalformedInput("Content is required".to_string()));
        }
        let content = self.read_all(id)?;
        check_revision(&content, update.revision.as_deref())?;
        let entry = resolve(&content, index)?;

        if !entry.kind.is_editable() {
            return Err(SqlbookError::InvalidTarget(format!(
                "{} entries cannot be edited",
                entry.kind
            )));
        }

        let block = codec::encode_block(entry.kind, &update.content, update.name.as_deref());
        let replacement = format!("{block}{}", separator_after(&entry.raw));
        let updated = splice(&content, &entry, &replacement);

        self.blobs.write(id, &updated)?;
        debug!(target: "sqlbook::store", "Updated entry {} ({}) in {}", index, entry.kind, id);
        Ok(())
    }

    /// Remove an entry. Page breaks cannot be removed.
    pub fn delete_entry(&self, id: &str, index: usize, revision: Option<&str>) -> Result<()> {
        let content = self.read_all(id)?;
        check_revision(&content, revision)?;
        let entry = resolve(&content, index)?;

        if !entry.kind.is_deletable() {
            return Err(SqlbookError::InvalidTarget(
                "Cannot delete a page break".to_string(),
            ));
        }

        let updated = splice(&content, &entry, "");
        self.blobs.write(id, &updated)?;
        debug!(target: "sqlbook::store", "Deleted entry {} ({}) from {}", index, entry.kind, id);
        Ok(())
    }

    /// Remove a session document. Deleting an absent session is not an error.
    pub fn delete(&self, id: &str) -> Result<()> {
        validate_id(id)?;
        if self.blobs.remove(id)? {
            info!(target: "sqlbook::store", "Deleted session {}", id);
        }
        Ok(())
    }

    fn page_is_full(&self, content: &str) -> bool {
        let entries = parser::parse(content);
        paginator::should_paginate(paginator::tail_len(&entries), self.config.page_size)
    }
}

/// Parse and paginate a document.
pub fn build_view(content: &str) -> TranscriptView {
    let entries = parser::parse(content);
    let pages = paginator::paginate(&entries);
    TranscriptView {
        title: parser::parse_title(content),
        database: parser::parse_database(content),
        revision: document_revision(content),
        entries,
        pages,
    }
}

/// Lowercase ASCII alphanumerics; everything else becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Session ids are file names: `[A-Za-z0-9_]+` only.
pub fn validate_id(id: &str) -> Result<()> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(SqlbookError::InvalidSessionId(id.to_string()))
    }
}

fn initial_document(title: &str, database: &str) -> String {
    format!("# {title}\n<!-- database: {database} -->\n\n")
}

fn check_revision(content: &str, expected: Option<&str>) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let actual = document_revision(content);
    if actual == expected {
        Ok(())
    } else {
        Err(SqlbookError::StaleRevision {
            expected: expected.to_string(),
            actual,
        })
    }
}

fn resolve(content: &str, index: usize) -> Result<Entry> {
    let mut entries = parser::parse(content);
    let len = entries.len();
    if index >= len {
        return Err(SqlbookError::IndexOutOfBounds { index, len });
    }
    Ok(entries.swap_remove(index))
}

/// Blank lines that separated `raw` from the following block.
///
/// An encoded block already ends in one newline, so that one is not repeated.
fn separator_after(raw: &str) -> &str {
    let trailing = &raw[raw.trim_end().len()..];
    trailing.strip_prefix('\n').unwrap_or(trailing)
}

fn splice(content: &str, entry: &Entry, replacement: &str) -> String {
    let mut out = String::with_capacity(content.len() + replacement.len());
    out.push_str(&content[..entry.span.start]);
    out.push_str(replacement);
    out.push_str(&content[entry.span.end..]);
    out
}
