//! Parsed, paginated view of a transcript document.

use crate::Entry;
use serde::{Deserialize, Serialize};

/// A run of consecutive non-page-break entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (0-based).
    pub number: usize,
    pub entries: Vec<Entry>,
}

impl Page {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a client needs to render one transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptView {
    /// Title from the `# ` line, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Database from the metadata comment, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Revision of the document the indices below refer to.
    pub revision: String,
    pub entries: Vec<Entry>,
    /// Always holds at least one (possibly empty) page.
    pub pages: Vec<Page>,
}

/// Compute the revision tag of a document: the SHA-256 of its bytes.
pub fn document_revision(content: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_changes_with_content() {
        let a = document_revision("# Demo\n");
        let b = document_revision("# Demo\n\n");
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(a, document_revision("# Demo\n"));
    }
}
