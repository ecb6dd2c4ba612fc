//! Transcript entry types.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Kind of a transcript entry.
///
/// The set is closed: a block whose header is not one of these is not an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    /// SQL submitted by the user.
    Query,
    /// Rendered result of a query (markdown table or rows-affected line).
    Result,
    /// Error text produced by a failed query.
    Error,
    /// Free-form markdown note.
    Note,
    /// Diagram source (mermaid).
    #[serde(alias = "mermaid")]
    Diagram,
    /// Bookmarked query with a name.
    SavedQuery,
    /// Page boundary marker.
    PageBreak,
}

impl EntryKind {
    /// Every kind, in header-matching order.
    pub const ALL: [EntryKind; 7] = [
        EntryKind::Query,
        EntryKind::Result,
        EntryKind::Error,
        EntryKind::Note,
        EntryKind::Diagram,
        EntryKind::SavedQuery,
        EntryKind::PageBreak,
    ];

    /// Header word written after `## ` in the document.
    pub fn header(self) -> &'static str {
        match self {
            EntryKind::Query => "Query",
            EntryKind::Result => "Result",
            EntryKind::Error => "Error",
            EntryKind::Note => "Note",
            EntryKind::Diagram => "Diagram",
            EntryKind::SavedQuery => "Saved Query",
            EntryKind::PageBreak => "Page Break",
        }
    }

    /// Kind name used at the HTTP boundary (`"saved-query"`, `"mermaid"`, ...).
    pub fn from_type_name(s: &str) -> Option<Self> {
        match s {
            "query" => Some(EntryKind::Query),
            "result" => Some(EntryKind::Result),
            "error" => Some(EntryKind::Error),
            "note" => Some(EntryKind::Note),
            "diagram" | "mermaid" => Some(EntryKind::Diagram),
            "saved-query" => Some(EntryKind::SavedQuery),
            "page-break" => Some(EntryKind::PageBreak),
            _ => None,
        }
    }

    /// Whether the payload is carried inside a fenced code block.
    pub fn is_fenced(self) -> bool {
        matches!(
            self,
            EntryKind::Query | EntryKind::Error | EntryKind::SavedQuery
        )
    }

    /// Kinds whose content may be rewritten in place.
    pub fn is_editable(self) -> bool {
        matches!(
            self,
            EntryKind::Note | EntryKind::Diagram | EntryKind::SavedQuery
        )
    }

    /// Kinds that may be removed from a transcript.
    ///
    /// Query, Result and Error are deletable but not editable; page breaks
    /// are neither.
    pub fn is_deletable(self) -> bool {
        self != EntryKind::PageBreak
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// One decoded entry of a transcript document.
///
/// Entries have no identity beyond `index`, which is only valid against the
/// exact document text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Ordinal among decodable entries (0-based).
    pub index: usize,
    pub kind: EntryKind,
    /// Semantic payload (SQL, result text, note markdown, ...).
    pub content: String,
    /// Saved query name; `None` for every other kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Exact substring of the document this entry was decoded from.
    pub raw: String,
    /// Byte range of `raw` within the document.
    pub span: Range<usize>,
}

impl Entry {
    pub fn is_page_break(&self) -> bool {
        self.kind == EntryKind::PageBreak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_match_serde() {
        for kind in EntryKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            let name = json.trim_matches('"');
            assert_eq!(EntryKind::from_type_name(name), Some(kind));
        }
    }

    #[test]
    fn test_mermaid_alias() {
        let kind: EntryKind = serde_json::from_str("\"mermaid\"").unwrap();
        assert_eq!(kind, EntryKind::Diagram);
        assert_eq!(EntryKind::from_type_name("mermaid"), Some(EntryKind::Diagram));
        assert_eq!(EntryKind::from_type_name("Query"), None);
    }

    #[test]
    fn test_edit_and_delete_predicates() {
        assert!(!EntryKind::Query.is_editable());
        assert!(EntryKind::Query.is_deletable());
        assert!(EntryKind::Note.is_editable());
        assert!(!EntryKind::PageBreak.is_editable());
        assert!(!EntryKind::PageBreak.is_deletable());
    }
}
