//! Document parser: splits a transcript document into indexed entries.
//!
//! A document is a preamble (title line and metadata comment) followed by
//! blocks, each starting at a line that begins with `## `. Every block is
//! decoded with the entry codec; blocks that are blank or carry an unknown
//! header are dropped and do not consume an index.

use crate::codec::{self, HEADER_PREFIX};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlbook_types::Entry;
use std::ops::Range;
use tracing::debug;

static BLOCK_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^## ").unwrap());

static DATABASE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!-- database: (.*?) -->").unwrap());

/// Byte ranges of every block in `text`, preamble excluded.
///
/// Each range starts at its `## ` marker and runs to the next marker or the
/// end of the document, so the ranges tile everything after the preamble.
pub fn block_spans(text: &str) -> Vec<Range<usize>> {
    let starts: Vec<usize> = BLOCK_START.find_iter(text).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            start..end
        })
        .collect()
}

/// Parse a document into its decodable entries, indexed `0..n`.
pub fn parse(text: &str) -> Vec<Entry> {
    let mut entries = Vec::new();

    for span in block_spans(text) {
        let raw = &text[span.clone()];
        let body = &raw[HEADER_PREFIX.len()..];
        if body.trim().is_empty() {
            continue;
        }

        match codec::decode(body) {
            Some(decoded) => entries.push(Entry {
                index: entries.len(),
                kind: decoded.kind,
                content: decoded.content,
                name: decoded.name,
                raw: raw.to_string(),
                span,
            }),
            None => {
                debug!(
                    target: "sqlbook::parser",
                    "Dropping block with unrecognized header at byte {}: {:?}",
                    span.start,
                    body.lines().next().unwrap_or_default()
                );
            }
        }
    }

    entries
}

/// Title from a leading `# ` line.
pub fn parse_title(text: &str) -> Option<String> {
    text.lines()
        .next()
        .and_then(|line| line.strip_prefix("# "))
        .map(|title| title.trim_end_matches('\r').to_string())
}

/// Database name from the `<!-- database: NAME -->` metadata comment.
pub fn parse_database(text: &str) -> Option<String> {
    DATABASE_COMMENT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sqlbook_types::EntryKind;

    const DEMO: &str = "# Demo\n<!-- database: learning_db -->\n\n\
        \n## Query\n```sql\nSELECT 1\n```\n\
        \n## Result\n| ?column? |\n|---|\n| 1 |\n";

    #[test]
    fn test_parse_demo() {
        let entries = parse(DEMO);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntryKind::Query);
        assert_eq!(entries[0].content, "SELECT 1");
        assert_eq!(entries[1].kind, EntryKind::Result);
        assert_eq!(entries[1].content, "| ?column? |\n|---|\n| 1 |");
        assert_eq!(entries[1].index, 1);
    }

    #[test]
    fn test_spans_point_at_raw_text() {
        for entry in parse(DEMO) {
            assert_eq!(&DEMO[entry.span.clone()], entry.raw);
            assert!(entry.raw.starts_with("## "));
        }
    }

    #[test]
    fn test_unrecognized_and_blank_blocks_do_not_consume_indices() {
        let doc = "# T\n\n## Note\nfirst\n## Aside\nignored\n## \n\n\
            ## Diagram\ngraph TD\n## Query\n```sql\nSELECT 2\n```\n";
        let entries = parse(doc);
        let kinds: Vec<_> = entries.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EntryKind::Note, EntryKind::Diagram, EntryKind::Query]);
        let indices: Vec<_> = entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_repeated_marker_is_dropped() {
        let doc = "# T\n\n## Note\nintro\n## ## Query\n```sql\nDROP TABLE x\n```\n";
        let entries = parse(doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::Note);
        assert_eq!(entries[0].content, "intro");
    }

    #[test]
    fn test_header_only_at_line_start() {
        let doc = "# T\n\n## Note\nsee ## Query inside\n";
        let entries = parse(doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "see ## Query inside");
    }

    #[test]
    fn test_whitespace_document() {
        assert!(parse("").is_empty());
        assert!(parse("  \n\n\t\n").is_empty());
    }

    #[test]
    fn test_preamble_is_not_an_entry() {
        let entries = parse("# Query\n<!-- database: x -->\n\n");
        assert!(entries.is_empty());
    }

    #[test]
    fn test_title_and_database() {
        assert_eq!(parse_title(DEMO).as_deref(), Some("Demo"));
        assert_eq!(parse_database(DEMO).as_deref(), Some("learning_db"));
        assert_eq!(parse_title("## Query\n"), None);
        assert_eq!(parse_database("# T\n"), None);
    }

    #[derive(Debug, Clone)]
    enum Chunk {
        Known(EntryKind, String),
        Noise(&'static str),
    }

    fn chunk() -> impl Strategy<Value = Chunk> {
        let kind = prop_oneof![
            Just(EntryKind::Query),
            Just(EntryKind::Result),
            Just(EntryKind::Error),
            Just(EntryKind::Note),
            Just(EntryKind::Diagram),
        ];
        let known = (kind, "[A-Za-z][A-Za-z0-9_(),;= ]{0,20}")
            .prop_map(|(kind, content)| Chunk::Known(kind, content.trim().to_string()));
        let page_break = Just(Chunk::Known(EntryKind::PageBreak, String::new()));
        let noise = prop_oneof![
            Just("\n## Aside\nnot an entry\n"),
            Just("\n## \n\n"),
            Just("\n##   \n"),
            Just("\n## query\nSELECT 1\n"),
            Just("\n## ## Query\n```sql\nDROP TABLE x\n```\n"),
        ]
        .prop_map(Chunk::Noise);
        prop_oneof![4 => known, 1 => page_break, 3 => noise]
    }

    proptest! {
        #[test]
        fn prop_dropped_chunks_do_not_shift_indices(
            chunks in prop::collection::vec(chunk(), 0..16),
        ) {
            let mut doc = String::from("# T\n<!-- database: d -->\n\n");
            let mut expected = Vec::new();
            for chunk in &chunks {
                match chunk {
                    Chunk::Known(kind, content) => {
                        doc.push_str(&codec::encode(*kind, content, None));
                        expected.push((*kind, content.clone()));
                    }
                    Chunk::Noise(text) => doc.push_str(text),
                }
            }

            let entries = parse(&doc);
            let actual: Vec<_> = entries.iter().map(|e| (e.kind, e.content.clone())).collect();
            prop_assert_eq!(actual, expected);
            for (i, entry) in entries.iter().enumerate() {
                prop_assert_eq!(entry.index, i);
                prop_assert_eq!(&doc[entry.span.clone()], entry.raw.as_str());
            }
        }
    }
}
