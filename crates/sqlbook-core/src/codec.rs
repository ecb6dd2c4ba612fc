//! Entry codec: one entry <-> one `## Header` block of markdown.
//!
//! Block layout per kind:
//!
//! ```text
//! ## Query          ## Result        ## Error       ## Saved Query
//! ```sql            <markdown>       ```            <name>
//! <sql>                              <message>      ```sql
//! ```                                ```            <sql>
//!                                                   ```
//! ```
//!
//! `Note` and `Diagram` carry their payload verbatim; `Page Break` has none.

use sqlbook_types::EntryKind;

/// Marker that opens every entry block at the start of a line.
pub const HEADER_PREFIX: &str = "## ";

/// Name given to saved queries written without one.
pub const UNTITLED_QUERY: &str = "Untitled Query";

const FENCE: &str = "```";
const SQL_FENCE: &str = "```sql";

/// The semantic part of a decoded block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    pub kind: EntryKind,
    pub content: String,
    pub name: Option<String>,
}

/// Encode an entry as a block ready to be appended to a document.
///
/// The block starts with a blank-line separator and ends with a newline.
pub fn encode(kind: EntryKind, content: &str, name: Option<&str>) -> String {
    format!("\n{}", encode_block(kind, content, name))
}

/// Encode an entry as `## Header\n<payload>\n`, without the leading separator.
pub fn encode_block(kind: EntryKind, content: &str, name: Option<&str>) -> String {
    let header = kind.header();
    match kind {
        EntryKind::Query => format!("{HEADER_PREFIX}{header}\n{SQL_FENCE}\n{content}\n{FENCE}\n"),
        EntryKind::Error => format!("{HEADER_PREFIX}{header}\n{FENCE}\n{content}\n{FENCE}\n"),
        EntryKind::SavedQuery => match name {
            Some(name) => format!(
                "{HEADER_PREFIX}{header}\n{name}\n{SQL_FENCE}\n{content}\n{FENCE}\n"
            ),
            // Already formatted by the caller.
            None => format!("{HEADER_PREFIX}{header}\n{content}\n"),
        },
        EntryKind::PageBreak => format!("{HEADER_PREFIX}{header}\n"),
        EntryKind::Result | EntryKind::Note | EntryKind::Diagram => {
            format!("{HEADER_PREFIX}{header}\n{content}\n")
        }
    }
}

/// Recognize the header word at the start of a block whose `## ` marker has
/// already been removed. Returns the kind and the remainder after the word.
pub fn match_header(block: &str) -> Option<(EntryKind, &str)> {
    let block = block.trim_start();
    EntryKind::ALL.into_iter().find_map(|kind| {
        let rest = block.strip_prefix(kind.header())?;
        match rest.chars().next() {
            None => Some((kind, rest)),
            Some(c) if c.is_whitespace() => Some((kind, rest)),
            Some(_) => None,
        }
    })
}

/// Decode one block. Blocks with an unrecognized header decode to `None`.
///
/// Fenced kinds whose fence is missing fall back to the trimmed remainder.
pub fn decode(block: &str) -> Option<DecodedEntry> {
    let (kind, rest) = match_header(block)?;
    let body = rest.trim();

    let (content, name) = match kind {
        EntryKind::Query => (fenced(body, SQL_FENCE).unwrap_or(body), None),
        EntryKind::Error => (fenced(body, FENCE).unwrap_or(body), None),
        EntryKind::SavedQuery => {
            let (name, after_name) = saved_query_name(body);
            let sql = fenced(body, SQL_FENCE).unwrap_or(after_name);
            (sql, Some(name.to_string()))
        }
        EntryKind::PageBreak => ("", None),
        EntryKind::Result | EntryKind::Note | EntryKind::Diagram => (body, None),
    };

    Some(DecodedEntry {
        kind,
        content: content.to_string(),
        name,
    })
}

/// Inner text of the first fenced block opened by `opener`, trimmed.
fn fenced<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)? + opener.len();
    let len = text[start..].find(FENCE)?;
    Some(text[start..start + len].trim())
}

/// First non-empty line of a saved-query body, and the text after it.
fn saved_query_name(body: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        let trimmed = line.trim();
        offset += line.len();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with(FENCE) {
            break;
        }
        return (trimmed, body[offset..].trim());
    }
    (UNTITLED_QUERY, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_query() {
        assert_eq!(
            encode(EntryKind::Query, "SELECT 1", None),
            "\n## Query\n```sql\nSELECT 1\n```\n"
        );
    }

    #[test]
    fn test_encode_error_and_page_break() {
        assert_eq!(
            encode(EntryKind::Error, "relation \"x\" does not exist", None),
            "\n## Error\n```\nrelation \"x\" does not exist\n```\n"
        );
        assert_eq!(encode(EntryKind::PageBreak, "", None), "\n## Page Break\n");
    }

    #[test]
    fn test_encode_saved_query_structured() {
        assert_eq!(
            encode(EntryKind::SavedQuery, "SELECT * FROM users", Some("All users")),
            "\n## Saved Query\nAll users\n```sql\nSELECT * FROM users\n```\n"
        );
    }

    #[test]
    fn test_decode_saved_query() {
        let decoded = decode("Saved Query\nAll users\n```sql\nSELECT * FROM users\n```").unwrap();
        assert_eq!(decoded.kind, EntryKind::SavedQuery);
        assert_eq!(decoded.name.as_deref(), Some("All users"));
        assert_eq!(decoded.content, "SELECT * FROM users");
    }

    #[test]
    fn test_decode_saved_query_without_name() {
        let decoded = decode("Saved Query\n```sql\nSELECT 2\n```").unwrap();
        assert_eq!(decoded.name.as_deref(), Some(UNTITLED_QUERY));
        assert_eq!(decoded.content, "SELECT 2");
    }

    #[test]
    fn test_decode_query_without_fence_falls_back() {
        let decoded = decode("Query\nSELECT 1").unwrap();
        assert_eq!(decoded.kind, EntryKind::Query);
        assert_eq!(decoded.content, "SELECT 1");
    }

    #[test]
    fn test_decode_unknown_header() {
        assert!(decode("Summary\nsomething").is_none());
        assert!(decode("Queryish\nSELECT 1").is_none());
        assert!(decode("query\nSELECT 1").is_none());
    }

    #[test]
    fn test_decode_rejects_repeated_marker() {
        assert!(decode("## Query\n```sql\nDROP TABLE x\n```\n").is_none());
        assert!(decode(" ## Note\nhidden").is_none());
    }

    #[test]
    fn test_decode_page_break() {
        let decoded = decode("Page Break\n").unwrap();
        assert_eq!(decoded.kind, EntryKind::PageBreak);
        assert_eq!(decoded.content, "");
    }

    #[test]
    fn test_decode_result_keeps_table() {
        let table = "| ?column? |\n|---|\n| 1 |";
        let decoded = decode(&format!("Result\n{table}\n\n")).unwrap();
        assert_eq!(decoded.content, table);
    }

    /// Decode encoder output the way the parser sees it, marker removed.
    fn decode_encoded(encoded: &str) -> Option<DecodedEntry> {
        decode(encoded.trim_start().strip_prefix(HEADER_PREFIX)?)
    }

    fn content_kind() -> impl Strategy<Value = EntryKind> {
        prop_oneof![
            Just(EntryKind::Query),
            Just(EntryKind::Result),
            Just(EntryKind::Error),
            Just(EntryKind::Note),
            Just(EntryKind::Diagram),
        ]
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            kind in content_kind(),
            content in "[A-Za-z0-9_*(),;=' ]{0,20}(\n[A-Za-z0-9_*(),;=' |-]{1,20}){0,3}",
        ) {
            let content = content.trim().to_string();
            let decoded = decode_encoded(&encode(kind, &content, None)).unwrap();
            prop_assert_eq!(decoded.kind, kind);
            prop_assert_eq!(decoded.content, content);
        }

        #[test]
        fn prop_saved_query_round_trip(
            name in "[A-Za-z][A-Za-z0-9 ]{0,15}",
            sql in "SELECT [a-z0-9_, ]{1,20}",
        ) {
            let name = name.trim().to_string();
            let sql = sql.trim().to_string();
            let encoded = encode(EntryKind::SavedQuery, &sql, Some(&name));
            let decoded = decode_encoded(&encoded).unwrap();
            prop_assert_eq!(decoded.kind, EntryKind::SavedQuery);
            prop_assert_eq!(decoded.name, Some(name));
            prop_assert_eq!(decoded.content, sql);
        }
    }
}
