//! Page grouping and the auto page-break policy.

use sqlbook_types::{Entry, Page};

/// Entries per page before a new query starts a fresh page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Group entries into pages separated by page-break entries.
///
/// Page breaks are consumed. The result always holds at least one page, and
/// a trailing page break yields a trailing empty page.
pub fn paginate(entries: &[Entry]) -> Vec<Page> {
    let mut pages = vec![Page::new(0)];
    for entry in entries {
        if entry.is_page_break() {
            pages.push(Page::new(pages.len()));
        } else if let Some(current) = pages.last_mut() {
            current.entries.push(entry.clone());
        }
    }
    pages
}

/// Number of entries after the last page break (or in total, if none).
pub fn tail_len(entries: &[Entry]) -> usize {
    entries
        .iter()
        .rev()
        .take_while(|e| !e.is_page_break())
        .count()
}

/// Whether the next query should open a new page.
pub fn should_paginate(tail_len: usize, page_size: usize) -> bool {
    page_size > 0 && tail_len >= page_size
}
