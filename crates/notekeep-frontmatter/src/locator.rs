//! Metadata block locator: where the block is, and which lines each key owns.
//!
//! A line begins an entry when it starts at column zero and its first
//! whitespace-delimited token contains `:`; the text before that colon is
//! the key. Every other line (indented `- item` lines, stray text, blanks)
//! continues the current entry. An entry's recorded span ends at its last
//! non-blank line, so blank separator lines never belong to an entry.

use crate::FrontMatter;
use notekeep_core::models::strip_terminator;
use notekeep_core::Document;

/// Line span `start..=end` owned by one key inside the block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySpan {
    pub key: String,
    pub start: usize,
    pub end: usize,
}

impl EntrySpan {
    pub fn is_single_line(&self) -> bool {
        self.start == self.end
    }
}

/// Key named by a line, if the line begins an entry
pub(crate) fn key_token(line: &str) -> Option<&str> {
    let content = strip_terminator(line);
    if content.starts_with(char::is_whitespace) {
        return None;
    }
    let token = content.split_whitespace().next()?;
    let (key, _) = token.split_once(':')?;
    (!key.is_empty()).then_some(key)
}

fn is_blank(line: &str) -> bool {
    strip_terminator(line).trim().is_empty()
}

impl FrontMatter {
    /// Whether `line` is a delimiter line (terminator ignored)
    pub fn is_delimiter(&self, line: &str) -> bool {
        strip_terminator(line) == self.delimiter
    }

    /// True iff the delimiter line occurs exactly twice in the document
    pub fn has_block(&self, doc: &Document) -> bool {
        doc.lines()
            .iter()
            .filter(|line| self.is_delimiter(line))
            .count()
            == 2
    }

    /// Indices of the opening and closing delimiter lines
    pub fn block_bounds(&self, doc: &Document) -> Option<(usize, usize)> {
        let mut delimiters = doc
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| self.is_delimiter(line))
            .map(|(idx, _)| idx);

        let first = delimiters.next()?;
        let second = delimiters.next()?;
        if delimiters.next().is_some() {
            return None;
        }
        Some((first, second))
    }

    /// Every entry in the block, in document order, from a single pass
    pub fn entries(&self, doc: &Document) -> Vec<EntrySpan> {
        let Some((start, end)) = self.block_bounds(doc) else {
            return Vec::new();
        };

        let lines = doc.lines();
        let mut spans = Vec::new();
        let mut current: Option<EntrySpan> = None;

        for (idx, line) in lines.iter().enumerate().take(end).skip(start + 1) {
            if let Some(key) = key_token(line) {
                spans.extend(current.take());
                current = Some(EntrySpan {
                    key: key.to_string(),
                    start: idx,
                    end: idx,
                });
            } else if let Some(span) = current.as_mut()
                && !is_blank(line)
            {
                span.end = idx;
            } else if current.is_none() && !is_blank(line) {
                log::debug!("Line {} in metadata block belongs to no key", idx + 1);
            }
        }

        spans.extend(current);
        spans
    }

    /// Line range of `key`'s entry.
    ///
    /// Scans forward from the opening delimiter and stops at the first line
    /// that begins another entry after the match.
    pub fn key_bounds(&self, doc: &Document, key: &str) -> Option<(usize, usize)> {
        let (start, end) = self.block_bounds(doc)?;
        let lines = doc.lines();
        let mut found: Option<(usize, usize)> = None;

        for (idx, line) in lines.iter().enumerate().take(end).skip(start + 1) {
            match found {
                Some(_) if key_token(line).is_some() => break,
                Some((_, ref mut span_end)) => {
                    if !is_blank(line) {
                        *span_end = idx;
                    }
                }
                None => {
                    if key_token(line) == Some(key) {
                        found = Some((idx, idx));
                    }
                }
            }
        }

        found
    }

    /// Index of the line that opens `key`'s entry
    pub fn key_index(&self, doc: &Document, key: &str) -> Option<usize> {
        self.key_bounds(doc, key).map(|(start, _)| start)
    }

    /// True iff a line strictly inside the block begins with `key:`
    pub fn has_key(&self, doc: &Document, key: &str) -> bool {
        self.key_index(doc, key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fm() -> FrontMatter {
        FrontMatter::default()
    }

    #[test]
    fn test_key_token() {
        assert_eq!(key_token("title: Note\n"), Some("title"));
        assert_eq!(key_token("tags:\n"), Some("tags"));
        assert_eq!(key_token("url:https://example.com"), Some("url"));
        assert_eq!(key_token("  - item\n"), None);
        assert_eq!(key_token("  nested: value\n"), None);
        assert_eq!(key_token("plain text\n"), None);
        assert_eq!(key_token(": orphan\n"), None);
        assert_eq!(key_token("\n"), None);
    }

    #[test]
    fn test_has_block_requires_exactly_two_delimiters() {
        let doc = Document::from_text("---\ntitle: x\n---\nbody\n");
        assert!(fm().has_block(&doc));

        let one = Document::from_text("---\ntitle: x\n");
        assert!(!fm().has_block(&one));

        let three = Document::from_text("---\ntitle: x\n---\nbody\n---\n");
        assert!(!fm().has_block(&three));
        assert_eq!(fm().block_bounds(&three), None);
    }

    #[test]
    fn test_block_bounds() {
        let doc = Document::from_text("intro\n---\na: 1\n---\n");
        assert_eq!(fm().block_bounds(&doc), Some((1, 3)));
    }

    #[test]
    fn test_delimiter_without_terminator() {
        let doc = Document::from_text("---\na: 1\n---");
        assert_eq!(fm().block_bounds(&doc), Some((0, 2)));
    }

    #[test]
    fn test_delimiter_with_crlf() {
        let doc = Document::from_text("---\r\na: 1\r\n---\r\n");
        assert_eq!(fm().block_bounds(&doc), Some((0, 2)));
        assert!(fm().has_key(&doc, "a"));
    }

    #[test]
    fn test_custom_delimiter() {
        let toml = FrontMatter::new("+++");
        let doc = Document::from_text("+++\na: 1\n+++\n");
        assert!(toml.has_block(&doc));
        assert!(!fm().has_block(&doc));
    }

    #[test]
    fn test_prefix_key_does_not_match() {
        let doc = Document::from_text("---\ntags:\n  - a\n---\n");
        assert!(!fm().has_key(&doc, "tag"));
        assert!(fm().has_key(&doc, "tags"));
    }

    #[test]
    fn test_key_in_body_is_ignored() {
        let doc = Document::from_text("---\ntitle: x\n---\nstatus: not metadata\n");
        assert!(!fm().has_key(&doc, "status"));
        assert_eq!(fm().key_bounds(&doc, "status"), None);
    }

    #[test]
    fn test_empty_block_has_no_keys() {
        let doc = Document::from_text("---\n---\nbody\n");
        assert!(fm().has_block(&doc));
        assert!(fm().entries(&doc).is_empty());
        assert!(!fm().has_key(&doc, "title"));
    }

    #[test]
    fn test_key_bounds_scalar_and_list() {
        let doc = Document::from_text(
            "---\ntitle: x\nattendees:\n  - Alice\n  - Bob\nstatus: draft\n---\n",
        );
        assert_eq!(fm().key_bounds(&doc, "title"), Some((1, 1)));
        assert_eq!(fm().key_bounds(&doc, "attendees"), Some((2, 4)));
        assert_eq!(fm().key_bounds(&doc, "status"), Some((5, 5)));
        assert_eq!(fm().key_index(&doc, "status"), Some(5));
    }

    #[test]
    fn test_adjacent_lists_split_at_next_key() {
        let doc = Document::from_text("---\na:\n  - 1\nb:\n  - 2\n  - 3\n---\n");
        assert_eq!(fm().key_bounds(&doc, "a"), Some((1, 2)));
        assert_eq!(fm().key_bounds(&doc, "b"), Some((3, 5)));
    }

    #[test]
    fn test_trailing_blank_lines_excluded() {
        let doc = Document::from_text("---\ntitle: x\n\n---\n");
        assert_eq!(fm().key_bounds(&doc, "title"), Some((1, 1)));
    }

    #[test]
    fn test_entries_match_key_bounds() {
        let doc = Document::from_text(
            "---\ntitle: x\ntags:\n  - a\n\n  - b\ndone: true\n---\nbody: text\n",
        );
        let entries = fm().entries(&doc);
        assert_eq!(entries.len(), 3);
        for entry in &entries {
            assert_eq!(
                fm().key_bounds(&doc, &entry.key),
                Some((entry.start, entry.end))
            );
        }
        assert_eq!(entries[1].start, 2);
        assert_eq!(entries[1].end, 5);
        assert!(entries[2].is_single_line());
    }

    #[test]
    fn test_no_block_means_no_entries() {
        let doc = Document::from_text("just a note\ntitle: x\n");
        assert!(fm().entries(&doc).is_empty());
        assert_eq!(fm().key_bounds(&doc, "title"), None);
    }
}
