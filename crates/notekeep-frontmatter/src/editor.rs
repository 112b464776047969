//! Metadata editor: read, mutate, and rebuild the front matter block.
//!
//! Every operation works on the caller's full [`Document`]. Lookups that
//! find no block or no key return `None`/`false` and leave the document
//! untouched. Only caller bugs (bad indices, keys or values that would
//! not read back as written) surface as errors.

use crate::locator::EntrySpan;
use crate::FrontMatter;
use notekeep_core::models::strip_terminator;
use notekeep_core::{Document, Error, Metadata, Result, Value};

/// Reject keys that would not be read back as a key line
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(':') || key.contains(char::is_whitespace) {
        return Err(Error::invalid_input(format!("Invalid metadata key: {:?}", key)));
    }
    Ok(())
}

/// Reject values whose rendered lines would not read back as the same value
pub fn validate_value(value: &Value) -> Result<()> {
    let breaks_line = |s: &String| s.contains(['\n', '\r']);
    match value {
        Value::Scalar(s) if breaks_line(s) => Err(Error::invalid_input(format!(
            "Metadata value spans several lines: {:?}",
            s
        ))),
        Value::List(items) if items.is_empty() => Err(Error::invalid_input(
            "List value needs at least one item",
        )),
        Value::List(items) if items.iter().any(breaks_line) => Err(Error::invalid_input(
            "List item spans several lines",
        )),
        _ => Ok(()),
    }
}

/// Value of a list continuation line: `- item` stripped, anything else verbatim
fn list_item(trimmed: &str) -> String {
    if trimmed == "-" {
        return String::new();
    }
    trimmed
        .strip_prefix("- ")
        .map(str::trim_start)
        .unwrap_or(trimmed)
        .to_string()
}

/// Parse the value held by `lines[start..=end]`
fn parse_span(lines: &[String], start: usize, end: usize) -> Value {
    let first = strip_terminator(&lines[start]);
    let inline = first
        .split_once(':')
        .map(|(_, rest)| rest.trim())
        .unwrap_or_default();

    if start == end {
        return Value::scalar(inline);
    }

    let mut items = Vec::new();
    if !inline.is_empty() {
        items.push(inline.to_string());
    }
    for line in &lines[start + 1..=end] {
        let trimmed = strip_terminator(line).trim();
        if !trimmed.is_empty() {
            items.push(list_item(trimmed));
        }
    }
    Value::List(items)
}

/// Lines for one entry, each ending in `ending`
fn render_entry(key: &str, value: &Value, ending: &str) -> Vec<String> {
    match value {
        Value::Scalar(s) if s.is_empty() => vec![format!("{}:{}", key, ending)],
        Value::Scalar(s) => vec![format!("{}: {}{}", key, s, ending)],
        Value::List(items) => std::iter::once(format!("{}:{}", key, ending))
            .chain(items.iter().map(|item| format!("  - {}{}", item, ending)))
            .collect(),
    }
}

impl FrontMatter {
    /// Value of `key`: a scalar for one-line entries, a list otherwise
    pub fn value(&self, doc: &Document, key: &str) -> Option<Value> {
        let (start, end) = self.key_bounds(doc, key)?;
        Some(parse_span(doc.lines(), start, end))
    }

    /// Remove `key`'s entry. False if the block or key is absent.
    pub fn delete_key(&self, doc: &mut Document, key: &str) -> bool {
        match self.key_bounds(doc, key) {
            Some((start, end)) => doc.remove_range(start, end).is_ok(),
            None => false,
        }
    }

    /// Insert a new entry just before the closing delimiter.
    ///
    /// False if there is no block or `key` already exists; use
    /// [`FrontMatter::update_key`] to overwrite. Malformed keys and values
    /// are [`Error::InvalidInput`].
    pub fn add_key(&self, doc: &mut Document, key: &str, value: &Value) -> Result<bool> {
        validate_key(key)?;
        validate_value(value)?;
        let Some((_, close)) = self.block_bounds(doc) else {
            return Ok(false);
        };
        if self.has_key(doc, key) {
            return Ok(false);
        }

        let lines = render_entry(key, value, doc.line_ending());
        doc.insert_lines(close, lines)?;
        Ok(true)
    }

    /// Replace `key`'s entry in place, or add it if missing
    pub fn update_key(&self, doc: &mut Document, key: &str, value: &Value) -> Result<bool> {
        validate_key(key)?;
        validate_value(value)?;
        let Some((start, end)) = self.key_bounds(doc, key) else {
            return self.add_key(doc, key, value);
        };

        let lines = render_entry(key, value, doc.line_ending());
        doc.remove_range(start, end)?;
        doc.insert_lines(start, lines)?;
        Ok(true)
    }

    /// Rewrite the key token of `key`'s first line, keeping its value lines.
    ///
    /// False if `key` is absent or `new_key` is already taken.
    pub fn rename_key(&self, doc: &mut Document, key: &str, new_key: &str) -> Result<bool> {
        validate_key(new_key)?;
        let Some(start) = self.key_index(doc, key) else {
            return Ok(false);
        };
        if key == new_key {
            return Ok(true);
        }
        if self.has_key(doc, new_key) {
            log::debug!("Not renaming {} to existing key {}", key, new_key);
            return Ok(false);
        }

        let renamed = doc
            .line(start)
            .and_then(|line| line.strip_prefix(key))
            .map(|rest| format!("{}{}", new_key, rest));
        match renamed {
            Some(line) => doc.replace_line(start, &line).map(|_| true),
            None => Ok(false),
        }
    }

    /// Full key/value mapping of the block; empty if there is none.
    ///
    /// A repeated key keeps its first entry, matching [`FrontMatter::value`].
    pub fn metadata(&self, doc: &Document) -> Metadata {
        let mut metadata = Metadata::new();
        for EntrySpan { key, start, end } in self.entries(doc) {
            if metadata.contains_key(&key) {
                log::debug!("Ignoring repeated key {} on line {}", key, start + 1);
                continue;
            }
            let value = parse_span(doc.lines(), start, end);
            metadata.insert(key, value);
        }
        metadata
    }

    /// Keys in document order
    pub fn keys(&self, doc: &Document) -> Vec<String> {
        self.metadata(doc).keys().map(str::to_string).collect()
    }

    /// Values in document order
    pub fn values(&self, doc: &Document) -> Vec<Value> {
        self.metadata(doc).into_iter().map(|(_, v)| v).collect()
    }

    /// Metadata as a JSON object, or `None` without a block
    pub fn to_json(&self, doc: &Document) -> Option<serde_json::Value> {
        self.block_bounds(doc)?;
        Some(self.metadata(doc).to_json())
    }

    /// Serialize a mapping to `\n`-terminated lines in iteration order.
    ///
    /// An empty list renders as `key:`, which reads back as an empty scalar.
    pub fn render(&self, metadata: &Metadata, with_delimiters: bool) -> Vec<String> {
        self.render_with_ending(metadata, with_delimiters, "\n")
    }

    fn render_with_ending(
        &self,
        metadata: &Metadata,
        with_delimiters: bool,
        ending: &str,
    ) -> Vec<String> {
        let delimiter = format!("{}{}", self.delimiter, ending);
        let mut lines = Vec::new();
        if with_delimiters {
            lines.push(delimiter.clone());
        }
        for (key, value) in metadata.iter() {
            lines.extend(render_entry(key, value, ending));
        }
        if with_delimiters {
            lines.push(delimiter);
        }
        lines
    }

    /// Swap the whole block, delimiters included, for `metadata`.
    ///
    /// Lines inside the old block that belong to no key are dropped.
    pub fn replace_block(&self, doc: &mut Document, metadata: &Metadata) -> Result<bool> {
        let Some((open, close)) = self.block_bounds(doc) else {
            return Ok(false);
        };

        let mut lines = self.render_with_ending(metadata, true, doc.line_ending());
        let removed = doc.remove_range(open, close)?;
        if removed.last().is_some_and(|l| !l.ends_with('\n'))
            && let Some(last) = lines.last_mut()
        {
            *last = self.delimiter.clone();
        }
        doc.insert_lines(open, lines)?;
        Ok(true)
    }

    /// Sort the block's entries by key
    pub fn alphabetize(&self, doc: &mut Document) -> Result<bool> {
        self.transform(doc, Metadata::alphabetized)
    }

    /// Group entries by value kind, optionally sorting each group by key
    pub fn group(&self, doc: &mut Document, alphabetize: bool) -> Result<bool> {
        self.transform(doc, |meta| meta.grouped(alphabetize))
    }

    /// Replace every value with the redaction sentinel
    pub fn redact(&self, doc: &mut Document) -> Result<bool> {
        let sentinel = self.redaction.clone();
        self.transform(doc, |meta| meta.redacted(&sentinel))
    }

    /// Delete the block entirely, delimiters included
    pub fn remove_block(&self, doc: &mut Document) -> bool {
        match self.block_bounds(doc) {
            Some((open, close)) => doc.remove_range(open, close).is_ok(),
            None => false,
        }
    }

    /// Derive mapping, transform it, write it back as the block
    fn transform<F>(&self, doc: &mut Document, f: F) -> Result<bool>
    where
        F: FnOnce(Metadata) -> Metadata,
    {
        if !self.has_block(doc) {
            return Ok(false);
        }
        let metadata = f(self.metadata(doc));
        self.replace_block(doc, &metadata)
    }
}
