//! Core data models for note documents and their front matter.
//!
//! A [`Document`] is the owned line sequence of one note file, terminators
//! included. A [`Metadata`] is the ordered key/value view of its front
//! matter block, with values modeled as the tagged [`Value`].

use crate::error::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static NUMERIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("numeric pattern is valid"));

static ISO_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is valid"));

/// Strip a trailing `\n` or `\r\n` from a line.
pub fn strip_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// One note file as an ordered sequence of lines.
///
/// Every line keeps its terminator, so joining the lines reproduces the
/// original text byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// Split text into lines, keeping terminators
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line content at `index` without its terminator
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|l| strip_terminator(l))
    }

    /// Rejoin the lines into file text
    pub fn to_text(&self) -> String {
        self.lines.concat()
    }

    /// Terminator used by the document: `\r\n` if the first terminated
    /// line uses it, `\n` otherwise.
    pub fn line_ending(&self) -> &'static str {
        match self.lines.iter().find(|l| l.ends_with('\n')) {
            Some(line) if line.ends_with("\r\n") => "\r\n",
            _ => "\n",
        }
    }

    /// Insert `lines` so the first of them lands at `index`.
    ///
    /// `index == len()` appends. If the current last line lacks a
    /// terminator and lines are appended after it, it gets one.
    pub fn insert_lines(&mut self, index: usize, lines: Vec<String>) -> Result<()> {
        if index > self.lines.len() {
            return Err(Error::invalid_input(format!(
                "Insertion index {} out of range for document of {} lines",
                index,
                self.lines.len()
            )));
        }

        if index == self.lines.len() && !lines.is_empty() {
            let ending = self.line_ending();
            if let Some(last) = self.lines.last_mut()
                && !last.ends_with('\n')
            {
                last.push_str(ending);
            }
        }

        self.lines.splice(index..index, lines);
        Ok(())
    }

    /// Remove lines `start..=end` and return them
    pub fn remove_range(&mut self, start: usize, end: usize) -> Result<Vec<String>> {
        if start > end || end >= self.lines.len() {
            return Err(Error::invalid_input(format!(
                "Line range {}..={} out of range for document of {} lines",
                start,
                end,
                self.lines.len()
            )));
        }
        Ok(self.lines.drain(start..=end).collect())
    }

    /// Replace the content of one line, keeping its terminator
    pub fn replace_line(&mut self, index: usize, content: &str) -> Result<()> {
        let line = self.lines.get_mut(index).ok_or_else(|| {
            Error::invalid_input(format!("Line {} out of range", index))
        })?;
        let terminator = line[strip_terminator(line).len()..].to_string();
        *line = format!("{}{}", content, terminator);
        Ok(())
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            f.write_str(line)?;
        }
        Ok(())
    }
}

/// A front matter value: a single `key: value` line or a `- item` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

impl Value {
    pub fn scalar(value: impl Into<String>) -> Self {
        Value::Scalar(value.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::List(_) => None,
        }
    }

    /// Scalars as-is, lists as a single vector
    pub fn to_items(&self) -> Vec<String> {
        match self {
            Value::Scalar(s) => vec![s.clone()],
            Value::List(items) => items.clone(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        ValueKind::classify(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => f.write_str(s),
            Value::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

/// Grouping category of a value, in the order groups are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    List,
    Boolean,
    Numeric,
    Date,
    Text,
}

impl ValueKind {
    /// Guess the category of a value from its shape and text
    pub fn classify(value: &Value) -> Self {
        let text = match value {
            Value::List(_) => return ValueKind::List,
            Value::Scalar(s) => s.trim(),
        };

        if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
            ValueKind::Boolean
        } else if NUMERIC_PATTERN.is_match(text) {
            ValueKind::Numeric
        } else if ISO_DATE_PATTERN.is_match(text) {
            ValueKind::Date
        } else {
            ValueKind::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::List => "list",
            ValueKind::Boolean => "boolean",
            ValueKind::Numeric => "numeric",
            ValueKind::Date => "date",
            ValueKind::Text => "text",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered key/value view of a front matter block.
///
/// Keys are unique. Iteration follows insertion order; inserting an
/// existing key replaces its value in place. Equality is order-sensitive.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: IndexMap<String, Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove `key`, keeping the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Same entries sorted by key
    pub fn alphabetized(mut self) -> Self {
        self.entries.sort_keys();
        self
    }

    /// Entries partitioned by [`ValueKind`], categories in kind order.
    ///
    /// Within a category, document order is kept unless `alphabetize`.
    pub fn grouped(mut self, alphabetize: bool) -> Self {
        if alphabetize {
            self.entries.sort_keys();
        }
        // stable sort keeps the within-category order from above
        self.entries.sort_by(|_, a, _, b| a.kind().cmp(&b.kind()));
        self
    }

    /// Every value replaced by `sentinel`, keys and order unchanged
    pub fn redacted(mut self, sentinel: &str) -> Self {
        for value in self.entries.values_mut() {
            *value = Value::scalar(sentinel);
        }
        self
    }

    /// JSON object view, order preserved
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl PartialEq for Metadata {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for Metadata {}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Metadata {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
