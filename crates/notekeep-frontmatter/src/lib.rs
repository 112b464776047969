//! # notekeep front matter engine
//!
//! Locates and edits the delimited key/value block at the top of a note,
//! working line by line rather than through a YAML parser, so everything
//! outside the edited entry stays byte-for-byte intact.
//!
//! ## Format
//!
//! ```text
//! ---
//! title: My Note
//! attendees:
//!   - Alice
//!   - Bob
//! ---
//! Body text
//! ```
//!
//! The block exists only when the delimiter line appears exactly twice in
//! the document. Scalars are `key: value`; lists are `key:` followed by
//! `  - item` lines.
//!
//! ## Quick Start
//!
//! ```
//! use notekeep_core::{Document, Value};
//! use notekeep_frontmatter::FrontMatter;
//!
//! let fm = FrontMatter::default();
//! let mut doc = Document::from_text("---\nstatus: draft\n---\n# Note\n");
//!
//! assert_eq!(fm.value(&doc, "status"), Some(Value::scalar("draft")));
//! fm.update_key(&mut doc, "status", &Value::scalar("final")).unwrap();
//! fm.add_key(&mut doc, "tags", &Value::list(["work"])).unwrap();
//!
//! assert_eq!(
//!     doc.to_text(),
//!     "---\nstatus: final\ntags:\n  - work\n---\n# Note\n"
//! );
//! ```
//!
//! ## Modules
//!
//! - [`locator`] - block bounds and per-key line spans
//! - [`editor`] - value reads, key edits, block rebuilds
//! - [`format`] - `{key}` templates filled from a note's metadata

pub mod editor;
pub mod format;
pub mod locator;

pub use editor::{validate_key, validate_value};
pub use format::format_template;
pub use locator::EntrySpan;

use notekeep_core::config::{DEFAULT_DELIMITER, DEFAULT_REDACTION};
use notekeep_core::KeeperConfig;

/// Front matter locator and editor.
///
/// Holds only its delimiter and redaction sentinel; every call re-reads
/// the document it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    delimiter: String,
    redaction: String,
}

impl FrontMatter {
    /// Engine using `delimiter` as the block marker line
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            redaction: DEFAULT_REDACTION.to_string(),
        }
    }

    pub fn from_config(config: &KeeperConfig) -> Self {
        Self {
            delimiter: config.delimiter.clone(),
            redaction: config.redaction.clone(),
        }
    }

    /// Use `sentinel` for redacted values
    pub fn with_redaction(mut self, sentinel: impl Into<String>) -> Self {
        self.redaction = sentinel.into();
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn redaction(&self) -> &str {
        &self.redaction
    }
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}
