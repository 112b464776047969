//! # Batch Operations
//!
//! Applies a list of edits to many notes, one file at a time. Each file is
//! read once, every operation is applied in memory, and the file is
//! rewritten once if its text changed. A failure on one file is recorded
//! in that file's [`FileOutcome`] and never stops the remaining files; a
//! failing file is left exactly as it was.

pub mod contacted;
pub mod search;

pub use contacted::{ContactPropagator, sanitize_person_link, sanitize_person_links};
pub use search::Pattern;

use notekeep_core::prelude::*;
use notekeep_core::RunTracker;
use notekeep_frontmatter::{FrontMatter, format_template, validate_key, validate_value};
use notekeep_vault::NoteStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

fn default_true() -> bool {
    true
}

/// Individual edit applied to each note in a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchOperation {
    /// Set a key, adding it if missing
    SetValue { key: String, value: Value },

    DeleteKey { key: String },

    RenameKey { from: String, to: String },

    Alphabetize,

    Group {
        #[serde(default = "default_true")]
        alphabetize: bool,
    },

    Redact,

    RemoveBlock,

    /// Find and replace over the whole note
    Replace {
        pattern: String,
        replacement: String,
        #[serde(default)]
        regex: bool,
        #[serde(default)]
        count: usize,
    },

    /// Replace the first match inside the front matter block
    ReplaceInBlock {
        pattern: String,
        replacement: String,
        #[serde(default)]
        regex: bool,
    },

    /// Replace with a `{key}` template filled from the note's own metadata
    ReplaceFormatted {
        pattern: String,
        template: String,
        #[serde(default)]
        regex: bool,
    },

    /// Remove matches; with `lines`, drop lines the removal leaves blank
    Remove {
        pattern: String,
        #[serde(default)]
        regex: bool,
        #[serde(default)]
        lines: bool,
    },

    /// Append text after trimming trailing whitespace
    Append { text: String },

    /// `YYYY-MM-DD HH:MM` -> `YYYY-MM-DD`
    TruncateTimedDates,
}

impl BatchOperation {
    /// Short description used in outcome messages
    pub fn describe(&self) -> String {
        match self {
            Self::SetValue { key, .. } => format!("set {}", key),
            Self::DeleteKey { key } => format!("delete {}", key),
            Self::RenameKey { from, to } => format!("rename {} -> {}", from, to),
            Self::Alphabetize => "alphabetize".to_string(),
            Self::Group { .. } => "group".to_string(),
            Self::Redact => "redact".to_string(),
            Self::RemoveBlock => "remove block".to_string(),
            Self::Replace { pattern, .. } => format!("replace {:?}", pattern),
            Self::ReplaceInBlock { pattern, .. } => format!("replace {:?} in block", pattern),
            Self::ReplaceFormatted { pattern, .. } => format!("format {:?}", pattern),
            Self::Remove { pattern, .. } => format!("remove {:?}", pattern),
            Self::Append { .. } => "append".to_string(),
            Self::TruncateTimedDates => "truncate dates".to_string(),
        }
    }

    /// Compile patterns once, before any file is touched
    fn compile(&self) -> Result<Option<Pattern>> {
        match self {
            Self::Replace { pattern, regex, .. }
            | Self::ReplaceInBlock { pattern, regex, .. }
            | Self::ReplaceFormatted { pattern, regex, .. }
            | Self::Remove { pattern, regex, .. } => Pattern::new(pattern, *regex).map(Some),
            Self::SetValue { key, value } => {
                validate_key(key)?;
                validate_value(value)?;
                Ok(None)
            }
            Self::DeleteKey { key } => {
                validate_key(key)?;
                Ok(None)
            }
            Self::RenameKey { from, to } => {
                validate_key(from)?;
                validate_key(to)?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Apply to one note's text. Returns whether the operation took effect.
    fn apply(
        &self,
        front_matter: &FrontMatter,
        pattern: Option<&Pattern>,
        text: &mut String,
    ) -> Result<bool> {
        let pattern = || {
            pattern.ok_or_else(|| Error::invalid_input(format!("{} needs a pattern", self.describe())))
        };

        let updated = match self {
            Self::SetValue { key, value } => {
                return edit_document(text, |doc| front_matter.update_key(doc, key, value));
            }
            Self::DeleteKey { key } => {
                return edit_document(text, |doc| Ok(front_matter.delete_key(doc, key)));
            }
            Self::RenameKey { from, to } => {
                return edit_document(text, |doc| front_matter.rename_key(doc, from, to));
            }
            Self::Alphabetize => {
                return edit_document(text, |doc| front_matter.alphabetize(doc));
            }
            Self::Group { alphabetize } => {
                return edit_document(text, |doc| front_matter.group(doc, *alphabetize));
            }
            Self::Redact => return edit_document(text, |doc| front_matter.redact(doc)),
            Self::RemoveBlock => {
                return edit_document(text, |doc| Ok(front_matter.remove_block(doc)));
            }
            Self::Replace {
                replacement, count, ..
            } => pattern()?.replace(text, replacement, *count),
            Self::ReplaceInBlock { replacement, .. } => {
                match search::replace_in_block(front_matter, text, pattern()?, replacement) {
                    Some(updated) => updated,
                    None => return Err(Error::parse_error("Front matter not found")),
                }
            }
            Self::ReplaceFormatted { template, .. } => {
                let pattern = pattern()?;
                if !pattern.contains(text) {
                    return Ok(false);
                }
                let metadata = front_matter.metadata(&Document::from_text(text));
                let replacement = format_template(template, &metadata)?;
                pattern.replace_with(text, 0, |_| replacement.clone())
            }
            Self::Remove { lines: true, .. } => search::remove_in_lines(text, pattern()?),
            Self::Remove { .. } => pattern()?.remove(text, 0),
            Self::Append { text: addition } => search::append_text(text, addition),
            Self::TruncateTimedDates => search::truncate_timed_dates(text),
        };

        let changed = updated != *text;
        *text = updated;
        Ok(changed)
    }
}

/// Run a document-level edit against text, writing the result back
fn edit_document<F>(text: &mut String, edit: F) -> Result<bool>
where
    F: FnOnce(&mut Document) -> Result<bool>,
{
    let mut doc = Document::from_text(text);
    if !edit(&mut doc)? {
        return Ok(false);
    }
    *text = doc.to_text();
    Ok(true)
}

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Vault-relative path
    pub path: String,
    pub success: bool,
    /// Whether the file was rewritten
    pub changed: bool,
    pub message: String,
}

/// Result of one file's processing, before it becomes a [`FileOutcome`]
#[derive(Debug, Clone)]
pub struct FileChange {
    pub changed: bool,
    pub message: String,
}

/// Result of batch execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Whether every file succeeded
    pub success: bool,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Files rewritten
    pub changed: usize,
    /// Errors that prevented the batch from starting
    pub errors: Vec<String>,
    pub outcomes: Vec<FileOutcome>,
    /// Unique run ID
    pub run_id: String,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl BatchResult {
    pub fn from_outcomes(tracker: &RunTracker, outcomes: Vec<FileOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        Self {
            success: succeeded == outcomes.len(),
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            changed: outcomes.iter().filter(|o| o.changed).count(),
            errors: vec![],
            outcomes,
            run_id: tracker.run_id().to_string(),
            duration_ms: tracker.elapsed_ms(),
        }
    }

    fn rejected(tracker: &RunTracker, total: usize, error: Error) -> Self {
        Self {
            success: false,
            total,
            succeeded: 0,
            failed: 0,
            changed: 0,
            errors: vec![error.to_string()],
            outcomes: vec![],
            run_id: tracker.run_id().to_string(),
            duration_ms: tracker.elapsed_ms(),
        }
    }

    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}

/// Whether a note contains a pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sequential per-file batch executor
pub struct BatchExecutor {
    store: Arc<NoteStore>,
}

impl BatchExecutor {
    /// Create a new batch executor
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Validate batch operations before execution
    pub fn validate(&self, ops: &[BatchOperation]) -> Result<Vec<Option<Pattern>>> {
        if ops.is_empty() {
            return Err(Error::invalid_input("Batch cannot be empty"));
        }
        ops.iter().map(BatchOperation::compile).collect()
    }

    /// Apply `ops` to every file, in order, one file at a time
    #[instrument(skip_all, fields(files = files.len(), ops = ops.len()), name = "batch_execute")]
    pub fn execute(&self, files: &[PathBuf], ops: &[BatchOperation]) -> BatchResult {
        let tracker = RunTracker::new();

        let patterns = match self.validate(ops) {
            Ok(patterns) => patterns,
            Err(e) => {
                log::warn!("Batch rejected before touching files: {}", e);
                return BatchResult::rejected(&tracker, files.len(), e);
            }
        };

        let front_matter = self.store.front_matter();
        let summary = ops
            .iter()
            .map(BatchOperation::describe)
            .collect::<Vec<_>>()
            .join(", ");

        self.run_each_tracked(tracker, files, |path| {
            let original = self.store.read_text(path)?;
            let mut text = original.clone();
            let mut applied = 0;

            for (op, pattern) in ops.iter().zip(&patterns) {
                if op.apply(front_matter, pattern.as_ref(), &mut text)? {
                    applied += 1;
                }
            }

            if text == original {
                return Ok(FileChange {
                    changed: false,
                    message: format!("No changes ({})", summary),
                });
            }

            self.store.write_text(path, &text)?;
            Ok(FileChange {
                changed: true,
                message: format!("Applied {}/{} operations ({})", applied, ops.len(), summary),
            })
        })
    }

    /// Run `f` for every file, collecting one outcome per file
    pub fn run_each<F>(&self, files: &[PathBuf], f: F) -> BatchResult
    where
        F: FnMut(&Path) -> Result<FileChange>,
    {
        self.run_each_tracked(RunTracker::new(), files, f)
    }

    fn run_each_tracked<F>(&self, tracker: RunTracker, files: &[PathBuf], mut f: F) -> BatchResult
    where
        F: FnMut(&Path) -> Result<FileChange>,
    {
        let outcomes = files
            .iter()
            .map(|path| {
                let display = self.store.display_path(path);
                match f(path) {
                    Ok(change) => FileOutcome {
                        path: display,
                        success: true,
                        changed: change.changed,
                        message: change.message,
                    },
                    Err(e) => {
                        log::warn!("Failed on {}: {}", display, e);
                        FileOutcome {
                            path: display,
                            success: false,
                            changed: false,
                            message: e.to_string(),
                        }
                    }
                }
            })
            .collect();

        let result = BatchResult::from_outcomes(&tracker, outcomes);
        log::info!(
            "Batch {} finished: {}/{} succeeded, {} changed in {}ms",
            result.run_id,
            result.succeeded,
            result.total,
            result.changed,
            result.duration_ms
        );
        result
    }

    /// Report which files contain `pattern`
    pub fn search(&self, files: &[PathBuf], pattern: &Pattern) -> Vec<SearchHit> {
        files
            .iter()
            .map(|path| {
                let display = self.store.display_path(path);
                match self.store.read_text(path) {
                    Ok(text) => SearchHit {
                        path: display,
                        found: pattern.contains(&text),
                        error: None,
                    },
                    Err(e) => SearchHit {
                        path: display,
                        found: false,
                        error: Some(e.to_string()),
                    },
                }
            })
            .collect()
    }
}
