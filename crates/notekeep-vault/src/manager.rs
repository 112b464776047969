//! Note store: scoped file access and per-file front matter operations

use notekeep_core::prelude::*;
use notekeep_frontmatter::FrontMatter;
use std::path::{Path, PathBuf};
use tracing::instrument;
use walkdir::{DirEntry, WalkDir};

/// Reads, edits, and rewrites notes under one vault root
pub struct NoteStore {
    config: KeeperConfig,
    front_matter: FrontMatter,
}

impl NoteStore {
    /// Create a new note store
    pub fn new(config: KeeperConfig) -> Self {
        let front_matter = FrontMatter::from_config(&config);
        Self {
            config,
            front_matter,
        }
    }

    pub fn vault_path(&self) -> &Path {
        &self.config.vault_root
    }

    pub fn config(&self) -> &KeeperConfig {
        &self.config
    }

    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    /// Resolve a path against the vault root, rejecting escapes
    pub fn resolve_path(&self, path: &Path) -> Result<PathBuf> {
        PathValidator::resolve_in_vault(&self.config.vault_root, path)
    }

    /// Vault-relative display form of a path, falling back to the full path
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.config.vault_root)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| path.to_string_lossy().to_string())
    }

    /// Read a note's full text
    #[instrument(skip(self), fields(file = ?path), name = "note_read")]
    pub fn read_text(&self, path: &Path) -> Result<String> {
        let full_path = self.resolve_path(path)?;
        std::fs::read_to_string(&full_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::file_not_found(&full_path),
            _ => Error::io(e),
        })
    }

    /// Write a note's full text: temp file first, then rename over the original
    #[instrument(skip(self, content), fields(file = ?path, size = content.len()), name = "note_write")]
    pub fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        let full_path = self.resolve_path(path)?;

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::io)?;
        }

        let temp_path = full_path.with_extension("notekeep.tmp");
        std::fs::write(&temp_path, content).map_err(Error::io)?;
        if let Err(e) = std::fs::rename(&temp_path, &full_path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(Error::io(e));
        }

        log::debug!("Wrote {} bytes to {}", content.len(), full_path.display());
        Ok(())
    }

    pub fn read_document(&self, path: &Path) -> Result<Document> {
        self.read_text(path).map(|text| Document::from_text(&text))
    }

    pub fn write_document(&self, path: &Path, doc: &Document) -> Result<()> {
        self.write_text(path, &doc.to_text())
    }

    /// Read, apply `edit`, and rewrite only if the edit reports a change
    /// and the text actually differs.
    pub fn edit<F>(&self, path: &Path, edit: F) -> Result<bool>
    where
        F: FnOnce(&FrontMatter, &mut Document) -> Result<bool>,
    {
        let original = self.read_text(path)?;
        let mut doc = Document::from_text(&original);

        if !edit(&self.front_matter, &mut doc)? {
            return Ok(false);
        }

        let updated = doc.to_text();
        if updated != original {
            self.write_text(path, &updated)?;
        }
        Ok(true)
    }

    /// All notes under `root` (a vault-relative or absolute directory),
    /// sorted by path, skipping excluded directory names.
    #[instrument(skip(self), name = "note_gather")]
    pub fn gather_notes(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let root = self.resolve_path(root)?;
        if !root.is_dir() {
            return Err(Error::invalid_path(format!(
                "Not a directory: {}",
                root.display()
            )));
        }

        let excluded = &self.config.excluded_paths;
        let extension = self.config.note_extension.as_str();
        let is_excluded = |entry: &DirEntry| {
            entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| excluded.contains(name))
        };

        let mut notes = Vec::new();
        for entry in WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_excluded(e))
        {
            let entry = entry.map_err(|e| Error::other(format!("Failed to walk vault: {}", e)))?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some(extension)
            {
                notes.push(entry.into_path());
            }
        }

        notes.sort();
        log::info!("Found {} notes under {}", notes.len(), root.display());
        Ok(notes)
    }

    /// Every note in the vault
    pub fn scan_vault(&self) -> Result<Vec<PathBuf>> {
        self.gather_notes(Path::new(""))
    }

    pub fn has_front_matter(&self, path: &Path) -> Result<bool> {
        let doc = self.read_document(path)?;
        Ok(self.front_matter.has_block(&doc))
    }

    /// Value of `key` in a note
    pub fn value(&self, path: &Path, key: &str) -> Result<Option<Value>> {
        let doc = self.read_document(path)?;
        Ok(self.front_matter.value(&doc, key))
    }

    /// Full metadata of a note
    pub fn metadata(&self, path: &Path) -> Result<Metadata> {
        let doc = self.read_document(path)?;
        Ok(self.front_matter.metadata(&doc))
    }

    pub fn add_key(&self, path: &Path, key: &str, value: &Value) -> Result<bool> {
        self.edit(path, |fm, doc| fm.add_key(doc, key, value))
    }

    pub fn update_key(&self, path: &Path, key: &str, value: &Value) -> Result<bool> {
        self.edit(path, |fm, doc| fm.update_key(doc, key, value))
    }

    pub fn delete_key(&self, path: &Path, key: &str) -> Result<bool> {
        self.edit(path, |fm, doc| Ok(fm.delete_key(doc, key)))
    }

    pub fn rename_key(&self, path: &Path, key: &str, new_key: &str) -> Result<bool> {
        self.edit(path, |fm, doc| fm.rename_key(doc, key, new_key))
    }

    pub fn alphabetize(&self, path: &Path) -> Result<bool> {
        self.edit(path, |fm, doc| fm.alphabetize(doc))
    }

    pub fn group(&self, path: &Path, alphabetize: bool) -> Result<bool> {
        self.edit(path, |fm, doc| fm.group(doc, alphabetize))
    }

    pub fn redact(&self, path: &Path) -> Result<bool> {
        self.edit(path, |fm, doc| fm.redact(doc))
    }

    pub fn remove_block(&self, path: &Path) -> Result<bool> {
        self.edit(path, |fm, doc| Ok(fm.remove_block(doc)))
    }
}
