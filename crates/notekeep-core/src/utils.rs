//! Shared utilities used across notekeep crates.
//!
//! - JSON serialization with consistent error handling
//! - Path validation against the vault root
//! - Run tracking for batch reports

use crate::{Error, Result};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

/// Generic JSON serialization with consistent error handling
pub fn to_json_string<T: serde::Serialize + ?Sized>(data: &T, context: &str) -> Result<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| Error::other(format!("Failed to serialize {} as JSON: {}", context, e)))
}

/// Path validation helpers
pub struct PathValidator;

impl PathValidator {
    /// Resolve `path` against `vault_root`, rejecting anything that escapes it.
    ///
    /// Absolute paths are accepted when they already point inside the vault.
    pub fn resolve_in_vault(vault_root: &Path, path: &Path) -> Result<PathBuf> {
        let full_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            vault_root.join(path)
        };

        let canonical_vault = vault_root
            .canonicalize()
            .unwrap_or_else(|_| vault_root.to_path_buf());

        if let Ok(canonical_full) = full_path.canonicalize() {
            // A symlink inside the vault can resolve outside it
            if !canonical_full.starts_with(&canonical_vault) {
                return Err(Error::path_traversal(full_path));
            }
            return Ok(full_path);
        }

        // Not on disk yet: compare normalized components instead
        let normalized_vault = normalize(vault_root);
        if !normalize(&full_path).starts_with(&normalized_vault) {
            return Err(Error::path_traversal(full_path));
        }

        // A new file below a symlinked directory lands wherever the link points
        let existing_parent = full_path
            .ancestors()
            .skip(1)
            .filter(|dir| normalize(dir).starts_with(&normalized_vault))
            .find_map(|dir| dir.canonicalize().ok());
        if let Some(parent) = existing_parent
            && !parent.starts_with(&canonical_vault)
        {
            return Err(Error::path_traversal(full_path));
        }

        Ok(full_path)
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Identifies one batch run and times it
pub struct RunTracker {
    run_id: String,
    start_time: Instant,
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Outcome {
        path: String,
        changed: bool,
    }

    #[test]
    fn test_to_json_string() {
        let data = Outcome {
            path: "People/alice.md".to_string(),
            changed: true,
        };
        let json = to_json_string(&data, "outcome").unwrap();
        assert!(json.contains("People/alice.md"));
        assert!(json.contains("true"));
    }

    #[test]
    fn test_path_validator_valid() {
        let vault_root = PathBuf::from("/vault");
        let result = PathValidator::resolve_in_vault(&vault_root, Path::new("notes/file.md"));
        assert_eq!(result.unwrap(), PathBuf::from("/vault/notes/file.md"));
    }

    #[test]
    fn test_path_validator_traversal() {
        let vault_root = PathBuf::from("/vault");
        let result =
            PathValidator::resolve_in_vault(&vault_root, Path::new("../../../etc/passwd"));
        assert!(matches!(result, Err(Error::PathTraversalAttempt { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_path_validator_symlink_escape() {
        let vault = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let secret = outside.path().join("secret.md");
        std::fs::write(&secret, "x").unwrap();

        std::os::unix::fs::symlink(&secret, vault.path().join("link.md")).unwrap();
        let result = PathValidator::resolve_in_vault(vault.path(), Path::new("link.md"));
        assert!(matches!(result, Err(Error::PathTraversalAttempt { .. })));

        std::os::unix::fs::symlink(outside.path(), vault.path().join("elsewhere")).unwrap();
        let result =
            PathValidator::resolve_in_vault(vault.path(), Path::new("elsewhere/new.md"));
        assert!(matches!(result, Err(Error::PathTraversalAttempt { .. })));

        let inner = vault.path().join("inner.md");
        std::fs::write(&inner, "x").unwrap();
        std::os::unix::fs::symlink(&inner, vault.path().join("alias.md")).unwrap();
        let result = PathValidator::resolve_in_vault(vault.path(), Path::new("alias.md"));
        assert_eq!(result.unwrap(), vault.path().join("alias.md"));
    }

    #[test]
    fn test_path_validator_absolute_inside() {
        let temp = TempDir::new().unwrap();
        let note = temp.path().join("a.md");
        std::fs::write(&note, "x").unwrap();
        let result = PathValidator::resolve_in_vault(temp.path(), &note);
        assert_eq!(result.unwrap(), note);
    }

    #[test]
    fn test_path_validator_absolute_outside() {
        let vault = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let note = other.path().join("b.md");
        std::fs::write(&note, "x").unwrap();
        assert!(PathValidator::resolve_in_vault(vault.path(), &note).is_err());
    }

    #[test]
    fn test_run_tracker() {
        let tracker = RunTracker::new();
        assert!(!tracker.run_id().is_empty());
        assert!(tracker.elapsed_ms() < 1000);
    }
}
