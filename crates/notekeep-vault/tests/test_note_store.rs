//! Integration tests for NoteStore front matter operations

use notekeep_vault::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const MEETING: &str = "---\ntitle: Sync\nattendees:\n  - \"[[alice]]\"\n  - \"[[bob]]\"\ntranspired: 2025-03-04\n---\n# Notes\n\ntitle: this line is body text\n";

fn setup_store() -> (TempDir, NoteStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(temp_dir.path().join("meeting.md"), MEETING).unwrap();
    std::fs::write(temp_dir.path().join("plain.md"), "# No metadata\n").unwrap();

    let config = KeeperConfig::builder(temp_dir.path()).build().unwrap();
    (temp_dir, NoteStore::new(config))
}

#[test]
fn test_value_reads_list() {
    let (_temp_dir, store) = setup_store();
    let value = store.value(Path::new("meeting.md"), "attendees").unwrap();
    assert_eq!(
        value,
        Some(Value::list(["\"[[alice]]\"", "\"[[bob]]\""]))
    );
}

#[test]
fn test_value_absent_is_not_error() {
    let (_temp_dir, store) = setup_store();
    assert_eq!(store.value(Path::new("plain.md"), "title").unwrap(), None);
    assert_eq!(store.value(Path::new("meeting.md"), "nope").unwrap(), None);
}

#[test]
fn test_update_preserves_body() {
    let (temp_dir, store) = setup_store();
    let path = Path::new("meeting.md");
    assert!(store.update_key(path, "title", &Value::scalar("Weekly Sync")).unwrap());

    let text = std::fs::read_to_string(temp_dir.path().join(path)).unwrap();
    assert_eq!(text, MEETING.replacen("title: Sync", "title: Weekly Sync", 1));
}

#[test]
fn test_rename_on_plain_note_leaves_file() {
    let (temp_dir, store) = setup_store();
    let path = Path::new("plain.md");
    assert!(!store.rename_key(path, "title", "link").unwrap());
    assert!(!store.delete_key(path, "title").unwrap());
    assert!(!store.redact(path).unwrap());
    let text = std::fs::read_to_string(temp_dir.path().join(path)).unwrap();
    assert_eq!(text, "# No metadata\n");
}

#[test]
fn test_group_then_metadata() {
    let (_temp_dir, store) = setup_store();
    let path = Path::new("meeting.md");
    assert!(store.group(path, true).unwrap());

    let meta = store.metadata(path).unwrap();
    assert_eq!(
        meta.keys().collect::<Vec<_>>(),
        vec!["attendees", "transpired", "title"]
    );
}

#[test]
fn test_remove_block() {
    let (temp_dir, store) = setup_store();
    let path = Path::new("meeting.md");
    assert!(store.has_front_matter(path).unwrap());
    assert!(store.remove_block(path).unwrap());
    assert!(!store.has_front_matter(path).unwrap());

    let text = std::fs::read_to_string(temp_dir.path().join(path)).unwrap();
    assert!(text.starts_with("# Notes\n"));
}

#[test]
fn test_missing_note_is_io_error() {
    let (_temp_dir, store) = setup_store();
    let result = store.update_key(Path::new("ghost.md"), "a", &Value::scalar("1"));
    assert!(matches!(result, Err(Error::FileNotFound { .. })));
}
