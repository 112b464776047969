//! End-to-end tests for command dispatch

use clap::Parser;
use notekeep::{Cli, load_config, run};
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn exec(vault: &Path, args: &[&str]) -> anyhow::Result<String> {
    let mut argv = vec!["notekeep", "--vault", vault.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv)?;
    let config = load_config(&cli)?;
    let mut out = Vec::new();
    run(cli, config, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn test_get_and_set() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.md", "---\nstatus: draft\n---\n# A\n");

    let out = exec(temp.path(), &["get", "status", "a.md"]).unwrap();
    assert_eq!(out, "a.md: draft\n");

    let out = exec(
        temp.path(),
        &["set", "tags", "--item", "x", "--item", "y", "a.md"],
    )
    .unwrap();
    assert!(out.contains("changed"));
    assert_eq!(
        std::fs::read_to_string(temp.path().join("a.md")).unwrap(),
        "---\nstatus: draft\ntags:\n  - x\n  - y\n---\n# A\n"
    );
}

#[test]
fn test_strip_whole_vault() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.md", "---\nk: v\n---\nbody\n");
    write(temp.path(), "dir/b.md", "no block\n");

    let out = exec(temp.path(), &["strip"]).unwrap();
    assert!(out.ends_with("2 notes, 1 changed, 0 failed\n"));
    assert_eq!(
        std::fs::read_to_string(temp.path().join("a.md")).unwrap(),
        "body\n"
    );
}

#[test]
fn test_json_skips_notes_without_block() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.md", "---\nb: 1\na:\n  - x\n---\n");
    write(temp.path(), "c.md", "plain\n");

    let out = exec(temp.path(), &["json"]).unwrap();
    assert_eq!(out, "a.md: {\"b\":\"1\",\"a\":[\"x\"]}\n");
}

#[test]
fn test_bad_regex_is_an_error() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.md", "text\n");
    assert!(exec(temp.path(), &["replace", "--regex", "(", "x"]).is_err());
}

#[test]
fn test_missing_vault_is_an_error() {
    assert!(exec(Path::new("/definitely/not/a/vault"), &["keys"]).is_err());
}

#[test]
fn test_json_batch_report() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.md", "---\nat: 2024-05-01 09:30\n---\n");

    let out = exec(temp.path(), &["--json", "truncate-dates"]).unwrap();
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["changed"], 1);
    assert_eq!(report["outcomes"][0]["path"], "a.md");
    assert_eq!(
        std::fs::read_to_string(temp.path().join("a.md")).unwrap(),
        "---\nat: 2024-05-01\n---\n"
    );
}
