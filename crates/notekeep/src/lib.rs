//! # notekeep
//!
//! Command-line front matter editing and cleanup for Markdown note vaults.
//!
//! Targets may be note files or directories; directories are searched
//! recursively for notes. With no targets, the whole vault is used.
//! Per-file failures are reported in the output and never change the
//! exit status; only configuration and argument errors do.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use notekeep_batch::{BatchExecutor, BatchOperation, BatchResult, ContactPropagator};
use notekeep_core::prelude::*;
use notekeep_core::to_json_string;
use notekeep_vault::NoteStore;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// notekeep - front matter tools for note vaults
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the note vault directory
    #[arg(short, long, env = "NOTEKEEP_VAULT", global = true)]
    pub vault: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print batch reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value of a key
    Get { key: String, targets: Vec<PathBuf> },

    /// Set a key, adding it if missing
    Set {
        key: String,
        /// Scalar value
        #[arg(long, conflicts_with = "item")]
        value: Option<String>,
        /// List item; repeat for several
        #[arg(long)]
        item: Vec<String>,
        targets: Vec<PathBuf>,
    },

    /// Delete a key
    Delete { key: String, targets: Vec<PathBuf> },

    /// Rename a key, keeping its value and position
    Rename {
        from: String,
        to: String,
        targets: Vec<PathBuf>,
    },

    /// Print the keys of each note
    Keys { targets: Vec<PathBuf> },

    /// Print the metadata of each note as JSON
    Json { targets: Vec<PathBuf> },

    /// Sort entries by key
    Alphabetize { targets: Vec<PathBuf> },

    /// Order entries by value kind
    Group {
        /// Keep the existing order within each kind
        #[arg(long)]
        unsorted: bool,
        targets: Vec<PathBuf>,
    },

    /// Replace every value with the redaction sentinel
    Redact { targets: Vec<PathBuf> },

    /// Remove the front matter block entirely
    Strip { targets: Vec<PathBuf> },

    /// Find and replace over whole notes
    Replace {
        pattern: String,
        replacement: String,
        /// Treat the pattern as a regular expression
        #[arg(long)]
        regex: bool,
        /// Maximum replacements per note (0 = all)
        #[arg(long, default_value_t = 0)]
        count: usize,
        targets: Vec<PathBuf>,
    },

    /// Shorten `YYYY-MM-DD HH:MM` timestamps to dates
    TruncateDates { targets: Vec<PathBuf> },

    /// Copy meeting dates onto the people who attended
    Contacted {
        /// Skip meetings already recorded in the ledger
        #[arg(long)]
        new_only: bool,
        /// Record every meeting in the ledger afterwards
        #[arg(long)]
        record: bool,
    },
}

/// Resolve the configuration from `--config` and `--vault`
pub fn load_config(cli: &Cli) -> anyhow::Result<KeeperConfig> {
    let mut config = match (&cli.config, &cli.vault) {
        (Some(path), vault) => {
            let mut config = KeeperConfig::load(path)?;
            if let Some(vault) = vault {
                config.vault_root = notekeep_core::expand_path(vault)?;
            }
            config.validate()?;
            config
        }
        (None, Some(vault)) => KeeperConfig::builder(vault).build()?,
        (None, None) => bail!("No vault given: pass --vault, set NOTEKEEP_VAULT, or use --config"),
    };

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

/// Expand targets into note paths
fn collect_notes(store: &NoteStore, targets: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    if targets.is_empty() {
        return Ok(store.scan_vault()?);
    }

    let mut notes = Vec::new();
    for target in targets {
        let resolved = store
            .resolve_path(target)
            .with_context(|| format!("Invalid target {}", target.display()))?;
        if resolved.is_dir() {
            notes.extend(store.gather_notes(&resolved)?);
        } else {
            notes.push(resolved);
        }
    }
    Ok(notes)
}

fn print_result(out: &mut impl Write, result: &BatchResult) -> anyhow::Result<()> {
    for error in &result.errors {
        writeln!(out, "error: {}", error)?;
    }
    for outcome in &result.outcomes {
        let status = match (outcome.success, outcome.changed) {
            (false, _) => "failed",
            (true, true) => "changed",
            (true, false) => "unchanged",
        };
        writeln!(out, "{:<9} {}: {}", status, outcome.path, outcome.message)?;
    }
    Ok(())
}

fn batch(
    store: &Arc<NoteStore>,
    targets: &[PathBuf],
    ops: Vec<BatchOperation>,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let files = collect_notes(store, targets)?;
    let result = BatchExecutor::new(Arc::clone(store)).execute(&files, &ops);
    if !result.errors.is_empty() {
        bail!("{}", result.errors.join("; "));
    }
    if json {
        writeln!(out, "{}", to_json_string(&result, "batch result")?)?;
        return Ok(());
    }
    print_result(out, &result)?;
    writeln!(
        out,
        "{} notes, {} changed, {} failed",
        result.total, result.changed, result.failed
    )?;
    Ok(())
}

/// Print one line per note from a read-only query
fn query<F>(
    store: &NoteStore,
    targets: &[PathBuf],
    out: &mut impl Write,
    mut f: F,
) -> anyhow::Result<()>
where
    F: FnMut(&Path) -> notekeep_core::Result<Option<String>>,
{
    for note in collect_notes(store, targets)? {
        let display = store.display_path(&note);
        match f(&note) {
            Ok(Some(line)) => writeln!(out, "{}: {}", display, line)?,
            Ok(None) => {}
            Err(e) => writeln!(out, "failed    {}: {}", display, e)?,
        }
    }
    Ok(())
}

/// Execute a parsed command against a loaded configuration
pub fn run(cli: Cli, config: KeeperConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let store = Arc::new(NoteStore::new(config));
    let json = cli.json;
    log::debug!("Vault: {}", store.vault_path().display());

    match cli.command {
        Command::Get { key, targets } => query(&store, &targets, out, |note| {
            Ok(store.value(note, &key)?.map(|v| v.to_string()))
        }),
        Command::Keys { targets } => query(&store, &targets, out, |note| {
            let metadata = store.metadata(note)?;
            Ok((!metadata.is_empty())
                .then(|| metadata.keys().collect::<Vec<_>>().join(", ")))
        }),
        Command::Json { targets } => query(&store, &targets, out, |note| {
            let doc = store.read_document(note)?;
            Ok(store
                .front_matter()
                .to_json(&doc)
                .map(|json| json.to_string()))
        }),
        Command::Set {
            key,
            value,
            item,
            targets,
        } => {
            let value = match value {
                Some(scalar) => Value::Scalar(scalar),
                None if !item.is_empty() => Value::List(item),
                None => bail!("set needs --value or at least one --item"),
            };
            batch(&store, &targets, vec![BatchOperation::SetValue { key, value }], json, out)
        }
        Command::Delete { key, targets } => {
            batch(&store, &targets, vec![BatchOperation::DeleteKey { key }], json, out)
        }
        Command::Rename { from, to, targets } => {
            batch(&store, &targets, vec![BatchOperation::RenameKey { from, to }], json, out)
        }
        Command::Alphabetize { targets } => {
            batch(&store, &targets, vec![BatchOperation::Alphabetize], json, out)
        }
        Command::Group { unsorted, targets } => batch(
            &store,
            &targets,
            vec![BatchOperation::Group {
                alphabetize: !unsorted,
            }],
            json,
            out,
        ),
        Command::Redact { targets } => batch(&store, &targets, vec![BatchOperation::Redact], json, out),
        Command::Strip { targets } => {
            batch(&store, &targets, vec![BatchOperation::RemoveBlock], json, out)
        }
        Command::Replace {
            pattern,
            replacement,
            regex,
            count,
            targets,
        } => batch(
            &store,
            &targets,
            vec![BatchOperation::Replace {
                pattern,
                replacement,
                regex,
                count,
            }],
            json,
            out,
        ),
        Command::TruncateDates { targets } => {
            batch(&store, &targets, vec![BatchOperation::TruncateTimedDates], json, out)
        }
        Command::Contacted { new_only, record } => {
            let propagator = ContactPropagator::new(Arc::clone(&store));
            let results = if new_only {
                propagator.propagate_new()?
            } else {
                propagator.propagate_all()?
            };

            for (meeting, result) in &results {
                if json {
                    writeln!(out, "{}", to_json_string(result, "contacted result")?)?;
                    continue;
                }
                writeln!(out, "{}", store.display_path(meeting))?;
                print_result(out, result)?;
            }
            writeln!(out, "{} meetings processed", results.len())?;

            if record {
                let recorded = propagator.record_ledger()?;
                writeln!(out, "{} meetings recorded in the ledger", recorded)?;
            }
            Ok(())
        }
    }
}
