//! # notekeep core
//!
//! Core data models, error types, and configuration for the note vault
//! toolkit. This crate defines the canonical types that all other crates
//! depend on.
//!
//! ## Core Modules
//!
//! - [`models`] - [`Document`] lines, front matter [`Value`]s and [`Metadata`]
//! - [`error`] - Error type and Result alias
//! - [`config`] - Toolkit configuration with builder and YAML persistence
//! - [`utils`] - Path validation, JSON helpers, run tracking
//!
//! ## Usage Examples
//!
//! ```
//! use notekeep_core::prelude::*;
//!
//! let doc = Document::from_text("---\ntitle: Note\n---\nBody\n");
//! assert_eq!(doc.line(1), Some("title: Note"));
//!
//! let mut meta = Metadata::new();
//! meta.insert("attendees", Value::list(["Alice", "Bob"]));
//! assert_eq!(meta.get("attendees").unwrap().kind(), ValueKind::List);
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use config::*;
pub use error::{Error, Result};
pub use models::*;
pub use utils::{PathValidator, RunTracker, to_json_string};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ContactConfig, KeeperConfig};
    pub use crate::error::{Error, Result};
    pub use crate::models::{Document, Metadata, Value, ValueKind};
    pub use crate::utils::PathValidator;
}
