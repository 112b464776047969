//! # Note Store
//!
//! File access for the note vault, plus path-level wrappers around the
//! front matter engine.
//!
//! Every front matter operation performs one full read, an in-memory edit,
//! and at most one full rewrite. Writes go to a sibling temp file that is
//! renamed over the original, so a failure before the rename leaves the
//! note untouched.
//!
//! ## Quick Start
//!
//! ```no_run
//! use notekeep_vault::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let config = KeeperConfig::builder("~/Notes").build()?;
//!     let store = NoteStore::new(config);
//!
//!     for note in store.gather_notes(Path::new("People"))? {
//!         store.rename_key(&note, "title", "link")?;
//!     }
//!
//!     let status = store.value(Path::new("Projects/plan.md"), "status")?;
//!     println!("{:?}", status);
//!     Ok(())
//! }
//! ```

pub mod manager;

pub use manager::NoteStore;
pub use notekeep_core::prelude::*;

pub mod prelude {
    pub use crate::manager::*;
    pub use notekeep_core::prelude::*;
}
