//! Describe a directory/file tree with a compact shorthand and materialize it on a storage
//! backend.
//!
//! ### Overview
//!
//! ```text
//! /src/ < index.html & [ /css/ < style.css ] ; /docs/readme.md
//! ```
//!
//! `batch-kit` compiles such text into an ordered list of `mkdir`/`write` operations
//! ([`compile`]) and applies that list to an [`FsBackend`] ([`apply()`]).
//!
//! **Key ideas**:
//! - **Pure compiler**: tokenizing and parsing perform no I/O; a parse error means zero mutations.
//! - **Safe re-runs**: `mkdir` is idempotent and `write` never overwrites, so a script can be
//!   applied again without damage.
//! - **Backends**: [`DirFS`] writes below a host directory, [`MapFS`] keeps everything in memory.
//! - **Collaborators**: `${name}` substitution ([`subst`]), per-extension default content
//!   ([`ContentProvider`]), saved scripts ([`store`]).
//!
//! Grammar:
//!
//! ```text
//! script    := chainItem (connector? chainItem | ';')*
//! chainItem := PATH | FILE | '[' script ']'
//! connector := '<' | '&'
//! ```

mod core;
mod vfs;

pub mod apply;
pub mod config;
pub mod content;
pub mod error;
pub mod runner;
pub mod script;
pub mod store;
pub mod subst;

pub use apply::{ApplyReport, apply};
pub use config::Config;
pub use content::ContentProvider;
pub use crate::core::{FsBackend, Result as FsResult, utils};
pub use error::{Error, Result};
pub use runner::{Invocation, parse_save, prepare, run_script};
pub use script::{OpKind, Operation, Token, compile, tokenize};
pub use store::{JsonStore, MemoryStore, ScriptStore};
pub use subst::{Prompter, substitute};
pub use vfs::{DirFS, MapFS};
