use std::path::PathBuf;

use thiserror::Error;

use crate::script::OpKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: unmatched [")]
    UnmatchedGroup,

    #[error("Variable input cancelled.")]
    SubstitutionCancelled,

    #[error("{kind} {path} failed (operation {index}): {source}")]
    Apply {
        index: usize,
        kind: OpKind,
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("No saved script \"{0}\"")]
    UnknownScript(String),

    #[error("Use: name @ script")]
    InvalidSaveSyntax,

    #[error("Missing name or script.")]
    MissingNameOrScript,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Script store {path} is corrupted: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// Cancellation is reported as a notice, not as a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::SubstitutionCancelled)
    }
}
