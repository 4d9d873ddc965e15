//! Fatal errors of a roster run.
//!
//! Problems with individual rows never show up here; those are collected as
//! [`crate::Rejection`] values and written to the rejection log.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    /// Input CSV does not exist or cannot be opened.
    #[error("input file not found: {path}")]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from an already opened input failed.
    #[error("failed to read input {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write rejection log {path}: {source}")]
    LogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unsupported output format '{format}' (supported: json)")]
    UnsupportedFormat { format: String },
}

pub type Result<T> = std::result::Result<T, RosterError>;
