//! Export error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure writing one report file.
///
/// Each sink fails independently; the caller decides whether to continue
/// with the others.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Creating, writing or renaming the output file failed.
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding failed.
    #[error("CSV export to {path} failed: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON export to {path} failed: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ExportError {
    /// Path of the report file involved.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ExportError::Io { path, .. }
            | ExportError::Csv { path, .. }
            | ExportError::Json { path, .. } => path,
        }
    }
}
