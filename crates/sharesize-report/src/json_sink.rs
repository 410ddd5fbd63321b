//! JSON export of the folder tree.

use std::io::Write;
use std::path::Path;

use sharesize_core::FolderNode;
use tracing::info;

use crate::atomic::write_atomically;
use crate::error::ExportError;

/// Write `root` as pretty-printed JSON to any writer.
pub fn write_json_to<W: Write>(writer: W, root: &FolderNode) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(writer, root)
}

/// Write `root` as a JSON file at `path`.
pub fn write_json(root: &FolderNode, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    write_atomically(path, |file| {
        write_json_to(file, root).map_err(|source| ExportError::Json {
            path: path.to_path_buf(),
            source,
        })
    })?;

    info!(path = %path.display(), "JSON report written");
    Ok(())
}

/// Read a tree previously written by [`write_json`].
pub fn read_json(path: impl AsRef<Path>) -> Result<FolderNode, ExportError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })
}
