//! Write-then-rename file output.

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::ExportError;

/// Write `path` through a temporary file in the same directory.
///
/// The target only appears once `write` succeeded and the data was flushed.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<(), ExportError>,
{
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;

    {
        let mut writer = BufWriter::new(&mut temp);
        write(&mut writer)?;
        writer.flush().map_err(io_err)?;
    }

    temp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
