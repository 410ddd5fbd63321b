//! CSV export of report rows.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::atomic::write_atomically;
use crate::error::ExportError;
use crate::format::format_size;
use crate::rows::RowRecord;

/// Column headers, in output order.
pub const CSV_HEADER: [&str; 7] = [
    "Path",
    "Name",
    "Type",
    "Size (bytes)",
    "Size (formatted)",
    "File Count",
    "Folder Count",
];

/// Write `rows` as CSV to any writer.
pub fn write_csv_to<W: Write>(writer: W, rows: &[RowRecord]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADER)?;

    for row in rows {
        let kind = row.kind.to_string();
        let size = row.size.to_string();
        let formatted = format_size(row.size);
        let file_count = row.file_count.to_string();
        let folder_count = row.folder_count.to_string();
        out.write_record([
            row.path.as_str(),
            row.name.as_str(),
            kind.as_str(),
            size.as_str(),
            formatted.as_str(),
            file_count.as_str(),
            folder_count.as_str(),
        ])?;
    }

    out.flush()?;
    Ok(())
}

/// Write `rows` as a CSV file at `path`.
pub fn write_csv(rows: &[RowRecord], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    write_atomically(path, |file| {
        write_csv_to(file, rows).map_err(|source| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        })
    })?;

    info!(path = %path.display(), rows = rows.len(), "CSV report written");
    Ok(())
}
