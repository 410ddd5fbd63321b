//! Report assembly and export for sharesize.
//!
//! This crate turns an aggregated [`FolderNode`] tree into the two report
//! formats produced by a run:
//!
//! - **Rows** - a flat, pre-order sequence of folders and files
//!   ([`ReportAssembler::flatten`]), written as CSV by [`write_csv`]
//! - **Tree** - the nested folder tree, written as JSON by [`write_json`]
//!
//! Both sinks write to a temporary file next to the target and rename it
//! into place, so a failed export never leaves a partial file behind.
//!
//! ```rust,ignore
//! use sharesize_report::{ReportAssembler, write_csv, write_json};
//!
//! let rows = ReportAssembler::new().flatten(&tree.root);
//! write_csv(&rows, "folder_sizes.csv")?;
//! write_json(&tree.root, "folder_sizes.json")?;
//! ```

mod atomic;
mod csv_sink;
mod error;
mod format;
mod json_sink;
mod rows;

pub use csv_sink::{CSV_HEADER, write_csv, write_csv_to};
pub use error::ExportError;
pub use format::format_size;
pub use json_sink::{read_json, write_json, write_json_to};
pub use rows::{ReportAssembler, RowRecord};

// Re-export core types
pub use sharesize_core::{EntryKind, FolderNode};
