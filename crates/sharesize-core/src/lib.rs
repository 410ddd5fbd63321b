//! Core types for sharesize.
//!
//! This crate provides the data structures shared by the traversal engine,
//! the remote client and the report sinks: remote entries, aggregated folder
//! nodes, the completed tree, configuration and error types.

mod config;
mod entry;
mod error;
mod node;
mod tree;

pub use config::{TraversalConfig, TraversalConfigBuilder};
pub use entry::{Entry, EntryKind, FORMS_LIBRARY, SYSTEM_PREFIX, is_system_name};
pub use error::{FetchError, RemoteUnavailable, TraversalError, TraversalWarning, WarningKind};
pub use node::FolderNode;
pub use tree::{FolderTree, TopFileRecord};
