//! Microsoft Graph access for sharesize.
//!
//! [`GraphClient`] lists a SharePoint document library page by page and
//! implements [`PageFetcher`](sharesize_scan::PageFetcher), so it plugs
//! straight into the traversal engine:
//!
//! ```rust,ignore
//! use sharesize_graph::{GraphClient, GraphConfig, normalize_folder_path};
//! use sharesize_scan::{RetryPolicy, TraversalConfig, TraversalEngine};
//!
//! let client = GraphClient::connect(&graph_config, &RetryPolicy::default()).await?;
//! let root = normalize_folder_path("/sites/Team/Shared Documents/Projects");
//! let tree = TraversalEngine::new(client, TraversalConfig::new(root)).run().await?;
//! ```

mod auth;
mod client;
mod config;
mod error;
pub mod model;
mod path;

pub use auth::{ClientCredentials, StaticToken, TokenSupplier};
pub use client::{GraphClient, parse_retry_after, status_error};
pub use config::{
    DEFAULT_GRAPH_URL, DEFAULT_LOGIN_URL, GRAPH_SCOPE, GraphConfig, GraphConfigBuilder,
};
pub use error::{AuthError, GraphError};
pub use path::{DEFAULT_LIBRARIES, encode_path, join_path, normalize_folder_path, split_site_url};
