//! Error types for the Graph client.

use sharesize_core::{FetchError, RemoteUnavailable};
use thiserror::Error;

/// Failure to obtain an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint could not be reached or its answer not decoded.
    #[error("Token request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The token endpoint refused the credentials.
    #[error("Token request rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The token endpoint answered without an access token.
    #[error("Token response contained no access token")]
    MissingToken,
}

impl From<AuthError> for FetchError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Request(e) => FetchError::transient(e.to_string()),
            AuthError::Rejected { status, .. } if status == 429 || status >= 500 => {
                FetchError::transient(format!("token endpoint returned HTTP {status}"))
            }
            other => FetchError::Unauthorized {
                message: other.to_string(),
            },
        }
    }
}

/// Failure while connecting to a site's document library.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid site URL: {url}")]
    InvalidSiteUrl { url: String },

    #[error("Site {url} could not be resolved: {source}")]
    Site {
        url: String,
        #[source]
        source: RemoteUnavailable,
    },

    #[error("Drives of site {site} could not be listed: {source}")]
    Drives {
        site: String,
        #[source]
        source: RemoteUnavailable,
    },

    #[error("Site {site} has no document library")]
    NoDrive { site: String },
}
