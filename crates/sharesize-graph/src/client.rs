//! Document library client implementing [`PageFetcher`].

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use sharesize_core::FetchError;
use sharesize_scan::{Page, PageFetcher, RetryPolicy};
use tracing::{info, trace};

use crate::auth::{ClientCredentials, TokenSupplier};
use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::model::{Collection, Drive, DriveItem, Site, pick_drive};
use crate::path::{encode_path, split_site_url};

/// Lists folders of one site's document library.
pub struct GraphClient<T = ClientCredentials> {
    http: reqwest::Client,
    tokens: T,
    graph_url: String,
    site_name: String,
    drive: Drive,
    page_size: u32,
}

impl GraphClient<ClientCredentials> {
    /// Authenticate with client credentials and resolve the configured
    /// site's document library.
    pub async fn connect(config: &GraphConfig, policy: &RetryPolicy) -> Result<Self, GraphError> {
        let http = build_http_client(config)?;
        let tokens = ClientCredentials::new(http.clone(), config);

        // Bad credentials are reported as such, not as an unreachable site.
        tokens.access_token().await?;
        info!("Authenticated");

        Self::with_tokens(http, tokens, config, policy).await
    }
}

impl<T: TokenSupplier> GraphClient<T> {
    /// Resolve the configured site's document library using `tokens`.
    pub async fn with_tokens(
        http: reqwest::Client,
        tokens: T,
        config: &GraphConfig,
        policy: &RetryPolicy,
    ) -> Result<Self, GraphError> {
        let (host, site_path) =
            split_site_url(&config.site_url).ok_or_else(|| GraphError::InvalidSiteUrl {
                url: config.site_url.clone(),
            })?;
        let graph_url = config.graph_url.trim_end_matches('/').to_string();

        let site_endpoint = if site_path.is_empty() {
            format!("{graph_url}/sites/{host}")
        } else {
            format!("{graph_url}/sites/{host}:/{site_path}")
        };
        let site: Site = policy
            .run(|| get_json(&http, &tokens, &site_endpoint, site_path))
            .await
            .map_err(|source| GraphError::Site {
                url: config.site_url.clone(),
                source,
            })?;
        let site_name = site.display_name.clone().unwrap_or_else(|| site.id.clone());
        info!(site = %site_name, "Connected to site");

        let drives_endpoint = format!("{graph_url}/sites/{}/drives", site.id);
        let drives: Collection<Drive> = policy
            .run(|| get_json(&http, &tokens, &drives_endpoint, site_path))
            .await
            .map_err(|source| GraphError::Drives {
                site: site_name.clone(),
                source,
            })?;
        let drive = pick_drive(&drives.value)
            .cloned()
            .ok_or_else(|| GraphError::NoDrive {
                site: site_name.clone(),
            })?;
        info!(drive = %drive.name, "Using document library");

        Ok(Self {
            http,
            tokens,
            graph_url,
            site_name,
            drive,
            page_size: config.page_size,
        })
    }

    /// Display name of the connected site.
    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Name of the document library being listed.
    pub fn drive_name(&self) -> &str {
        &self.drive.name
    }

    fn children_url(&self, path: &str) -> String {
        if path.is_empty() {
            format!(
                "{}/drives/{}/root/children?$top={}",
                self.graph_url, self.drive.id, self.page_size
            )
        } else {
            format!(
                "{}/drives/{}/root:/{}:/children?$top={}",
                self.graph_url,
                self.drive.id,
                encode_path(path),
                self.page_size
            )
        }
    }
}

impl<T: TokenSupplier> PageFetcher for GraphClient<T> {
    async fn list_children(&self, path: &str, page_token: Option<&str>) -> Result<Page, FetchError> {
        // The page token is the server's next link, used verbatim.
        let url = match page_token {
            Some(next) => next.to_string(),
            None => self.children_url(path),
        };
        trace!(path, url = %url, "Fetching page");

        let page: Collection<DriveItem> = get_json(&self.http, &self.tokens, &url, path).await?;
        let entries = page
            .value
            .into_iter()
            .filter_map(|item| item.into_entry(path))
            .collect();

        Ok(Page::new(entries, page.next_link))
    }
}

fn build_http_client(config: &GraphConfig) -> Result<reqwest::Client, GraphError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!("sharesize/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(GraphError::Client)
}

async fn get_json<T, R>(
    http: &reqwest::Client,
    tokens: &T,
    url: &str,
    path: &str,
) -> Result<R, FetchError>
where
    T: TokenSupplier,
    R: DeserializeOwned,
{
    let token = tokens.access_token().await?;
    let response = http
        .get(url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(
            status,
            parse_retry_after(response.headers()),
            path,
        ));
    }

    response.json::<R>().await.map_err(request_error)
}

/// Map a non-success HTTP status to a fetch error.
pub fn status_error(status: StatusCode, retry_after: Option<Duration>, path: &str) -> FetchError {
    match status.as_u16() {
        429 | 503 => FetchError::Throttled { retry_after },
        401 | 403 => FetchError::Unauthorized {
            message: format!("HTTP {status}"),
        },
        404 => FetchError::NotFound { path: path.into() },
        500..=599 => FetchError::transient(format!("HTTP {status}")),
        _ => FetchError::Malformed {
            message: format!("unexpected HTTP {status}"),
        },
    }
}

fn request_error(err: reqwest::Error) -> FetchError {
    if err.is_decode() {
        FetchError::Malformed {
            message: err.to_string(),
        }
    } else {
        FetchError::transient(err.to_string())
    }
}

/// Read a `Retry-After` header given in seconds.
///
/// The HTTP-date form is not used by the Graph API and is ignored.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
