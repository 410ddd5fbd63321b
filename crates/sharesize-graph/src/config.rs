//! Connection settings for the Graph API.

use std::fmt;
use std::time::Duration;

use derive_builder::Builder;

/// Graph API root used unless overridden.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";

/// Identity platform root used unless overridden.
pub const DEFAULT_LOGIN_URL: &str = "https://login.microsoftonline.com";

/// Scope requested for app-only access.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Credentials and endpoints for one site.
#[derive(Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct GraphConfig {
    /// Directory (tenant) id.
    pub tenant_id: String,

    /// Application (client) id.
    pub client_id: String,

    /// Application secret.
    pub client_secret: String,

    /// Site URL, e.g. `https://contoso.sharepoint.com/sites/Team`.
    pub site_url: String,

    /// Timeout for a single HTTP request.
    #[builder(default = "Duration::from_secs(30)")]
    pub timeout: Duration,

    /// Items requested per listing page (`$top`).
    #[builder(default = "200")]
    pub page_size: u32,

    #[builder(default = "DEFAULT_GRAPH_URL.to_string()")]
    pub graph_url: String,

    #[builder(default = "DEFAULT_LOGIN_URL.to_string()")]
    pub login_url: String,
}

impl GraphConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let required = [
            ("tenant id", &self.tenant_id),
            ("client id", &self.client_id),
            ("client secret", &self.client_secret),
            ("site URL", &self.site_url),
        ];
        for (label, value) in required {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                return Err(format!("Missing {label}"));
            }
        }
        if self.page_size == Some(0) {
            return Err("Page size must be at least 1".to_string());
        }
        Ok(())
    }
}

impl GraphConfig {
    /// Create a new config builder.
    pub fn builder() -> GraphConfigBuilder {
        GraphConfigBuilder::default()
    }

    /// Token endpoint of the configured tenant.
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_url.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("site_url", &self.site_url)
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .field("graph_url", &self.graph_url)
            .field("login_url", &self.login_url)
            .finish()
    }
}
