// GitHub Releases lookup for the package repository

use crate::constants::GITHUB_ACCEPT;
use crate::error::FetchError;
use crate::http;
use crate::version::normalize_version;
use log::{debug, error};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// The subset of a "latest release" response the checker uses.
///
/// Every field is optional; an absent field decodes to `None` rather than
/// failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseData {
    pub tag_name: Option<String>,
    pub html_url: Option<String>,
    pub zipball_url: Option<String>,
    pub published_at: Option<String>,
    pub name: Option<String>,
    pub body: Option<String>,
}

impl ReleaseData {
    /// Tag with any leading `v` removed; `None` for a missing or blank tag
    pub fn version(&self) -> Option<&str> {
        self.tag_name
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(normalize_version)
    }

    pub fn has_body(&self) -> bool {
        self.body.as_deref().is_some_and(|b| !b.trim().is_empty())
    }
}

/// Value stored under the checker's cache key.
///
/// A failed lookup is cached as well so an outage costs one request per TTL
/// window, but it stays distinguishable from a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CachedRelease {
    Available(ReleaseData),
    FetchFailed { reason: String },
}

impl CachedRelease {
    pub fn release(&self) -> Option<&ReleaseData> {
        match self {
            CachedRelease::Available(release) => Some(release),
            CachedRelease::FetchFailed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CachedRelease::FetchFailed { .. })
    }
}

impl From<Result<ReleaseData, FetchError>> for CachedRelease {
    fn from(result: Result<ReleaseData, FetchError>) -> Self {
        match result {
            Ok(release) => CachedRelease::Available(release),
            Err(e) => CachedRelease::FetchFailed {
                reason: e.to_string(),
            },
        }
    }
}

/// Where the latest release of the package comes from
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the latest published release
    async fn fetch_latest(&self) -> Result<ReleaseData, FetchError>;

    /// Endpoint this source queries, used for diagnostics
    fn api_url(&self) -> &str;
}

/// Latest-release lookup against the GitHub REST API
pub struct GitHubReleaseSource {
    client: Client,
    api_url: String,
}

impl GitHubReleaseSource {
    pub fn new(
        api_url: impl Into<String>,
        host_version: &str,
        host_url: &str,
    ) -> anyhow::Result<Self> {
        let user_agent = http::host_user_agent(host_version, host_url);
        Ok(Self {
            client: http::build_client(&user_agent)?,
            api_url: api_url.into(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn request(&self) -> Result<ReleaseData, FetchError> {
        let response = self
            .client
            .get(&self.api_url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }

        serde_json::from_str(&body).map_err(|e| FetchError::InvalidJson(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubReleaseSource {
    async fn fetch_latest(&self) -> Result<ReleaseData, FetchError> {
        debug!("Fetching latest release from {}", self.api_url);
        let result = self.request().await;
        if let Err(e) = &result {
            error!("GitHub updater error: {}", e);
        }
        result
    }

    fn api_url(&self) -> &str {
        &self.api_url
    }
}
