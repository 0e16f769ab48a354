//! HTTP client for the remote catalog and download API.
//!
//! This module provides the `ApiClient` struct which builds the shared
//! reqwest client (timeouts, User-Agent, session cookie header), opens download
//! requests and serves catalog lookups.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::constants::SESSION_COOKIE;
use super::error::DownloadError;
use crate::catalog::{Catalog, CatalogError, Release};
use crate::settings::Settings;
use crate::user_agent;

/// Client for the remote service.
///
/// Create once and clone freely; clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use mcat_core::{ApiClient, Catalog, Settings};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(&Settings::default())?;
/// let release = client.release("742779548588").await?;
/// println!("{} ({})", release.title, release.release_type);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

#[derive(Debug, Deserialize)]
struct ReleaseList {
    results: Vec<Release>,
}

impl ApiClient {
    /// Builds a client from the API base, timeouts and session cookie in `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] if the API base is not an absolute
    /// URL, [`DownloadError::InvalidSessionCookie`] if the cookie cannot be sent
    /// as a header, or [`DownloadError::Client`] if the HTTP client cannot be built.
    pub fn new(settings: &Settings) -> Result<Self, DownloadError> {
        let base = Url::parse(settings.api_base.trim())
            .map_err(|_| DownloadError::invalid_url(&settings.api_base))?;
        if base.cannot_be_a_base() {
            return Err(DownloadError::invalid_url(&settings.api_base));
        }

        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .read_timeout(Duration::from_secs(settings.read_timeout_secs))
            .user_agent(user_agent::default_user_agent());
        if let Some(session) = settings
            .session_cookie
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let mut value = HeaderValue::from_str(&format!("{SESSION_COOKIE}={session}"))
                .map_err(|_| DownloadError::InvalidSessionCookie)?;
            value.set_sensitive(true);
            let mut headers = HeaderMap::new();
            headers.insert(COOKIE, value);
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(DownloadError::client)?;
        Ok(Self { client, base })
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Lists the catalog's releases.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the request fails or the body is not a release list.
    #[instrument(level = "debug", skip(self))]
    pub async fn releases(&self) -> Result<Vec<Release>, CatalogError> {
        let list: ReleaseList = self.get_json(self.endpoint(&["catalog", "release"])).await?;
        Ok(list.results)
    }

    /// Sends the download request for `release_id` and checks its status.
    ///
    /// The query always carries `method=download` and `type=<quality>`,
    /// followed by `extra` pairs (for example `track=<id>`).
    pub(crate) async fn open_download(
        &self,
        release_id: &str,
        quality: &str,
        extra: &[(&str, &str)],
    ) -> Result<reqwest::Response, DownloadError> {
        let mut url = self.endpoint(&["release", release_id, "download"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("method", "download");
            query.append_pair("type", quality);
            for (key, value) in extra {
                query.append_pair(key, value);
            }
        }
        debug!(url = %url, "opening download connection");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DownloadError::network(url.as_str(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::connection(url.as_str(), status.as_u16()));
        }
        Ok(response)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so the segments are always editable.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::network(url.as_str(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::http_status(url.as_str(), status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| CatalogError::decode(url.as_str(), e))
    }
}

#[async_trait]
impl Catalog for ApiClient {
    #[instrument(level = "debug", skip(self))]
    async fn release(&self, id: &str) -> Result<Release, CatalogError> {
        self.get_json(self.endpoint(&["catalog", "release", id])).await
    }
}
