use super::resilient_http::resilient_get;
use super::{F1Api, PageRequest};
use crate::Result;
use crate::config::Config;
use core::time::Duration;
use ohno::{IntoAppError, bail};
use serde_json::Value;
use url::Url;

/// Log target for the API client
const LOG_TARGET: &str = "       api";

/// Reads pages from a Jolpica (Ergast-compatible) server over HTTP.
#[derive(Debug, Clone)]
pub struct JolpicaClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl JolpicaClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self> {
        let parsed = Url::parse(base_url).into_app_err_with(|| format!("invalid API base URL '{base_url}'"))?;
        if parsed.cannot_be_a_base() {
            bail!("API base URL '{base_url}' cannot have paths appended");
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("f1db/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .into_app_err("unable to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            max_retries,
        })
    }

    /// Creates a client from the `base_url`, `request_timeout_secs` and `max_retries` settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.request_timeout_secs), config.max_retries)
    }

    /// The full URL of a page request, including the `limit` and `offset` query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL is invalid.
    pub fn page_url(&self, request: &PageRequest) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path()))
            .into_app_err_with(|| format!("unable to build the URL for {}", request.endpoint))?;

        let _ = url
            .query_pairs_mut()
            .append_pair("limit", &request.limit.to_string())
            .append_pair("offset", &request.offset.to_string());

        Ok(url)
    }
}

impl F1Api for JolpicaClient {
    async fn get_page(&self, request: &PageRequest) -> Result<Value> {
        let url = self.page_url(request)?;
        log::debug!(target: LOG_TARGET, "GET {url}");

        let response = resilient_get(&self.client, url.as_str(), self.max_retries, self.timeout).await?;

        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} returned status {status}");
        }

        response.json().await.into_app_err_with(|| format!("unable to parse the response of {url}"))
    }
}
