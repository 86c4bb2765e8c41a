//! Shared HTTP plumbing for the service adapters.
//!
//! Both adapters hold an [`HttpEndpoint`]: a `reqwest` client configured
//! from [`HttpServiceConfig`] plus the validated base URL. Request failures
//! are mapped to [`TransportError`] in one place.

use std::time::Duration;

use fuelstop_core::TransportError;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::routing::DEFAULT_OSRM_BASE_URL;

/// Default user agent for outgoing requests.
pub const DEFAULT_USER_AGENT: &str = "fuelstop/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while constructing an HTTP-backed adapter.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The configured base URL could not be parsed.
    #[error("invalid base URL {base_url}: {source}")]
    InvalidBaseUrl {
        /// The rejected URL.
        base_url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// The base URL parsed but cannot carry path segments (for example `mailto:`).
    #[error("base URL {base_url} cannot be used as an HTTP endpoint")]
    UnsupportedBaseUrl {
        /// The rejected URL.
        base_url: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Configuration for an HTTP-backed adapter.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use fuelstop_data::HttpServiceConfig;
///
/// let config = HttpServiceConfig::new("http://osrm.internal:5000")
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("fleet-planner/2.1");
/// assert_eq!(config.timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct HttpServiceConfig {
    /// Base URL of the service (e.g. `"http://localhost:5000"`).
    pub base_url: String,
    /// Request and connect timeout.
    pub timeout: Duration,
    /// User agent sent with each request.
    pub user_agent: String,
}

impl Default for HttpServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OSRM_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpServiceConfig {
    /// Create a configuration for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// A configured client bound to one service base URL.
#[derive(Debug, Clone)]
pub(crate) struct HttpEndpoint {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpEndpoint {
    pub(crate) fn build(config: &HttpServiceConfig) -> Result<Self, ProviderBuildError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|source| ProviderBuildError::InvalidBaseUrl {
                base_url: config.base_url.clone(),
                source,
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderBuildError::UnsupportedBaseUrl {
                base_url: config.base_url.clone(),
            });
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
        })
    }

    /// The base URL with `segments` appended as path segments.
    ///
    /// A trailing slash on the base URL does not produce an empty segment.
    pub(crate) fn url_with_path<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// The base URL unchanged.
    pub(crate) const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issue a GET request and return the body as text.
    ///
    /// Non-success statuses fail with [`TransportError::HttpStatus`].
    pub(crate) async fn get_text(&self, url: Url) -> Result<String, TransportError> {
        let shown = url.to_string();
        let reply = self.fetch(url).await?;
        if reply.is_success() {
            Ok(reply.body)
        } else {
            Err(reply.status_error(&shown))
        }
    }

    /// Issue a GET request and return the status and body, whatever the status.
    pub(crate) async fn fetch(&self, url: Url) -> Result<HttpReply, TransportError> {
        let shown = url.to_string();
        debug!("GET {shown}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &shown))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &shown))?;
        Ok(HttpReply { status, body })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return TransportError::HttpStatus {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        TransportError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HttpReply {
    pub(crate) status: u16,
    pub(crate) body: String,
}

impl HttpReply {
    pub(crate) const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    pub(crate) fn status_error(&self, url: &str) -> TransportError {
        TransportError::HttpStatus {
            url: url.to_owned(),
            status: self.status,
            message: summarise_body(&self.body),
        }
    }
}

/// First line of a response body, bounded to keep error messages readable.
fn summarise_body(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect()
}

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Decode a JSON body into `T`.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, TransportError> {
    serde_json::from_str(body).map_err(|err| TransportError::Parse {
        message: err.to_string(),
    })
}
