//! HTTP client for paginated list endpoints
//!
//! Provides a thin client that handles:
//! - Base URL resolution for paths and continuation URIs
//! - Default headers and request timeout
//! - Classification of error responses into coded REST errors

use crate::error::{Error, Result};
use crate::types::StringMap;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("pagewalk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Error document returned by REST APIs on failure
#[derive(Debug, Deserialize)]
struct RestErrorBody {
    code: Option<u32>,
    message: Option<String>,
    more_info: Option<String>,
}

/// HTTP client for list endpoints
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request
    ///
    /// Non-2xx responses are turned into errors: a body carrying a REST
    /// error document becomes [`Error::Rest`], anything else
    /// [`Error::HttpStatus`].
    pub async fn get(&self, url: &str, query: &StringMap) -> Result<Response> {
        let full_url = self.build_url(url);

        let mut req = self.client.get(&full_url);
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !query.is_empty() {
            req = req.query(query);
        }

        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            debug!("Request succeeded: GET {}", full_url);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!("Request failed with {}: GET {}", status.as_u16(), full_url);
        Err(classify_error(status.as_u16(), body))
    }

    /// Make a GET request and parse JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &StringMap) -> Result<T> {
        let response = self.get(url, query).await?;
        let json: T = response.json().await?;
        Ok(json)
    }

    /// Resolve a continuation URI against the resource at `path`
    ///
    /// Absolute URIs are returned as-is. Relative ones are joined onto the
    /// full URL `path` maps to, so `?Page=2` keeps the resource path and an
    /// absolute path replaces it.
    pub fn resolve(&self, path: &str, uri: &str) -> Result<Url> {
        match Url::parse(uri) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let resource = match Url::parse(&self.build_url(path)) {
                    Ok(url) => url,
                    Err(url::ParseError::RelativeUrlWithoutBase) => {
                        return Err(Error::config(format!(
                            "Cannot resolve '{uri}' without a base URL"
                        )))
                    }
                    Err(e) => return Err(e.into()),
                };
                Ok(resource.join(uri)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                if path.is_empty() {
                    base.to_string()
                } else {
                    format!("{base}/{path}")
                }
            }
            None => path.to_string(),
        }
    }
}

/// Map an error response onto the crate error taxonomy
fn classify_error(status: u16, body: String) -> Error {
    match serde_json::from_str::<RestErrorBody>(&body) {
        Ok(doc) if doc.code.is_some() || doc.message.is_some() => Error::Rest {
            status,
            code: doc.code,
            message: doc.message.unwrap_or_default(),
            more_info: doc.more_info,
        },
        _ => Error::HttpStatus { status, body },
    }
}
