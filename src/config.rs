//! Endpoint configuration
//!
//! Describes one paginated list endpoint in YAML (or JSON, which is valid
//! YAML): where it lives, how its pages are laid out, and how a walk over
//! it starts.
//!
//! ```yaml
//! base_url: https://api.twilio.com/2010-04-01/Accounts/AC123
//! path: Calls.json
//! items_key: calls
//! page_size: 100
//! filters:
//!   Status: completed
//! headers:
//!   Authorization: Basic QUM6c2VjcmV0
//! ```

use crate::cursor::CursorParams;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, HttpPageFetcher, PageLayout};
use crate::types::{StringMap, Termination};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// A paginated list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL; continuation URIs are resolved against it
    pub base_url: String,

    /// Path of the list resource, relative to the base URL
    #[serde(default)]
    pub path: String,

    /// Dotted path to the item array in each response
    pub items_key: String,

    /// Dotted path to the continuation token in each response
    #[serde(default = "default_next_token_key")]
    pub next_token_key: String,

    /// Query parameter carrying the page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Query parameter carrying the page size
    #[serde(default = "default_page_size_param")]
    pub page_size_param: String,

    /// Page number of the first request
    #[serde(default)]
    pub start_page: u32,

    /// Items requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Filter criteria sent as query parameters on the first request
    #[serde(default)]
    pub filters: StringMap,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: StringMap,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How the end of the collection is detected
    #[serde(default)]
    pub termination: Termination,
}

fn default_next_token_key() -> String {
    "next_page_uri".to_string()
}

fn default_page_param() -> String {
    "Page".to_string()
}

fn default_page_size_param() -> String {
    "PageSize".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

impl EndpointConfig {
    /// Create a config for `base_url` with items under `items_key`
    pub fn new(base_url: impl Into<String>, items_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: String::new(),
            items_key: items_key.into(),
            next_token_key: default_next_token_key(),
            page_param: default_page_param(),
            page_size_param: default_page_size_param(),
            start_page: 0,
            page_size: default_page_size(),
            filters: StringMap::new(),
            headers: StringMap::new(),
            timeout_secs: default_timeout_secs(),
            termination: Termination::default(),
        }
    }

    /// Check the config for values no walk could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        let url = Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(Error::invalid_value("base_url", "must be a hierarchical URL"));
        }

        if self.items_key.is_empty() {
            return Err(Error::missing_field("items_key"));
        }
        if self.next_token_key.is_empty() {
            return Err(Error::invalid_value("next_token_key", "cannot be empty"));
        }
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be greater than 0"));
        }

        Ok(())
    }

    /// Response and query layout of the endpoint
    pub fn layout(&self) -> PageLayout {
        PageLayout::new(&self.items_key)
            .with_next_token_key(&self.next_token_key)
            .with_params(&self.page_param, &self.page_size_param)
    }

    /// Cursor parameters for a walk over the endpoint
    pub fn params(&self) -> CursorParams<StringMap> {
        CursorParams::new(self.start_page, self.page_size, self.filters.clone())
    }

    /// HTTP client configuration for the endpoint
    pub fn client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.timeout_secs));
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }

    /// Build a page source for the endpoint
    pub fn fetcher<T>(&self) -> Result<HttpPageFetcher<T>> {
        let client = HttpClient::with_config(self.client_config())?;
        Ok(HttpPageFetcher::new(client, &self.path, self.layout()))
    }
}

/// Load an endpoint config from a YAML or JSON file
pub fn load_endpoint(path: impl AsRef<Path>) -> Result<EndpointConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    load_endpoint_from_str(&content)
}

/// Load an endpoint config from a YAML or JSON string
pub fn load_endpoint_from_str(content: &str) -> Result<EndpointConfig> {
    let config: EndpointConfig = serde_yaml::from_str(content)?;
    config.validate()?;
    Ok(config)
}
