//! Page source backed by an HTTP list endpoint

use super::client::HttpClient;
use crate::cursor::AsyncFetchPage;
use crate::error::{Error, Result};
use crate::page::{PageRequest, ResourcePage};
use crate::types::{JsonValue, StringMap};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;

/// Where a list endpoint puts things, in requests and responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    /// Dotted path to the item array in the response (e.g. `calls`)
    pub items_key: String,
    /// Dotted path to the continuation token (e.g. `next_page_uri`)
    pub next_token_key: String,
    /// Query parameter carrying the page number
    pub page_param: String,
    /// Query parameter carrying the page size
    pub page_size_param: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            items_key: "items".to_string(),
            next_token_key: "next_page_uri".to_string(),
            page_param: "Page".to_string(),
            page_size_param: "PageSize".to_string(),
        }
    }
}

impl PageLayout {
    /// Layout with the given item key and default everything else
    pub fn new(items_key: impl Into<String>) -> Self {
        Self {
            items_key: items_key.into(),
            ..Default::default()
        }
    }

    /// Set the continuation token path
    #[must_use]
    pub fn with_next_token_key(mut self, key: impl Into<String>) -> Self {
        self.next_token_key = key.into();
        self
    }

    /// Set the page number and page size query parameters
    #[must_use]
    pub fn with_params(
        mut self,
        page_param: impl Into<String>,
        size_param: impl Into<String>,
    ) -> Self {
        self.page_param = page_param.into();
        self.page_size_param = size_param.into();
        self
    }

    /// Query parameters for a first-page request
    pub fn query(&self, request: &PageRequest<StringMap>) -> StringMap {
        let mut query = request.filters.clone();
        query.insert(self.page_param.clone(), request.page_number.to_string());
        query.insert(self.page_size_param.clone(), request.page_size.to_string());
        query
    }

    /// Read a page envelope
    ///
    /// A missing, null or empty token marks the last page. A missing item
    /// array, or a token that is neither a string nor a number, is a
    /// malformed page.
    pub fn decode<T: DeserializeOwned>(&self, body: &JsonValue) -> Result<ResourcePage<T>> {
        let items = lookup(body, &self.items_key).ok_or_else(|| {
            Error::malformed_page(format!("no '{}' in response", self.items_key))
        })?;
        if !items.is_array() {
            return Err(Error::malformed_page(format!(
                "'{}' is not an array",
                self.items_key
            )));
        }
        let items = Vec::<T>::deserialize(items)?;

        let token = match lookup(body, &self.next_token_key) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(JsonValue::Number(n)) => Some(n.to_string()),
            Some(_) => {
                return Err(Error::malformed_page(format!(
                    "'{}' is not a string or number",
                    self.next_token_key
                )))
            }
        };

        Ok(ResourcePage::new(items, token))
    }
}

/// Look up a dotted path (`meta.next_page_url`, optionally `$.`-prefixed)
fn lookup<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    path.split('.')
        .try_fold(value, |current, part| current.as_object()?.get(part))
}

/// Fetches pages of `T` from a JSON list endpoint
///
/// The first page is requested at `path` with page number, page size and
/// filters as query parameters. Later pages follow the continuation token,
/// a URI resolved against the endpoint's URL.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher<T = JsonValue> {
    client: HttpClient,
    path: String,
    layout: PageLayout,
    _item: PhantomData<fn() -> T>,
}

impl<T> HttpPageFetcher<T> {
    /// Create a fetcher for the endpoint at `path`
    pub fn new(client: HttpClient, path: impl Into<String>, layout: PageLayout) -> Self {
        Self {
            client,
            path: path.into(),
            layout,
            _item: PhantomData,
        }
    }

    /// The endpoint layout
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// The underlying client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

#[async_trait]
impl<T> AsyncFetchPage<StringMap> for HttpPageFetcher<T>
where
    T: DeserializeOwned + Send,
{
    type Item = T;
    type Page = ResourcePage<T>;

    async fn fetch_page(&self, request: &PageRequest<StringMap>) -> Result<ResourcePage<T>> {
        let body: JsonValue = match &request.next_page_token {
            Some(token) => {
                let url = self.client.resolve(&self.path, token)?;
                self.client.get_json(url.as_str(), &StringMap::new()).await?
            }
            None => {
                let query = self.layout.query(request);
                self.client.get_json(&self.path, &query).await?
            }
        };

        self.layout.decode(&body)
    }
}
