//! Page and page request types

use serde::{Deserialize, Serialize};

/// One fetched batch of items plus its continuation token
///
/// A token of `None` means the API reported no further pages.
pub trait Page {
    /// Item type carried by the page
    type Item;

    /// Split the page into its ordered items and continuation token
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

/// A plain vector is a page that never continues
impl<T> Page for Vec<T> {
    type Item = T;

    fn into_parts(self) -> (Vec<T>, Option<String>) {
        (self, None)
    }
}

/// Owned page of resources returned by a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePage<T> {
    /// Items in page order
    pub items: Vec<T>,
    /// Continuation token (e.g. `next_page_uri`)
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl<T> ResourcePage<T> {
    /// Create a page that continues with the given token
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token: next_page_token.filter(|t| !t.is_empty()),
        }
    }

    /// Create a page that continues with `token`
    pub fn with_token(items: Vec<T>, token: impl Into<String>) -> Self {
        Self::new(items, Some(token.into()))
    }

    /// Create the final page of a collection
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Create an empty final page
    pub fn empty() -> Self {
        Self::last(Vec::new())
    }

    /// Number of items on the page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if the API reported another page
    pub fn has_next(&self) -> bool {
        self.next_page_token.is_some()
    }
}

impl<T> Page for ResourcePage<T> {
    type Item = T;

    fn into_parts(self) -> (Vec<T>, Option<String>) {
        let token = self.next_page_token.filter(|t| !t.is_empty());
        (self.items, token)
    }
}

/// Parameters of a single page fetch
///
/// The cursor owns one of these as its "next request" and hands it to the
/// transport by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    /// Page index being requested
    pub page_number: u32,
    /// Requested number of items per page
    pub page_size: u32,
    /// Opaque filter criteria
    pub filters: F,
    /// Token returned by the previous page, `None` before the first fetch
    pub next_page_token: Option<String>,
}

impl<F> PageRequest<F> {
    /// Create a request for a first page
    pub fn new(page_number: u32, page_size: u32, filters: F) -> Self {
        Self {
            page_number,
            page_size,
            filters,
            next_page_token: None,
        }
    }

    /// Set the continuation token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }
}
