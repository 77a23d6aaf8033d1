//! Cursor types and traits
//!
//! Defines the transport seams and the values passed across them.

use crate::error::Result;
use crate::page::{Page, PageRequest};
use async_trait::async_trait;

/// Blocking source of pages
///
/// Implemented by transports, and by any closure through [`fetch_fn`].
pub trait FetchPage<F> {
    /// Item type yielded by the cursor
    type Item;
    /// Page type returned by the transport
    type Page: Page<Item = Self::Item>;

    /// Fetch the page described by `request`
    fn fetch_page(&mut self, request: &PageRequest<F>) -> Result<Self::Page>;
}

/// Cooperative source of pages
///
/// The cursor suspends only while awaiting this call.
#[async_trait]
pub trait AsyncFetchPage<F: Sync>: Send + Sync {
    /// Item type yielded by the cursor
    type Item: Send;
    /// Page type returned by the transport
    type Page: Page<Item = Self::Item> + Send;

    /// Fetch the page described by `request`
    async fn fetch_page(&self, request: &PageRequest<F>) -> Result<Self::Page>;
}

/// Adapter turning a closure into a [`FetchPage`]
#[derive(Debug, Clone)]
pub struct FnFetcher<Func>(Func);

/// Wrap a closure as a page source
pub fn fetch_fn<F, P, Func>(f: Func) -> FnFetcher<Func>
where
    Func: FnMut(&PageRequest<F>) -> Result<P>,
    P: Page,
{
    FnFetcher(f)
}

impl<F, P, Func> FetchPage<F> for FnFetcher<Func>
where
    Func: FnMut(&PageRequest<F>) -> Result<P>,
    P: Page,
{
    type Item = P::Item;
    type Page = P;

    fn fetch_page(&mut self, request: &PageRequest<F>) -> Result<P> {
        (self.0)(request)
    }
}

/// Construction-time parameters, kept unchanged for restarts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorParams<F> {
    /// Page number of the first request
    pub start_page: u32,
    /// Requested number of items per page
    pub page_size: u32,
    /// Opaque filter criteria
    pub filters: F,
}

impl<F: Clone> CursorParams<F> {
    /// Create a new set of parameters
    pub fn new(start_page: u32, page_size: u32, filters: F) -> Self {
        Self {
            start_page,
            page_size,
            filters,
        }
    }

    /// The request that opens a traversal
    pub fn first_request(&self) -> PageRequest<F> {
        PageRequest::new(self.start_page, self.page_size, self.filters.clone())
    }
}

/// Result of one fetch step, once transport errors are classified
#[derive(Debug)]
pub enum PageOutcome<P> {
    /// The transport returned a page
    Items(P),
    /// The transport reported that the page lies beyond the collection
    EndOfSequence,
}

impl<P> PageOutcome<P> {
    /// Classify a fetch result
    ///
    /// A page-out-of-range failure becomes `EndOfSequence`; every other
    /// failure is returned unchanged.
    pub fn from_fetch(result: Result<P>) -> Result<Self> {
        match result {
            Ok(page) => Ok(Self::Items(page)),
            Err(e) if e.is_out_of_range() => Ok(Self::EndOfSequence),
            Err(e) => Err(e),
        }
    }

    /// Check if this is the end of the sequence
    pub fn is_end(&self) -> bool {
        matches!(self, Self::EndOfSequence)
    }
}
