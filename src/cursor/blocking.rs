//! Blocking page cursor

use super::state::CursorState;
use super::types::{fetch_fn, CursorParams, FetchPage, FnFetcher, PageOutcome};
use crate::error::{Error, Result};
use crate::page::{Page, PageRequest};
use crate::types::Termination;

/// Lazy cursor over a paginated collection, driven by a blocking transport
///
/// ```
/// use pagewalk::{PageCursor, ResourcePage};
///
/// let mut cursor = PageCursor::from_fn(
///     |req| {
///         Ok(match req.next_page_token.as_deref() {
///             None => ResourcePage::with_token(vec!["a", "b"], "t1"),
///             Some(_) => ResourcePage::last(vec!["c"]),
///         })
///     },
///     0,
///     2,
///     (),
/// );
///
/// let items: Vec<_> = cursor.by_ref().collect::<pagewalk::Result<_>>().unwrap();
/// assert_eq!(items, vec!["a", "b", "c"]);
/// ```
pub struct PageCursor<Fe, F>
where
    Fe: FetchPage<F>,
{
    fetcher: Fe,
    state: CursorState<Fe::Item, F>,
}

impl<Func, F, P> PageCursor<FnFetcher<Func>, F>
where
    Func: FnMut(&PageRequest<F>) -> Result<P>,
    P: Page,
    F: Clone,
{
    /// Create a cursor that fetches pages with a closure
    pub fn from_fn(fetch: Func, start_page: u32, page_size: u32, filters: F) -> Self {
        Self::new(fetch_fn(fetch), start_page, page_size, filters)
    }
}

impl<Fe, F> PageCursor<Fe, F>
where
    Fe: FetchPage<F>,
    F: Clone,
{
    /// Create a cursor; nothing is fetched until the first item is needed
    pub fn new(fetcher: Fe, start_page: u32, page_size: u32, filters: F) -> Self {
        Self::with_params(fetcher, CursorParams::new(start_page, page_size, filters))
    }

    /// Create a cursor from a parameter record
    pub fn with_params(fetcher: Fe, params: CursorParams<F>) -> Self {
        Self {
            fetcher,
            state: CursorState::new(params),
        }
    }

    /// Set how the cursor detects the last page
    #[must_use]
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.state.set_termination(termination);
        self
    }

    /// Check whether another item is available, fetching a page if needed
    pub fn has_next(&mut self) -> Result<bool> {
        self.ensure_buffered()
    }

    /// The item under the cursor, without advancing
    ///
    /// Returns `None` until [`has_next`](Self::has_next) has buffered an item.
    pub fn current(&self) -> Option<&Fe::Item> {
        self.state.current()
    }

    /// Step over the current item, fetching a page first if needed
    ///
    /// Returns the item stepped over, or `None` at the end of the sequence.
    pub fn advance(&mut self) -> Result<Option<Fe::Item>> {
        self.ensure_buffered()?;
        Ok(self.state.take_current())
    }

    /// Rewind to the construction parameters
    ///
    /// The next call to `has_next` or `advance` performs the first fetch of
    /// a new traversal.
    pub fn restart(&mut self) {
        self.state.restart();
    }

    /// Counting is refused; the total is unknown without walking every page
    pub fn count_items(&self) -> Result<usize> {
        Err(Error::unsupported("count"))
    }

    /// Page number of the next request
    pub fn page_number(&self) -> u32 {
        self.state.request().page_number
    }

    /// Requested page size
    pub fn page_size(&self) -> u32 {
        self.state.request().page_size
    }

    /// Filter criteria sent with each request
    pub fn filters(&self) -> &F {
        &self.state.request().filters
    }

    /// Continuation token returned by the last fetched page
    pub fn next_page_token(&self) -> Option<&str> {
        self.state.request().next_page_token.as_deref()
    }

    /// Parameters captured at construction
    pub fn params(&self) -> &CursorParams<F> {
        self.state.params()
    }

    /// Items of the current page not yet stepped over
    pub fn buffered(&self) -> usize {
        self.state.buffered()
    }

    /// Check if the traversal has ended and every item was handed out
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Pages fetched since construction or the last restart
    pub fn pages_fetched(&self) -> u64 {
        self.state.pages_fetched()
    }

    /// The underlying page source
    pub fn fetcher(&self) -> &Fe {
        &self.fetcher
    }

    fn ensure_buffered(&mut self) -> Result<bool> {
        while self.state.needs_fetch() {
            let result = self.fetcher.fetch_page(self.state.request());
            self.state.apply(PageOutcome::from_fetch(result)?);
        }
        Ok(self.state.current().is_some())
    }
}

impl<Fe, F> std::fmt::Debug for PageCursor<Fe, F>
where
    Fe: FetchPage<F>,
    F: Clone + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCursor")
            .field("request", self.state.request())
            .field("buffered", &self.state.buffered())
            .field("finished", &self.state.is_finished())
            .finish_non_exhaustive()
    }
}

impl<Fe, F> Iterator for PageCursor<Fe, F>
where
    Fe: FetchPage<F>,
    F: Clone,
{
    type Item = Result<Fe::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.state.buffered(), None)
    }
}
