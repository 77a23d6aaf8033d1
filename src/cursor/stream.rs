//! Async page cursor
//!
//! Same traversal rules as [`PageCursor`](super::PageCursor), for transports
//! that suspend while a page is in flight.

use super::state::CursorState;
use super::types::{AsyncFetchPage, CursorParams, PageOutcome};
use crate::error::{Error, Result};
use crate::types::Termination;
use futures::Stream;

/// Lazy cursor over a paginated collection, driven by an async transport
pub struct AsyncPageCursor<Fe, F>
where
    Fe: AsyncFetchPage<F>,
    F: Sync,
{
    fetcher: Fe,
    state: CursorState<Fe::Item, F>,
}

impl<Fe, F> AsyncPageCursor<Fe, F>
where
    Fe: AsyncFetchPage<F>,
    F: Clone + Sync,
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
    pub async fn has_next(&mut self) -> Result<bool> {
        self.ensure_buffered().await
    }

    /// The item under the cursor, without advancing
    pub fn current(&self) -> Option<&Fe::Item> {
        self.state.current()
    }

    /// Step over the current item, fetching a page first if needed
    pub async fn advance(&mut self) -> Result<Option<Fe::Item>> {
        self.ensure_buffered().await?;
        Ok(self.state.take_current())
    }

    /// Rewind to the construction parameters without fetching
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

    /// Convert into a stream of items
    ///
    /// The stream ends at the end of the sequence, or right after yielding
    /// the first transport error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Fe::Item>> {
        futures::stream::try_unfold(self, |mut cursor| async move {
            let item = cursor.advance().await?;
            Ok::<_, Error>(item.map(|item| (item, cursor)))
        })
    }

    async fn ensure_buffered(&mut self) -> Result<bool> {
        while self.state.needs_fetch() {
            let result = self.fetcher.fetch_page(self.state.request()).await;
            self.state.apply(PageOutcome::from_fetch(result)?);
        }
        Ok(self.state.current().is_some())
    }
}

impl<Fe, F> std::fmt::Debug for AsyncPageCursor<Fe, F>
where
    Fe: AsyncFetchPage<F>,
    F: Clone + Sync + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncPageCursor")
            .field("request", self.state.request())
            .field("buffered", &self.state.buffered())
            .field("finished", &self.state.is_finished())
            .finish_non_exhaustive()
    }
}
