//! Traversal state shared by the blocking and async cursors
//!
//! Holds the buffer, the next request and the restart snapshot. `apply` is
//! the only place where a fetched page changes the buffer, the page number
//! or the continuation token.

use super::types::{CursorParams, PageOutcome};
use crate::page::{Page, PageRequest};
use crate::types::Termination;
use std::collections::VecDeque;
use tracing::debug;

pub(crate) struct CursorState<T, F> {
    params: CursorParams<F>,
    request: PageRequest<F>,
    /// Items of the current page not yet stepped over; the front is current
    buffer: VecDeque<T>,
    termination: Termination,
    finished: bool,
    pages_fetched: u64,
}

impl<T, F: Clone> CursorState<T, F> {
    pub(crate) fn new(params: CursorParams<F>) -> Self {
        let request = params.first_request();
        Self {
            params,
            request,
            buffer: VecDeque::new(),
            termination: Termination::default(),
            finished: false,
            pages_fetched: 0,
        }
    }

    pub(crate) fn set_termination(&mut self, termination: Termination) {
        self.termination = termination;
    }

    /// A fetch is due when the buffer is used up and the walk has not ended
    pub(crate) fn needs_fetch(&self) -> bool {
        self.buffer.is_empty() && !self.finished
    }

    pub(crate) fn request(&self) -> &PageRequest<F> {
        &self.request
    }

    pub(crate) fn apply<P>(&mut self, outcome: PageOutcome<P>)
    where
        P: Page<Item = T>,
    {
        match outcome {
            PageOutcome::Items(page) => {
                let (items, token) = page.into_parts();
                debug!(
                    "Fetched page {} (size {}): {} items, next token: {:?}",
                    self.request.page_number,
                    self.request.page_size,
                    items.len(),
                    token
                );

                // A page that hands back the token it was fetched with ends the walk
                let repeated = token.is_some() && token == self.request.next_page_token;
                if repeated {
                    debug!(
                        "Page {} repeated its own token, ending traversal",
                        self.request.page_number
                    );
                }

                self.finished = repeated
                    || match self.termination {
                        Termination::MissingToken => token.is_none(),
                        Termination::ProbeNextPage => items.is_empty(),
                    };
                self.buffer = items.into();
                self.request.page_number = self.request.page_number.saturating_add(1);
                self.request.next_page_token = token;
                self.pages_fetched += 1;
            }
            PageOutcome::EndOfSequence => {
                debug!(
                    "Page {} is out of range, ending traversal",
                    self.request.page_number
                );
                self.finished = true;
            }
        }
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.buffer.front()
    }

    pub(crate) fn take_current(&mut self) -> Option<T> {
        self.buffer.pop_front()
    }

    pub(crate) fn restart(&mut self) {
        debug!("Restarting traversal at page {}", self.params.start_page);
        self.request = self.params.first_request();
        self.buffer.clear();
        self.finished = false;
        self.pages_fetched = 0;
    }

    pub(crate) fn params(&self) -> &CursorParams<F> {
        &self.params
    }

    pub(crate) fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished && self.buffer.is_empty()
    }

    pub(crate) fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }
}
