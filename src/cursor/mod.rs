//! Cursor module
//!
//! Lazy, forward-only cursors over a paginated collection.
//!
//! # Overview
//!
//! A cursor asks its transport for one page at a time and hands out the
//! items of that page in order, requesting the next page only once the
//! current one is used up. Two flavours share the same state machine:
//!
//! - [`PageCursor`] drives a blocking [`FetchPage`] and is an [`Iterator`]
//! - [`AsyncPageCursor`] drives an [`AsyncFetchPage`] and converts into a
//!   [`futures::Stream`]
//!
//! A transport failure carrying the page-out-of-range code ends the walk
//! quietly; any other failure is returned to the caller and leaves the
//! cursor ready to retry the same request.

mod blocking;
mod state;
mod stream;
mod types;

pub use blocking::PageCursor;
pub use stream::AsyncPageCursor;
pub use types::{fetch_fn, AsyncFetchPage, CursorParams, FetchPage, FnFetcher, PageOutcome};

#[cfg(test)]
mod tests;
