// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! # pagewalk
//!
//! Lazy, restartable cursors over paginated REST collections.
//!
//! A cursor walks a paginated API one page at a time and exposes the whole
//! result set as a single forward-only sequence. Pages are requested only
//! when the items already fetched have been handed out.
//!
//! ## Features
//!
//! - **Lazy paging**: at most one page is buffered; nothing is prefetched
//! - **Restartable**: `restart()` rewinds to the construction parameters
//! - **Out-of-range aware**: REST error 20006 ends a walk instead of failing it
//! - **Retry-friendly**: a failed fetch leaves the cursor ready to repeat it
//! - **Blocking or async**: `PageCursor` is an `Iterator`, `AsyncPageCursor` a `Stream`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::{load_endpoint, AsyncPageCursor, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let endpoint = load_endpoint("calls.yaml")?;
//!     let fetcher = endpoint.fetcher::<serde_json::Value>()?;
//!     let mut cursor = AsyncPageCursor::with_params(fetcher, endpoint.params());
//!
//!     while let Some(call) = cursor.advance().await? {
//!         println!("{call}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Consumer                         │
//! │   has_next() / current() / advance() / restart()         │
//! │   Iterator<Item = Result<T>>  ·  Stream<Item = Result<T>> │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌────────────────────────────┴─────────────────────────────┐
//! │          PageCursor  ·  AsyncPageCursor                  │
//! │   buffer · next PageRequest · restart snapshot           │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │ fetch_page(&PageRequest)
//! ┌────────────────────────────┴─────────────────────────────┐
//! │     FetchPage / AsyncFetchPage (closure, HttpPageFetcher) │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Pages and page requests
pub mod page;

/// Blocking and async page cursors
pub mod cursor;

/// HTTP transport for JSON list endpoints
pub mod http;

/// Endpoint configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result, PAGE_OUT_OF_RANGE};
pub use types::*;

// Re-export commonly used types
pub use config::{load_endpoint, load_endpoint_from_str, EndpointConfig};
pub use cursor::{AsyncFetchPage, AsyncPageCursor, CursorParams, FetchPage, PageCursor};
pub use page::{Page, PageRequest, ResourcePage};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
