//! HTTP transport module
//!
//! Reference page source for JSON list endpoints.
//!
//! # Features
//!
//! - **Page envelopes**: items and continuation token read from configurable keys
//! - **Token following**: `next_page_uri`-style tokens resolved against the endpoint URL
//! - **Coded errors**: REST error documents mapped to [`Error::Rest`](crate::Error::Rest)
//!   so the page-out-of-range code is recognised by cursors

mod client;
mod fetcher;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use fetcher::{HttpPageFetcher, PageLayout};
