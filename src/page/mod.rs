//! Page module
//!
//! The data exchanged between a cursor and its transport: the request the
//! cursor issues for each page, and the page the transport hands back.

mod types;

pub use types::{Page, PageRequest, ResourcePage};
