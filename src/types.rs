//! Common types used throughout pagewalk
//!
//! Shared type aliases and small enums used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Termination
// ============================================================================

/// How a cursor decides that the collection has no further pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// A page without a continuation token is the last one; nothing is
    /// requested after it.
    #[default]
    MissingToken,
    /// Keep requesting the next page number until the transport answers
    /// with an empty page or a page-out-of-range error.
    ProbeNextPage,
}
