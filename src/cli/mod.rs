//! CLI module
//!
//! Command-line interface for walking paginated endpoints.
//!
//! # Commands
//!
//! - `walk` - Iterate the whole collection, one item per line
//! - `page` - Fetch only the first page
//! - `validate` - Load and validate an endpoint definition

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, TerminationArg};
pub use runner::Runner;
