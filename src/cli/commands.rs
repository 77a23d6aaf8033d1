//! CLI commands and argument parsing

use crate::types::Termination;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Walk paginated REST collections
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Endpoint definition file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub endpoint: Option<PathBuf>,

    /// Base URL (overrides the endpoint file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Resource path relative to the base URL
    #[arg(long, global = true)]
    pub path: Option<String>,

    /// Dotted path to the item array in each response
    #[arg(long, global = true)]
    pub items_key: Option<String>,

    /// Items requested per page
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Page number of the first request
    #[arg(long, global = true)]
    pub start_page: Option<u32>,

    /// Filter sent as a query parameter (KEY=VALUE, repeatable)
    #[arg(long = "filter", value_parser = parse_key_value, global = true)]
    pub filters: Vec<(String, String)>,

    /// How the end of the collection is detected
    #[arg(long, global = true)]
    pub termination: Option<TerminationArg>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Iterate the whole collection
    Walk {
        /// Stop after this many items
        #[arg(long)]
        max_items: Option<usize>,
    },

    /// Fetch only the first page
    Page,

    /// Validate the endpoint definition
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one item per line)
    Json,
    /// Indented JSON
    Pretty,
}

/// End-of-collection detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TerminationArg {
    /// Stop at the first page without a continuation token
    MissingToken,
    /// Request page after page until an empty or out-of-range answer
    ProbeNextPage,
}

impl From<TerminationArg> for Termination {
    fn from(arg: TerminationArg) -> Self {
        match arg {
            TerminationArg::MissingToken => Termination::MissingToken,
            TerminationArg::ProbeNextPage => Termination::ProbeNextPage,
        }
    }
}

/// Parse a `KEY=VALUE` pair
fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
