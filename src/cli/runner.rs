//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_endpoint, EndpointConfig};
use crate::cursor::{AsyncFetchPage, AsyncPageCursor, PageOutcome};
use crate::error::{Error, Result, ResultExt};
use crate::page::ResourcePage;
use crate::types::JsonValue;
use serde::Serialize;
use std::io::Write;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, writing results to stdout
    pub async fn run(&self) -> Result<()> {
        let mut out = std::io::stdout().lock();
        self.run_to(&mut out).await
    }

    /// Run the CLI command, writing results to `out`
    pub async fn run_to<W: Write>(&self, out: &mut W) -> Result<()> {
        match &self.cli.command {
            Commands::Walk { max_items } => self.walk(out, *max_items).await,
            Commands::Page => self.page(out).await,
            Commands::Validate => self.validate(out),
        }
    }

    /// Resolve the endpoint from the definition file and command-line overrides
    pub fn endpoint(&self) -> Result<EndpointConfig> {
        let cli = &self.cli;
        let mut config = match (&cli.endpoint, &cli.base_url, &cli.items_key) {
            (Some(path), _, _) => load_endpoint(path)
                .with_context(|| format!("Failed to load endpoint '{}'", path.display()))?,
            (None, Some(base_url), Some(items_key)) => EndpointConfig::new(base_url, items_key),
            (None, Some(_), None) => return Err(Error::missing_field("items_key")),
            (None, None, _) => {
                return Err(Error::config(
                    "No endpoint given. Use --endpoint <file> or --base-url with --items-key",
                ))
            }
        };

        if let Some(base_url) = &cli.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(path) = &cli.path {
            config.path.clone_from(path);
        }
        if let Some(items_key) = &cli.items_key {
            config.items_key.clone_from(items_key);
        }
        if let Some(page_size) = cli.page_size {
            config.page_size = page_size;
        }
        if let Some(start_page) = cli.start_page {
            config.start_page = start_page;
        }
        if let Some(termination) = cli.termination {
            config.termination = termination.into();
        }
        config.filters.extend(cli.filters.iter().cloned());

        config.validate()?;
        Ok(config)
    }

    async fn walk<W: Write>(&self, out: &mut W, max_items: Option<usize>) -> Result<()> {
        let config = self.endpoint()?;
        let fetcher = config.fetcher::<JsonValue>()?;
        let mut cursor = AsyncPageCursor::with_params(fetcher, config.params())
            .with_termination(config.termination);

        let mut count = 0usize;
        while max_items.map_or(true, |max| count < max) {
            let Some(item) = cursor.advance().await? else {
                break;
            };
            self.emit(out, &item)?;
            count += 1;
        }

        info!("Walked {} items across {} pages", count, cursor.pages_fetched());
        Ok(())
    }

    /// Print the first page as `{"items": [...], "next_page_token": ...}`
    async fn page<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = self.endpoint()?;
        let fetcher = config.fetcher::<JsonValue>()?;
        let request = config.params().first_request();

        let page = match PageOutcome::from_fetch(fetcher.fetch_page(&request).await)? {
            PageOutcome::Items(page) => {
                info!("Page {} returned {} items", request.page_number, page.len());
                page
            }
            PageOutcome::EndOfSequence => {
                info!("Page {} is out of range", request.page_number);
                ResourcePage::empty()
            }
        };
        self.emit(out, &page)
    }

    fn validate<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = self.endpoint()?;
        writeln!(
            out,
            "Endpoint is valid: {} (path '{}', items at '{}', {} per page)",
            config.base_url, config.path, config.items_key, config.page_size
        )?;
        Ok(())
    }

    fn emit<W: Write, T: Serialize>(&self, out: &mut W, value: &T) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        writeln!(out, "{line}")?;
        Ok(())
    }
}
