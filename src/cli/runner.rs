//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::ApiClient;
use crate::config::{ClientConfig, ExecutionContext};
use crate::error::Result;
use crate::pagination::{PageStrategy, Paginator};
use crate::transport::Transport;
use serde::Serialize;
use std::io::Write;
use std::time::Instant;
use tracing::info;

/// Totals for one walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Endpoint that was walked
    pub slug: String,
    /// Pages written, empty ones included
    pub pages: usize,
    /// Items across all pages
    pub items: usize,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command against the configured API, writing to stdout
    pub async fn run(&self) -> Result<()> {
        let client = ApiClient::from_config(self.load_config()?, self.context())?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with(&client, &mut out).await?;
        Ok(())
    }

    /// Run the CLI command with an existing client
    pub async fn run_with<T, W>(&self, client: &ApiClient<T>, out: &mut W) -> Result<WalkSummary>
    where
        T: Transport + Clone,
        W: Write,
    {
        let started = Instant::now();
        let summary = match &self.cli.command {
            Commands::Timeline { slug, args } => {
                let walk = client.timeline(slug, args.iter().cloned())?;
                self.drain(walk, out).await?
            }
            Commands::Search { query, args } => {
                let walk = client.search(query, args.iter().cloned())?;
                self.drain(walk, out).await?
            }
            Commands::Followers { args } => {
                let walk = client.followers(args.iter().cloned())?;
                self.drain(walk, out).await?
            }
            Commands::Friends { args } => {
                let walk = client.friends(args.iter().cloned())?;
                self.drain(walk, out).await?
            }
        };

        info!(
            "Walked {}: {} pages, {} items in {}ms",
            summary.slug,
            summary.pages,
            summary.items,
            started.elapsed().as_millis()
        );
        Ok(summary)
    }

    /// Load client config, falling back to defaults plus environment
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::from_yaml_str("{}")?,
        };
        if self.cli.verbose {
            config.debug = true;
        }
        Ok(config)
    }

    fn context(&self) -> ExecutionContext {
        if self.cli.serve_mode {
            ExecutionContext::RequestServing
        } else {
            ExecutionContext::Batch
        }
    }

    /// Write pages until the walk ends or `--max-pages` is reached
    async fn drain<S, T, W>(&self, mut walk: Paginator<S, T>, out: &mut W) -> Result<WalkSummary>
    where
        S: PageStrategy,
        S::Item: Serialize,
        T: Transport,
        W: Write,
    {
        let mut summary = WalkSummary {
            slug: walk.request().slug().to_string(),
            ..WalkSummary::default()
        };
        loop {
            if self.cli.max_pages.is_some_and(|max| summary.pages >= max) {
                info!("Stopping after {} pages", summary.pages);
                break;
            }
            let Some(page) = walk.next_page().await else {
                break;
            };
            summary.pages += 1;
            summary.items += page.len();
            self.output_page(&page, out)?;
        }
        Ok(summary)
    }

    /// Output a page
    fn output_page<I: Serialize, W: Write>(&self, page: &[I], out: &mut W) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(page)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(page)?,
        };
        writeln!(out, "{line}")?;
        Ok(())
    }
}
