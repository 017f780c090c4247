mod analyze;
mod catalog;
mod news;

use std::time::Instant;

use niftylens_core::NiftylensConfig;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::{Envelope, Metadata};

pub struct CommandResult {
    pub data: Value,
    pub text: String,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value, text: String) -> Self {
        Self {
            data,
            text,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let config = resolve_config(cli);
    tracing::debug!(?config, "resolved configuration");

    let started = Instant::now();
    let CommandResult {
        data,
        text,
        warnings,
    } = match &cli.command {
        Command::Catalog(args) => catalog::run(args, &config)?,
        Command::Analyze(args) => analyze::run(args, &config).await?,
        Command::News(args) => news::run(args, &config).await?,
    };
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let mut meta = Metadata::new(latency_ms);
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(Envelope { meta, data, text })
}

/// Environment first, then explicit flags.
fn resolve_config(cli: &Cli) -> NiftylensConfig {
    let mut config = NiftylensConfig::from_env();
    if let Some(path) = &cli.catalog {
        config = config.with_catalog_path(path.clone());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }
    config
}
