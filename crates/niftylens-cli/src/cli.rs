//! CLI argument definitions for niftylens.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog` | List or search the ticker catalog |
//! | `analyze` | Prices, moving average and relevant news for tickers |
//! | `news` | Relevant news for company names |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--catalog` | `$NIFTYLENS_CATALOG` or `All_Indian_Stocks_listed_in_nifty500.csv` | Catalog CSV |
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `$NIFTYLENS_TIMEOUT_MS` or `10000` | Per-request timeout |
//! | `--concurrency` | `$NIFTYLENS_CONCURRENCY` or `4` | Parallel provider calls |
//! | `--verbose` | `false` | Debug logs on stderr |
//!
//! # Examples
//!
//! ```bash
//! niftylens catalog --search bank --limit 10
//! niftylens analyze TCS INFY --start 2022-01-01 --end 2022-03-01 --window 20
//! niftylens analyze TCS --start 2022-01-01 --end 2022-03-01 --window-for TCS=50 --no-news
//! niftylens --format json --pretty news "Tata Consultancy Services"
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Indian stock analysis from the terminal.
///
/// Picks NSE tickers from a Nifty 500 catalog, pulls daily prices, adds a
/// simple moving average and lists news that mention each company.
#[derive(Debug, Parser)]
#[command(name = "niftylens", author, version, about = "NSE stock analysis CLI")]
pub struct Cli {
    /// Catalog CSV with `Symbol` and `Company Name` columns.
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Maximum provider calls in flight.
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Emit debug logs to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables.
    Table,
    /// JSON envelope with metadata.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tickers from the catalog.
    ///
    /// # Examples
    ///
    ///   niftylens catalog
    ///   niftylens catalog --search infosys
    Catalog(CatalogArgs),

    /// Fetch prices, derive the SMA and filter news for selected tickers.
    ///
    /// Tickers can be bare (TCS) or qualified (TCS.NS). The end date is
    /// exclusive.
    ///
    /// # Examples
    ///
    ///   niftylens analyze TCS --start 2022-01-01 --end 2022-01-10 --window 3
    ///   niftylens analyze TCS INFY --start 2022-01-01 --end 2022-06-01 --window-for INFY=50
    Analyze(AnalyzeArgs),

    /// Relevant news for one or more company names.
    ///
    /// # Examples
    ///
    ///   niftylens news "Tata Consultancy Services" Infosys
    News(NewsArgs),
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Case-insensitive match on symbol or company name.
    #[arg(long)]
    pub search: Option<String>,

    /// Maximum rows to print.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Tickers to analyse.
    pub tickers: Vec<String>,

    /// First date, YYYY-MM-DD.
    #[arg(long)]
    pub start: String,

    /// End date (exclusive), YYYY-MM-DD.
    #[arg(long)]
    pub end: String,

    /// SMA window for every ticker (default 20).
    #[arg(long)]
    pub window: Option<usize>,

    /// Per-ticker SMA window, `TICKER=N`. Repeatable.
    #[arg(long = "window-for", value_name = "TICKER=N", value_parser = parse_window_override)]
    pub window_for: Vec<(String, usize)>,

    /// Skip the news lookup.
    #[arg(long, default_value_t = false)]
    pub no_news: bool,
}

#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Company names, matched as exact phrases.
    #[arg(required = true)]
    pub names: Vec<String>,
}

fn parse_window_override(value: &str) -> Result<(String, usize), String> {
    let (ticker, window) = value
        .split_once('=')
        .ok_or_else(|| format!("expected TICKER=N, got '{value}'"))?;
    let window = window
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("window must be a positive integer, got '{}'", window.trim()))?;
    Ok((ticker.trim().to_owned(), window))
}
