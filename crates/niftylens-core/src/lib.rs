//! # niftylens-core
//!
//! Stock analysis pipeline for NSE-listed companies.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo chart and NewsAPI adapters |
//! | [`cache`] | TTL memoization keyed by function and arguments |
//! | [`catalog`] | Ticker to company-name reference table |
//! | [`config`] | Defaults and environment overrides |
//! | [`data_source`] | Provider traits and `SourceError` |
//! | [`domain`] | Tickers, date ranges, price and news models |
//! | [`fetcher`] | Bounded fan-out of per-ticker history calls |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`indicators`] | Simple moving average |
//! | [`news_filter`] | Company-name relevance filter |
//! | [`outcome`] | `Success` / `Empty` / `Failure` results |
//! | [`pipeline`] | Validate, fetch, derive, filter |
//!
//! ## Data flow
//!
//! ```text
//! Catalog ──▶ tickers ──▶ SeriesFetcher ──▶ indicators::derive ──▶ report
//!    │
//!    └──▶ company names ──▶ NewsFilter ─────────────────────────▶ report
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use niftylens_core::{AnalysisPipeline, AnalysisRequest, NiftylensConfig, parse_date};
//!
//! let pipeline = AnalysisPipeline::from_config(&NiftylensConfig::from_env())?;
//! let request = AnalysisRequest::new(["TCS"], parse_date("2022-01-01")?, parse_date("2022-03-01")?)
//!     .with_window(20);
//! let report = pipeline.analyze(&request).await?;
//! ```

pub mod adapters;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod indicators;
pub mod news_filter;
pub mod outcome;
pub mod pipeline;

pub use adapters::{NewsApiSource, YahooChartSource};
pub use cache::{CacheKey, CacheMode, CacheStore};
pub use catalog::{Catalog, CatalogEntry};
pub use config::NiftylensConfig;
pub use data_source::{NewsSource, PriceSource, SourceError, SourceErrorKind, SourceFuture};
pub use domain::*;
pub use error::{CatalogError, FetchError, PipelineError, ValidationError};
pub use fetcher::{FetchReport, SeriesFetcher, SeriesOutcome};
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use news_filter::{is_relevant, FilteredArticleSet, NewsFilter, NewsReport};
pub use outcome::Outcome;
pub use pipeline::{AnalysisPipeline, AnalysisReport, AnalysisRequest, TickerAnalysis};
