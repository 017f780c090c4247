//! End-to-end analysis: validate, fetch, derive, filter news.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use time::Date;

use crate::adapters::{NewsApiSource, YahooChartSource};
use crate::cache::{CacheMode, CacheStore};
use crate::config::NiftylensConfig;
use crate::data_source::{NewsSource, PriceSource};
use crate::fetcher::SeriesFetcher;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::indicators;
use crate::news_filter::{NewsFilter, NewsReport};
use crate::{
    Catalog, DateRange, DerivedSeries, FetchError, Outcome, PipelineError, TickerSymbol,
    ValidationError,
};

/// User selection for one analysis run.
///
/// Tickers may be bare (`TCS`) or qualified (`TCS.NS`); both are resolved
/// against the catalog. Repeated tickers are analysed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub tickers: Vec<String>,
    pub start: Date,
    pub end: Date,
    /// Per-ticker SMA window, keyed like `tickers`.
    pub windows: BTreeMap<String, usize>,
    /// Falls back to the pipeline default when `None`.
    pub default_window: Option<usize>,
    pub include_news: bool,
    pub cache_mode: CacheMode,
}

impl AnalysisRequest {
    pub fn new<I, S>(tickers: I, start: Date, end: Date) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tickers: tickers.into_iter().map(Into::into).collect(),
            start,
            end,
            windows: BTreeMap::new(),
            default_window: None,
            include_news: true,
            cache_mode: CacheMode::Use,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.default_window = Some(window);
        self
    }

    pub fn with_window_for(mut self, ticker: impl Into<String>, window: usize) -> Self {
        self.windows.insert(ticker.into(), window);
        self
    }

    pub fn without_news(mut self) -> Self {
        self.include_news = false;
        self
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }
}

/// Derived result for one selected ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerAnalysis {
    pub ticker: TickerSymbol,
    pub company: String,
    pub window: usize,
    pub outcome: Outcome<DerivedSeries, FetchError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub range: DateRange,
    pub tickers: Vec<TickerAnalysis>,
    pub news: NewsReport,
}

impl AnalysisReport {
    /// One line per degraded item, for display next to the results.
    pub fn warnings(&self) -> Vec<String> {
        let fetch = self
            .tickers
            .iter()
            .filter_map(|analysis| analysis.outcome.failure().map(ToString::to_string));
        let news = self
            .news
            .failures()
            .map(|(company, error)| format!("news query failed for {company}: {error}"));
        fetch.chain(news).collect()
    }
}

#[derive(Debug, Clone)]
struct PlannedTicker {
    ticker: TickerSymbol,
    company: String,
    window: usize,
}

/// Composes the catalog with a price source and a news source.
#[derive(Clone)]
pub struct AnalysisPipeline {
    catalog: Arc<Catalog>,
    fetcher: SeriesFetcher,
    news: NewsFilter,
    default_window: usize,
}

impl AnalysisPipeline {
    pub fn new(
        catalog: Catalog,
        price_source: Arc<dyn PriceSource>,
        news_source: Arc<dyn NewsSource>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            fetcher: SeriesFetcher::new(price_source),
            news: NewsFilter::new(news_source),
            default_window: crate::config::DEFAULT_SMA_WINDOW,
        }
    }

    /// Load the catalog and wire the Yahoo and NewsAPI adapters over reqwest.
    pub fn from_config(config: &NiftylensConfig) -> Result<Self, PipelineError> {
        let catalog = Catalog::load(&config.catalog_path)?;
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
        Self::with_http_client(catalog, http, config)
    }

    pub fn with_http_client(
        catalog: Catalog,
        http: Arc<dyn HttpClient>,
        config: &NiftylensConfig,
    ) -> Result<Self, PipelineError> {
        if config.default_window == 0 {
            return Err(ValidationError::InvalidWindow.into());
        }

        let prices = YahooChartSource::new(Arc::clone(&http)).with_timeout_ms(config.timeout_ms);
        let news = NewsApiSource::new(http, config.news_api_key.clone())
            .with_timeout_ms(config.timeout_ms);

        Ok(Self::new(catalog, Arc::new(prices), Arc::new(news))
            .with_concurrency(config.concurrency)
            .with_cache_ttl(config.cache_ttl)
            .with_default_window(config.default_window))
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.fetcher = self.fetcher.with_concurrency(concurrency);
        self.news = self.news.with_concurrency(concurrency);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.fetcher = self.fetcher.with_cache(CacheStore::new(ttl));
        self.news = self.news.with_cache(CacheStore::new(ttl));
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.fetcher = self.fetcher.with_deadline(deadline);
        self
    }

    /// Zero is ignored.
    pub fn with_default_window(mut self, window: usize) -> Self {
        if window > 0 {
            self.default_window = window;
        }
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub const fn default_window(&self) -> usize {
        self.default_window
    }

    /// Run one analysis. Every validation failure is returned before the
    /// first provider call.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, PipelineError> {
        let (range, plan) = self.plan(request)?;
        tracing::info!(tickers = plan.len(), %range, news = request.include_news, "starting analysis");

        let tickers: Vec<TickerSymbol> = plan.iter().map(|p| p.ticker.clone()).collect();
        let companies: Vec<&str> = plan.iter().map(|p| p.company.as_str()).collect();

        let fetch = self.fetcher.fetch(&tickers, range, request.cache_mode);
        let (fetched, news) = if request.include_news {
            futures::join!(fetch, self.news.filter(&companies, request.cache_mode))
        } else {
            (fetch.await, NewsReport::default())
        };

        let mut analyses = Vec::with_capacity(plan.len());
        for (planned, entry) in plan.into_iter().zip(fetched.entries) {
            let outcome = match entry.outcome {
                Outcome::Success(series) => {
                    Outcome::Success(indicators::derive(&series, planned.window)?)
                }
                Outcome::Empty => Outcome::Empty,
                Outcome::Failure(error) => Outcome::Failure(error),
            };
            analyses.push(TickerAnalysis {
                ticker: planned.ticker,
                company: planned.company,
                window: planned.window,
                outcome,
            });
        }

        Ok(AnalysisReport {
            range,
            tickers: analyses,
            news,
        })
    }

    pub async fn clear_cache(&self) {
        self.fetcher.cache().clear().await;
        self.news.cache().clear().await;
    }

    pub async fn clear_expired(&self) {
        self.fetcher.cache().clear_expired().await;
        self.news.cache().clear_expired().await;
    }

    fn plan(
        &self,
        request: &AnalysisRequest,
    ) -> Result<(DateRange, Vec<PlannedTicker>), ValidationError> {
        let range = DateRange::new(request.start, request.end)?;

        if request.tickers.is_empty() {
            return Err(ValidationError::EmptySelection);
        }

        let mut seen = HashSet::new();
        let mut selected = Vec::with_capacity(request.tickers.len());
        for input in &request.tickers {
            let ticker = self.catalog.resolve(input)?;
            if seen.insert(ticker.clone()) {
                selected.push(ticker);
            }
        }

        let default_window = request.default_window.unwrap_or(self.default_window);
        if default_window == 0 {
            return Err(ValidationError::InvalidWindow);
        }

        let mut overrides = BTreeMap::new();
        for (input, &window) in &request.windows {
            let ticker = self.catalog.resolve(input)?;
            if !seen.contains(&ticker) {
                return Err(ValidationError::WindowForUnselected {
                    symbol: ticker.to_string(),
                });
            }
            if window == 0 {
                return Err(ValidationError::InvalidWindow);
            }
            if let Some(&first) = overrides.get(&ticker) {
                if first != window {
                    return Err(ValidationError::ConflictingWindows {
                        symbol: ticker.to_string(),
                        first,
                        second: window,
                    });
                }
            }
            overrides.insert(ticker, window);
        }

        let plan = selected
            .into_iter()
            .map(|ticker| {
                let company = self
                    .catalog
                    .company_name(&ticker)
                    .unwrap_or_default()
                    .to_owned();
                let window = overrides.get(&ticker).copied().unwrap_or(default_window);
                PlannedTicker {
                    ticker,
                    company,
                    window,
                }
            })
            .collect();

        Ok((range, plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{SourceError, SourceFuture};
    use crate::{CatalogEntry, NewsArticle, PriceSeries};
    use time::macros::date;

    struct NoPrices;

    impl PriceSource for NoPrices {
        fn id(&self) -> &'static str {
            "none"
        }

        fn daily_history<'a>(
            &'a self,
            ticker: &'a TickerSymbol,
            _range: DateRange,
        ) -> SourceFuture<'a, PriceSeries> {
            Box::pin(async move { Ok(PriceSeries::empty(ticker.clone())) })
        }
    }

    struct NoNews;

    impl NewsSource for NoNews {
        fn id(&self) -> &'static str {
            "none"
        }

        fn search_phrase<'a>(&'a self, _phrase: &'a str) -> SourceFuture<'a, Vec<NewsArticle>> {
            Box::pin(async { Err(SourceError::unavailable("offline")) })
        }
    }

    fn pipeline() -> AnalysisPipeline {
        let catalog = Catalog::from_entries([
            CatalogEntry {
                ticker: TickerSymbol::parse("TCS.NS").expect("valid"),
                company: String::from("Tata Consultancy Services"),
            },
            CatalogEntry {
                ticker: TickerSymbol::parse("INFY.NS").expect("valid"),
                company: String::from("Infosys"),
            },
        ]);
        AnalysisPipeline::new(catalog, Arc::new(NoPrices), Arc::new(NoNews))
    }

    #[test]
    fn plan_resolves_dedups_and_applies_windows() {
        let request = AnalysisRequest::new(
            ["tcs", "INFY.NS", "TCS.NS"],
            date!(2022 - 01 - 01),
            date!(2022 - 01 - 10),
        )
        .with_window_for("INFY", 5);

        let (_, plan) = pipeline().plan(&request).expect("valid request");

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].ticker.as_str(), "TCS.NS");
        assert_eq!(plan[0].window, 20);
        assert_eq!(plan[0].company, "Tata Consultancy Services");
        assert_eq!(plan[1].window, 5);
    }

    #[test]
    fn plan_rejects_bad_requests() {
        let start = date!(2022 - 01 - 01);
        let end = date!(2022 - 01 - 10);
        let pipeline = pipeline();
        let empty: [&str; 0] = [];

        assert_eq!(
            pipeline.plan(&AnalysisRequest::new(empty, start, end)).map(|_| ()),
            Err(ValidationError::EmptySelection)
        );
        assert!(matches!(
            pipeline.plan(&AnalysisRequest::new(["WIPRO"], start, end)),
            Err(ValidationError::UnknownTicker { .. })
        ));
        assert!(matches!(
            pipeline.plan(&AnalysisRequest::new(["TCS"], end, start)),
            Err(ValidationError::InvertedDateRange { .. })
        ));
        assert_eq!(
            pipeline
                .plan(&AnalysisRequest::new(["TCS"], start, end).with_window(0))
                .map(|_| ()),
            Err(ValidationError::InvalidWindow)
        );
        assert!(matches!(
            pipeline.plan(&AnalysisRequest::new(["TCS"], start, end).with_window_for("INFY", 3)),
            Err(ValidationError::WindowForUnselected { .. })
        ));
    }

    #[test]
    fn date_range_is_checked_before_tickers() {
        let request =
            AnalysisRequest::new(["WIPRO"], date!(2022 - 01 - 10), date!(2022 - 01 - 01));

        assert!(matches!(
            pipeline().plan(&request),
            Err(ValidationError::InvertedDateRange { .. })
        ));
    }

    #[test]
    fn overrides_naming_the_same_ticker_must_agree() {
        let start = date!(2022 - 01 - 01);
        let end = date!(2022 - 01 - 10);
        let pipeline = pipeline();

        let conflicting = AnalysisRequest::new(["TCS"], start, end)
            .with_window_for("TCS", 5)
            .with_window_for("TCS.NS", 7);
        assert_eq!(
            pipeline.plan(&conflicting).map(|_| ()),
            Err(ValidationError::ConflictingWindows {
                symbol: String::from("TCS.NS"),
                first: 5,
                second: 7,
            })
        );

        let agreeing = AnalysisRequest::new(["TCS"], start, end)
            .with_window_for("tcs", 5)
            .with_window_for("TCS.NS", 5);
        let (_, plan) = pipeline.plan(&agreeing).expect("same window twice is fine");
        assert_eq!(plan[0].window, 5);
    }

    #[tokio::test]
    async fn degraded_items_become_warnings() {
        let request =
            AnalysisRequest::new(["TCS"], date!(2022 - 01 - 01), date!(2022 - 01 - 10));

        let report = pipeline().analyze(&request).await.expect("runs");

        assert!(report.tickers[0].outcome.is_empty());
        assert_eq!(report.warnings().len(), 1);
        assert!(report.warnings()[0].contains("Tata Consultancy Services"));
    }
}
