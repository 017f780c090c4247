//! Per-ticker daily history retrieval with failure isolation.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::cache::{CacheKey, CacheMode, CacheStore};
use crate::data_source::{PriceSource, SourceError};
use crate::{format_date, DateRange, FetchError, Outcome, PriceSeries, TickerSymbol};

/// Result of fetching one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesOutcome {
    pub ticker: TickerSymbol,
    pub outcome: Outcome<PriceSeries, FetchError>,
}

/// Batch result in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchReport {
    pub entries: Vec<SeriesOutcome>,
}

impl FetchReport {
    pub fn get(&self, ticker: &TickerSymbol) -> Option<&Outcome<PriceSeries, FetchError>> {
        self.entries
            .iter()
            .find(|entry| &entry.ticker == ticker)
            .map(|entry| &entry.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FetchError> {
        self.entries.iter().filter_map(|entry| entry.outcome.failure())
    }

    pub fn success_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome.is_success())
            .count()
    }
}

/// Fans out one provider call per ticker, at most `concurrency` at a time.
///
/// A failing ticker is reported in its own slot; the rest of the batch
/// still completes.
#[derive(Clone)]
pub struct SeriesFetcher {
    source: Arc<dyn PriceSource>,
    cache: CacheStore<PriceSeries>,
    concurrency: usize,
    deadline: Option<Duration>,
}

impl SeriesFetcher {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            cache: CacheStore::disabled(),
            concurrency: 1,
            deadline: None,
        }
    }

    pub fn with_cache(mut self, cache: CacheStore<PriceSeries>) -> Self {
        self.cache = cache;
        self
    }

    /// Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Upper bound on each provider call, on top of the transport timeout.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cache(&self) -> &CacheStore<PriceSeries> {
        &self.cache
    }

    pub async fn fetch(
        &self,
        tickers: &[TickerSymbol],
        range: DateRange,
        mode: CacheMode,
    ) -> FetchReport {
        let entries = stream::iter(tickers.iter().cloned())
            .map(|ticker| async move {
                let outcome = self.fetch_one(&ticker, range, mode).await;
                SeriesOutcome { ticker, outcome }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let report = FetchReport { entries };
        tracing::info!(
            source = self.source.id(),
            requested = tickers.len(),
            succeeded = report.success_count(),
            "price fetch finished"
        );
        report
    }

    async fn fetch_one(
        &self,
        ticker: &TickerSymbol,
        range: DateRange,
        mode: CacheMode,
    ) -> Outcome<PriceSeries, FetchError> {
        let key = CacheKey::new(
            "daily_history",
            [
                ticker.to_string(),
                format_date(range.start()),
                format_date(range.end()),
            ],
        );

        if mode.reads() {
            if let Some(series) = self.cache.get(&key).await {
                tracing::debug!(%ticker, "price cache hit");
                return classify(series);
            }
        }

        match self.call_source(ticker, range).await {
            Ok(series) => {
                if mode.writes() {
                    self.cache.put(key, series.clone()).await;
                }
                classify(series)
            }
            Err(error) => {
                tracing::warn!(%ticker, code = error.code(), error = %error, "price fetch failed");
                Outcome::Failure(FetchError::new(ticker.as_str(), error))
            }
        }
    }

    async fn call_source(
        &self,
        ticker: &TickerSymbol,
        range: DateRange,
    ) -> Result<PriceSeries, SourceError> {
        let call = self.source.daily_history(ticker, range);
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, call).await.map_err(|_| {
                SourceError::unavailable(format!(
                    "{} did not answer within {} ms",
                    self.source.id(),
                    deadline.as_millis()
                ))
            })?,
            None => call.await,
        }
    }
}

fn classify(series: PriceSeries) -> Outcome<PriceSeries, FetchError> {
    if series.is_empty() {
        Outcome::Empty
    } else {
        Outcome::Success(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceFuture;
    use crate::PriceBar;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::macros::date;

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl PriceSource for CountingSource {
        fn id(&self) -> &'static str {
            "counting"
        }

        fn daily_history<'a>(
            &'a self,
            ticker: &'a TickerSymbol,
            _range: DateRange,
        ) -> SourceFuture<'a, PriceSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                match ticker.base() {
                    "DOWN" => Err(SourceError::unavailable("connection refused")),
                    "NODATA" => Ok(PriceSeries::empty(ticker.clone())),
                    _ => {
                        let bar = PriceBar::new(date!(2022 - 01 - 03), 1.0, 2.0, 0.5, 1.5, None)
                            .expect("valid bar");
                        Ok(PriceSeries::new(ticker.clone(), vec![bar]))
                    }
                }
            })
        }
    }

    fn tickers(values: &[&str]) -> Vec<TickerSymbol> {
        values
            .iter()
            .map(|value| TickerSymbol::parse(value).expect("valid ticker"))
            .collect()
    }

    fn range() -> DateRange {
        DateRange::new(date!(2022 - 01 - 01), date!(2022 - 01 - 10)).expect("valid range")
    }

    #[tokio::test]
    async fn classifies_each_ticker_independently() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let fetcher = SeriesFetcher::new(source).with_concurrency(2);
        let requested = tickers(&["TCS.NS", "DOWN.NS", "NODATA.NS"]);

        let report = fetcher.fetch(&requested, range(), CacheMode::Use).await;

        assert_eq!(report.entries.len(), 3);
        assert!(report.entries[0].outcome.is_success());
        let failure = report.entries[1].outcome.failure().expect("failure");
        assert_eq!(failure.ticker, "DOWN.NS");
        assert!(report.entries[2].outcome.is_empty());
    }

    #[tokio::test]
    async fn cache_serves_repeat_calls_but_not_failures() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let fetcher = SeriesFetcher::new(source.clone())
            .with_cache(CacheStore::new(Duration::from_secs(60)));
        let requested = tickers(&["TCS.NS", "DOWN.NS"]);

        fetcher.fetch(&requested, range(), CacheMode::Use).await;
        fetcher.fetch(&requested, range(), CacheMode::Use).await;

        // TCS once, DOWN twice.
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);

        fetcher.fetch(&requested, range(), CacheMode::Refresh).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn bypass_leaves_cache_untouched() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = CacheStore::new(Duration::from_secs(60));
        let fetcher = SeriesFetcher::new(source).with_cache(cache.clone());

        fetcher
            .fetch(&tickers(&["TCS.NS"]), range(), CacheMode::Bypass)
            .await;

        assert!(cache.is_empty().await);
    }
}
