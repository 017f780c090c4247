use std::sync::Arc;

use serde::Deserialize;
use time::OffsetDateTime;

use crate::data_source::{PriceSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{DateRange, PriceBar, PriceSeries, TickerSymbol};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Daily history from the Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooChartSource {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl YahooChartSource {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: 10_000,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn endpoint(&self, ticker: &TickerSymbol, range: &DateRange) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            urlencoding::encode(ticker.as_str()),
            range.start_unix(),
            range.end_unix(),
        )
    }

    async fn fetch(&self, ticker: &TickerSymbol, range: DateRange) -> Result<PriceSeries, SourceError> {
        if range.is_empty() {
            tracing::debug!(ticker = %ticker, %range, "empty range, skipping yahoo request");
            return Ok(PriceSeries::empty(ticker.clone()));
        }

        let request = HttpRequest::get(self.endpoint(ticker, &range))
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);

        tracing::debug!(ticker = %ticker, %range, "requesting yahoo chart");

        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.retryable() {
                SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
            } else {
                SourceError::invalid_request(format!("yahoo transport error: {}", error.message()))
            }
        })?;

        if !response.is_success() {
            // Unknown or delisted symbols come back as 404 with a "Not Found" chart error.
            if response.status == 404 && reports_no_data(&response.body) {
                return Ok(PriceSeries::empty(ticker.clone()));
            }
            return Err(SourceError::from_status("yahoo", response.status));
        }

        parse_chart(ticker, &response.body, &range)
    }
}

impl PriceSource for YahooChartSource {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    fn daily_history<'a>(
        &'a self,
        ticker: &'a TickerSymbol,
        range: DateRange,
    ) -> SourceFuture<'a, PriceSeries> {
        Box::pin(async move { self.fetch(ticker, range).await })
    }
}

fn reports_no_data(body: &str) -> bool {
    serde_json::from_str::<YahooChartResponse>(body)
        .ok()
        .and_then(|response| response.chart.error)
        .is_some_and(|error| error.is_no_data())
}

fn parse_chart(
    ticker: &TickerSymbol,
    body: &str,
    range: &DateRange,
) -> Result<PriceSeries, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {}", e)))?;

    if let Some(error) = response.chart.error {
        if error.is_no_data() {
            return Ok(PriceSeries::empty(ticker.clone()));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo chart API error: {}",
            error.describe()
        )));
    }

    let Some(result) = response.chart.result.and_then(|results| results.into_iter().next()) else {
        return Ok(PriceSeries::empty(ticker.clone()));
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(PriceSeries::empty(ticker.clone()));
    };
    let gmt_offset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts_value) in timestamps.iter().enumerate() {
        let session = OffsetDateTime::from_unix_timestamp(ts_value + gmt_offset)
            .map_err(|e| SourceError::malformed(format!("invalid timestamp: {}", e)))?;

        // Only keep rows where every OHLC value is present.
        if let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(i),
            quote.high.get(i),
            quote.low.get(i),
            quote.close.get(i),
        ) {
            let volume = quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .and_then(|v| u64::try_from(v).ok());

            match PriceBar::new(session.date(), *open, *high, *low, *close, volume) {
                Ok(bar) => bars.push(bar),
                Err(rejection) => {
                    tracing::debug!(ticker = %ticker, ?rejection, "dropping invalid yahoo row");
                }
            }
        }
    }

    Ok(PriceSeries::new(ticker.clone(), bars).clamp_to(range))
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooChartError {
    fn is_no_data(&self) -> bool {
        let code = self.code.as_deref().unwrap_or_default();
        let description = self.description.as_deref().unwrap_or_default();
        code.eq_ignore_ascii_case("Not Found")
            || description.to_ascii_lowercase().contains("no data found")
    }

    fn describe(&self) -> String {
        format!(
            "{}: {}",
            self.code.as_deref().unwrap_or("unknown"),
            self.description.as_deref().unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}
