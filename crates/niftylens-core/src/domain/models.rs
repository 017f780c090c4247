use serde::{Deserialize, Serialize};
use time::Date;

use super::date_range::iso_date;
use crate::{DateRange, TickerSymbol};

/// Reason a provider row was rejected during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarRejection {
    NonFinite(&'static str),
    Negative(&'static str),
    HighBelowLow,
}

/// One daily OHLCV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PriceBar {
    pub fn new(
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, BarRejection> {
        validate_price("open", open)?;
        validate_price("high", high)?;
        validate_price("low", low)?;
        validate_price("close", close)?;

        if high < low {
            return Err(BarRejection::HighBelowLow);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Ordered daily history for one ticker over a date range.
///
/// An empty `bars` vector means the provider had no sessions for the range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: TickerSymbol,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: TickerSymbol, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.date);
        Self { ticker, bars }
    }

    pub fn empty(ticker: TickerSymbol) -> Self {
        Self {
            ticker,
            bars: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Keep only sessions in `[range.start, range.end)`.
    pub fn clamp_to(mut self, range: &DateRange) -> Self {
        self.bars
            .retain(|bar| bar.date >= range.start() && bar.date < range.end());
        self
    }
}

/// A price row paired with its simple moving average of `close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    #[serde(flatten)]
    pub bar: PriceBar,
    /// `None` until `window` rows are available.
    pub sma: Option<f64>,
}

/// [`PriceSeries`] augmented with an SMA column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub ticker: TickerSymbol,
    pub window: usize,
    pub rows: Vec<DerivedRow>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sma_values(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|row| row.sma).collect()
    }
}

/// News item as returned by the news provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    /// Provider `description`; often absent.
    pub summary: Option<String>,
    pub url: String,
    pub source_name: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
}

fn validate_price(field: &'static str, value: f64) -> Result<(), BarRejection> {
    if !value.is_finite() {
        return Err(BarRejection::NonFinite(field));
    }
    if value < 0.0 {
        return Err(BarRejection::Negative(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn rejects_high_below_low() {
        let err = PriceBar::new(date!(2022 - 01 - 03), 10.0, 9.0, 11.0, 10.0, None)
            .expect_err("must fail");
        assert_eq!(err, BarRejection::HighBelowLow);
    }

    #[test]
    fn rejects_nan_close() {
        let err = PriceBar::new(date!(2022 - 01 - 03), 10.0, 11.0, 9.0, f64::NAN, None)
            .expect_err("must fail");
        assert_eq!(err, BarRejection::NonFinite("close"));
    }

    #[test]
    fn series_is_sorted_and_clamped() {
        let ticker = TickerSymbol::parse("TCS.NS").expect("valid");
        let bar = |d| PriceBar::new(d, 1.0, 1.0, 1.0, 1.0, None).expect("valid bar");
        let series = PriceSeries::new(
            ticker,
            vec![
                bar(date!(2022 - 01 - 05)),
                bar(date!(2022 - 01 - 03)),
                bar(date!(2022 - 01 - 10)),
            ],
        );
        assert_eq!(series.bars[0].date, date!(2022 - 01 - 03));

        let range = DateRange::new(date!(2022 - 01 - 01), date!(2022 - 01 - 10)).expect("range");
        let clamped = series.clamp_to(&range);
        assert_eq!(clamped.len(), 2);
    }

    #[test]
    fn derived_row_flattens_bar_fields() {
        let row = DerivedRow {
            bar: PriceBar::new(date!(2022 - 01 - 03), 1.0, 2.0, 0.5, 1.5, Some(10)).expect("bar"),
            sma: None,
        };
        let value = serde_json::to_value(&row).expect("serializes");
        assert_eq!(value["date"], "2022-01-03");
        assert_eq!(value["close"], 1.5);
        assert!(value["sma"].is_null());
    }
}
