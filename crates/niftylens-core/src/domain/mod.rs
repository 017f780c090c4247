//! # Domain Models
//!
//! Canonical domain types for niftylens.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TickerSymbol`] | Exchange-qualified ticker (`TCS.NS`) |
//! | [`DateRange`] | Validated `start <= end` calendar window |
//! | [`PriceBar`] | Daily OHLCV row |
//! | [`PriceSeries`] | Ordered rows for one ticker |
//! | [`DerivedSeries`] | Rows plus a simple moving average column |
//! | [`NewsArticle`] | Headline, optional summary and link |
//!
//! Construction validates invariants; an inverted [`DateRange`] or a
//! malformed ticker cannot be represented.

mod date_range;
mod models;
mod symbol;

pub use date_range::{format_date, iso_date, parse_date, DateRange};
pub use models::{BarRejection, DerivedRow, DerivedSeries, NewsArticle, PriceBar, PriceSeries};
pub use symbol::{TickerSymbol, MARKET_SUFFIX};
