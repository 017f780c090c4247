//! Provider adapters.
//!
//! | Adapter | Contract | Upstream |
//! |---------|----------|----------|
//! | [`YahooChartSource`] | [`PriceSource`](crate::PriceSource) | Yahoo Finance chart API |
//! | [`NewsApiSource`] | [`NewsSource`](crate::NewsSource) | NewsAPI `everything` |

mod newsapi;
mod yahoo;

pub use newsapi::NewsApiSource;
pub use yahoo::YahooChartSource;
