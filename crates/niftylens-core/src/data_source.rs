//! Provider contracts and the adapter-level error type.
//!
//! | Trait | Call | Response |
//! |-------|------|----------|
//! | [`PriceSource`] | one ticker over a [`DateRange`] | [`PriceSeries`] (possibly empty) |
//! | [`NewsSource`] | one exact-phrase query | raw [`NewsArticle`] list |
//!
//! Both traits return boxed futures so adapters stay object safe and can be
//! shared behind `Arc<dyn ...>`.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{DateRange, NewsArticle, PriceSeries, TickerSymbol};

/// Boxed future returned by provider calls.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Malformed,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(provider: &str, status: u16) -> Self {
        let message = format!("{provider} returned status {status}");
        match status {
            429 => Self::rate_limited(message),
            400..=499 => Self::invalid_request(message),
            _ => Self::unavailable(message),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Malformed => "source.malformed",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Market-data provider contract.
///
/// Implementations return an empty [`PriceSeries`] when the provider has no
/// sessions for the ticker and range; `Err` is reserved for calls that did
/// not complete or could not be understood.
pub trait PriceSource: Send + Sync {
    /// Short provider name used in logs.
    fn id(&self) -> &'static str;

    fn daily_history<'a>(
        &'a self,
        ticker: &'a TickerSymbol,
        range: DateRange,
    ) -> SourceFuture<'a, PriceSeries>;
}

/// News provider contract.
///
/// `phrase` is matched verbatim by the provider; implementations handle the
/// quoting. Any non-success response is an `Err`.
pub trait NewsSource: Send + Sync {
    fn id(&self) -> &'static str;

    fn search_phrase<'a>(&'a self, phrase: &'a str) -> SourceFuture<'a, Vec<NewsArticle>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_http_statuses() {
        assert_eq!(
            SourceError::from_status("newsapi", 429).kind(),
            SourceErrorKind::RateLimited
        );
        assert_eq!(
            SourceError::from_status("newsapi", 401).kind(),
            SourceErrorKind::InvalidRequest
        );
        assert_eq!(
            SourceError::from_status("newsapi", 500).kind(),
            SourceErrorKind::Unavailable
        );
    }

    #[test]
    fn display_includes_stable_code() {
        let error = SourceError::malformed("bad json");
        assert_eq!(error.to_string(), "bad json (source.malformed)");
        assert!(!error.retryable());
    }
}
