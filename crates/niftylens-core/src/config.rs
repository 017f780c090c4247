//! Runtime settings with environment overrides.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CATALOG_PATH: &str = "All_Indian_Stocks_listed_in_nifty500.csv";
pub const DEFAULT_SMA_WINDOW: usize = 20;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Settings shared by the pipeline and the CLI.
///
/// | Field | Variable | Default |
/// |-------|----------|---------|
/// | `catalog_path` | `NIFTYLENS_CATALOG` | `All_Indian_Stocks_listed_in_nifty500.csv` |
/// | `news_api_key` | `NIFTYLENS_NEWS_API_KEY`, then `NEWS_API_KEY` | none |
/// | `timeout_ms` | `NIFTYLENS_TIMEOUT_MS` | 10000 |
/// | `concurrency` | `NIFTYLENS_CONCURRENCY` | 4 |
/// | `cache_ttl` | `NIFTYLENS_CACHE_TTL_SECS` (0 disables) | 300 s |
#[derive(Clone, PartialEq, Eq)]
pub struct NiftylensConfig {
    pub catalog_path: PathBuf,
    pub news_api_key: Option<String>,
    pub timeout_ms: u64,
    pub concurrency: usize,
    pub cache_ttl: Duration,
    pub default_window: usize,
}

impl Default for NiftylensConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            news_api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            default_window: DEFAULT_SMA_WINDOW,
        }
    }
}

impl NiftylensConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unparsable numbers keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = non_blank(lookup("NIFTYLENS_CATALOG")) {
            config.catalog_path = PathBuf::from(path);
        }
        config.news_api_key = non_blank(lookup("NIFTYLENS_NEWS_API_KEY"))
            .or_else(|| non_blank(lookup("NEWS_API_KEY")));

        if let Some(timeout_ms) = parse_number::<u64>(&lookup, "NIFTYLENS_TIMEOUT_MS") {
            config.timeout_ms = timeout_ms.max(1);
        }
        if let Some(concurrency) = parse_number::<usize>(&lookup, "NIFTYLENS_CONCURRENCY") {
            config.concurrency = concurrency.max(1);
        }
        if let Some(secs) = parse_number::<u64>(&lookup, "NIFTYLENS_CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(secs);
        }

        config
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }

    pub fn with_news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms.max(1);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

impl std::fmt::Debug for NiftylensConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NiftylensConfig")
            .field("catalog_path", &self.catalog_path)
            .field(
                "news_api_key",
                &self.news_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout_ms", &self.timeout_ms)
            .field("concurrency", &self.concurrency)
            .field("cache_ttl", &self.cache_ttl)
            .field("default_window", &self.default_window)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = non_blank(lookup(name))?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = NiftylensConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, NiftylensConfig::default());
        assert_eq!(config.default_window, 20);
        assert_eq!(
            config.catalog_path,
            PathBuf::from("All_Indian_Stocks_listed_in_nifty500.csv")
        );
    }

    #[test]
    fn prefixed_key_wins_over_generic_fallback() {
        let config = NiftylensConfig::from_lookup(lookup_from(&[
            ("NIFTYLENS_NEWS_API_KEY", "primary"),
            ("NEWS_API_KEY", "fallback"),
        ]));
        assert_eq!(config.news_api_key.as_deref(), Some("primary"));

        let config = NiftylensConfig::from_lookup(lookup_from(&[
            ("NIFTYLENS_NEWS_API_KEY", " "),
            ("NEWS_API_KEY", "fallback"),
        ]));
        assert_eq!(config.news_api_key.as_deref(), Some("fallback"));
    }

    #[test]
    fn numeric_overrides_and_bad_values() {
        let config = NiftylensConfig::from_lookup(lookup_from(&[
            ("NIFTYLENS_TIMEOUT_MS", "2500"),
            ("NIFTYLENS_CONCURRENCY", "0"),
            ("NIFTYLENS_CACHE_TTL_SECS", "soon"),
        ]));
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = NiftylensConfig::default().with_news_api_key("secret-key");
        assert!(!format!("{config:?}").contains("secret-key"));
    }
}
