//! Company-name relevance filtering over per-name news queries.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::cache::{CacheKey, CacheMode, CacheStore};
use crate::data_source::{NewsSource, SourceError};
use crate::{NewsArticle, Outcome, ValidationError};

/// True when `company` appears, ignoring case, in the article title or in
/// its summary. A missing summary only fails the summary test.
pub fn is_relevant(company: &str, article: &NewsArticle) -> bool {
    let needle = company.to_lowercase();
    let in_title = article.title.to_lowercase().contains(&needle);
    let in_summary = article
        .summary
        .as_deref()
        .is_some_and(|summary| summary.to_lowercase().contains(&needle));
    in_title || in_summary
}

/// Trim and reject blank company names before they reach a query.
pub fn company_name(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyCompanyName);
    }
    Ok(trimmed.to_owned())
}

/// Relevant articles for one company name.
///
/// `Empty` covers both "provider had nothing" and "nothing matched";
/// `fetched` tells them apart. `Failure` means the query itself failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredArticleSet {
    pub company: String,
    pub fetched: usize,
    pub outcome: Outcome<Vec<NewsArticle>, SourceError>,
}

impl FilteredArticleSet {
    pub fn articles(&self) -> &[NewsArticle] {
        self.outcome.success().map(Vec::as_slice).unwrap_or_default()
    }
}

/// Per-name results in the order names were supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewsReport {
    pub sets: Vec<FilteredArticleSet>,
}

impl NewsReport {
    /// All relevant articles, concatenated in input-name order.
    pub fn articles(&self) -> Vec<&NewsArticle> {
        self.sets.iter().flat_map(|set| set.articles()).collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SourceError)> {
        self.sets
            .iter()
            .filter_map(|set| set.outcome.failure().map(|e| (set.company.as_str(), e)))
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(|set| set.articles().is_empty())
    }
}

/// Issues one exact-phrase query per company name and keeps relevant hits.
#[derive(Clone)]
pub struct NewsFilter {
    source: Arc<dyn NewsSource>,
    cache: CacheStore<Vec<NewsArticle>>,
    concurrency: usize,
}

impl NewsFilter {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        Self {
            source,
            cache: CacheStore::disabled(),
            concurrency: 1,
        }
    }

    pub fn with_cache(mut self, cache: CacheStore<Vec<NewsArticle>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &CacheStore<Vec<NewsArticle>> {
        &self.cache
    }

    pub async fn filter<S: AsRef<str>>(&self, names: &[S], mode: CacheMode) -> NewsReport {
        let sets = stream::iter(names.iter().map(|name| name.as_ref().to_owned()))
            .map(|company| async move { self.filter_one(company, mode).await })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        NewsReport { sets }
    }

    async fn filter_one(&self, input: String, mode: CacheMode) -> FilteredArticleSet {
        let company = match company_name(&input) {
            Ok(company) => company,
            Err(error) => {
                tracing::warn!(company = %input, error = %error, "skipping news query");
                return FilteredArticleSet {
                    company: input,
                    fetched: 0,
                    outcome: Outcome::Failure(SourceError::invalid_request(error.to_string())),
                };
            }
        };
        let key = CacheKey::new("news", [company.as_str()]);

        let cached = if mode.reads() {
            self.cache.get(&key).await
        } else {
            None
        };

        let fetched = match cached {
            Some(articles) => {
                tracing::debug!(company = %company, "news cache hit");
                articles
            }
            None => match self.source.search_phrase(&company).await {
                Ok(articles) => {
                    if mode.writes() {
                        self.cache.put(key, articles.clone()).await;
                    }
                    articles
                }
                Err(error) => {
                    tracing::warn!(
                        company = %company,
                        source = self.source.id(),
                        code = error.code(),
                        error = %error,
                        "news query failed, contributing no articles"
                    );
                    return FilteredArticleSet {
                        company,
                        fetched: 0,
                        outcome: Outcome::Failure(error),
                    };
                }
            },
        };

        let total = fetched.len();
        let relevant: Vec<NewsArticle> = fetched
            .into_iter()
            .filter(|article| is_relevant(&company, article))
            .collect();
        tracing::debug!(company = %company, fetched = total, relevant = relevant.len(), "news filtered");

        let outcome = if relevant.is_empty() {
            Outcome::Empty
        } else {
            Outcome::Success(relevant)
        };
        FilteredArticleSet {
            company,
            fetched: total,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, summary: Option<&str>) -> NewsArticle {
        NewsArticle {
            title: title.to_owned(),
            summary: summary.map(str::to_owned),
            url: String::from("https://news.test/a"),
            source_name: None,
            author: None,
            published_at: None,
        }
    }

    #[test]
    fn title_match_ignores_case() {
        let hit = article("TATA CONSULTANCY SERVICES wins deal", None);
        assert!(is_relevant("Tata Consultancy Services", &hit));
    }

    #[test]
    fn summary_match_counts() {
        let hit = article("Sensex closes higher", Some("Gains led by infosys and TCS"));
        assert!(is_relevant("Infosys", &hit));
    }

    #[test]
    fn missing_summary_is_a_non_match_not_an_error() {
        let miss = article("Market update", None);
        assert!(!is_relevant("Infosys", &miss));
    }

    #[test]
    fn empty_title_with_no_summary_never_matches() {
        assert!(!is_relevant("Wipro", &article("", None)));
    }

    #[test]
    fn blank_company_name_is_rejected() {
        assert_eq!(company_name("   "), Err(ValidationError::EmptyCompanyName));
        assert_eq!(company_name(" Infosys ").as_deref(), Ok("Infosys"));
    }

    #[test]
    fn report_articles_skip_degraded_sets() {
        let report = NewsReport {
            sets: vec![
                FilteredArticleSet {
                    company: String::from("A"),
                    fetched: 1,
                    outcome: Outcome::Success(vec![article("A up", None)]),
                },
                FilteredArticleSet {
                    company: String::from("B"),
                    fetched: 0,
                    outcome: Outcome::Failure(SourceError::unavailable("down")),
                },
                FilteredArticleSet {
                    company: String::from("C"),
                    fetched: 3,
                    outcome: Outcome::Empty,
                },
            ],
        };

        let titles: Vec<&str> = report.articles().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["A up"]);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.is_empty());
    }
}
