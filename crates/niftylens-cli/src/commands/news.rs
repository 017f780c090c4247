use std::sync::Arc;

use niftylens_core::news_filter::company_name;
use niftylens_core::{
    CacheMode, NewsApiSource, NewsFilter, NewsReport, NiftylensConfig, ReqwestHttpClient,
};

use crate::cli::NewsArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &NewsArgs, config: &NiftylensConfig) -> Result<CommandResult, CliError> {
    let names = args
        .names
        .iter()
        .map(|name| company_name(name))
        .collect::<Result<Vec<_>, _>>()?;

    let source = NewsApiSource::new(
        Arc::new(ReqwestHttpClient::new()),
        config.news_api_key.clone(),
    )
    .with_timeout_ms(config.timeout_ms);
    let filter = NewsFilter::new(Arc::new(source)).with_concurrency(config.concurrency);

    let report = filter.filter(&names, CacheMode::Bypass).await;

    let warnings = news_warnings(&report);
    let text = render_news(&report);
    let data = serde_json::to_value(&report)?;
    Ok(CommandResult::ok(data, text).with_warnings(warnings))
}

fn news_warnings(report: &NewsReport) -> Vec<String> {
    report
        .failures()
        .map(|(company, error)| format!("news query failed for {company}: {error}"))
        .collect()
}

/// Articles in input-name order, or the empty-result notice.
pub fn render_news(report: &NewsReport) -> String {
    let articles = report.articles();
    if articles.is_empty() {
        return String::from("No relevant news articles found.\n");
    }

    let mut text = String::new();
    for article in articles {
        text.push_str(&format!("* {}\n", article.title));
        if let Some(summary) = article.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            text.push_str(&format!("  {}\n", summary.trim()));
        }
        if !article.url.is_empty() {
            text.push_str(&format!("  {}\n", article.url));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use niftylens_core::{FilteredArticleSet, NewsArticle, Outcome, SourceError};

    fn set(company: &str, outcome: Outcome<Vec<NewsArticle>, SourceError>) -> FilteredArticleSet {
        FilteredArticleSet {
            company: company.to_owned(),
            fetched: 0,
            outcome,
        }
    }

    #[test]
    fn empty_report_prints_notice() {
        let report = NewsReport {
            sets: vec![set("Infosys", Outcome::Empty)],
        };
        assert_eq!(render_news(&report), "No relevant news articles found.\n");
    }

    #[test]
    fn failures_become_warnings() {
        let report = NewsReport {
            sets: vec![set("Wipro", Outcome::Failure(SourceError::from_status("newsapi", 500)))],
        };
        let warnings = news_warnings(&report);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("news query failed for Wipro"));
    }

    #[test]
    fn articles_show_title_summary_and_link() {
        let article = NewsArticle {
            title: String::from("Infosys beats estimates"),
            summary: Some(String::from("Revenue grew 20%")),
            url: String::from("https://news.test/infy"),
            source_name: None,
            author: None,
            published_at: None,
        };
        let report = NewsReport {
            sets: vec![set("Infosys", Outcome::Success(vec![article]))],
        };
        assert_eq!(
            render_news(&report),
            "* Infosys beats estimates\n  Revenue grew 20%\n  https://news.test/infy\n"
        );
    }
}
