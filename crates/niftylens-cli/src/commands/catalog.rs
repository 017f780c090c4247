use niftylens_core::{Catalog, NiftylensConfig};
use serde::Serialize;

use crate::cli::CatalogArgs;
use crate::error::CliError;
use crate::output::TextTable;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct CatalogRow<'a> {
    ticker: &'a str,
    symbol: &'a str,
    company: &'a str,
}

#[derive(Debug, Serialize)]
struct CatalogResponseData<'a> {
    query: Option<&'a str>,
    matched: usize,
    tickers: Vec<CatalogRow<'a>>,
}

pub fn run(args: &CatalogArgs, config: &NiftylensConfig) -> Result<CommandResult, CliError> {
    if args.limit == Some(0) {
        return Err(CliError::Command(String::from(
            "--limit must be greater than zero",
        )));
    }

    let catalog = Catalog::load(&config.catalog_path)?;
    let query = args.search.as_deref().map(str::trim);
    let matches = catalog.search(query.unwrap_or_default());
    let matched = matches.len();

    let rows: Vec<CatalogRow<'_>> = matches
        .into_iter()
        .take(args.limit.unwrap_or(usize::MAX))
        .map(|entry| CatalogRow {
            ticker: entry.ticker.as_str(),
            symbol: entry.ticker.base(),
            company: entry.company.as_str(),
        })
        .collect();

    let mut table = TextTable::new(["ticker", "company"]);
    for row in &rows {
        table.push(vec![row.ticker.to_owned(), row.company.to_owned()]);
    }
    let mut text = table.render();
    if rows.len() < matched {
        text.push_str(&format!("({} of {matched} shown)\n", rows.len()));
    }

    let data = serde_json::to_value(CatalogResponseData {
        query,
        matched,
        tickers: rows,
    })?;
    Ok(CommandResult::ok(data, text))
}
