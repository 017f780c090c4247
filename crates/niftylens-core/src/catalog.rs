//! Reference table of NSE tickers and company names.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::{CatalogError, TickerSymbol, ValidationError};

const SYMBOL_COLUMN: &str = "Symbol";
const NAME_COLUMN: &str = "Company Name";

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub ticker: TickerSymbol,
    pub company: String,
}

/// Ordered ticker to company-name mapping, read-only once loaded.
///
/// Raw symbols are qualified with [`MARKET_SUFFIX`](crate::MARKET_SUFFIX)
/// at load time. A symbol listed twice keeps its first position and takes
/// the later row's name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<TickerSymbol, usize>,
}

impl Catalog {
    /// Load a catalog CSV from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let catalog = Self::from_reader(File::open(path)?)?;
        tracing::debug!(path = %path.display(), tickers = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    /// Parse catalog CSV with a header row containing `Symbol` and
    /// `Company Name`. Other columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let symbol_at = column_index(&headers, SYMBOL_COLUMN)?;
        let name_at = column_index(&headers, NAME_COLUMN)?;

        let mut catalog = Self::default();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let raw_symbol = record.get(symbol_at).unwrap_or_default();
            let company = record.get(name_at).unwrap_or_default();

            let entry = parse_row(raw_symbol, company)
                .map_err(|source| CatalogError::InvalidRow { line, source })?;
            catalog.insert(entry);
        }

        Ok(catalog)
    }

    /// Build a catalog from already qualified pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    fn insert(&mut self, entry: CatalogEntry) {
        match self.index.get(&entry.ticker) {
            Some(&position) => self.entries[position].company = entry.company,
            None => {
                self.index.insert(entry.ticker.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, ticker: &TickerSymbol) -> bool {
        self.index.contains_key(ticker)
    }

    pub fn company_name(&self, ticker: &TickerSymbol) -> Option<&str> {
        self.index
            .get(ticker)
            .map(|&position| self.entries[position].company.as_str())
    }

    /// Entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Case-insensitive substring match on ticker or company name.
    pub fn search<'a>(&'a self, text: &str) -> Vec<&'a CatalogEntry> {
        let needle = text.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                needle.is_empty()
                    || entry.ticker.as_str().to_lowercase().contains(&needle)
                    || entry.company.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Resolve user input to a listed ticker. Bare symbols get the market
    /// suffix.
    pub fn resolve(&self, input: &str) -> Result<TickerSymbol, ValidationError> {
        let direct = TickerSymbol::parse(input)?;
        if self.contains(&direct) {
            return Ok(direct);
        }
        if let Ok(qualified) = TickerSymbol::from_raw(input) {
            if self.contains(&qualified) {
                return Ok(qualified);
            }
        }
        Err(ValidationError::UnknownTicker {
            symbol: direct.to_string(),
        })
    }
}

fn column_index(headers: &StringRecord, column: &'static str) -> Result<usize, CatalogError> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(column))
        .ok_or(CatalogError::MissingColumn { column })
}

fn parse_row(raw_symbol: &str, company: &str) -> Result<CatalogEntry, ValidationError> {
    if raw_symbol.is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    if company.is_empty() {
        return Err(ValidationError::EmptyCompanyName);
    }
    Ok(CatalogEntry {
        ticker: TickerSymbol::from_raw(raw_symbol)?,
        company: company.to_owned(),
    })
}
