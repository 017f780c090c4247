//! Behavior tests for loading the ticker catalog from disk.

use std::fs;

use niftylens_core::{Catalog, CatalogError};
use tempfile::tempdir;

use niftylens_tests::ticker;

const NIFTY_500_EXCERPT: &str = "\
Company Name,Industry,Symbol,Series,ISIN Code
Tata Consultancy Services Ltd.,Information Technology,TCS,EQ,INE467B01029
HDFC Bank Ltd.,Financial Services,HDFCBANK,EQ,INE040A01034
Bajaj Auto Ltd.,Automobile and Auto Components,BAJAJ-AUTO,EQ,INE917I01010
";

#[test]
fn user_loads_nifty_catalog_and_sees_suffixed_tickers() {
    // Given: the Nifty 500 reference file on disk
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("All_Indian_Stocks_listed_in_nifty500.csv");
    fs::write(&path, NIFTY_500_EXCERPT).expect("write catalog");

    // When: the catalog is loaded
    let catalog = Catalog::load(&path).expect("catalog loads");

    // Then: every symbol carries the NSE suffix, in file order
    let tickers: Vec<&str> = catalog.iter().map(|e| e.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["TCS.NS", "HDFCBANK.NS", "BAJAJ-AUTO.NS"]);

    // And: company names are looked up by ticker
    assert_eq!(
        catalog.company_name(&ticker("BAJAJ-AUTO.NS")),
        Some("Bajaj Auto Ltd.")
    );
}

#[test]
fn missing_catalog_file_is_reported_as_not_found() {
    // Given: a path with no file behind it
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("missing.csv");

    // When: loading is attempted
    let error = Catalog::load(&path).expect_err("load must fail");

    // Then: the error names the missing path
    match error {
        CatalogError::NotFound { path: reported } => assert_eq!(reported, path),
        other => panic!("expected NotFound, got {other}"),
    }
}

#[test]
fn catalog_without_symbol_column_is_a_parse_error() {
    // Given: a file lacking the Symbol column
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("broken.csv");
    fs::write(&path, "Company Name,Industry\nInfosys Ltd.,IT\n").expect("write catalog");

    // When / Then: loading reports the absent column
    let error = Catalog::load(&path).expect_err("load must fail");
    assert!(matches!(
        error,
        CatalogError::MissingColumn { column: "Symbol" }
    ));
}

#[test]
fn bundled_sample_catalog_loads() {
    // Given: the sample catalog shipped with the repository
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/nifty500_sample.csv");

    // When: it is loaded
    let catalog = Catalog::load(path).expect("sample catalog loads");

    // Then: the TCS row is present
    assert_eq!(
        catalog.company_name(&ticker("TCS.NS")),
        Some("Tata Consultancy Services Ltd.")
    );
    assert!(catalog.len() >= 10);
}
