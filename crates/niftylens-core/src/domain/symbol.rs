use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 24;

/// Market qualifier appended to every raw NSE symbol.
pub const MARKET_SUFFIX: &str = ".NS";

/// Exchange-qualified ticker (raw symbol plus market suffix), e.g. `TCS.NS`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Parse and normalize an already qualified ticker to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !first.is_ascii_alphanumeric() {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
        }

        // NSE symbols use '&' and '-' (M&M, BAJAJ-AUTO).
        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '&' | '_');
            if !valid {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    /// Qualify a raw catalog symbol with [`MARKET_SUFFIX`].
    pub fn from_raw(raw: &str) -> Result<Self, ValidationError> {
        Self::parse(&format!("{}{MARKET_SUFFIX}", raw.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Symbol without the market suffix.
    pub fn base(&self) -> &str {
        self.0.strip_suffix(MARKET_SUFFIX).unwrap_or(&self.0)
    }
}

impl Display for TickerSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for TickerSymbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for TickerSymbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TickerSymbol> for String {
    fn from(value: TickerSymbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_market_suffix_to_raw_symbol() {
        let ticker = TickerSymbol::from_raw(" tcs ").expect("symbol should parse");
        assert_eq!(ticker.as_str(), "TCS.NS");
        assert_eq!(ticker.base(), "TCS");
    }

    #[test]
    fn accepts_nse_punctuation() {
        assert!(TickerSymbol::from_raw("M&M").is_ok());
        assert!(TickerSymbol::from_raw("BAJAJ-AUTO").is_ok());
        assert!(TickerSymbol::from_raw("3MINDIA").is_ok());
    }

    #[test]
    fn rejects_invalid_start() {
        let err = TickerSymbol::parse("-TCS.NS").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidStart { .. }));
    }

    #[test]
    fn rejects_invalid_chars() {
        let err = TickerSymbol::parse("TCS$.NS").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidChar { index: 3, .. }));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(TickerSymbol::parse("   "), Err(ValidationError::EmptySymbol));
    }
}
