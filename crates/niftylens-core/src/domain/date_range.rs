use std::fmt::{Display, Formatter};

use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), ISO_DATE).map_err(|_| ValidationError::InvalidDate {
        value: input.to_owned(),
    })
}

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(ISO_DATE)
        .unwrap_or_else(|_| String::from("<unformattable>"))
}

/// Serde adapter for `YYYY-MM-DD` dates.
pub mod iso_date {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(value: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        super::parse_date(&value).map_err(D::Error::custom)
    }
}

/// Calendar window selected by the user, `start <= end`.
///
/// Providers treat `end` as exclusive, so `start == end` selects no sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    #[serde(with = "iso_date")]
    start: Date,
    #[serde(with = "iso_date")]
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedDateRange {
                start: format_date(start),
                end: format_date(end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    /// True when `start == end`; no session can fall inside.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Unix seconds at 00:00 UTC of the start date.
    pub fn start_unix(&self) -> i64 {
        midnight_unix(self.start)
    }

    /// Unix seconds at 00:00 UTC of the end date.
    pub fn end_unix(&self) -> i64 {
        midnight_unix(self.end)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", format_date(self.start), format_date(self.end))
    }
}

fn midnight_unix(date: Date) -> i64 {
    OffsetDateTime::new_utc(date, Time::MIDNIGHT).unix_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let range = DateRange::parse("2022-01-01", "2023-01-01").expect("valid range");
        assert_eq!(range.to_string(), "2022-01-01..2023-01-01");
        assert_eq!(range.start_unix(), 1_640_995_200);
    }

    #[test]
    fn rejects_inverted_range() {
        let err = DateRange::parse("2023-01-02", "2023-01-01").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvertedDateRange { .. }));
    }

    #[test]
    fn accepts_single_day_range() {
        let range = DateRange::parse("2023-01-01", "2023-01-01").expect("valid range");
        assert!(range.is_empty());
        assert!(!DateRange::parse("2023-01-01", "2023-01-02").expect("valid range").is_empty());
    }

    #[test]
    fn rejects_malformed_date() {
        let err = parse_date("01/02/2023").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn serializes_as_iso_strings() {
        let range = DateRange::parse("2022-01-01", "2022-01-10").expect("valid range");
        let json = serde_json::to_string(&range).expect("serializes");
        assert_eq!(json, r#"{"start":"2022-01-01","end":"2022-01-10"}"#);
    }
}
