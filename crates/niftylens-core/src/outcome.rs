//! Typed result of a single degraded-tolerant external call.

use serde::{Serialize, Serializer};

/// Result of one per-ticker or per-name call.
///
/// `Empty` is a successful call that produced nothing (no trading sessions,
/// no relevant articles); `Failure` is a call that did not complete. Callers
/// must not read a `Failure` as a true negative.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, E> {
    Success(T),
    Empty,
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&E> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Empty => Outcome::Empty,
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Empty => Outcome::Empty,
            Self::Failure(error) => Outcome::Failure(f(error)),
        }
    }

    pub const fn status(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Empty => "empty",
            Self::Failure(_) => "failure",
        }
    }
}

/// Wire shape: `{"status": "success", "data": ...}`, `{"status": "empty"}`
/// or `{"status": "failure", "reason": "..."}`.
impl<T, E> Serialize for Outcome<T, E>
where
    T: Serialize,
    E: std::fmt::Display,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            Self::Success(value) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("status", self.status())?;
                map.serialize_entry("data", value)?;
                map.end()
            }
            Self::Empty => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("status", self.status())?;
                map.end()
            }
            Self::Failure(error) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("status", self.status())?;
                map.serialize_entry("reason", &error.to_string())?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_each_variant_with_status_tag() {
        let ok: Outcome<u32, String> = Outcome::Success(7);
        let empty: Outcome<u32, String> = Outcome::Empty;
        let failed: Outcome<u32, String> = Outcome::Failure(String::from("HTTP 500"));

        assert_eq!(
            serde_json::to_string(&ok).expect("serializes"),
            r#"{"status":"success","data":7}"#
        );
        assert_eq!(
            serde_json::to_string(&empty).expect("serializes"),
            r#"{"status":"empty"}"#
        );
        assert_eq!(
            serde_json::to_string(&failed).expect("serializes"),
            r#"{"status":"failure","reason":"HTTP 500"}"#
        );
    }

    #[test]
    fn map_preserves_degraded_variants() {
        let empty: Outcome<u32, String> = Outcome::Empty;
        assert!(empty.map(|v| v + 1).is_empty());

        let failed: Outcome<u32, String> = Outcome::Failure(String::from("x"));
        assert_eq!(failed.map_err(|e| e.len()).failure(), Some(&1));
    }
}
