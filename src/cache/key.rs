//! Deterministic cache-key suffixes for structured search parameters.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Builds a canonical key suffix from search parameters.
///
/// Parameters are ordered by name, values are trimmed and lower-cased and
/// empty values are skipped, so the same logical query always yields the
/// same suffix: `adults=2&from=jfk&to=lhr`. Names and values are
/// percent-encoded, so a value containing `&` or `=` cannot pose as
/// another parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryKey {
    params: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter. Later values for the same name replace earlier ones.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string().trim().to_lowercase();
        if !value.is_empty() {
            self.params.insert(name.into(), value);
        }
        self
    }

    /// Collects the top-level fields of a serializable value.
    ///
    /// Nulls are skipped; nested arrays and objects are kept as compact JSON.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self> {
        let mut key = Self::new();
        match serde_json::to_value(value)? {
            Value::Object(fields) => {
                for (name, field) in fields {
                    key = match field {
                        Value::Null => key,
                        Value::String(s) => key.param(name, s),
                        other => key.param(name, other),
                    };
                }
            }
            Value::Null => {}
            Value::String(s) => key = key.param("q", s),
            other => key = key.param("q", other),
        }
        Ok(key)
    }

    /// Renders the suffix.
    pub fn build(&self) -> String {
        self.params
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_sorted() {
        let key = QueryKey::new()
            .param("to", "LHR")
            .param("from", "JFK")
            .param("adults", 2)
            .build();

        assert_eq!(key, "adults=2&from=jfk&to=lhr");
    }

    #[test]
    fn test_normalization_makes_equivalent_queries_equal() {
        let a = QueryKey::new().param("city", " Paris ").param("nights", 3);
        let b = QueryKey::new().param("nights", "3").param("city", "paris");

        assert_eq!(a.build(), b.build());
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let key = QueryKey::new().param("city", "rome").param("promo", "  ").build();
        assert_eq!(key, "city=rome");
    }

    #[test]
    fn test_separators_in_values_do_not_collide() {
        let smuggled = QueryKey::new().param("city", "rome&nights=3").build();
        let genuine = QueryKey::new()
            .param("city", "rome")
            .param("nights", 3)
            .build();

        assert_ne!(smuggled, genuine);
        assert_eq!(smuggled, "city=rome%26nights%3D3");
        assert_eq!(genuine, "city=rome&nights=3");
    }

    #[test]
    fn test_separators_in_names_are_encoded() {
        let key = QueryKey::new().param("a=b", "c").build();
        assert_eq!(key, "a%3Db=c");
    }

    #[test]
    fn test_from_serializable() {
        #[derive(Serialize)]
        struct HotelSearch {
            city: String,
            guests: u32,
            promo: Option<String>,
        }

        let search = HotelSearch {
            city: "Lisbon".to_string(),
            guests: 2,
            promo: None,
        };

        let key = QueryKey::from_serializable(&search).unwrap().build();
        assert_eq!(key, "city=lisbon&guests=2");
    }
}
