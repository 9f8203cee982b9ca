//! Field-level request validation
//!
//! Request payloads deserialize into structs of optional fields so missing
//! values can be reported per field in the same response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::{ApiError, ApiResult};
use crate::constants::messages;

/// Integer payload field that also accepts numeric strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IntegerInput {
    Number(i64),
    Text(String),
}

impl IntegerInput {
    pub fn value(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl From<i64> for IntegerInput {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// `Ok(())` when no field failed
    pub fn into_result(self) -> ApiResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation { errors: self })
        }
    }

    /// Return the validated values, or every collected error
    ///
    /// `value` is `None` only when some check failed and recorded an error.
    pub fn finish<T>(self, value: Option<T>) -> ApiResult<T> {
        self.into_result()?;
        value.ok_or(ApiError::Internal)
    }

    /// Required, non-blank string of at most `max_len` characters
    pub fn required_str<'a>(
        &mut self,
        field: &str,
        value: &'a Option<String>,
        max_len: usize,
    ) -> Option<&'a str> {
        match value.as_deref() {
            None => {
                self.add(field, messages::REQUIRED_FIELD);
                None
            }
            Some(v) => self.check_str(field, v, max_len),
        }
    }

    /// Present-only check for partial updates
    pub fn optional_str<'a>(
        &mut self,
        field: &str,
        value: &'a Option<String>,
        max_len: usize,
    ) -> Option<&'a str> {
        value.as_deref().and_then(|v| self.check_str(field, v, max_len))
    }

    fn check_str<'a>(&mut self, field: &str, value: &'a str, max_len: usize) -> Option<&'a str> {
        if value.trim().is_empty() {
            self.add(field, messages::BLANK_FIELD);
            return None;
        }
        if value.chars().count() > max_len {
            self.add(
                field,
                format!("Ensure this field has no more than {max_len} characters."),
            );
            return None;
        }
        Some(value)
    }

    /// Integer value of a field, recording an error for non-numeric text
    pub fn integer(&mut self, field: &str, value: &IntegerInput) -> Option<i64> {
        let parsed = value.value();
        if parsed.is_none() {
            self.add(field, messages::INVALID_INTEGER);
        }
        parsed
    }

    /// Integer within `min..=max`
    pub fn in_range(&mut self, field: &str, value: i64, min: i64, max: i64) -> Option<i32> {
        if value < min {
            self.add(
                field,
                format!("Ensure this value is greater than or equal to {min}."),
            );
            return None;
        }
        if value > max {
            self.add(
                field,
                format!("Ensure this value is less than or equal to {max}."),
            );
            return None;
        }
        i32::try_from(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_str() {
        let mut errors = FieldErrors::new();
        assert_eq!(errors.required_str("name", &Some("Soup".into()), 10), Some("Soup"));
        assert_eq!(errors.required_str("text", &None, 10), None);
        assert_eq!(errors.required_str("slug", &Some("   ".into()), 10), None);
        assert_eq!(errors.required_str("long", &Some("x".repeat(11)), 10), None);

        assert!(!errors.has("name"));
        assert_eq!(errors.messages("text"), [messages::REQUIRED_FIELD]);
        assert_eq!(errors.messages("slug"), [messages::BLANK_FIELD]);
        assert!(errors.messages("long")[0].contains("no more than 10"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_in_range() {
        let mut errors = FieldErrors::new();
        assert_eq!(errors.in_range("cooking_time", 15, 1, 32000), Some(15));
        assert_eq!(errors.in_range("cooking_time", 0, 1, 32000), None);
        assert_eq!(errors.in_range("amount", 32001, 1, 32000), None);
        assert!(errors.has("cooking_time"));
        assert!(errors.has("amount"));
    }

    #[test]
    fn test_integer_input_accepts_numeric_strings() {
        let parsed: Vec<IntegerInput> = serde_json::from_str(r#"[10, "25", " 7 ", "ten"]"#).unwrap();
        let mut errors = FieldErrors::new();
        let values: Vec<Option<i64>> = parsed.iter().map(|v| errors.integer("amount", v)).collect();

        assert_eq!(values, vec![Some(10), Some(25), Some(7), None]);
        assert_eq!(errors.messages("amount"), [messages::INVALID_INTEGER]);
    }

    #[test]
    fn test_empty_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_finish_returns_values_or_errors() {
        let mut errors = FieldErrors::new();
        let soup = Some("Soup".to_string());
        let name = errors.required_str("name", &soup, 10);
        assert_eq!(errors.finish(name).unwrap(), "Soup");

        let mut errors = FieldErrors::new();
        let name = errors.required_str("name", &None, 10);
        assert!(matches!(errors.finish(name), Err(ApiError::Validation { .. })));
    }
}
