//! Filter criteria for similarity queries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Text condition: a single value or a set of accepted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextFilter {
    One(String),
    Many(Vec<String>),
}

impl TextFilter {
    /// True if `text` is one of the accepted values.
    pub fn contains(&self, text: &str) -> bool {
        match self {
            TextFilter::One(value) => value == text,
            TextFilter::Many(values) => values.iter().any(|v| v == text),
        }
    }
}

impl From<&str> for TextFilter {
    fn from(value: &str) -> Self {
        TextFilter::One(value.to_string())
    }
}

impl From<String> for TextFilter {
    fn from(value: String) -> Self {
        TextFilter::One(value)
    }
}

impl From<Vec<String>> for TextFilter {
    fn from(values: Vec<String>) -> Self {
        TextFilter::Many(values)
    }
}

impl From<Vec<&str>> for TextFilter {
    fn from(values: Vec<&str>) -> Self {
        TextFilter::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// A conjunction of an optional metadata condition and an optional text
/// condition. Absent conditions are vacuously true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Every key must be present in the document metadata with an equal value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    /// Document text must be one of these values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextFilter>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `metadata[key] == value` (builder pattern).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Require the document text to match (builder pattern).
    pub fn with_text(mut self, text: impl Into<TextFilter>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Include/exclude filter applied before scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Documents must match these criteria, when given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<FilterCriteria>,

    /// Documents must not match these criteria, when given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<FilterCriteria>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, criteria: FilterCriteria) -> Self {
        self.include = Some(criteria);
        self
    }

    pub fn exclude(mut self, criteria: FilterCriteria) -> Self {
        self.exclude = Some(criteria);
        self
    }

    /// True if neither include nor exclude criteria are set.
    pub fn is_empty(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_filter_contains() {
        let one = TextFilter::from("a");
        assert!(one.contains("a"));
        assert!(!one.contains("A"));

        let many = TextFilter::from(vec!["a", "b"]);
        assert!(many.contains("b"));
        assert!(!many.contains("c"));

        assert!(!TextFilter::Many(Vec::new()).contains(""));
    }

    #[test]
    fn test_text_filter_deserializes_string_or_list() {
        let one: TextFilter = serde_json::from_value(json!("a")).unwrap();
        assert_eq!(one, TextFilter::One("a".to_string()));

        let many: TextFilter = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(many, TextFilter::from(vec!["a", "b"]));
    }

    #[test]
    fn test_criteria_builder() {
        let criteria = FilterCriteria::new()
            .with_metadata("flag", true)
            .with_metadata("kind", "note")
            .with_text("a");

        let metadata = criteria.metadata.as_ref().unwrap();
        assert_eq!(metadata.get("flag"), Some(&json!(true)));
        assert_eq!(metadata.get("kind"), Some(&json!("note")));
        assert_eq!(criteria.text, Some(TextFilter::from("a")));
    }

    #[test]
    fn test_filter_options_from_json() {
        let options: FilterOptions = serde_json::from_value(json!({
            "include": {"text": ["a", "b"]},
            "exclude": {"metadata": {"flag": true}}
        }))
        .unwrap();

        assert!(!options.is_empty());
        assert_eq!(
            options.include.unwrap().text,
            Some(TextFilter::from(vec!["a", "b"]))
        );
        assert!(options.exclude.unwrap().metadata.is_some());
        assert!(FilterOptions::new().is_empty());
    }
}
