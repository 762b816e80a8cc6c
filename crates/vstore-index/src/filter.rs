//! Include/exclude predicates over document metadata and text.
//!
//! Metadata is compared through its JSON form, so any serializable payload
//! can be filtered. A criteria key must be present in the document's
//! metadata object with an equal value; a missing key never matches.

use serde::Serialize;
use serde_json::{Map, Value};

use vstore_types::{Document, FilterCriteria, FilterOptions};

/// True if `document` satisfies every condition in `criteria`.
pub fn matches<T: Serialize>(document: &Document<T>, criteria: &FilterCriteria) -> bool {
    if let Some(text) = &criteria.text {
        if !text.contains(&document.text) {
            return false;
        }
    }

    match &criteria.metadata {
        Some(expected) if !expected.is_empty() => metadata_matches(&document.metadata, expected),
        _ => true,
    }
}

/// True if `document` passes the include and exclude criteria.
pub fn passes<T: Serialize>(document: &Document<T>, options: &FilterOptions) -> bool {
    let included = options
        .include
        .as_ref()
        .map_or(true, |criteria| matches(document, criteria));
    let excluded = options
        .exclude
        .as_ref()
        .is_some_and(|criteria| matches(document, criteria));
    included && !excluded
}

/// Documents passing `options`, in input order.
pub fn filter<'a, T: Serialize>(
    documents: &'a [Document<T>],
    options: &FilterOptions,
) -> Vec<&'a Document<T>> {
    documents.iter().filter(|d| passes(d, options)).collect()
}

/// Positions of the documents passing `options`, in input order.
pub fn filter_positions<T: Serialize>(
    documents: &[Document<T>],
    options: &FilterOptions,
) -> Vec<usize> {
    documents
        .iter()
        .enumerate()
        .filter(|(_, d)| passes(d, options))
        .map(|(i, _)| i)
        .collect()
}

fn metadata_matches<T: Serialize>(metadata: &T, expected: &Map<String, Value>) -> bool {
    let Ok(Value::Object(actual)) = serde_json::to_value(metadata) else {
        return false;
    };
    expected.iter().all(|(key, value)| {
        actual
            .get(key)
            .is_some_and(|present| values_equal(present, value))
    })
}

// Numbers compare by value so that 1 and 1.0 are equal.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}
