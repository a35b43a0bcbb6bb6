use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::path::{segments, FieldPath, Segment, EMPTY_MARKER};

/// Walks `path` through `doc`. Total over every document and path: a type
/// mismatch or missing key yields `None`, never a panic.
pub fn resolve<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;

    for segment in segments(path) {
        current = match segment {
            Segment::FirstOf(key) => {
                let target = if key.is_empty() {
                    current
                } else {
                    get_field(current, key)?
                };
                // Empty arrays and non-arrays stay put so a later segment misses instead.
                match target {
                    Value::Array(items) => items.first().unwrap_or(target),
                    other => other,
                }
            }
            Segment::Key(key) => get_field(current, key)?,
        };
    }

    Some(current)
}

/// Member access on objects; numeric keys index into arrays.
pub fn get_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(_) => key
            .parse::<usize>()
            .ok()
            .and_then(|index| get_index(value, index)),
        _ => None,
    }
}

pub fn get_index(value: &Value, index: usize) -> Option<&Value> {
    value.as_array().and_then(|items| items.get(index))
}

/// Display string for a single path, used to preview sample values while
/// picking fields. Misses return [`EMPTY_MARKER`].
pub fn value_at(doc: &Value, path: &str) -> String {
    match resolve(doc, path) {
        Some(value) => display_raw(value),
        None => EMPTY_MARKER.to_string(),
    }
}

/// Raw display form: strings verbatim, numbers and booleans as written,
/// null/arrays/objects as compact JSON.
pub fn display_raw(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number_to_string(number),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Integral floats print without a trailing `.0`.
pub fn number_to_string(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(float) if float.is_finite() && float.fract() == 0.0 && float.abs() < 1e21 => {
            format!("{}", float as i128)
        }
        Some(float) => format!("{float}"),
        None => number.to_string(),
    }
}

/// Flat path → value mapping for one poll tick. Keeps selection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectedRecord(Map<String, Value>);

impl ProjectedRecord {
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.0.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: Value) {
        self.0.insert(path.into(), value);
    }
}

/// Resolves every selected path against `doc`. A miss stores the empty marker
/// for that field and leaves the others untouched.
pub fn project(doc: &Value, fields: &[FieldPath]) -> ProjectedRecord {
    let mut record = ProjectedRecord::default();
    for field in fields {
        let value = resolve(doc, field.as_str())
            .cloned()
            .unwrap_or_else(|| Value::String(EMPTY_MARKER.to_string()));
        record.insert(field.as_str(), value);
    }
    record
}
