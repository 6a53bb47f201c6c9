use serde_json::{Map, Value};

use crate::models::{FlatRecord, FlatValue, Record};

pub const DEFAULT_SEPARATOR: &str = ".";

/// How nested mappings are collapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Joins parent and child keys
    pub separator: String,
    /// Mapping levels to descend below the top level. Deeper mappings are kept as JSON text.
    /// `None` descends without limit.
    pub max_depth: Option<usize>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self { separator: DEFAULT_SEPARATOR.to_string(), max_depth: None }
    }
}

/// Flatten one record into dotted paths.
///
/// Non-empty mappings are descended (subject to `max_depth`). Sequences, empty mappings
/// and mappings past the depth limit become their compact JSON text. Scalars are copied.
///
/// # Examples
///
/// ```
/// use eventlog_flattener::flatten::{FlattenOptions, flatten_record};
/// use eventlog_flattener::models::FlatValue;
///
/// let record = serde_json::from_str(r#"{"Stage Info":{"Stage ID":2,"RDD Info":[]}}"#).unwrap();
/// let flat = flatten_record(&record, &FlattenOptions::default());
/// assert_eq!(flat.get("Stage Info.Stage ID"), Some(&FlatValue::from(2)));
/// assert_eq!(flat.get("Stage Info.RDD Info"), Some(&FlatValue::from("[]")));
/// ```
pub fn flatten_record(record: &Record, options: &FlattenOptions) -> FlatRecord {
    let mut flat = FlatRecord::with_capacity(record.len());
    walk(record, None, 0, options, &mut flat);
    flat
}

/// Flatten a whole batch, preserving record order
pub fn flatten_records(records: &[Record], options: &FlattenOptions) -> Vec<FlatRecord> {
    records.iter().map(|record| flatten_record(record, options)).collect()
}

fn walk(
    map: &Map<String, Value>,
    prefix: Option<&str>,
    depth: usize,
    options: &FlattenOptions,
    out: &mut FlatRecord,
) {
    let can_descend = options.max_depth.is_none_or(|max| depth < max);

    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, options.separator, key),
            None => key.clone(),
        };

        match value {
            Value::Object(nested) if can_descend && !nested.is_empty() => {
                walk(nested, Some(&path), depth + 1, options, out);
            }
            other => out.insert(path, to_flat_value(other)),
        }
    }
}

fn to_flat_value(value: &Value) -> FlatValue {
    match value {
        Value::Null => FlatValue::Null,
        Value::Bool(b) => FlatValue::Bool(*b),
        Value::Number(n) => FlatValue::Number(n.clone()),
        Value::String(s) => FlatValue::String(s.clone()),
        // Display for Value is compact JSON
        Value::Array(_) | Value::Object(_) => FlatValue::String(value.to_string()),
    }
}
