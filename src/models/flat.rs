use std::borrow::Cow;

use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter};
use serde::Serialize;
use serde_json::Number;

/// A tabular-safe cell value: containers never appear here
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlatValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl FlatValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FlatValue::Null)
    }

    /// Text written into a delimited cell. Null becomes an empty field.
    pub fn as_field(&self) -> Cow<'_, str> {
        match self {
            FlatValue::Null => Cow::Borrowed(""),
            FlatValue::Bool(true) => Cow::Borrowed("true"),
            FlatValue::Bool(false) => Cow::Borrowed("false"),
            FlatValue::Number(n) => Cow::Owned(n.to_string()),
            FlatValue::String(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl From<&str> for FlatValue {
    fn from(value: &str) -> Self {
        FlatValue::String(value.to_string())
    }
}

impl From<i64> for FlatValue {
    fn from(value: i64) -> Self {
        FlatValue::Number(value.into())
    }
}

impl From<i32> for FlatValue {
    fn from(value: i32) -> Self {
        FlatValue::Number(value.into())
    }
}

impl From<u64> for FlatValue {
    fn from(value: u64) -> Self {
        FlatValue::Number(value.into())
    }
}

impl From<bool> for FlatValue {
    fn from(value: bool) -> Self {
        FlatValue::Bool(value)
    }
}

/// Dotted path -> scalar mapping produced by the flattener.
///
/// Insertion order is the order paths were discovered while walking the source record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlatRecord {
    fields: IndexMap<String, FlatValue>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: IndexMap::with_capacity(capacity) }
    }

    /// Insert a value. A path that already exists keeps its position and takes the new value.
    pub fn insert(&mut self, path: impl Into<String>, value: FlatValue) {
        self.fields.insert(path.into(), value);
    }

    pub fn get(&self, path: &str) -> Option<&FlatValue> {
        self.fields.get(path)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &FlatValue> {
        self.fields.values()
    }

    pub fn iter(&self) -> Iter<'_, String, FlatValue> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a FlatRecord {
    type Item = (&'a String, &'a FlatValue);
    type IntoIter = Iter<'a, String, FlatValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl IntoIterator for FlatRecord {
    type Item = (String, FlatValue);
    type IntoIter = IntoIter<String, FlatValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, FlatValue)> for FlatRecord {
    fn from_iter<T: IntoIterator<Item = (K, FlatValue)>>(iter: T) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_field_renders_scalars() {
        assert_eq!(FlatValue::Null.as_field(), "");
        assert_eq!(FlatValue::from(true).as_field(), "true");
        assert_eq!(FlatValue::from(42).as_field(), "42");
        assert_eq!(FlatValue::from("x,y").as_field(), "x,y");
    }

    #[test]
    fn test_insert_existing_path_keeps_position() {
        let mut record = FlatRecord::new();
        record.insert("a", FlatValue::from(1));
        record.insert("b", FlatValue::from(2));
        record.insert("a", FlatValue::from(3));

        assert_eq!(record.paths().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&FlatValue::from(3)));
    }

    #[test]
    fn test_serializes_as_json_object() {
        let record: FlatRecord =
            [("a", FlatValue::from(1)), ("b", FlatValue::Null)].into_iter().collect();
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"a":1,"b":null}"#);
    }
}
