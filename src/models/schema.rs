use indexmap::IndexSet;
use serde::Serialize;

use super::FlatRecord;

/// Ordered, duplicate-free list of output columns for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    columns: IndexSet<String>,
}

impl ColumnSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of all paths across `records`, in first-seen order
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a FlatRecord>,
    {
        let mut schema = Self::new();
        for record in records {
            schema.observe(record);
        }
        schema
    }

    /// Append any paths of `record` not yet in the schema
    pub fn observe(&mut self, record: &FlatRecord) {
        for path in record.paths() {
            if !self.columns.contains(path) {
                self.columns.insert(path.to_string());
            }
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnSchema {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self { columns: iter.into_iter().map(Into::into).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlatValue;

    #[test]
    fn test_union_in_first_seen_order() {
        let first: FlatRecord =
            [("a", FlatValue::from(1)), ("c", FlatValue::from(3))].into_iter().collect();
        let second: FlatRecord =
            [("b", FlatValue::from(2)), ("a", FlatValue::from(4))].into_iter().collect();

        let schema = ColumnSchema::from_records([&first, &second]);
        assert_eq!(schema.columns().collect::<Vec<_>>(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_empty_batch_gives_empty_schema() {
        let schema = ColumnSchema::from_records(std::iter::empty());
        assert!(schema.is_empty());
    }
}
