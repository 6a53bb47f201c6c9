use crate::models::{ColumnSchema, FlatRecord, FlatValue};

/// Column schema for a batch: the union of all paths in first-seen order
pub fn derive_schema(records: &[FlatRecord]) -> ColumnSchema {
    ColumnSchema::from_records(records)
}

/// Reindex `record` against `schema`.
///
/// The result has exactly the schema's columns in schema order. Missing paths are
/// [`FlatValue::Null`]; paths outside the schema are dropped without error.
pub fn align_record(schema: &ColumnSchema, record: &FlatRecord) -> FlatRecord {
    schema
        .columns()
        .map(|column| (column, record.get(column).cloned().unwrap_or(FlatValue::Null)))
        .collect()
}

pub fn align_records(schema: &ColumnSchema, records: &[FlatRecord]) -> Vec<FlatRecord> {
    records.iter().map(|record| align_record(schema, record)).collect()
}

/// Paths of `record` that [`align_record`] would drop
pub fn out_of_schema_paths<'a>(schema: &ColumnSchema, record: &'a FlatRecord) -> Vec<&'a str> {
    record.paths().filter(|path| !schema.contains(path)).collect()
}
