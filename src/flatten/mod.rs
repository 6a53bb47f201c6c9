//! Turning nested event records into rows with one stable column set.
//!
//! [`flattener`] collapses nesting into dotted paths, [`align`] derives the batch column
//! schema and reindexes every flat record against it.

pub mod align;
pub mod flattener;

pub use align::{align_record, align_records, derive_schema, out_of_schema_paths};
pub use flattener::{FlattenOptions, flatten_record, flatten_records};
