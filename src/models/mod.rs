//! Data models for Spark event-log processing.
//!
//! - [`Record`] - one decoded JSON object from the event log
//! - [`DecodeFailure`] - a non-blank line that could not be decoded into a [`Record`]
//! - [`FlatRecord`] / [`FlatValue`] - a record with nesting collapsed into dotted paths
//! - [`ColumnSchema`] - the ordered column set shared by every row of a batch
//!
//! Records keep the key order of the source line (serde_json is built with `preserve_order`),
//! which the first-key grouping in [`crate::events::grouper`] depends on.

pub mod flat;
pub mod record;
pub mod schema;

pub use flat::{FlatRecord, FlatValue};
pub use record::{DecodeFailure, Record, first_key};
pub use schema::ColumnSchema;
