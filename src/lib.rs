//! Eventlog Flattener - Turn Spark event logs into tables and per-event collections
//!
//! This library reads newline-delimited JSON event logs as written by Spark's event-log
//! listener and provides:
//!
//! - Line-tolerant decoding that skips and reports malformed lines
//! - Flattening of nested records into dotted-path columns aligned to one schema
//! - Append-only delimited export with a header written once per file
//! - Classification of records by event type into append-only JSON collections
//! - Verification that expected listener events were captured
//!
//! # Example
//!
//! ```no_run
//! use eventlog_flattener::{FlattenOptions, load_batch, flatten_batch};
//! use std::path::Path;
//!
//! let batch = load_batch(Path::new("/tmp/spark-events/app-1"), None, u64::MAX)?;
//! let flat = flatten_batch(&batch, &FlattenOptions::default(), None);
//! println!("{} rows, {} columns", flat.rows.len(), flat.schema.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod events;
pub mod export;
pub mod flatten;
pub mod logging;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use events::{EventExtractor, EventStore, verify_captured};
pub use export::{DelimitedFileWriter, TabularWriter};
pub use flatten::{FlattenOptions, align_record, derive_schema, flatten_record};
pub use models::{ColumnSchema, FlatRecord, FlatValue, Record};
pub use parsers::{LineDecoder, decode_file};
pub use pipeline::{
    EventBatch, FlatBatch, classify_batch, export_batch, flatten_batch, load_batch, partition_batch,
};
