//! Pipeline stages over one in-memory batch of event-log records.
//!
//! # Error Handling Strategy
//!
//! - **Per-line and per-record failures**: malformed lines are kept in
//!   [`EventBatch::failures`]; records without an event type are counted as excluded from
//!   classification but still flattened and exported. Both are logged, neither stops a stage.
//! - **I/O failures**: reading an input log or writing an output location aborts the stage
//!   with the error propagated through `anyhow`.
//!
//! The batch is decoded completely before any stage runs and is passed to stages by
//! reference; nothing is accumulated in shared state.

use std::path::{Path, PathBuf};

use anyhow::Result;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::discovery::discover_event_logs;
use crate::events::{
    AppendOutcome, EventExtractor, EventGroups, EventStore, group_by, group_by_first_key,
};
use crate::export::{ExportSummary, TabularWriter};
use crate::flatten::{
    FlattenOptions, align_records, derive_schema, flatten_records, out_of_schema_paths,
};
use crate::models::{ColumnSchema, DecodeFailure, FlatRecord, Record};
use crate::parsers::decode_file;

/// Every record decoded from one input, plus what could not be decoded
#[derive(Debug, Clone, Default)]
pub struct EventBatch {
    pub sources: Vec<PathBuf>,
    pub records: Vec<Record>,
    pub failures: Vec<DecodeFailure>,
    pub lines_read: usize,
}

impl EventBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decode every event log under `input`.
///
/// `max_records` caps the whole batch, not each file.
///
/// # Errors
///
/// Returns an error if `input` cannot be resolved or a log file cannot be opened or read.
pub fn load_batch(
    input: &Path,
    max_records: Option<usize>,
    max_file_bytes: u64,
) -> Result<EventBatch> {
    let mut batch = EventBatch::default();

    for source in discover_event_logs(input)? {
        let remaining = max_records.map(|max| max.saturating_sub(batch.records.len()));
        if remaining == Some(0) {
            debug!(source = %source.display(), "Record cap reached, not reading further logs");
            break;
        }

        let log = decode_file(&source, remaining, max_file_bytes)?;
        batch.records.extend(log.records);
        batch.failures.extend(log.failures);
        batch.lines_read += log.lines_read;
        batch.sources.push(source);
    }

    if batch.sources.is_empty() {
        warn!(input = %input.display(), "No event logs found");
    }

    Ok(batch)
}

/// Flattened, schema-aligned rows of a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatBatch {
    pub schema: ColumnSchema,
    pub rows: Vec<FlatRecord>,
    /// Rows that lost at least one path not present in the schema
    pub truncated_rows: usize,
}

/// Flatten every record and align it to the batch schema.
///
/// With `schema_sample`, the schema comes from the first N flattened records only; paths
/// that first appear later are dropped from the rows of this run.
pub fn flatten_batch(
    batch: &EventBatch,
    options: &FlattenOptions,
    schema_sample: Option<usize>,
) -> FlatBatch {
    let flat = flatten_records(&batch.records, options);
    let sample = schema_sample.map_or(flat.len(), |n| n.min(flat.len()));
    let schema = derive_schema(&flat[..sample]);

    let truncated_rows = flat
        .iter()
        .skip(sample)
        .filter(|record| !out_of_schema_paths(&schema, record).is_empty())
        .count();
    if truncated_rows > 0 {
        debug!(
            rows = truncated_rows,
            columns = schema.len(),
            "Dropped paths outside the sampled schema"
        );
    }

    let rows = align_records(&schema, &flat);
    FlatBatch { schema, rows, truncated_rows }
}

/// Hand aligned rows to a tabular writer
pub fn export_batch<W: TabularWriter>(flat: &FlatBatch, writer: &mut W) -> Result<ExportSummary> {
    let summary = writer.write_rows(&flat.schema, &flat.rows)?;
    info!(
        path = %summary.path.display(),
        rows = summary.rows_written,
        columns = flat.schema.len(),
        header_written = summary.header_written,
        "Exported flattened events"
    );
    Ok(summary)
}

/// Outcome of writing groups of records into an [`EventStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifySummary {
    /// Records written to some collection
    pub classified: usize,
    /// Records left out because no group key could be determined
    pub excluded: usize,
    /// One entry per collection written, in first-seen order
    pub collections: Vec<(String, AppendOutcome)>,
}

/// Bucket records by event type (see [`EventExtractor::resolve`]) and append each bucket to
/// its collection in `store`
pub fn classify_batch(
    batch: &EventBatch,
    extractor: &EventExtractor,
    store: &EventStore,
) -> Result<ClassifySummary> {
    let (groups, excluded) = group_by_event_type(batch, extractor);
    let mut summary = persist_groups(groups, store)?;
    summary.excluded = excluded;

    info!(
        classified = summary.classified,
        excluded = summary.excluded,
        collections = summary.collections.len(),
        "Classified events"
    );
    Ok(summary)
}

/// Partition records by the name of their first key and append each partition to `store`
pub fn partition_batch(batch: &EventBatch, store: &EventStore) -> Result<ClassifySummary> {
    let groups = group_by_first_key(&batch.records);
    let grouped: usize = groups.values().map(Vec::len).sum();
    let mut summary = persist_groups(groups, store)?;
    summary.excluded = batch.records.len() - grouped;

    info!(
        partitioned = summary.classified,
        excluded = summary.excluded,
        partitions = summary.collections.len(),
        "Partitioned events by first key"
    );
    Ok(summary)
}

/// Record count per event type in first-seen order, and the number of records without one
pub fn count_event_types(
    batch: &EventBatch,
    extractor: &EventExtractor,
) -> (IndexMap<String, usize>, usize) {
    let (groups, excluded) = group_by_event_type(batch, extractor);
    let counts = groups.into_iter().map(|(event, records)| (event, records.len())).collect();
    (counts, excluded)
}

fn group_by_event_type<'a>(
    batch: &'a EventBatch,
    extractor: &EventExtractor,
) -> (EventGroups<'a>, usize) {
    let mut excluded = 0;
    let mut position = 0;
    let groups = group_by(&batch.records, |record| {
        position += 1;
        match extractor.resolve(record) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(record = position, error = %e, "Excluding record from classification");
                excluded += 1;
                None
            }
        }
    });
    (groups, excluded)
}

fn persist_groups(groups: EventGroups<'_>, store: &EventStore) -> Result<ClassifySummary> {
    let mut summary = ClassifySummary::default();
    for (key, records) in groups {
        let outcome = store.append_all(&key, records)?;
        debug!(
            collection = %outcome.path.display(),
            appended = outcome.appended,
            len = outcome.len,
            prior = ?outcome.prior,
            "Updated collection"
        );
        summary.classified += outcome.appended;
        summary.collections.push((key, outcome));
    }
    Ok(summary)
}
