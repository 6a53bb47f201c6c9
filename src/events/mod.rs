//! Event classification and per-event-type persistence.
//!
//! Two classification axes exist side by side:
//!
//! - [`extractor`] reads the event type from the well-known `Event` field, also when the
//!   event arrives as text wrapping a literal. Collections in the [`store`] are keyed by it.
//! - [`grouper::group_by_first_key`] buckets records by the name of their first key, a rough
//!   shape-based partition that does not look at any field value.
//!
//! # Error Handling Strategy
//!
//! - **Extraction failures**: reported per record. The record is left out of classification
//!   only.
//! - **Corrupt collections**: a collection file that does not parse is treated as empty and
//!   rewritten on the next append.
//! - **I/O failures**: reading or writing a collection location fails the run.

pub mod extractor;
pub mod grouper;
pub mod store;
pub mod verify;

pub use extractor::{DEFAULT_EVENT_KEY, EventExtractor, ExtractionError};
pub use grouper::{EventGroups, group_by, group_by_first_key};
pub use store::{AppendOutcome, EventStore, PriorShape};
pub use verify::{CaptureReport, DEFAULT_EXPECTED_EVENTS, verify_captured};
