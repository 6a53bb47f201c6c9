//! Run configuration shared by every CLI command

use std::path::{Path, PathBuf};

use crate::events::{DEFAULT_EVENT_KEY, DEFAULT_EXPECTED_EVENTS};
use crate::export::DEFAULT_DELIMITER;
use crate::flatten::FlattenOptions;
use crate::utils::default_csv_path;
use crate::utils::paths::DEFAULT_MAX_FILE_BYTES;

/// Sub-directory of the output directory holding per-event-type collections
pub const EVENTS_DIR_NAME: &str = "events";
/// Sub-directory of the output directory holding first-key partitions
pub const PARTITIONS_DIR_NAME: &str = "partitions";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Event-log file or Spark event-log directory
    pub input: PathBuf,
    /// Stop decoding after this many records (sampling runs)
    pub max_records: Option<usize>,
    /// Reject log files larger than this
    pub max_file_bytes: u64,
    pub flatten: FlattenOptions,
    /// Derive the column schema from only the first N records
    pub schema_sample: Option<usize>,
    /// Field holding the event type
    pub event_key: String,
    pub delimiter: char,
    pub csv_output: PathBuf,
    pub events_dir: PathBuf,
    pub partitions_dir: PathBuf,
    pub expected_events: Vec<String>,
}

impl PipelineConfig {
    /// Defaults for reading `input` and writing below `output_dir`
    pub fn new(input: impl Into<PathBuf>, output_dir: &Path) -> Self {
        let input = input.into();
        Self {
            csv_output: default_csv_path(output_dir, &input),
            events_dir: output_dir.join(EVENTS_DIR_NAME),
            partitions_dir: output_dir.join(PARTITIONS_DIR_NAME),
            input,
            max_records: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            flatten: FlattenOptions::default(),
            schema_sample: None,
            event_key: DEFAULT_EVENT_KEY.to_string(),
            delimiter: DEFAULT_DELIMITER,
            expected_events: DEFAULT_EXPECTED_EVENTS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_derive_from_input_and_output_dir() {
        let config = PipelineConfig::new("/logs/app-42", Path::new("/out"));

        assert_eq!(config.csv_output, PathBuf::from("/out/app-42.csv"));
        assert_eq!(config.events_dir, PathBuf::from("/out/events"));
        assert_eq!(config.partitions_dir, PathBuf::from("/out/partitions"));
        assert_eq!(config.event_key, "Event");
        assert_eq!(config.delimiter, ',');
        assert!(config.max_records.is_none());
        assert_eq!(config.expected_events.len(), DEFAULT_EXPECTED_EVENTS.len());
    }
}
