use serde::Serialize;
use serde_json::{Map, Value};

/// A decoded event-log line. Key order follows the source text.
pub type Record = Map<String, Value>;

/// A non-blank input line that did not decode into a [`Record`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeFailure {
    /// 1-based line number in the source stream
    pub line_number: usize,
    pub line: String,
    pub message: String,
}

/// First key in a record's own key ordering, if it has any keys
pub fn first_key(record: &Record) -> Option<&str> {
    record.keys().next().map(String::as_str)
}
