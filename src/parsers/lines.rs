use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{DecodeFailure, Record};
use crate::utils::validate_file_size;

/// Outcome of decoding one non-blank line
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedLine {
    Record(Record),
    Failure(DecodeFailure),
}

/// Lazy line-by-line decoder over a buffered reader.
///
/// Blank lines are skipped. Every non-blank line yields either a record or a
/// [`DecodeFailure`]; only reader I/O errors are surfaced as `Err`, after which the
/// decoder is exhausted. Once `max_records` records have been produced the decoder stops.
pub struct LineDecoder<R> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
    records_emitted: usize,
    max_records: Option<usize>,
    done: bool,
}

impl<R: BufRead> LineDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            line_number: 0,
            records_emitted: 0,
            max_records: None,
            done: false,
        }
    }

    /// Stop after `max_records` successfully decoded records
    pub fn with_max_records(mut self, max_records: Option<usize>) -> Self {
        self.max_records = max_records;
        self
    }

    /// Number of lines consumed from the reader so far, blank ones included
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    fn cap_reached(&self) -> bool {
        self.max_records.is_some_and(|max| self.records_emitted >= max)
    }
}

impl<R: BufRead> Iterator for LineDecoder<R> {
    type Item = Result<DecodedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cap_reached() {
            self.done = true;
            return None;
        }

        loop {
            self.buffer.clear();
            let read = match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(read) => read,
                Err(e) => {
                    self.done = true;
                    return Some(Err(anyhow::Error::new(e)
                        .context(format!("Failed to read line {}", self.line_number + 1))));
                }
            };
            if read == 0 {
                self.done = true;
                return None;
            }
            self.line_number += 1;

            // Invalid UTF-8 is a property of this line only, not of the stream
            let text = match std::str::from_utf8(&self.buffer) {
                Ok(text) => text,
                Err(e) => {
                    return Some(Ok(DecodedLine::Failure(DecodeFailure {
                        line_number: self.line_number,
                        line: String::from_utf8_lossy(&self.buffer).trim().to_string(),
                        message: format!("invalid UTF-8: {}", e),
                    })));
                }
            };

            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            let decoded = match decode_line(trimmed) {
                Ok(record) => {
                    self.records_emitted += 1;
                    DecodedLine::Record(record)
                }
                Err(message) => DecodedLine::Failure(DecodeFailure {
                    line_number: self.line_number,
                    line: trimmed.to_string(),
                    message,
                }),
            };
            return Some(Ok(decoded));
        }
    }
}

/// Decode one trimmed, non-blank line into a record
fn decode_line(line: &str) -> std::result::Result<Record, String> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(format!("expected a JSON object, found {}", value_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Everything decoded from one event-log stream
#[derive(Debug, Clone, Default)]
pub struct DecodedLog {
    pub records: Vec<Record>,
    pub failures: Vec<DecodeFailure>,
    pub lines_read: usize,
}

/// Drain a reader through [`LineDecoder`], logging each failure under `source`
pub fn decode_reader<R: BufRead>(
    reader: R,
    source: &str,
    max_records: Option<usize>,
) -> Result<DecodedLog> {
    let mut decoder = LineDecoder::new(reader).with_max_records(max_records);
    let mut log = DecodedLog::default();

    for decoded in decoder.by_ref() {
        match decoded.with_context(|| format!("Failed to read event log {}", source))? {
            DecodedLine::Record(record) => log.records.push(record),
            DecodedLine::Failure(failure) => {
                warn!(
                    source,
                    line = failure.line_number,
                    error = %failure.message,
                    "Skipping malformed event-log line"
                );
                log.failures.push(failure);
            }
        }
    }
    log.lines_read = decoder.lines_read();

    if log.failures.is_empty() {
        info!(source, records = log.records.len(), "Decoded event log");
    } else {
        info!(
            source,
            records = log.records.len(),
            skipped = log.failures.len(),
            "Decoded event log ({} skipped)",
            log.failures.len()
        );
    }

    Ok(log)
}

/// Open an event-log file and decode it
///
/// # Errors
///
/// Returns an error if the file cannot be opened, exceeds `max_file_bytes`,
/// or a read fails part-way. Malformed lines are not errors.
pub fn decode_file(
    path: &Path,
    max_records: Option<usize>,
    max_file_bytes: u64,
) -> Result<DecodedLog> {
    // Open first, then check the size on the handle we read from
    let file = File::open(path)
        .with_context(|| format!("Failed to open event log: {}", path.display()))?;
    validate_file_size(&file, path, max_file_bytes)?;

    decode_reader(BufReader::new(file), &path.display().to_string(), max_records)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use tempfile::NamedTempFile;

    use super::*;

    /// Helper to create a temporary test file with given content
    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn decode_str(content: &str) -> DecodedLog {
        decode_reader(Cursor::new(content.as_bytes()), "test", None).unwrap()
    }

    #[test]
    fn test_decode_valid_lines() {
        let log = decode_str(
            r#"{"Event":"SparkListenerLogStart","Spark Version":"3.5.1"}
{"Event":"SparkListenerApplicationStart","App Name":"demo"}"#,
        );

        assert_eq!(log.records.len(), 2);
        assert!(log.failures.is_empty());
        assert_eq!(log.records[1]["App Name"], "demo");
    }

    #[test]
    fn test_blank_lines_are_skipped_silently() {
        let log = decode_str("\n{\"a\":1}\n   \n\t\n{\"b\":2}\n\n");

        assert_eq!(log.records.len(), 2);
        assert!(log.failures.is_empty());
        assert_eq!(log.lines_read, 6);
    }

    #[test]
    fn test_malformed_lines_reported_and_skipped() {
        let log = decode_str("{\"a\":1}\nnot json\n{\"b\":2}\n{\"c\":");

        assert_eq!(log.records.len(), 2);
        assert_eq!(log.failures.len(), 2);
        assert_eq!(log.failures[0].line_number, 2);
        assert_eq!(log.failures[0].line, "not json");
        assert_eq!(log.failures[1].line_number, 4);
    }

    #[test]
    fn test_non_object_json_is_a_failure() {
        let log = decode_str("[1,2,3]\n42\n\"text\"\n{\"ok\":true}");

        assert_eq!(log.records.len(), 1);
        assert_eq!(log.failures.len(), 3);
        assert!(log.failures[0].message.contains("an array"));
        assert!(log.failures[1].message.contains("a number"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let log = decode_str("{\"a\":1}\r\n{\"b\":2}\r\n");
        assert_eq!(log.records.len(), 2);
        assert!(log.failures.is_empty());
    }

    #[test]
    fn test_invalid_utf8_line_does_not_abort() {
        let mut content = b"{\"a\":1}\n".to_vec();
        content.extend_from_slice(&[0xff, 0xfe, b'\n']);
        content.extend_from_slice(b"{\"b\":2}\n");

        let log = decode_reader(Cursor::new(content), "test", None).unwrap();
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.failures.len(), 1);
        assert!(log.failures[0].message.contains("invalid UTF-8"));
    }

    #[test]
    fn test_max_records_caps_decoding() {
        let log = decode_reader(
            Cursor::new("{\"a\":1}\nbad\n{\"a\":2}\n{\"a\":3}\n".as_bytes()),
            "test",
            Some(2),
        )
        .unwrap();

        assert_eq!(log.records.len(), 2);
        assert_eq!(log.failures.len(), 1);
        assert_eq!(log.lines_read, 3);
    }

    #[test]
    fn test_max_records_zero_reads_nothing() {
        let log = decode_reader(Cursor::new("{\"a\":1}\n".as_bytes()), "test", Some(0)).unwrap();
        assert!(log.records.is_empty());
        assert_eq!(log.lines_read, 0);
    }

    #[test]
    fn test_decoder_is_lazy() {
        let mut decoder = LineDecoder::new(Cursor::new("{\"a\":1}\n{\"b\":2}\n".as_bytes()));
        assert!(matches!(decoder.next(), Some(Ok(DecodedLine::Record(_)))));
        assert_eq!(decoder.lines_read(), 1);
        assert!(matches!(decoder.next(), Some(Ok(DecodedLine::Record(_)))));
        assert!(decoder.next().is_none());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_record_keeps_key_order() {
        let log = decode_str(r#"{"z":1,"a":2,"m":3}"#);
        let keys: Vec<_> = log.records[0].keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_decode_file_nonexistent() {
        let result = decode_file(Path::new("/nonexistent/eventlog"), None, u64::MAX);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to open event log"));
    }

    #[test]
    fn test_decode_file_too_large() {
        let file = create_test_file(b"{\"a\":1}\n");
        let result = decode_file(file.path(), None, 4);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("File too large"));
    }

    #[test]
    fn test_decode_file_reads_records() {
        let file = create_test_file(b"{\"Event\":\"SparkListenerJobStart\",\"Job ID\":0}\n");
        let log = decode_file(file.path(), None, u64::MAX).unwrap();
        assert_eq!(log.records.len(), 1);
    }
}
