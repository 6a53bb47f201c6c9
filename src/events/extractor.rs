use serde_json::Value;
use thiserror::Error;

use crate::models::Record;
use crate::parsers::literal::embedded_literals;

/// Field holding the event type in Spark event logs
pub const DEFAULT_EVENT_KEY: &str = "Event";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("record has no {key:?} field")]
    MissingKey { key: String },
    #[error("{key:?} field is not a string")]
    NotAString { key: String },
    #[error("no embedded mapping literal found in text payload")]
    NoEmbeddedLiteral,
    #[error("payload is neither a mapping nor text")]
    UnsupportedPayload,
}

/// Reads the event-type discriminator from records or from text wrapping a record literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventExtractor {
    key: String,
}

impl Default for EventExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_KEY)
    }
}

impl EventExtractor {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Event type of a decoded record
    pub fn from_record(&self, record: &Record) -> Result<String, ExtractionError> {
        match record.get(&self.key) {
            Some(Value::String(event)) => Ok(event.clone()),
            Some(_) => Err(ExtractionError::NotAString { key: self.key.clone() }),
            None => Err(ExtractionError::MissingKey { key: self.key.clone() }),
        }
    }

    /// Event type of a text payload such as `"posted {'Event': 'X', ...} to bus"`.
    ///
    /// The first embedded mapping literal is used; sequences found before it are skipped.
    pub fn from_text(&self, text: &str) -> Result<String, ExtractionError> {
        match embedded_literals(text).find(Value::is_object) {
            Some(Value::Object(record)) => self.from_record(&record),
            _ => Err(ExtractionError::NoEmbeddedLiteral),
        }
    }

    /// Event type of any decoded JSON value: mappings directly, strings via an embedded literal
    pub fn extract(&self, payload: &Value) -> Result<String, ExtractionError> {
        match payload {
            Value::Object(record) => self.from_record(record),
            Value::String(text) => self.from_text(text),
            _ => Err(ExtractionError::UnsupportedPayload),
        }
    }

    /// Event type of a decoded log record.
    ///
    /// Records without the event field may carry the event wrapped in one of their text
    /// fields; the first text field holding a literal with the event field wins.
    pub fn resolve(&self, record: &Record) -> Result<String, ExtractionError> {
        match self.from_record(record) {
            Err(missing @ ExtractionError::MissingKey { .. }) => record
                .values()
                .filter_map(Value::as_str)
                .find_map(|text| self.from_text(text).ok())
                .ok_or(missing),
            resolved => resolved,
        }
    }
}
