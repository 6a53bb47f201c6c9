//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

/// Builder for a temp workspace holding event-log files
pub struct EventLogBuilder {
    temp_dir: TempDir,
}

impl EventLogBuilder {
    /// Create a new builder with an empty workspace
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path of the workspace
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a log file with the given raw content
    pub fn with_log(self, name: &str, content: &str) -> Self {
        let log_path = self.temp_dir.path().join(name);
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create log dir");
        }
        let mut file = fs::File::create(log_path).expect("Failed to create log file");
        file.write_all(content.as_bytes()).expect("Failed to write log file");
        self
    }

    /// Add a log file with one line per event
    pub fn with_events(self, name: &str, events: &[SparkEventBuilder]) -> Self {
        let content = events.iter().map(|e| e.to_json()).collect::<Vec<_>>().join("\n");
        self.with_log(name, &content)
    }

    /// Path of a file inside the workspace
    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for EventLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one Spark listener event line
pub struct SparkEventBuilder {
    fields: Map<String, Value>,
}

impl SparkEventBuilder {
    /// Create an event of the given type
    pub fn new(event: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("Event".to_string(), Value::String(event.to_string()));
        Self { fields }
    }

    pub fn application_start() -> Self {
        Self::new("SparkListenerApplicationStart")
            .field("App Name", json!("test-app"))
            .field("App ID", json!("app-20240101000000-0001"))
            .field("Timestamp", json!(1700000000000u64))
            .field("User", json!("spark"))
    }

    pub fn job_start(job_id: u64) -> Self {
        Self::new("SparkListenerJobStart")
            .field("Job ID", json!(job_id))
            .field("Submission Time", json!(1700000001000u64))
            .field("Stage IDs", json!([0, 1]))
            .field(
                "Properties",
                json!({"spark.job.description": "count", "spark.scheduler.pool": "default"}),
            )
    }

    pub fn task_end(task_id: u64) -> Self {
        Self::new("SparkListenerTaskEnd")
            .field("Stage ID", json!(0))
            .field("Task Type", json!("ResultTask"))
            .field(
                "Task Info",
                json!({"Task ID": task_id, "Host": "localhost", "Failed": false, "Killed": false}),
            )
            .field("Task Metrics", json!({"Executor Run Time": 12, "Result Size": 1024}))
    }

    pub fn job_end(job_id: u64) -> Self {
        Self::new("SparkListenerJobEnd")
            .field("Job ID", json!(job_id))
            .field("Completion Time", json!(1700000002000u64))
            .field("Job Result", json!({"Result": "JobSucceeded"}))
    }

    pub fn application_end() -> Self {
        Self::new("SparkListenerApplicationEnd").field("Timestamp", json!(1700000003000u64))
    }

    /// Add or replace a field
    pub fn field(mut self, name: &str, value: Value) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Convert to one JSON line
    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

/// Every event type of a short, complete application run
pub fn full_application_run() -> Vec<SparkEventBuilder> {
    vec![
        SparkEventBuilder::new("SparkListenerLogStart").field("Spark Version", json!("3.5.0")),
        SparkEventBuilder::new("SparkListenerResourceProfileAdded")
            .field("Resource Profile Id", json!(0)),
        SparkEventBuilder::new("SparkListenerBlockManagerAdded")
            .field("Block Manager ID", json!({"Executor ID": "driver", "Port": 7079})),
        SparkEventBuilder::new("SparkListenerEnvironmentUpdate")
            .field("Spark Properties", json!({"spark.master": "local[*]"})),
        SparkEventBuilder::application_start(),
        SparkEventBuilder::job_start(0),
        SparkEventBuilder::new("SparkListenerStageSubmitted")
            .field("Stage Info", json!({"Stage ID": 0, "Number of Tasks": 2})),
        SparkEventBuilder::new("SparkListenerTaskStart")
            .field("Stage ID", json!(0))
            .field("Task Info", json!({"Task ID": 0})),
        SparkEventBuilder::task_end(0),
        SparkEventBuilder::new("SparkListenerStageCompleted")
            .field("Stage Info", json!({"Stage ID": 0, "Number of Tasks": 2})),
        SparkEventBuilder::job_end(0),
        SparkEventBuilder::application_end(),
    ]
}

/// Read a collection file as a JSON sequence
pub fn read_collection(path: &Path) -> Vec<Value> {
    let content = fs::read_to_string(path).expect("Failed to read collection");
    match serde_json::from_str(&content).expect("Collection is not JSON") {
        Value::Array(items) => items,
        other => panic!("Collection is not a sequence: {}", other),
    }
}
