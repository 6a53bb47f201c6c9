use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::config::PipelineConfig;
use crate::events::{EventExtractor, EventStore, verify_captured};
use crate::export::DelimitedFileWriter;
use crate::logging::init_logging;
use crate::pipeline::{
    ClassifySummary, EventBatch, classify_batch, count_event_types, export_batch, flatten_batch,
    load_batch, partition_batch,
};
use crate::utils::{format_path_with_tilde, get_output_dir, printable_label};

#[derive(Parser)]
#[command(name = "eventlog-flattener")]
#[command(version)]
#[command(about = "Flatten and classify Spark event logs", long_about = None)]
pub struct Cli {
    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flatten events into an append-only delimited table
    Flatten {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Append events to one JSON collection per event type
    Classify {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        events: EventArgs,
    },
    /// Append events to one JSON collection per first key
    Partition {
        #[command(flatten)]
        input: InputArgs,
        /// Directory for partition collections [default: <output-dir>/partitions]
        #[arg(long)]
        partitions_dir: Option<PathBuf>,
    },
    /// Check that expected event types occur in the log
    Verify {
        #[command(flatten)]
        input: InputArgs,
        /// Expected event type (repeatable) [default: core Spark listener events]
        #[arg(long = "expect", value_name = "EVENT")]
        expected: Vec<String>,
        /// Field holding the event type
        #[arg(long, default_value = crate::events::DEFAULT_EVENT_KEY)]
        event_key: String,
    },
    /// Show statistics about an event log
    Stats {
        #[command(flatten)]
        input: InputArgs,
        /// Field holding the event type
        #[arg(long, default_value = crate::events::DEFAULT_EVENT_KEY)]
        event_key: String,
    },
    /// Flatten and classify in one pass over the log
    Run {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        table: TableArgs,
        #[command(flatten)]
        events: EventArgs,
    },
}

#[derive(Args)]
pub struct InputArgs {
    /// Event-log file or Spark event-log directory
    #[arg(short, long)]
    pub input: PathBuf,
    /// Stop after this many decoded records
    #[arg(long)]
    pub max_records: Option<usize>,
    /// Reject log files larger than this many bytes
    #[arg(long)]
    pub max_file_bytes: Option<u64>,
    /// Base directory for outputs [default: $EVENTLOG_OUTPUT_DIR or the current directory]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct TableArgs {
    /// Delimited output file [default: <output-dir>/<input name>.csv]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Cell delimiter
    #[arg(long, default_value_t = crate::export::DEFAULT_DELIMITER)]
    pub delimiter: char,
    /// Mapping levels to flatten below the top level
    #[arg(long)]
    pub max_depth: Option<usize>,
    /// Derive columns from only the first N records
    #[arg(long)]
    pub schema_sample: Option<usize>,
}

#[derive(Args)]
pub struct EventArgs {
    /// Directory for event-type collections [default: <output-dir>/events]
    #[arg(long)]
    pub events_dir: Option<PathBuf>,
    /// Field holding the event type
    #[arg(long, default_value = crate::events::DEFAULT_EVENT_KEY)]
    pub event_key: String,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Flatten { input, table }) => {
            let mut config = base_config(&input)?;
            apply_table_args(&mut config, table);
            let batch = load(&config)?;
            flatten_and_export(&config, &batch)?;
        }
        Some(Commands::Classify { input, events }) => {
            let mut config = base_config(&input)?;
            apply_event_args(&mut config, events);
            let batch = load(&config)?;
            classify(&config, &batch)?;
        }
        Some(Commands::Partition { input, partitions_dir }) => {
            let mut config = base_config(&input)?;
            if let Some(dir) = partitions_dir {
                config.partitions_dir = dir;
            }
            let batch = load(&config)?;
            let summary = partition_batch(&batch, &EventStore::new(&config.partitions_dir))?;
            print_collections("Partitions", &config.partitions_dir, &summary);
        }
        Some(Commands::Verify { input, expected, event_key }) => {
            let mut config = base_config(&input)?;
            config.event_key = event_key;
            if !expected.is_empty() {
                config.expected_events = expected;
            }
            let batch = load(&config)?;
            verify(&config, &batch)?;
        }
        Some(Commands::Stats { input, event_key }) => {
            let mut config = base_config(&input)?;
            config.event_key = event_key;
            let batch = load(&config)?;
            show_stats(&config, &batch);
        }
        Some(Commands::Run { input, table, events }) => {
            let mut config = base_config(&input)?;
            apply_table_args(&mut config, table);
            apply_event_args(&mut config, events);
            let batch = load(&config)?;
            flatten_and_export(&config, &batch)?;
            classify(&config, &batch)?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn base_config(input: &InputArgs) -> Result<PipelineConfig> {
    let output_dir = match &input.output_dir {
        Some(dir) => dir.clone(),
        None => get_output_dir()?,
    };

    let mut config = PipelineConfig::new(&input.input, &output_dir);
    config.max_records = input.max_records;
    if let Some(max_file_bytes) = input.max_file_bytes {
        config.max_file_bytes = max_file_bytes;
    }
    Ok(config)
}

fn apply_table_args(config: &mut PipelineConfig, table: TableArgs) {
    if let Some(output) = table.output {
        config.csv_output = output;
    }
    config.delimiter = table.delimiter;
    config.flatten.max_depth = table.max_depth;
    config.schema_sample = table.schema_sample;
}

fn apply_event_args(config: &mut PipelineConfig, events: EventArgs) {
    if let Some(dir) = events.events_dir {
        config.events_dir = dir;
    }
    config.event_key = events.event_key;
}

fn load(config: &PipelineConfig) -> Result<EventBatch> {
    load_batch(&config.input, config.max_records, config.max_file_bytes)
}

fn flatten_and_export(config: &PipelineConfig, batch: &EventBatch) -> Result<()> {
    let flat = flatten_batch(batch, &config.flatten, config.schema_sample);
    let mut writer = DelimitedFileWriter::new(&config.csv_output).with_delimiter(config.delimiter)?;
    let summary = export_batch(&flat, &mut writer)?;

    println!("Flattened events");
    println!("================");
    println!("Records: {}", batch.len());
    println!("Skipped lines: {}", batch.failures.len());
    println!("Columns: {}", flat.schema.len());
    println!("Rows written: {}", summary.rows_written);
    println!("Header written: {}", if summary.header_written { "yes" } else { "no" });
    println!("Output: {}", format_path_with_tilde(&summary.path));
    Ok(())
}

fn classify(config: &PipelineConfig, batch: &EventBatch) -> Result<()> {
    let extractor = EventExtractor::new(&config.event_key);
    let summary = classify_batch(batch, &extractor, &EventStore::new(&config.events_dir))?;
    print_collections("Event collections", &config.events_dir, &summary);
    Ok(())
}

fn print_collections(title: &str, dir: &Path, summary: &ClassifySummary) {
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!("Records stored: {}", summary.classified);
    println!("Records excluded: {}", summary.excluded);
    println!("Directory: {}", format_path_with_tilde(dir));
    for (name, outcome) in &summary.collections {
        println!("  {}: +{} ({} total)", printable_label(name), outcome.appended, outcome.len);
    }
}

fn verify(config: &PipelineConfig, batch: &EventBatch) -> Result<()> {
    let (observed, _) = count_event_types(batch, &EventExtractor::new(&config.event_key));
    let report = verify_captured(&config.expected_events, &observed);

    println!("Expected event types: {}", report.expected.len());
    println!("Observed event types: {}", report.observed.len());
    if report.is_complete() {
        println!("All expected events captured");
        return Ok(());
    }

    println!("Missing event types:");
    for event in &report.missing {
        println!("  {}", printable_label(event));
    }
    bail!("{} of {} expected event types missing", report.missing.len(), report.expected.len());
}

fn show_stats(config: &PipelineConfig, batch: &EventBatch) {
    let (counts, excluded) = count_event_types(batch, &EventExtractor::new(&config.event_key));
    let flat = flatten_batch(batch, &config.flatten, None);

    println!("Spark Event Log Statistics");
    println!("==========================");
    println!("Log files: {}", batch.sources.len());
    println!("Lines read: {}", batch.lines_read);
    println!("Records: {}", batch.len());
    println!("Skipped lines: {}", batch.failures.len());
    println!("Columns: {}", flat.schema.len());
    println!("Event types: {}", counts.len());
    for (event, count) in &counts {
        println!("  {}: {}", printable_label(event), count);
    }
    println!("Records without event type: {}", excluded);
}
