//! Locating event-log files
//!
//! Spark writes one log per application into its event-log directory. An input path may be
//! such a directory or a single log, where a single log is anything readable as a byte stream
//! (a file, a FIFO, `/dev/stdin`). For a directory every regular file directly inside it is a
//! log, except hidden files and logs of applications still running (`.inprogress`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::warn;
use walkdir::WalkDir;

/// Suffix Spark gives logs of applications that have not finished
pub const IN_PROGRESS_SUFFIX: &str = ".inprogress";

/// Maximum number of log files taken from one directory (prevent resource exhaustion)
const MAX_LOG_FILES: usize = 10_000;

/// Resolve `input` to the event-log files to read, sorted by file name
///
/// # Errors
///
/// Returns an error if `input` does not exist, the directory cannot be read, or it holds
/// more than 10,000 log files. Skipped entries are logged as warnings.
pub fn discover_event_logs(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        bail!("Event log not found: {}", input.display());
    }
    // Anything that is not a directory is read as one log: files, FIFOs, `/dev/stdin`
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut logs = Vec::new();
    for entry in WalkDir::new(input).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("Failed to read event-log directory: {}", input.display()))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();

        if name.starts_with('.') {
            continue;
        }
        if !entry.file_type().is_file() {
            if entry.path_is_symlink() {
                warn!(path = %path.display(), "Skipping symlinked entry in event-log directory");
            }
            continue;
        }
        if name.ends_with(IN_PROGRESS_SUFFIX) {
            warn!(path = %path.display(), "Skipping log of an application that is still running");
            continue;
        }

        if logs.len() >= MAX_LOG_FILES {
            bail!(
                "Resource limit exceeded: {} holds more than {} event logs",
                input.display(),
                MAX_LOG_FILES
            );
        }
        logs.push(path.to_path_buf());
    }

    Ok(logs)
}
