use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Overrides where tabular exports and event collections are written by default
pub const OUTPUT_DIR_ENV: &str = "EVENTLOG_OUTPUT_DIR";

/// Default output directory: `$EVENTLOG_OUTPUT_DIR` when set and non-empty, else the
/// current working directory
pub fn get_output_dir() -> Result<PathBuf> {
    resolve_output_dir(env::var_os(OUTPUT_DIR_ENV))
}

fn resolve_output_dir(configured: Option<OsString>) -> Result<PathBuf> {
    match configured {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => env::current_dir().context("Failed to determine current directory"),
    }
}
