use std::borrow::Cow;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use sha2::{Digest, Sha256};

/// Default upper bound for a single event-log file: 2 GiB
pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

// Characters that are unsafe or ambiguous in file names on common platforms.
// '%' is included so names decode back unambiguously.
const FILE_NAME_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b'/')
    .add(b'\\')
    .add(b':')
    .add(b'*')
    .add(b'?')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'|')
    .add(b'%');

// A bare '%' never comes out of the encoder, so it can stand for the empty name
const EMPTY_NAME_STEM: &str = "%";

/// Longest encoded stem kept verbatim. Longer stems are cut and suffixed with a digest so the
/// file name (stem, digest, extension) stays under the common 255-byte limit.
pub const MAX_STEM_BYTES: usize = 180;

// '~' is never encoded; it separates the kept prefix from the digest
const DIGEST_MARKER: char = '~';
const DIGEST_HEX_CHARS: usize = 16;

/// Encodes an event type into the stem of its collection file name
///
/// Path separators and other reserved characters are percent-encoded and a leading `.`
/// becomes `%2E`, so the result never escapes the collections directory or turns hidden.
/// Stems longer than [`MAX_STEM_BYTES`] keep their first bytes and end in `~` plus a
/// SHA-256 prefix of the full event type.
///
/// # Examples
///
/// ```
/// use eventlog_flattener::utils::collection_file_name;
///
/// assert_eq!(collection_file_name("SparkListenerJobStart"), "SparkListenerJobStart");
/// assert_eq!(collection_file_name("../etc"), "%2E.%2Fetc");
/// ```
pub fn collection_file_name(event_type: &str) -> String {
    let encoded = utf8_percent_encode(event_type, FILE_NAME_ENCODE_SET).to_string();
    let stem = match encoded.strip_prefix('.') {
        Some(rest) => format!("%2E{}", rest),
        None if encoded.is_empty() => EMPTY_NAME_STEM.to_string(),
        None => encoded,
    };
    if stem.len() <= MAX_STEM_BYTES {
        return stem;
    }

    // The encoded stem is ASCII; only avoid splitting a `%XX` triple
    let mut cut = MAX_STEM_BYTES;
    if let Some(percent) = stem[cut - 2..cut].find('%') {
        cut = cut - 2 + percent;
    }
    let digest = hex::encode(Sha256::digest(event_type.as_bytes()));
    format!("{}{}{}", &stem[..cut], DIGEST_MARKER, &digest[..DIGEST_HEX_CHARS])
}

fn digest_suffix_start(stem: &str) -> Option<usize> {
    if stem.len() <= MAX_STEM_BYTES {
        return None;
    }
    let start = stem.len().checked_sub(DIGEST_HEX_CHARS + 1)?;
    let (prefix, suffix) = stem.split_at(start);
    let digest = suffix.strip_prefix(DIGEST_MARKER)?;
    digest.bytes().all(|b| b.is_ascii_hexdigit()).then_some(prefix.len())
}

/// Inverse of [`collection_file_name`]
///
/// For a digest-suffixed stem only the kept prefix can be recovered; it is returned with
/// `…` appended.
///
/// # Examples
///
/// ```
/// use eventlog_flattener::utils::event_type_from_file_name;
///
/// assert_eq!(event_type_from_file_name("%2E.%2Fetc"), "../etc");
/// ```
pub fn event_type_from_file_name(stem: &str) -> String {
    if stem == EMPTY_NAME_STEM {
        return String::new();
    }
    match digest_suffix_start(stem) {
        Some(end) => format!("{}…", percent_decode_str(&stem[..end]).decode_utf8_lossy()),
        None => percent_decode_str(stem).decode_utf8_lossy().into_owned(),
    }
}

/// Tabular export path used when none is given: `<output_dir>/<input stem>.csv`
pub fn default_csv_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "events".to_string());
    output_dir.join(format!("{}.csv", stem))
}

/// Validates that a file's size is within `max_bytes`
///
/// Takes an open file handle to avoid TOCTOU (time-of-check-time-of-use)
/// races between the size check and the read.
///
/// # Errors
///
/// Returns an error if the file metadata cannot be read or the file is larger than `max_bytes`.
pub fn validate_file_size(file: &File, path: &Path, max_bytes: u64) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > max_bytes {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            max_bytes
        );
    }

    Ok(())
}

/// Formats a path with ~ substitution for the home directory
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(
    path: &Path,
    home_override: Option<&str>,
) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
