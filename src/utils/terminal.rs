//! Sanitizing log-derived text before it reaches the terminal
//!
//! Event-type names and first-key names come straight from the event log. The CLI prints
//! them in summaries, so escape sequences inside them could move the cursor or recolor the
//! terminal. [`printable_label`] reduces such text to one inert line.

/// Longest label printed before truncation, in characters
pub const MAX_LABEL_CHARS: usize = 120;

/// Single-line, escape-free rendering of log-derived text
///
/// ANSI CSI sequences (`ESC [ ... letter`) are removed, other control characters
/// (newlines included) become nothing, and the result is cut at [`MAX_LABEL_CHARS`]
/// with a trailing `…`.
///
/// # Examples
///
/// ```
/// use eventlog_flattener::utils::terminal::printable_label;
///
/// assert_eq!(printable_label("\x1b[31mSparkListenerJobStart\x1b[0m"), "SparkListenerJobStart");
/// ```
pub fn printable_label(text: &str) -> String {
    let mut result = String::with_capacity(text.len().min(MAX_LABEL_CHARS));
    let mut kept = 0;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // Parameters run until the final letter
            for next_ch in chars.by_ref() {
                if next_ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        if ch.is_control() {
            continue;
        }
        if kept == MAX_LABEL_CHARS {
            result.push('…');
            break;
        }
        result.push(ch);
        kept += 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_label_unchanged() {
        assert_eq!(printable_label("SparkListenerTaskEnd"), "SparkListenerTaskEnd");
    }

    #[test]
    fn test_strips_color_and_cursor_sequences() {
        assert_eq!(printable_label("\x1b[2J\x1b[HEvent\x1b[1;31m!\x1b[0m"), "Event!");
    }

    #[test]
    fn test_removes_control_characters() {
        assert_eq!(printable_label("Line 1\nLine 2\r\tend\x07\x08"), "Line 1Line 2end");
    }

    #[test]
    fn test_keeps_unicode() {
        assert_eq!(printable_label("事件 👋"), "事件 👋");
    }

    #[test]
    fn test_truncates_long_labels() {
        let long = "x".repeat(MAX_LABEL_CHARS + 10);
        let label = printable_label(&long);
        assert_eq!(label.chars().count(), MAX_LABEL_CHARS + 1);
        assert!(label.ends_with('…'));
    }

    #[test]
    fn test_exact_length_not_truncated() {
        let exact = "y".repeat(MAX_LABEL_CHARS);
        assert_eq!(printable_label(&exact), exact);
    }

    #[test]
    fn test_empty() {
        assert_eq!(printable_label(""), "");
        assert_eq!(printable_label("\x1b[31m\x1b[0m"), "");
    }
}
