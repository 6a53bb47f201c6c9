//! Parsers for Spark event logs and for literals embedded in event payload text
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach:
//!
//! - **Individual line failures**: A line that is not a JSON object is reported as a
//!   [`DecodeFailure`](crate::models::DecodeFailure), logged through `tracing`, and skipped.
//!   A malformed line never aborts decoding of the rest of the log.
//!
//! - **Stream failures**: I/O errors on the underlying reader (file vanished, permission denied)
//!   are fatal and propagate as `anyhow::Error` with context.
//!
//! - **User feedback**: A summary of decoded and skipped lines is logged once the stream is done.
//!
//! - **Embedded literals**: [`literal`] parses the mapping/sequence/scalar literal syntax
//!   some producers wrap events in. It never evaluates expressions.

pub mod lines;
pub mod literal;

pub use lines::{DecodedLine, DecodedLog, LineDecoder, decode_file, decode_reader};
pub use literal::{LiteralError, find_embedded_literal, parse_literal};
