//! Streaming, incremental CSV parsing over raw bytes.
//!
//! `csvmodem` reads a byte source in fixed-size chunks, decodes the bytes
//! (UTF-8, UTF-16, or UTF-32, resolved from a caller hint or the leading
//! byte-order-mark), and walks a character state machine that reports the
//! document's structure as [`CsvEvent`]s: lines, fields, and comments,
//! bracketed by a document start and end. The event sequence for a given
//! source and options never depends on the chunk size, so callers can tune
//! read granularity without changing what they observe.
//!
//! Events can be pulled one at a time through [`Iterator`], or pushed into a
//! [`CsvSink`] by running the session to completion:
//!
//! ```rust
//! use csvmodem::{CsvEvent, CsvParser, ParserOptions};
//!
//! let parser = CsvParser::new(
//!     b"name,role\nferris,\"mascot, crab\"".as_slice(),
//!     ParserOptions::default(),
//! )
//! .unwrap();
//!
//! let fields: Vec<String> = parser
//!     .filter_map(|event| match event.unwrap() {
//!         CsvEvent::Field { value } => Some(value),
//!         _ => None,
//!     })
//!     .collect();
//! assert_eq!(fields, ["name", "role", "ferris", "mascot, crab"]);
//! ```
//!
//! A running parse can be stopped from any thread through a
//! [`CancelHandle`]; cancellation truncates the event sequence without
//! reporting a failure.

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod buffer;
mod encoding;
mod error;
mod event;
mod options;
mod parser;
mod sink;
mod source;

#[cfg(test)]
mod tests;

pub use encoding::TextEncoding;
pub use error::{CsvError, EncodingError, ErrorKind, SourceError, SyntaxError};
pub use event::CsvEvent;
pub use options::ParserOptions;
pub use parser::{CancelHandle, CsvParser, ParseOutcome};
pub use sink::{CsvSink, EventLog};
pub use source::ByteSource;
#[cfg(feature = "std")]
pub use source::IoSource;
