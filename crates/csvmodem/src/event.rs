//! Structural events emitted by the streaming CSV parser.
//!
//! One parse produces `document-start`, then for every line a
//! `line-start`/`line-end` pair bracketing its fields (or its comment), and
//! finally `document-end`. Failures cut the sequence short; cancellation cuts
//! it short silently.
//!
//! # Examples
//!
//! ```
//! use csvmodem::{CsvEvent, CsvParser, ParserOptions};
//!
//! let parser = CsvParser::new(b"x,y".as_slice(), ParserOptions::default()).unwrap();
//! let events: Vec<_> = parser.collect();
//! assert_eq!(
//!     events,
//!     vec![
//!         Ok(CsvEvent::DocumentStart),
//!         Ok(CsvEvent::LineStart { line: 1 }),
//!         Ok(CsvEvent::Field { value: "x".to_string() }),
//!         Ok(CsvEvent::Field { value: "y".to_string() }),
//!         Ok(CsvEvent::LineEnd { line: 1 }),
//!         Ok(CsvEvent::DocumentEnd),
//!     ]
//! );
//! ```
use alloc::string::String;

/// One discrete parse notification.
///
/// Events arrive strictly in the order
/// `DocumentStart (LineStart (Field | Comment)* LineEnd)* DocumentEnd`;
/// comments and fields never share a line.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(tag = "kind"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvEvent {
    /// The parse began. Always delivered, even when cancellation was
    /// requested before the first character step.
    DocumentStart,
    /// A physical line with content began.
    LineStart {
        /// 1-based number of the line being started.
        line: usize,
    },
    /// One field value, in cleaned form.
    Field {
        /// The field text: bounding quotes stripped, doubled quotes
        /// collapsed, everything else verbatim.
        value: String,
    },
    /// A comment line's text.
    Comment {
        /// Everything between the comment marker and the line terminator.
        text: String,
    },
    /// The current line ended.
    LineEnd {
        /// 1-based number of the line being ended.
        line: usize,
    },
    /// The source was fully parsed. Never delivered after a failure or a
    /// cancellation.
    DocumentEnd,
}
