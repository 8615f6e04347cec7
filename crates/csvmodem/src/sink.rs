use alloc::{string::String, vec::Vec};

use crate::{error::CsvError, event::CsvEvent};

/// Callback interface a parse session drives.
///
/// Every method has a default no-op body, so a sink implements only what it
/// cares about. All calls are synchronous, made from the parsing thread, in
/// the order documented on [`CsvEvent`](crate::CsvEvent): the failure
/// callback, when it happens, is the last call and arrives exactly once.
pub trait CsvSink {
    /// The parse began.
    fn on_document_start(&mut self) {}

    /// A line began; `line` is 1-based.
    fn on_line_start(&mut self, _line: usize) {}

    /// A cleaned field value was read.
    fn on_field(&mut self, _value: String) {}

    /// A comment line was read; the text excludes the marker.
    fn on_comment(&mut self, _text: String) {}

    /// The current line ended.
    fn on_line_end(&mut self, _line: usize) {}

    /// The source was fully parsed.
    fn on_document_end(&mut self) {}

    /// The parse failed; no further calls follow.
    fn on_failure(&mut self, _error: &CsvError) {}
}

/// A sink that records every notification it receives.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventLog {
    /// Events in delivery order.
    pub events: Vec<CsvEvent>,
    /// The failure notification, if the parse ended with one.
    pub failure: Option<CsvError>,
}

impl CsvSink for EventLog {
    fn on_document_start(&mut self) {
        self.events.push(CsvEvent::DocumentStart);
    }

    fn on_line_start(&mut self, line: usize) {
        self.events.push(CsvEvent::LineStart { line });
    }

    fn on_field(&mut self, value: String) {
        self.events.push(CsvEvent::Field { value });
    }

    fn on_comment(&mut self, text: String) {
        self.events.push(CsvEvent::Comment { text });
    }

    fn on_line_end(&mut self, line: usize) {
        self.events.push(CsvEvent::LineEnd { line });
    }

    fn on_document_end(&mut self) {
        self.events.push(CsvEvent::DocumentEnd);
    }

    fn on_failure(&mut self, error: &CsvError) {
        self.failure = Some(error.clone());
    }
}
