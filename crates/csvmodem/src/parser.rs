//! The streaming parse session: state machine, event queue, cancellation.

use alloc::{collections::VecDeque, string::String, sync::Arc, vec::Vec};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::{
    buffer::ChunkBuffer,
    encoding::TextEncoding,
    error::{CsvError, SyntaxError},
    event::CsvEvent,
    options::ParserOptions,
    sink::CsvSink,
    source::ByteSource,
};

/// The quote character. Dialects vary everything else; quoting is fixed.
const QUOTE: char = '"';

/// Where the machine stands between character steps.
///
/// Each variant carries only the data meaningful in that state, so nothing
/// can be read out of context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first line, between lines, or past the last one.
    InsideFile,
    /// A line just opened; its first character decides comment or field.
    InsideLine,
    /// Accumulating a field.
    InsideField {
        /// The field began with a quote.
        quoted: bool,
        /// An opening quote is unclosed, making delimiters and terminators
        /// literal content.
        in_quotes: bool,
    },
    /// Accumulating a comment's text.
    InsideComment,
    /// A cancellation request was observed. Terminal.
    Cancelled,
}

/// How a completed [`CsvParser::parse`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The whole source was parsed and the document-end event delivered.
    Finished,
    /// A cancellation request stopped the parse early. Not a failure: no
    /// failure notification was made.
    Cancelled,
}

/// Requests cancellation of a parse from any thread.
///
/// Handles are cheap to clone and outlive their parser; cancelling after the
/// parse ended is a no-op. The parser samples the flag at every character
/// boundary, so the request takes effect within one character.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Asks the parse to stop at the next character boundary.
    ///
    /// Cancellation is idempotent and silent: already-delivered events stand,
    /// no further events follow, and no failure is reported.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested through any handle.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// An incremental CSV parser over a byte source.
///
/// The session reads bounded chunks, decodes them, and walks a character
/// state machine that turns delimiter/terminator/quote/comment structure
/// into [`CsvEvent`]s. Events can be pulled through the `Iterator`
/// implementation or pushed into a [`CsvSink`] with [`parse`](Self::parse).
/// One session parses one source exactly once.
///
/// # Examples
///
/// ```rust
/// use csvmodem::{CsvEvent, CsvParser, ParserOptions};
///
/// let parser = CsvParser::new(b"a,b\nc".as_slice(), ParserOptions::default()).unwrap();
/// let fields: Vec<String> = parser
///     .filter_map(|event| match event.unwrap() {
///         CsvEvent::Field { value } => Some(value),
///         _ => None,
///     })
///     .collect();
/// assert_eq!(fields, ["a", "b", "c"]);
/// ```
pub struct CsvParser<S> {
    chars: ChunkBuffer<S>,
    delimiter: char,
    line_terminators: Vec<char>,
    comment_marker: char,
    state: State,
    /// One pushed-back character, re-consumed by the next state before the
    /// buffer advances again.
    reconsume: Option<char>,
    line: usize,
    /// Raw accumulator for the current field or comment, reused across them.
    field: String,
    events: VecDeque<CsvEvent>,
    cancel: Arc<AtomicBool>,
    finished: bool,
    errored: bool,
    /// A terminal failure detected by a step that had already queued events;
    /// it is held back until the queue drains.
    failure: Option<CsvError>,
}

impl<S: ByteSource> Iterator for CsvParser<S> {
    type Item = Result<CsvEvent, CsvError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

impl<S: ByteSource> CsvParser<S> {
    /// Creates a session over `source`, resolving the text encoding up front
    /// from the options hint or the leading byte-order-mark.
    ///
    /// # Errors
    ///
    /// Fails when the options are internally inconsistent (see
    /// [`ParserOptions`]) or when the source fails while the leading bytes
    /// are read. No sink is attached yet, so construction failures are only
    /// returned, never notified.
    pub fn new(source: S, options: ParserOptions) -> Result<Self, CsvError> {
        validate_options(&options).map_err(|err| CsvError::new(err, 0))?;
        let chars = ChunkBuffer::new(source, options.encoding, options.chunk_size)
            .map_err(|kind| CsvError::new(kind, 0))?;
        let mut events = VecDeque::new();
        events.push_back(CsvEvent::DocumentStart);
        Ok(Self {
            chars,
            delimiter: options.delimiter,
            line_terminators: options.line_terminators,
            comment_marker: options.comment_marker,
            state: State::InsideFile,
            reconsume: None,
            line: 1,
            field: String::new(),
            events,
            cancel: Arc::new(AtomicBool::new(false)),
            finished: false,
            errored: false,
            failure: None,
        })
    }

    /// The encoding resolved for this source at construction.
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.chars.encoding()
    }

    /// A handle for requesting cancellation, usable from any thread.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancel),
        }
    }

    /// Whether the machine stopped on an observed cancellation request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.state, State::Cancelled)
    }

    /// Runs the session to completion, delivering every remaining event to
    /// `sink`, and reports whether it finished or was cancelled.
    ///
    /// Taking `self` by value is the start guard: a session cannot be parsed
    /// twice. Events already pulled through the iterator are not replayed.
    ///
    /// # Errors
    ///
    /// The first terminal failure is handed to `sink.on_failure` exactly
    /// once, then returned. Cancellation is not a failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use csvmodem::{CsvParser, EventLog, ParseOutcome, ParserOptions};
    ///
    /// let parser = CsvParser::new(b"a,b\n#note\n".as_slice(), ParserOptions::default()).unwrap();
    /// let mut log = EventLog::default();
    /// assert_eq!(parser.parse(&mut log).unwrap(), ParseOutcome::Finished);
    /// assert_eq!(log.events.len(), 9);
    /// assert_eq!(log.failure, None);
    /// ```
    pub fn parse(mut self, sink: &mut impl CsvSink) -> Result<ParseOutcome, CsvError> {
        loop {
            match self.next_event() {
                Some(Ok(event)) => dispatch(sink, event),
                Some(Err(error)) => {
                    sink.on_failure(&error);
                    return Err(error);
                }
                None => {
                    return Ok(if self.is_cancelled() {
                        ParseOutcome::Cancelled
                    } else {
                        ParseOutcome::Finished
                    });
                }
            }
        }
    }

    /// Produces the next queued event, stepping the machine as needed.
    ///
    /// Returns `None` once the document ended, a failure was already
    /// yielded, or cancellation was observed. Events queued by the failing
    /// step are delivered before the failure itself.
    fn next_event(&mut self) -> Option<Result<CsvEvent, CsvError>> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Some(Ok(event));
            }
            if self.finished || matches!(self.state, State::Cancelled) {
                return None;
            }
            if self.errored {
                return self.failure.take().map(Err);
            }
            if let Err(error) = self.step() {
                self.errored = true;
                self.failure = Some(error);
            }
        }
    }

    /// Advances the machine by one character (or end of input), queueing the
    /// events that character completes. The cancellation flag is sampled
    /// here, once per step.
    fn step(&mut self) -> Result<(), CsvError> {
        if self.cancel.load(Ordering::Acquire) {
            self.state = State::Cancelled;
            return Ok(());
        }
        match self.state {
            State::Cancelled => Ok(()),
            State::InsideFile => match self.take_char()? {
                None => {
                    self.events.push_back(CsvEvent::DocumentEnd);
                    self.finished = true;
                    Ok(())
                }
                Some(ch) => {
                    self.events.push_back(CsvEvent::LineStart { line: self.line });
                    self.state = State::InsideLine;
                    self.reconsume = Some(ch);
                    Ok(())
                }
            },
            State::InsideLine => match self.take_char()? {
                None => self.finish_line(None),
                Some(ch) if ch == self.comment_marker => {
                    self.field.clear();
                    self.state = State::InsideComment;
                    Ok(())
                }
                Some(ch) => {
                    self.field.clear();
                    self.state = State::InsideField {
                        quoted: false,
                        in_quotes: false,
                    };
                    self.reconsume = Some(ch);
                    Ok(())
                }
            },
            State::InsideField { quoted, in_quotes } => self.field_step(quoted, in_quotes),
            State::InsideComment => match self.take_char()? {
                None => {
                    let text = core::mem::take(&mut self.field);
                    self.events.push_back(CsvEvent::Comment { text });
                    self.finish_line(None)
                }
                Some(ch) if self.is_terminator(ch) => {
                    let text = core::mem::take(&mut self.field);
                    self.events.push_back(CsvEvent::Comment { text });
                    self.finish_line(Some(ch))
                }
                Some(ch) => {
                    self.field.push(ch);
                    Ok(())
                }
            },
        }
    }

    /// One character inside a field.
    fn field_step(&mut self, quoted: bool, in_quotes: bool) -> Result<(), CsvError> {
        let Some(ch) = self.take_char()? else {
            if quoted && in_quotes {
                return Err(CsvError::new(SyntaxError::UnbalancedQuotes, self.line));
            }
            self.emit_field();
            return self.finish_line(None);
        };
        if quoted && ch == QUOTE {
            // Every quote in a quoted field toggles; doubled pairs collapse
            // later, during cleaning.
            self.state = State::InsideField {
                quoted,
                in_quotes: !in_quotes,
            };
            self.field.push(ch);
            return Ok(());
        }
        if quoted && in_quotes {
            // Open quote: delimiters and terminators are literal, which is
            // how a field spans physical lines.
            self.field.push(ch);
            return Ok(());
        }
        if ch == self.delimiter {
            self.emit_field();
            self.state = State::InsideField {
                quoted: false,
                in_quotes: false,
            };
            return Ok(());
        }
        if self.is_terminator(ch) {
            self.emit_field();
            return self.finish_line(Some(ch));
        }
        if !quoted && self.field.is_empty() && ch == QUOTE {
            self.state = State::InsideField {
                quoted: true,
                in_quotes: true,
            };
        }
        self.field.push(ch);
        Ok(())
    }

    /// Ends the current line: collapses a CR-LF pair when `terminator` is a
    /// carriage return, queues the line-end, and advances the line counter.
    /// `None` means end of input, which also ends the document.
    fn finish_line(&mut self, terminator: Option<char>) -> Result<(), CsvError> {
        if terminator == Some('\r') && self.line_terminators.contains(&'\n') {
            if let Some('\n') = self.peek_char()? {
                self.next_char()?;
            }
        }
        self.events.push_back(CsvEvent::LineEnd { line: self.line });
        self.line += 1;
        match terminator {
            Some(_) => self.state = State::InsideFile,
            None => {
                self.events.push_back(CsvEvent::DocumentEnd);
                self.finished = true;
            }
        }
        Ok(())
    }

    fn emit_field(&mut self) {
        let value = self.cleaned_field();
        self.events.push_back(CsvEvent::Field { value });
    }

    /// The delivered form of the raw accumulator: when the raw text is
    /// wrapped in quotes the pair is stripped and doubled quotes inside
    /// collapse to one; anything else passes through untouched.
    fn cleaned_field(&mut self) -> String {
        let raw = core::mem::take(&mut self.field);
        if raw.len() >= 2 && raw.starts_with(QUOTE) && raw.ends_with(QUOTE) {
            let body = &raw[1..raw.len() - 1];
            let mut value = String::with_capacity(body.len());
            let mut chars = body.chars().peekable();
            while let Some(ch) = chars.next() {
                value.push(ch);
                if ch == QUOTE && chars.peek() == Some(&QUOTE) {
                    chars.next();
                }
            }
            value
        } else {
            raw
        }
    }

    fn is_terminator(&self, ch: char) -> bool {
        self.line_terminators.contains(&ch)
    }

    /// The pushed-back character if one is pending, otherwise the next one
    /// from the buffer.
    fn take_char(&mut self) -> Result<Option<char>, CsvError> {
        match self.reconsume.take() {
            Some(ch) => Ok(Some(ch)),
            None => self.next_char(),
        }
    }

    fn next_char(&mut self) -> Result<Option<char>, CsvError> {
        self.chars
            .next_char()
            .map_err(|kind| CsvError::new(kind, self.line))
    }

    fn peek_char(&mut self) -> Result<Option<char>, CsvError> {
        self.chars
            .peek_char()
            .map_err(|kind| CsvError::new(kind, self.line))
    }
}

impl<'a> CsvParser<&'a [u8]> {
    /// Parses an in-memory string.
    ///
    /// The text is already decoded, so the encoding option is overridden to
    /// UTF-8 and a leading U+FEFF, if any, is data rather than a signature.
    ///
    /// # Errors
    ///
    /// Fails only when the options are internally inconsistent.
    pub fn from_text(text: &'a str, options: ParserOptions) -> Result<Self, CsvError> {
        let options = ParserOptions {
            encoding: Some(TextEncoding::Utf8),
            ..options
        };
        Self::new(text.as_bytes(), options)
    }
}

fn dispatch(sink: &mut impl CsvSink, event: CsvEvent) {
    match event {
        CsvEvent::DocumentStart => sink.on_document_start(),
        CsvEvent::LineStart { line } => sink.on_line_start(line),
        CsvEvent::Field { value } => sink.on_field(value),
        CsvEvent::Comment { text } => sink.on_comment(text),
        CsvEvent::LineEnd { line } => sink.on_line_end(line),
        CsvEvent::DocumentEnd => sink.on_document_end(),
    }
}

fn validate_options(options: &ParserOptions) -> Result<(), SyntaxError> {
    if options.chunk_size == 0 {
        return Err(SyntaxError::InvalidOptions("chunk size must be nonzero"));
    }
    if options.delimiter == QUOTE || options.comment_marker == QUOTE {
        return Err(SyntaxError::InvalidOptions(
            "the quote character cannot be reused by the dialect",
        ));
    }
    if options.delimiter == options.comment_marker {
        return Err(SyntaxError::InvalidOptions(
            "delimiter and comment marker must differ",
        ));
    }
    if options.line_terminators.contains(&options.delimiter) {
        return Err(SyntaxError::InvalidOptions(
            "the delimiter cannot be a line terminator",
        ));
    }
    if options.line_terminators.contains(&options.comment_marker) {
        return Err(SyntaxError::InvalidOptions(
            "the comment marker cannot be a line terminator",
        ));
    }
    if options.line_terminators.contains(&QUOTE) {
        return Err(SyntaxError::InvalidOptions(
            "the quote character cannot be a line terminator",
        ));
    }
    Ok(())
}
