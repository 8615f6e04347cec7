use alloc::string::String;

use thiserror::Error;

/// Terminal failure raised while constructing or driving a parse session.
///
/// Carries the failure kind and the 1-based line number where it was
/// detected. Once an error is produced the session emits no further events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}")]
pub struct CsvError {
    pub(crate) kind: ErrorKind,
    pub(crate) line: usize,
}

impl CsvError {
    pub(crate) fn new(kind: impl Into<ErrorKind>, line: usize) -> Self {
        Self { kind: kind.into(), line }
    }

    /// The kind of failure.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// 1-based line number where the failure was detected.
    ///
    /// Zero marks failures raised before the first line was started, such as
    /// invalid options or a source error while resolving the encoding.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

/// The three failure classes a parse can end with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input bytes do not form valid text under the resolved encoding.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),
    /// The character stream violates the CSV grammar.
    #[error("parse error: {0}")]
    Parse(#[from] SyntaxError),
    /// The byte source reported a read failure, propagated not interpreted.
    #[error("source error: {0}")]
    Source(#[from] SourceError),
}

/// Byte-level decoding failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The source ended in the middle of a multi-byte sequence.
    #[error("truncated multi-byte sequence at end of input")]
    TruncatedSequence,
    /// A byte sequence that is invalid in the resolved encoding.
    #[error("invalid byte sequence")]
    InvalidByteSequence,
    /// A UTF-16 surrogate code unit without its mate.
    #[error("unpaired surrogate 0x{0:04X}")]
    UnpairedSurrogate(u16),
    /// A UTF-32 code unit outside the Unicode scalar value range.
    #[error("invalid scalar value 0x{0:X}")]
    InvalidScalar(u32),
}

/// Grammar violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// End of input was reached with a quoted field still open.
    #[error("unbalanced quotes at end of input")]
    UnbalancedQuotes,
    /// The configured dialect is internally inconsistent.
    #[error("{0}")]
    InvalidOptions(&'static str),
}

/// Read failure reported by a [`ByteSource`](crate::ByteSource).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    /// Wraps a source-specific failure description.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        use alloc::string::ToString;

        Self::new(err.to_string())
    }
}
