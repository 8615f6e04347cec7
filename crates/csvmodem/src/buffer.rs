//! Chunked reads from a byte source, decoded into a character cursor.

use alloc::{string::String, vec::Vec};

use crate::{
    encoding::TextEncoding,
    error::{EncodingError, ErrorKind},
    source::ByteSource,
};

/// Pulls fixed-size chunks from a source and exposes the decoded characters
/// one at a time.
///
/// Bytes that do not yet form a complete character are carried in `pending`
/// until the next read; between fills it holds less than one complete
/// encoding unit. The decoded buffer is dropped wholesale each time the
/// cursor consumes it, so neither buffer grows with input size.
pub(crate) struct ChunkBuffer<S> {
    source: S,
    encoding: TextEncoding,
    chunk_size: usize,
    pending: Vec<u8>,
    decoded: String,
    cursor: usize,
    exhausted: bool,
    /// Decoding failure discovered while characters were still queued.
    /// Surfaced only after the cursor drains `decoded`, so the characters
    /// before the bad bytes are delivered no matter how reads were chunked.
    pending_error: Option<EncodingError>,
}

impl<S: ByteSource> ChunkBuffer<S> {
    /// Reads up to four bytes to resolve the encoding, then wraps the source.
    ///
    /// Reading the signature here, rather than with the first chunk, keeps
    /// byte-order-mark detection independent of `chunk_size`.
    pub(crate) fn new(
        source: S,
        hint: Option<TextEncoding>,
        chunk_size: usize,
    ) -> Result<Self, ErrorKind> {
        let mut this = Self {
            source,
            encoding: TextEncoding::Utf8,
            chunk_size,
            pending: Vec::new(),
            decoded: String::new(),
            cursor: 0,
            exhausted: false,
            pending_error: None,
        };
        let mut initial = [0u8; 4];
        let mut len = 0;
        while len < 4 && this.source.has_more() {
            let read = this.source.read(&mut initial[len..])?;
            len += read;
            if read == 0 {
                break;
            }
        }
        let (encoding, signature) = TextEncoding::resolve(&initial[..len], hint);
        this.encoding = encoding;
        this.pending.extend_from_slice(&initial[signature..len]);
        Ok(this)
    }

    /// The encoding all reads are decoded under.
    pub(crate) fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Returns the character at the cursor without advancing, filling from
    /// the source as needed. `Ok(None)` is end of input.
    pub(crate) fn peek_char(&mut self) -> Result<Option<char>, ErrorKind> {
        loop {
            if let Some(ch) = self.decoded[self.cursor..].chars().next() {
                return Ok(Some(ch));
            }
            if let Some(err) = self.pending_error.clone() {
                return Err(err.into());
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    /// Returns the character at the cursor and advances past it.
    pub(crate) fn next_char(&mut self) -> Result<Option<char>, ErrorKind> {
        let next = self.peek_char()?;
        if let Some(ch) = next {
            self.cursor += ch.len_utf8();
        }
        Ok(next)
    }

    /// Reads one chunk, decodes every complete character, and notes
    /// exhaustion or truncation once the source has no more bytes.
    ///
    /// Only source failures return `Err` here; decode failures are latched
    /// as `pending_error` because this fill may also have produced
    /// characters that must come out first.
    fn fill(&mut self) -> Result<(), ErrorKind> {
        if self.cursor != 0 && self.cursor == self.decoded.len() {
            self.decoded.clear();
            self.cursor = 0;
        }
        let start = self.pending.len();
        self.pending.resize(start + self.chunk_size, 0);
        let read = match self.source.read(&mut self.pending[start..]) {
            Ok(read) => read,
            Err(err) => {
                self.pending.truncate(start);
                return Err(err.into());
            }
        };
        self.pending.truncate(start + read);
        match self.encoding.decode_prefix(&self.pending, &mut self.decoded) {
            Ok(consumed) => {
                self.pending.drain(..consumed);
                if !self.source.has_more() {
                    if self.pending.is_empty() {
                        self.exhausted = true;
                    } else {
                        self.pending_error = Some(EncodingError::TruncatedSequence);
                    }
                }
            }
            Err(err) => {
                self.pending_error = Some(err);
            }
        }
        Ok(())
    }
}
