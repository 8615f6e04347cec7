use alloc::{vec, vec::Vec};

use crate::encoding::TextEncoding;

pub(crate) const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Configuration options for a CSV parse session.
///
/// The dialect characters (delimiter, line terminators, comment marker)
/// drive the grammar; the encoding hint and chunk size drive decoding. The
/// quote character is fixed as `"`. The dialect characters must be distinct
/// from each other and from the quote, which
/// [`CsvParser::new`](crate::CsvParser::new) checks.
///
/// # Examples
///
/// ```rust
/// use csvmodem::{CsvParser, ParserOptions};
///
/// let options = ParserOptions {
///     delimiter: ';',
///     ..Default::default()
/// };
/// let parser = CsvParser::new(b"1;2".as_slice(), options).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Character separating fields within a line.
    ///
    /// # Default
    ///
    /// `','`
    pub delimiter: char,

    /// Characters that terminate a line.
    ///
    /// A carriage return immediately followed by a line feed counts as one
    /// terminator, not two, when both are in the set.
    ///
    /// # Default
    ///
    /// `['\r', '\n']`
    pub line_terminators: Vec<char>,

    /// Character introducing a comment when it is the first character of a
    /// line. Anywhere else it is ordinary field data.
    ///
    /// # Default
    ///
    /// `'#'`
    pub comment_marker: char,

    /// Encoding to decode the source under.
    ///
    /// `None` auto-detects from the byte-order-mark and falls back to UTF-8.
    /// A hint is used verbatim: no signature bytes are skipped even when the
    /// input starts with a matching byte-order-mark.
    ///
    /// # Default
    ///
    /// `None`
    pub encoding: Option<TextEncoding>,

    /// Largest number of bytes requested from the source per read. Must be
    /// nonzero.
    ///
    /// Smaller chunks bound peak memory more tightly at the cost of more
    /// read calls; the emitted events are identical for any chunk size.
    ///
    /// # Default
    ///
    /// `4096`
    pub chunk_size: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            line_terminators: vec!['\r', '\n'],
            comment_marker: '#',
            encoding: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
