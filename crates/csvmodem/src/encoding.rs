//! Text encodings, byte-order-mark detection, and incremental decoding.
//!
//! Decoding works on byte prefixes: each call consumes the longest prefix of
//! the input that forms complete characters and reports how many bytes it
//! used, so a trailing partial sequence can be retried once more bytes
//! arrive. Only a sequence that can never become valid is an error.

use alloc::string::String;
use core::fmt;

use crate::error::EncodingError;

/// A text encoding the decoder understands.
///
/// Auto-detection covers exactly these encodings; inputs with no
/// byte-order-mark fall back to [`TextEncoding::Utf8`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum TextEncoding {
    /// UTF-8, the default.
    Utf8,
    /// UTF-16, little-endian code units.
    Utf16Le,
    /// UTF-16, big-endian code units.
    Utf16Be,
    /// UTF-32, little-endian code units.
    Utf32Le,
    /// UTF-32, big-endian code units.
    Utf32Be,
}

impl TextEncoding {
    /// Looks an encoding up by name, case-insensitively.
    ///
    /// Accepts the canonical labels (`"utf-8"`, `"utf-16le"`, `"utf-16be"`,
    /// `"utf-32le"`, `"utf-32be"`) plus the common aliases `"utf8"` and the
    /// endianness-free `"utf-16"`/`"utf-32"`, which resolve little-endian.
    /// Unknown labels yield `None`.
    #[must_use]
    pub fn for_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let is = |name: &str| label.eq_ignore_ascii_case(name);
        if is("utf-8") || is("utf8") {
            Some(Self::Utf8)
        } else if is("utf-16le") || is("utf-16") {
            Some(Self::Utf16Le)
        } else if is("utf-16be") {
            Some(Self::Utf16Be)
        } else if is("utf-32le") || is("utf-32") {
            Some(Self::Utf32Le)
        } else if is("utf-32be") {
            Some(Self::Utf32Be)
        } else {
            None
        }
    }

    /// The canonical lowercase label for this encoding.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
            Self::Utf32Le => "utf-32le",
            Self::Utf32Be => "utf-32be",
        }
    }

    /// Matches a byte-order-mark at the start of `initial`, returning the
    /// encoding and the signature length to skip.
    ///
    /// The UTF-32 marks begin with UTF-16 marks, so the longer signatures
    /// are tried first.
    pub(crate) fn sniff(initial: &[u8]) -> Option<(Self, usize)> {
        if initial.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
            Some((Self::Utf32Be, 4))
        } else if initial.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
            Some((Self::Utf32Le, 4))
        } else if initial.starts_with(&[0xEF, 0xBB, 0xBF]) {
            Some((Self::Utf8, 3))
        } else if initial.starts_with(&[0xFE, 0xFF]) {
            Some((Self::Utf16Be, 2))
        } else if initial.starts_with(&[0xFF, 0xFE]) {
            Some((Self::Utf16Le, 2))
        } else {
            None
        }
    }

    /// Resolves the encoding for a stream from its leading bytes and an
    /// optional caller hint.
    ///
    /// A hint wins unconditionally and skips no signature bytes; otherwise
    /// the byte-order-mark decides, with UTF-8 as the documented fallback.
    pub(crate) fn resolve(initial: &[u8], hint: Option<Self>) -> (Self, usize) {
        match hint {
            Some(encoding) => (encoding, 0),
            None => Self::sniff(initial).unwrap_or((Self::Utf8, 0)),
        }
    }

    /// Decodes the longest complete-character prefix of `input` into `out`,
    /// returning the number of bytes consumed.
    ///
    /// A trailing sequence that could still be completed by later bytes is
    /// left unconsumed; a sequence that can never become valid fails.
    pub(crate) fn decode_prefix(
        self,
        input: &[u8],
        out: &mut String,
    ) -> Result<usize, EncodingError> {
        match self {
            Self::Utf8 => decode_utf8_prefix(input, out),
            Self::Utf16Le => decode_utf16_prefix(input, false, out),
            Self::Utf16Be => decode_utf16_prefix(input, true, out),
            Self::Utf32Le => decode_utf32_prefix(input, false, out),
            Self::Utf32Be => decode_utf32_prefix(input, true, out),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether `byte` can begin a UTF-8 sequence. Distinguishes a truncated
/// tail worth keeping from bytes that can never decode.
fn utf8_can_begin(byte: u8) -> bool {
    matches!(byte, 0x00..=0x7F | 0xC2..=0xDF | 0xE0..=0xEF | 0xF0..=0xF4)
}

fn decode_utf8_prefix(input: &[u8], out: &mut String) -> Result<usize, EncodingError> {
    let mut pos = 0;
    while pos < input.len() {
        let (decoded, size) = bstr::decode_utf8(&input[pos..]);
        match decoded {
            Some(ch) => {
                out.push(ch);
                pos += size;
            }
            // `size` covers the rest of the input and may still grow into a
            // complete sequence, so keep it for the next chunk.
            None if pos + size == input.len() && utf8_can_begin(input[pos]) => break,
            None => return Err(EncodingError::InvalidByteSequence),
        }
    }
    Ok(pos)
}

fn read_u16(bytes: &[u8], big_endian: bool) -> u16 {
    let pair = [bytes[0], bytes[1]];
    if big_endian {
        u16::from_be_bytes(pair)
    } else {
        u16::from_le_bytes(pair)
    }
}

fn decode_utf16_prefix(
    input: &[u8],
    big_endian: bool,
    out: &mut String,
) -> Result<usize, EncodingError> {
    let mut pos = 0;
    while input.len() - pos >= 2 {
        let unit = read_u16(&input[pos..], big_endian);
        match unit {
            0xD800..=0xDBFF => {
                if input.len() - pos < 4 {
                    // The low half may arrive with the next chunk.
                    break;
                }
                let low = read_u16(&input[pos + 2..], big_endian);
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(EncodingError::UnpairedSurrogate(unit));
                }
                let scalar =
                    0x1_0000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                match char::from_u32(scalar) {
                    Some(ch) => out.push(ch),
                    None => return Err(EncodingError::InvalidScalar(scalar)),
                }
                pos += 4;
            }
            0xDC00..=0xDFFF => return Err(EncodingError::UnpairedSurrogate(unit)),
            _ => {
                match char::from_u32(u32::from(unit)) {
                    Some(ch) => out.push(ch),
                    None => return Err(EncodingError::InvalidScalar(u32::from(unit))),
                }
                pos += 2;
            }
        }
    }
    Ok(pos)
}

fn decode_utf32_prefix(
    input: &[u8],
    big_endian: bool,
    out: &mut String,
) -> Result<usize, EncodingError> {
    let mut pos = 0;
    while input.len() - pos >= 4 {
        let quad = [input[pos], input[pos + 1], input[pos + 2], input[pos + 3]];
        let scalar = if big_endian {
            u32::from_be_bytes(quad)
        } else {
            u32::from_le_bytes(quad)
        };
        match char::from_u32(scalar) {
            Some(ch) => out.push(ch),
            None => return Err(EncodingError::InvalidScalar(scalar)),
        }
        pos += 4;
    }
    Ok(pos)
}
