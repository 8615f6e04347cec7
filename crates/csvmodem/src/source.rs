use crate::error::SourceError;

/// Capability the parser pulls raw bytes through.
///
/// A source is read in bounded chunks and never rewound. `read` may fill
/// fewer bytes than requested; an empty read combined with `has_more()`
/// returning `false` signals exhaustion.
pub trait ByteSource {
    /// Whether the source may still produce bytes.
    fn has_more(&self) -> bool;

    /// Reads up to `buf.len()` bytes into `buf` and returns the count filled.
    ///
    /// When no bytes are available yet, the call should block until some
    /// arrive or the source ends. Returning `Ok(0)` while `has_more()` stays
    /// `true` stalls the parse.
    ///
    /// # Errors
    ///
    /// Returns the source's own read failure; the parser propagates it
    /// without interpretation.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

/// In-memory source: reading consumes the slice from the front.
impl ByteSource for &[u8] {
    fn has_more(&self) -> bool {
        !self.is_empty()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        Ok(n)
    }
}

/// Adapter over any [`std::io::Read`].
///
/// End of file is latched on the first zero-length read so `has_more`
/// answers without issuing further reads. Interrupted reads are retried.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
    eof: bool,
}

#[cfg(feature = "std")]
impl<R> IoSource<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self { inner, eof: false }
    }

    /// Unwraps the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> ByteSource for IoSource<R> {
    fn has_more(&self) -> bool {
        !self.eof
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if self.eof || buf.is_empty() {
            return Ok(0);
        }
        loop {
            match self.inner.read(buf) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(0);
                }
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
                Err(err) => return Err(SourceError::from(err)),
            }
        }
    }
}
