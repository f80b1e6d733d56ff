//! Byte-buffered file writer with `tell`/`seek` for same-length patching.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

/// Default flush threshold for [`BufferedPatchWriter`].
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Sequential writer that buffers small appends and flushes them to a backing file once the
/// buffer reaches its threshold.
///
/// Flush boundaries are invisible to callers. The only non-sequential operation is
/// [`seek`](Self::seek), which repositions the file cursor so the next write *overwrites*
/// previously committed bytes; callers must keep such overwrites length-preserving.
#[derive(Debug)]
pub struct BufferedPatchWriter {
    file: Option<File>,
    buffer: Vec<u8>,
    threshold: usize,
    check_utf8: bool,
    // Trailing bytes of a multi-byte sequence split across two flushes.
    utf8_carry: Vec<u8>,
}

impl BufferedPatchWriter {
    /// Create (or truncate) `path` and write to it.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }

    pub fn new(file: File) -> Self {
        Self {
            file: Some(file),
            buffer: Vec::with_capacity(DEFAULT_BUFFER_SIZE),
            threshold: DEFAULT_BUFFER_SIZE,
            check_utf8: false,
            utf8_carry: Vec::new(),
        }
    }

    /// Set the number of buffered bytes that triggers a flush. Zero flushes on every write.
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enable UTF-8 validation of everything flushed to disk.
    ///
    /// Invalid input is logged once; validation is then switched off for the rest of the
    /// stream and the bytes are written regardless.
    pub fn with_utf8_check(mut self, check_utf8: bool) -> Self {
        self.check_utf8 = check_utf8;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Whether UTF-8 validation is (still) active.
    pub fn checks_utf8(&self) -> bool {
        self.check_utf8
    }

    /// Append bytes, flushing to the file once the buffer reaches the threshold.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) -> io::Result<()> {
        if self.file.is_none() {
            return Err(closed_error());
        }
        self.buffer.extend_from_slice(bytes.as_ref());
        if self.buffer.len() >= self.threshold {
            self.purge()?;
        }
        Ok(())
    }

    /// Current logical offset in the backing file. Flushes pending bytes first.
    pub fn tell(&mut self) -> io::Result<u64> {
        self.purge()?;
        let file = self.file.as_mut().ok_or_else(closed_error)?;
        file.stream_position()
    }

    /// Flush, then move the file cursor to `offset` so subsequent writes overwrite in place.
    pub fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.purge()?;
        let file = self.file.as_mut().ok_or_else(closed_error)?;
        file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Flush any buffered bytes and release the file handle. Calling `close` again is a no-op.
    pub fn close(&mut self) -> io::Result<()> {
        if self.file.is_none() {
            return Ok(());
        }
        self.purge()?;
        if self.check_utf8 && !self.utf8_carry.is_empty() {
            log::warn!("invalid UTF-8 detected: stream ends inside a multi-byte sequence");
            self.check_utf8 = false;
        }
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        Ok(())
    }

    fn purge(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        if self.check_utf8 {
            self.validate_utf8();
        }
        let file = self.file.as_mut().ok_or_else(closed_error)?;
        file.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }

    fn validate_utf8(&mut self) {
        let mut chunk = std::mem::take(&mut self.utf8_carry);
        chunk.extend_from_slice(&self.buffer);
        match std::str::from_utf8(&chunk) {
            Ok(_) => {}
            // Incomplete sequence at the end: re-check it together with the next flush.
            Err(err) if err.error_len().is_none() => {
                self.utf8_carry = chunk[err.valid_up_to()..].to_vec();
            }
            Err(err) => {
                log::warn!(
                    "invalid UTF-8 detected at byte {} of flushed chunk; disabling validation for this stream",
                    err.valid_up_to()
                );
                self.check_utf8 = false;
            }
        }
    }
}

impl Drop for BufferedPatchWriter {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("failed to flush buffered writer on drop: {err}");
        }
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "buffered writer is closed")
}
