use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::pipe::Shared;

/// The write end of a pipe. Implements `Write`.
///
/// Writes block while the pipe is full and fail once the pipe is closed,
/// except that writing an empty buffer always returns `Ok(0)`. Dropping the
/// handle closes the pipe.
pub struct PipeWriter {
    shared: Arc<Shared>,
    timeout: Option<Duration>,
}

/// The read end of a pipe. Implements `Read`.
///
/// Reads block until at least one byte is buffered, and return `Ok(0)` once
/// the pipe is closed and drained. Dropping the handle closes the pipe.
pub struct PipeReader {
    shared: Arc<Shared>,
    timeout: Option<Duration>,
}

impl PipeWriter {
    pub(crate) fn new(shared: Arc<Shared>, timeout: Option<Duration>) -> Self {
        Self { shared, timeout }
    }

    /// Queue `data`, blocking while the pipe is full.
    ///
    /// Returns the number of bytes queued, which is short of `data.len()` only
    /// when the write timeout elapsed after part of `data` was accepted.
    pub fn send(&mut self, data: &[u8]) -> Result<usize> {
        self.shared.write(data, self.timeout)
    }

    /// Close the pipe. Buffered bytes remain readable.
    pub fn close(&self) {
        self.shared.close();
    }

    /// Set the timeout for blocking writes.
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Current write timeout.
    pub fn write_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Number of bytes buffered and not yet read.
    pub fn available(&self) -> usize {
        self.shared.available()
    }

    /// Maximum number of buffered bytes, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.shared.capacity()
    }

    /// Whether either end closed the pipe.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

impl PipeReader {
    pub(crate) fn new(shared: Arc<Shared>, timeout: Option<Duration>) -> Self {
        Self { shared, timeout }
    }

    /// Read buffered bytes into `buf`, blocking while the pipe is empty and open.
    pub fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.shared.read(buf, self.timeout)
    }

    /// Close the pipe. Pending and future writes fail.
    pub fn close(&self) {
        self.shared.close();
    }

    /// Set the timeout for blocking reads.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Current read timeout.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Number of bytes that can be read without blocking.
    pub fn available(&self) -> usize {
        self.shared.available()
    }

    /// Maximum number of buffered bytes, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.shared.capacity()
    }

    /// Whether either end closed the pipe.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.send(buf).map_err(Into::into)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.recv(buf).map_err(Into::into)
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        self.shared.close();
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        self.shared.close();
    }
}

impl std::fmt::Debug for PipeWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeWriter")
            .field("available", &self.available())
            .field("capacity", &self.capacity())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl std::fmt::Debug for PipeReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeReader")
            .field("available", &self.available())
            .field("capacity", &self.capacity())
            .field("closed", &self.is_closed())
            .finish()
    }
}
