use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::error::{PipeError, Result};
use crate::handle::{PipeReader, PipeWriter};

/// Default pipe capacity: 64 KiB.
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Chunk count above which small chunks get merged.
const COMPACT_MIN_CHUNKS: usize = 100;
/// Average chunk size below which a queue over `COMPACT_MIN_CHUNKS` is merged.
const COMPACT_MIN_AVERAGE: usize = 128;
/// Chunk count above which the queue is always merged.
const COMPACT_MAX_CHUNKS: usize = 1000;

/// Configuration for a pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeConfig {
    /// Maximum number of buffered bytes. `None` means unbounded. Default: 64 KiB.
    pub capacity: Option<usize>,
    /// Timeout for blocking reads. `None` blocks until data arrives or the pipe closes.
    pub read_timeout: Option<Duration>,
    /// Timeout for blocking writes. `None` blocks until space frees up or the pipe closes.
    pub write_timeout: Option<Duration>,
}

impl PipeConfig {
    /// A pipe holding at most `capacity` bytes.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// A pipe whose buffer grows without limit.
    pub fn unbounded() -> Self {
        Self {
            capacity: None,
            ..Self::default()
        }
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            capacity: Some(DEFAULT_CAPACITY),
            read_timeout: None,
            write_timeout: None,
        }
    }
}

/// Create a connected pipe and return its write and read handles.
///
/// ```
/// use std::io::{Read, Write};
/// use streamprims_pipe::{pipe, PipeConfig};
///
/// let (mut writer, mut reader) = pipe(PipeConfig::bounded(16)).unwrap();
/// writer.write_all(b"hello").unwrap();
/// writer.close();
///
/// let mut out = Vec::new();
/// reader.read_to_end(&mut out).unwrap();
/// assert_eq!(out, b"hello");
/// ```
pub fn pipe(config: PipeConfig) -> Result<(PipeWriter, PipeReader)> {
    if config.capacity == Some(0) {
        return Err(PipeError::InvalidCapacity(0));
    }

    let shared = Arc::new(Shared::new(config.capacity));
    let writer = PipeWriter::new(Arc::clone(&shared), config.write_timeout);
    let reader = PipeReader::new(shared, config.read_timeout);
    Ok((writer, reader))
}

/// State shared by both handles, guarded by a single monitor.
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<State>,
    changed: Condvar,
}

#[derive(Debug)]
struct State {
    chunks: VecDeque<Bytes>,
    available: usize,
    capacity: Option<usize>,
    closed: bool,
}

impl State {
    fn free(&self) -> usize {
        match self.capacity {
            Some(capacity) => capacity - self.available,
            None => usize::MAX - self.available,
        }
    }

    fn push(&mut self, data: &[u8]) {
        self.chunks.push_back(Bytes::copy_from_slice(data));
        self.available += data.len();
        self.compact_if_fragmented();
    }

    fn drain_into(&mut self, buf: &mut [u8]) -> usize {
        let mut copied = 0usize;
        while copied < buf.len() {
            let Some(head) = self.chunks.front_mut() else {
                break;
            };
            let n = head.len().min(buf.len() - copied);
            buf[copied..copied + n].copy_from_slice(&head[..n]);
            head.advance(n);
            if head.is_empty() {
                self.chunks.pop_front();
            }
            copied += n;
        }
        self.available -= copied;
        copied
    }

    fn compact_if_fragmented(&mut self) {
        let count = self.chunks.len();
        let fragmented = count > COMPACT_MAX_CHUNKS
            || (count > COMPACT_MIN_CHUNKS && self.available / count < COMPACT_MIN_AVERAGE);
        if !fragmented {
            return;
        }

        let mut merged = BytesMut::with_capacity(self.available);
        for chunk in self.chunks.drain(..) {
            merged.extend_from_slice(&chunk);
        }
        self.chunks.push_back(merged.freeze());
        trace!(chunks = count, available = self.available, "compacted pipe buffer");
    }
}

impl Shared {
    fn new(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(State {
                chunks: VecDeque::new(),
                available: 0,
                capacity,
                closed: false,
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block on the condvar until `deadline`. Returns `false` once the deadline passed.
    fn wait<'a>(
        &self,
        guard: MutexGuard<'a, State>,
        deadline: Option<Instant>,
    ) -> (MutexGuard<'a, State>, bool) {
        match deadline {
            None => (
                self.changed
                    .wait(guard)
                    .unwrap_or_else(PoisonError::into_inner),
                true,
            ),
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return (guard, false);
                }
                let (guard, _) = self
                    .changed
                    .wait_timeout(guard, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner);
                (guard, true)
            }
        }
    }

    /// Append `data` to the pipe, blocking while it is full.
    ///
    /// Returns the number of bytes accepted. The count is short of `data.len()`
    /// only when `timeout` elapsed after some bytes were already queued.
    pub(crate) fn write(&self, data: &[u8], timeout: Option<Duration>) -> Result<usize> {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut written = 0usize;
        let mut state = self.lock();

        while written < data.len() {
            if state.closed {
                return Err(PipeError::Closed);
            }

            let writable = state.free().min(data.len() - written);
            if writable == 0 {
                let (guard, in_time) = self.wait(state, deadline);
                state = guard;
                if !in_time {
                    if written > 0 {
                        return Ok(written);
                    }
                    return Err(PipeError::Timeout(timeout.unwrap_or_default()));
                }
                continue;
            }

            state.push(&data[written..written + writable]);
            written += writable;
            self.changed.notify_all();
        }

        Ok(written)
    }

    /// Copy buffered bytes into `buf`, blocking until at least one byte is
    /// available. Returns `Ok(0)` once the pipe is closed and drained.
    pub(crate) fn read(&self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut state = self.lock();

        while state.available == 0 {
            if state.closed {
                return Ok(0);
            }
            let (guard, in_time) = self.wait(state, deadline);
            state = guard;
            if !in_time && state.available == 0 && !state.closed {
                return Err(PipeError::Timeout(timeout.unwrap_or_default()));
            }
        }

        let copied = state.drain_into(buf);
        self.changed.notify_all();
        Ok(copied)
    }

    pub(crate) fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        debug!(available = state.available, "pipe closed");
        self.changed.notify_all();
    }

    pub(crate) fn available(&self) -> usize {
        self.lock().available
    }

    pub(crate) fn capacity(&self) -> Option<usize> {
        self.lock().capacity
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }

    #[cfg(test)]
    fn chunk_count(&self) -> usize {
        self.lock().chunks.len()
    }
}
