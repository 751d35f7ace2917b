use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{decode_frame, missing_part, Frame, RleConfig};
use crate::error::{Result, RleError};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Decodes an RLE stream from any `Read` source.
///
/// A frame split across source reads is reassembled internally. The end of
/// the source between frames ends the decoded stream; the end of the source
/// inside a frame is reported as [`RleError::Truncated`].
pub struct RleReader<R> {
    inner: R,
    buf: BytesMut,
    config: RleConfig,
    pending: u8,
    remaining: usize,
    consumed: u64,
}

impl<R: Read> RleReader<R> {
    /// Create a new decoder with the default signal byte.
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, RleConfig::default())
    }

    /// Create a new decoder with explicit configuration.
    pub fn with_config(inner: R, config: RleConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            pending: 0,
            remaining: 0,
            consumed: 0,
        }
    }

    /// Decode into `out`, returning the number of bytes produced.
    ///
    /// Blocks on the source only when nothing has been produced yet or a
    /// frame is incomplete. Returns `Ok(0)` at the end of the stream.
    pub fn decode(&mut self, out: &mut [u8]) -> Result<usize> {
        let mut produced = 0usize;

        while produced < out.len() {
            if self.remaining > 0 {
                let n = self.remaining.min(out.len() - produced);
                out[produced..produced + n].fill(self.pending);
                self.remaining -= n;
                produced += n;
                continue;
            }

            let before = self.buf.len();
            let frame = match decode_frame(&mut self.buf, self.config.signal) {
                Ok(frame) => frame,
                // Hand out what was decoded so far; the error repeats on the next call.
                Err(_) if produced > 0 => break,
                Err(err) => return Err(err),
            };
            match frame {
                Some(Frame::Literal(byte)) => {
                    out[produced] = byte;
                    produced += 1;
                }
                Some(Frame::Run { value, count }) => {
                    trace!(value, count, offset = self.consumed, "decoded run");
                    self.pending = value;
                    self.remaining = count;
                }
                None => {
                    if produced > 0 {
                        break;
                    }
                    if !self.fill()? {
                        if self.buf.is_empty() {
                            break;
                        }
                        return Err(RleError::Truncated {
                            frame: missing_part(&self.buf),
                            offset: self.consumed,
                        });
                    }
                }
            }
            self.consumed += (before.saturating_sub(self.buf.len())) as u64;
        }

        Ok(produced)
    }

    /// Read more encoded bytes. Returns `false` at the end of the source.
    fn fill(&mut self) -> Result<bool> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(true);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RleError::Io(err)),
            }
        }
    }

    /// Number of decoded bytes still owed by the current run.
    pub fn pending_repeats(&self) -> usize {
        self.remaining
    }

    /// Number of encoded bytes consumed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the decoder and return the inner source.
    ///
    /// Encoded bytes already pulled from the source but not yet decoded are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &RleConfig {
        &self.config
    }
}

impl<R: Read> Read for RleReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.decode(buf).map_err(Into::into)
    }
}

impl<R> std::fmt::Debug for RleReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RleReader")
            .field("config", &self.config)
            .field("buffered", &self.buf.len())
            .field("remaining", &self.remaining)
            .field("consumed", &self.consumed)
            .finish()
    }
}
