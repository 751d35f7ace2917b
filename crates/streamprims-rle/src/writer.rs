use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::debug;

use crate::codec::{encode_run, RleConfig};
use crate::error::{Result, RleError};
use crate::signal::MAX_RUN;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
/// Staged output is pushed to the sink once it grows past this size.
const STAGE_LIMIT: usize = 8 * 1024;

/// Encoder state between writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// No bytes pending.
    Idle,
    /// `count` copies of `last` have been written but not yet encoded.
    Buffering { last: u8, count: usize },
}

/// RLE-encodes everything written to it into any `Write` sink.
///
/// The current run is held back until a different byte arrives, the run
/// reaches [`MAX_RUN`], or the encoder is flushed. Dropping the encoder
/// encodes a pending run on a best-effort basis; call [`RleWriter::finish`]
/// or [`RleWriter::close`] to observe errors.
pub struct RleWriter<W: Write> {
    inner: Option<W>,
    buf: BytesMut,
    config: RleConfig,
    state: EncoderState,
}

impl<W: Write> RleWriter<W> {
    /// Create a new encoder with the default signal byte.
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, RleConfig::default())
    }

    /// Create a new encoder with explicit configuration.
    pub fn with_config(inner: W, config: RleConfig) -> Self {
        Self {
            inner: Some(inner),
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            state: EncoderState::Idle,
        }
    }

    /// Current encoder state.
    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Current encoder configuration.
    pub fn config(&self) -> &RleConfig {
        &self.config
    }

    /// Borrow the underlying sink. `None` once the encoder is closed.
    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    /// Mutably borrow the underlying sink. `None` once the encoder is closed.
    pub fn get_mut(&mut self) -> Option<&mut W> {
        self.inner.as_mut()
    }

    /// Encode `data`, staging complete frames for the sink.
    pub fn encode(&mut self, data: &[u8]) -> Result<()> {
        if self.inner.is_none() {
            return Err(RleError::Closed);
        }

        let mut rest = data;
        while let Some(&value) = rest.first() {
            let run = rest.iter().take_while(|b| **b == value).count();
            self.extend_run(value, run)?;
            rest = &rest[run..];

            if self.buf.len() >= STAGE_LIMIT {
                self.write_staged()?;
            }
        }
        self.write_staged()
    }

    /// Encode the pending run and push all staged frames to the sink,
    /// without flushing the sink itself.
    pub fn flush_run(&mut self) -> Result<()> {
        self.emit_pending()?;
        self.write_staged()
    }

    /// Encode the pending run, then close the underlying sink by dropping it.
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.inner.is_none() {
            return Ok(());
        }
        self.flush_run()?;
        if let Some(mut inner) = self.inner.take() {
            flush_retrying(&mut inner)?;
            debug!(signal = self.config.signal, "rle encoder closed");
        }
        Ok(())
    }

    /// Encode the pending run and return the underlying sink.
    pub fn finish(mut self) -> Result<W> {
        self.flush_run()?;
        let mut inner = self.inner.take().ok_or(RleError::Closed)?;
        flush_retrying(&mut inner)?;
        Ok(inner)
    }

    fn extend_run(&mut self, value: u8, mut count: usize) -> Result<()> {
        let mut pending = match self.state {
            EncoderState::Buffering { last, count } if last == value => count,
            EncoderState::Buffering { .. } => {
                self.emit_pending()?;
                0
            }
            EncoderState::Idle => 0,
        };

        while pending + count > MAX_RUN {
            count -= MAX_RUN - pending;
            encode_run(value, MAX_RUN, self.config.signal, &mut self.buf)?;
            pending = 0;
        }

        self.state = EncoderState::Buffering {
            last: value,
            count: pending + count,
        };
        Ok(())
    }

    fn emit_pending(&mut self) -> Result<()> {
        if let EncoderState::Buffering { last, count } = self.state {
            self.state = EncoderState::Idle;
            encode_run(last, count, self.config.signal, &mut self.buf)?;
        }
        Ok(())
    }

    fn write_staged(&mut self) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let inner = self.inner.as_mut().ok_or(RleError::Closed)?;
        let result = inner.write_all(&self.buf);
        self.buf.clear();
        result.map_err(RleError::Io)
    }
}

fn flush_retrying<W: Write>(inner: &mut W) -> Result<()> {
    loop {
        match inner.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(RleError::Io(err)),
        }
    }
}

impl<W: Write> Write for RleWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.encode(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_run()?;
        let inner = self.inner.as_mut().ok_or(RleError::Closed)?;
        flush_retrying(inner).map_err(Into::into)
    }
}

impl<W: Write> Drop for RleWriter<W> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            let _ = self.flush_run();
        }
    }
}

impl<W: Write> std::fmt::Debug for RleWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RleWriter")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("staged", &self.buf.len())
            .field("closed", &self.inner.is_none())
            .finish()
    }
}
