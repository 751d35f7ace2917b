use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FrameKind, Result, RleError};
use crate::signal::{
    extension_len, extension_len_for, indicator_length_bits, DEFAULT_SIGNAL, ESCAPE, MAX_RUN,
};

/// A decoded RLE frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// One literal byte (verbatim or escaped signal).
    Literal(u8),
    /// `count` repetitions of `value`.
    Run { value: u8, count: usize },
}

impl Frame {
    /// Number of decoded bytes this frame expands to.
    pub fn decoded_len(&self) -> usize {
        match self {
            Frame::Literal(_) => 1,
            Frame::Run { count, .. } => *count,
        }
    }
}

/// Configuration for the RLE codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RleConfig {
    /// Byte that introduces escapes and run headers. Default: `0xE2`.
    pub signal: u8,
}

impl RleConfig {
    /// Configuration with an explicit signal byte.
    pub fn with_signal(signal: u8) -> Self {
        Self { signal }
    }
}

impl Default for RleConfig {
    fn default() -> Self {
        Self {
            signal: DEFAULT_SIGNAL,
        }
    }
}

/// Encode `count` repetitions of `value` using the most compact frame form.
///
/// Wire forms:
/// ```text
/// count 1, value != S          value
/// count 1, value == S          S 0xFF
/// count 2, value != S          value value
/// otherwise, count <= 63       S 00nnnnnn value
///            count <= 16383    S 01nnnnnn nnnnnnnn value
///            count <= 4194303  S 10nnnnnn nnnnnnnn nnnnnnnn value
/// ```
pub fn encode_run(value: u8, count: usize, signal: u8, dst: &mut BytesMut) -> Result<()> {
    if count == 0 || count > MAX_RUN {
        return Err(RleError::InvalidRunLength {
            count,
            max: MAX_RUN,
        });
    }

    put_run(value, count, signal, dst);
    Ok(())
}

/// `count` must be in `1..=MAX_RUN`.
fn put_run(value: u8, count: usize, signal: u8, dst: &mut BytesMut) {
    match count {
        1 if value == signal => dst.put_slice(&[signal, ESCAPE]),
        1 => dst.put_u8(value),
        2 if value != signal => dst.put_slice(&[value, value]),
        _ => put_run_header(value, count, signal, dst),
    }
}

fn put_run_header(value: u8, count: usize, signal: u8, dst: &mut BytesMut) {
    let extension = extension_len_for(count);
    let indicator = ((extension as u8) << 6) | (count >> (8 * extension)) as u8;

    dst.reserve(3 + extension);
    dst.put_u8(signal);
    dst.put_u8(indicator);
    for shift in (0..extension).rev() {
        dst.put_u8((count >> (8 * shift)) as u8);
    }
    dst.put_u8(value);
}

/// Decode one frame from the front of `src`.
///
/// Returns `Ok(None)` if `src` doesn't hold a complete frame yet; nothing is
/// consumed in that case. On success, consumes the frame bytes.
pub fn decode_frame(src: &mut BytesMut, signal: u8) -> Result<Option<Frame>> {
    let Some(&first) = src.first() else {
        return Ok(None);
    };

    if first != signal {
        src.advance(1);
        return Ok(Some(Frame::Literal(first)));
    }

    let Some(&indicator) = src.get(1) else {
        return Ok(None);
    };

    if indicator == ESCAPE {
        src.advance(2);
        return Ok(Some(Frame::Literal(signal)));
    }

    let extension = extension_len(indicator).ok_or(RleError::ReservedIndicator(indicator))?;
    let total = 3 + extension;
    if src.len() < total {
        return Ok(None);
    }

    let count = src[2..2 + extension]
        .iter()
        .fold(indicator_length_bits(indicator), |acc, b| {
            (acc << 8) | usize::from(*b)
        });
    if count == 0 {
        return Err(RleError::EmptyRun);
    }

    let value = src[2 + extension];
    src.advance(total);
    Ok(Some(Frame::Run { value, count }))
}

/// Which part of the frame at the front of `src` is missing.
///
/// Only meaningful when [`decode_frame`] returned `Ok(None)` on a non-empty buffer.
pub(crate) fn missing_part(src: &[u8]) -> FrameKind {
    match src.get(1).copied().and_then(extension_len) {
        None => FrameKind::Indicator,
        Some(extension) if src.len() < 2 + extension => FrameKind::LengthExtension,
        Some(_) => FrameKind::RunValue,
    }
}

/// Encode a complete buffer.
pub fn encode_to_vec(data: &[u8], signal: u8) -> Vec<u8> {
    let mut dst = BytesMut::with_capacity(data.len());
    let mut rest = data;
    while let Some(&value) = rest.first() {
        let run = rest.iter().take_while(|b| **b == value).count();
        let mut remaining = run;
        while remaining > 0 {
            let count = remaining.min(MAX_RUN);
            put_run(value, count, signal, &mut dst);
            remaining -= count;
        }
        rest = &rest[run..];
    }
    dst.to_vec()
}

/// Decode a complete buffer. A frame cut short by the end of `data` is an error.
pub fn decode_to_vec(data: &[u8], signal: u8) -> Result<Vec<u8>> {
    let mut src = BytesMut::from(data);
    let mut out = Vec::with_capacity(data.len());

    while let Some(frame) = decode_frame(&mut src, signal)? {
        match frame {
            Frame::Literal(byte) => out.push(byte),
            Frame::Run { value, count } => out.resize(out.len() + count, value),
        }
    }

    if !src.is_empty() {
        return Err(RleError::Truncated {
            frame: missing_part(&src),
            offset: (data.len() - src.len()) as u64,
        });
    }
    Ok(out)
}
