use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};
use num_bigint::BigInt;

use crate::config::{Endian, PrimitiveConfig};
use crate::error::{PrimitiveError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 64;

macro_rules! fixed_width_writers {
    ($($name:ident, $name_with:ident, $ty:ty, $put_be:ident, $put_le:ident;)*) => {
        $(
            #[doc = concat!("Write a `", stringify!($ty), "` in the stream's byte order.")]
            pub fn $name(&mut self, value: $ty) -> Result<()> {
                self.$name_with(value, self.config.endian)
            }

            #[doc = concat!("Write a `", stringify!($ty), "` in an explicit byte order.")]
            pub fn $name_with(&mut self, value: $ty, endian: Endian) -> Result<()> {
                self.stage(|buf| match endian {
                    Endian::Big => buf.$put_be(value),
                    Endian::Little => buf.$put_le(value),
                })
            }
        )*
    };
}

/// Writes primitive values to any `Write` sink.
///
/// Each value is staged and handed to the sink with a single `write_all`.
/// Sink failures are returned as-is; nothing is retried beyond `Interrupted`.
pub struct PrimitiveWriter<W> {
    inner: W,
    buf: BytesMut,
    config: PrimitiveConfig,
}

impl<W: Write> PrimitiveWriter<W> {
    /// Create a big-endian writer.
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, PrimitiveConfig::default())
    }

    /// Create a writer with an explicit default byte order.
    pub fn with_endian(inner: W, endian: Endian) -> Self {
        Self::with_config(inner, PrimitiveConfig::with_endian(endian))
    }

    /// Create a writer with explicit configuration.
    pub fn with_config(inner: W, config: PrimitiveConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// The stream's default byte order.
    pub fn endian(&self) -> Endian {
        self.config.endian
    }

    /// Change the stream's default byte order.
    pub fn set_endian(&mut self, endian: Endian) {
        self.config.endian = endian;
    }

    fn stage(&mut self, fill: impl FnOnce(&mut BytesMut)) -> Result<()> {
        self.buf.clear();
        fill(&mut self.buf);
        self.inner.write_all(&self.buf)?;
        Ok(())
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        Ok(())
    }

    /// Write one byte.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.stage(|buf| buf.put_u8(value))
    }

    /// Write one signed byte.
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.stage(|buf| buf.put_i8(value))
    }

    /// Write a boolean as one byte, `1` or `0`.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(u8::from(value))
    }

    fixed_width_writers! {
        write_i16, write_i16_with, i16, put_i16, put_i16_le;
        write_u16, write_u16_with, u16, put_u16, put_u16_le;
        write_i32, write_i32_with, i32, put_i32, put_i32_le;
        write_u32, write_u32_with, u32, put_u32, put_u32_le;
        write_i64, write_i64_with, i64, put_i64, put_i64_le;
        write_u64, write_u64_with, u64, put_u64, put_u64_le;
        write_f32, write_f32_with, f32, put_f32, put_f32_le;
        write_f64, write_f64_with, f64, put_f64, put_f64_le;
    }

    /// Write the low `width` bytes (0..=4) of `value`.
    pub fn write_uint(&mut self, value: u32, width: usize) -> Result<()> {
        self.write_uint_with(value, width, self.config.endian)
    }

    /// Write the low `width` bytes (0..=4) of `value` in an explicit byte order.
    pub fn write_uint_with(&mut self, value: u32, width: usize, endian: Endian) -> Result<()> {
        check_width(width, u32::BITS)?;
        self.put_narrow(u64::from(value), width, endian)
    }

    /// Write the low `width` bytes (0..=8) of `value`.
    pub fn write_ulong(&mut self, value: u64, width: usize) -> Result<()> {
        self.write_ulong_with(value, width, self.config.endian)
    }

    /// Write the low `width` bytes (0..=8) of `value` in an explicit byte order.
    pub fn write_ulong_with(&mut self, value: u64, width: usize, endian: Endian) -> Result<()> {
        check_width(width, u64::BITS)?;
        self.put_narrow(value, width, endian)
    }

    fn put_narrow(&mut self, value: u64, width: usize, endian: Endian) -> Result<()> {
        self.stage(|buf| match endian {
            Endian::Big => buf.put_uint(value, width),
            Endian::Little => buf.put_uint_le(value, width),
        })
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_string_with(value, self.config.endian)
    }

    /// Write a length-prefixed UTF-8 string, prefix in an explicit byte order.
    pub fn write_string_with(&mut self, value: &str, endian: Endian) -> Result<()> {
        self.write_prefixed(value.as_bytes(), endian)
    }

    /// Write a length-prefixed big integer as minimal big-endian two's complement.
    pub fn write_big_integer(&mut self, value: &BigInt) -> Result<()> {
        self.write_big_integer_with(value, self.config.endian)
    }

    /// Write a big integer with the length prefix in an explicit byte order.
    ///
    /// The content bytes are big-endian regardless of `endian`.
    pub fn write_big_integer_with(&mut self, value: &BigInt, endian: Endian) -> Result<()> {
        self.write_prefixed(&value.to_signed_bytes_be(), endian)
    }

    fn write_prefixed(&mut self, data: &[u8], endian: Endian) -> Result<()> {
        let length = i32::try_from(data.len()).map_err(|_| PrimitiveError::InvalidLength {
            length: data.len() as i64,
            max: i32::MAX as usize,
        })?;
        self.write_i32_with(length, endian)?;
        self.write_bytes(data)
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(PrimitiveError::Io(err)),
            }
        }
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &PrimitiveConfig {
        &self.config
    }
}

pub(crate) fn check_width(width: usize, bits: u32) -> Result<()> {
    if width * 8 > bits as usize {
        return Err(PrimitiveError::InvalidWidth { width, bits });
    }
    Ok(())
}

impl<W: Write> Write for PrimitiveWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl<W> std::fmt::Debug for PrimitiveWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveWriter")
            .field("config", &self.config)
            .finish()
    }
}
