use std::io::{ErrorKind, Read};

use bytes::Buf;
use num_bigint::BigInt;
use tracing::warn;

use crate::config::{Endian, PrimitiveConfig};
use crate::error::{PrimitiveError, Result};
use crate::writer::check_width;

macro_rules! fixed_width_readers {
    ($($name:ident, $name_with:ident, $ty:ty, $get_be:ident, $get_le:ident;)*) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` in the stream's byte order.")]
            pub fn $name(&mut self) -> Result<$ty> {
                self.$name_with(self.config.endian)
            }

            #[doc = concat!("Read a `", stringify!($ty), "` in an explicit byte order.")]
            pub fn $name_with(&mut self, endian: Endian) -> Result<$ty> {
                let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                self.read_fully(&mut bytes)?;
                let mut src = &bytes[..];
                Ok(match endian {
                    Endian::Big => src.$get_be(),
                    Endian::Little => src.$get_le(),
                })
            }
        )*
    };
}

/// Reads primitive values from any `Read` source.
///
/// Fixed-size reads either complete or fail with
/// [`PrimitiveError::UnexpectedEof`]; the plain `Read` impl keeps the usual
/// partial-read contract.
pub struct PrimitiveReader<R> {
    inner: R,
    config: PrimitiveConfig,
}

impl<R: Read> PrimitiveReader<R> {
    /// Create a big-endian reader.
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, PrimitiveConfig::default())
    }

    /// Create a reader with an explicit default byte order.
    pub fn with_endian(inner: R, endian: Endian) -> Self {
        Self::with_config(inner, PrimitiveConfig::with_endian(endian))
    }

    /// Create a reader with explicit configuration.
    pub fn with_config(inner: R, config: PrimitiveConfig) -> Self {
        Self { inner, config }
    }

    /// The stream's default byte order.
    pub fn endian(&self) -> Endian {
        self.config.endian
    }

    /// Change the stream's default byte order.
    pub fn set_endian(&mut self, endian: Endian) {
        self.config.endian = endian;
    }

    /// Fill `buf` completely.
    pub fn read_fully(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(PrimitiveError::UnexpectedEof {
                        expected: buf.len() as u64,
                        read: filled as u64,
                    })
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(PrimitiveError::Io(err)),
            }
        }
        Ok(())
    }

    /// Discard exactly `count` bytes.
    pub fn skip_fully(&mut self, count: u64) -> Result<()> {
        let skipped = std::io::copy(&mut (&mut self.inner).take(count), &mut std::io::sink())?;
        if skipped < count {
            return Err(PrimitiveError::UnexpectedEof {
                expected: count,
                read: skipped,
            });
        }
        Ok(())
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_fully(&mut byte)?;
        Ok(byte[0])
    }

    /// Read one signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a boolean; any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    fixed_width_readers! {
        read_i16, read_i16_with, i16, get_i16, get_i16_le;
        read_u16, read_u16_with, u16, get_u16, get_u16_le;
        read_i32, read_i32_with, i32, get_i32, get_i32_le;
        read_u32, read_u32_with, u32, get_u32, get_u32_le;
        read_i64, read_i64_with, i64, get_i64, get_i64_le;
        read_u64, read_u64_with, u64, get_u64, get_u64_le;
        read_f32, read_f32_with, f32, get_f32, get_f32_le;
        read_f64, read_f64_with, f64, get_f64, get_f64_le;
    }

    /// Read `width` bytes (0..=4) as a zero-extended unsigned integer.
    pub fn read_uint(&mut self, width: usize) -> Result<u32> {
        self.read_uint_with(width, self.config.endian)
    }

    /// Read `width` bytes (0..=4) as unsigned, in an explicit byte order.
    pub fn read_uint_with(&mut self, width: usize, endian: Endian) -> Result<u32> {
        check_width(width, u32::BITS)?;
        Ok(self.get_narrow(width, endian)? as u32)
    }

    /// Read `width` bytes (0..=4) as a sign-extended integer.
    pub fn read_int(&mut self, width: usize) -> Result<i32> {
        self.read_int_with(width, self.config.endian)
    }

    /// Read `width` bytes (0..=4) as signed, in an explicit byte order.
    pub fn read_int_with(&mut self, width: usize, endian: Endian) -> Result<i32> {
        check_width(width, u32::BITS)?;
        let value = self.get_narrow(width, endian)?;
        Ok(sign_extend(value, width) as i32)
    }

    /// Read `width` bytes (0..=8) as a zero-extended unsigned integer.
    pub fn read_ulong(&mut self, width: usize) -> Result<u64> {
        self.read_ulong_with(width, self.config.endian)
    }

    /// Read `width` bytes (0..=8) as unsigned, in an explicit byte order.
    pub fn read_ulong_with(&mut self, width: usize, endian: Endian) -> Result<u64> {
        check_width(width, u64::BITS)?;
        self.get_narrow(width, endian)
    }

    /// Read `width` bytes (0..=8) as a sign-extended integer.
    pub fn read_long(&mut self, width: usize) -> Result<i64> {
        self.read_long_with(width, self.config.endian)
    }

    /// Read `width` bytes (0..=8) as signed, in an explicit byte order.
    pub fn read_long_with(&mut self, width: usize, endian: Endian) -> Result<i64> {
        check_width(width, u64::BITS)?;
        let value = self.get_narrow(width, endian)?;
        Ok(sign_extend(value, width))
    }

    fn get_narrow(&mut self, width: usize, endian: Endian) -> Result<u64> {
        let mut bytes = [0u8; 8];
        self.read_fully(&mut bytes[..width])?;
        let mut src = &bytes[..width];
        Ok(match endian {
            Endian::Big => src.get_uint(width),
            Endian::Little => src.get_uint_le(width),
        })
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        self.read_string_with(self.config.endian)
    }

    /// Read a length-prefixed UTF-8 string, prefix in an explicit byte order.
    pub fn read_string_with(&mut self, endian: Endian) -> Result<String> {
        let bytes = self.read_prefixed(endian)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Read a length-prefixed big-endian two's complement big integer.
    ///
    /// A zero-length payload reads as zero.
    pub fn read_big_integer(&mut self) -> Result<BigInt> {
        self.read_big_integer_with(self.config.endian)
    }

    /// Read a big integer with the length prefix in an explicit byte order.
    pub fn read_big_integer_with(&mut self, endian: Endian) -> Result<BigInt> {
        let bytes = self.read_prefixed(endian)?;
        Ok(BigInt::from_signed_bytes_be(&bytes))
    }

    fn read_prefixed(&mut self, endian: Endian) -> Result<Vec<u8>> {
        let length = self.read_i32_with(endian)?;
        let max = self.config.max_length;
        let len = match usize::try_from(length) {
            Ok(len) if len <= max => len,
            _ => {
                warn!(length, max, "rejecting length prefix");
                return Err(PrimitiveError::InvalidLength {
                    length: i64::from(length),
                    max,
                });
            }
        };

        let mut bytes = vec![0u8; len];
        self.read_fully(&mut bytes)?;
        Ok(bytes)
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &PrimitiveConfig {
        &self.config
    }
}

/// Sign-extend the low `width` bytes of `value`.
fn sign_extend(value: u64, width: usize) -> i64 {
    if width == 0 {
        return 0;
    }
    let shift = 64 - 8 * width as u32;
    ((value << shift) as i64) >> shift
}

impl<R: Read> Read for PrimitiveReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R> std::fmt::Debug for PrimitiveReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveReader")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::writer::PrimitiveWriter;

    fn reader(bytes: &[u8], endian: Endian) -> PrimitiveReader<Cursor<Vec<u8>>> {
        PrimitiveReader::with_endian(Cursor::new(bytes.to_vec()), endian)
    }

    fn roundtrip(
        endian: Endian,
        f: impl FnOnce(&mut PrimitiveWriter<Vec<u8>>),
    ) -> PrimitiveReader<Cursor<Vec<u8>>> {
        let mut writer = PrimitiveWriter::with_endian(Vec::new(), endian);
        f(&mut writer);
        PrimitiveReader::with_endian(Cursor::new(writer.into_inner()), endian)
    }

    #[test]
    fn integer_extremes_roundtrip_in_both_orders() {
        for endian in [Endian::Big, Endian::Little] {
            let mut r = roundtrip(endian, |w| {
                w.write_i8(i8::MIN).unwrap();
                w.write_i16(i16::MIN).unwrap();
                w.write_u16(u16::MAX).unwrap();
                w.write_i32(i32::MIN).unwrap();
                w.write_i32(i32::MAX).unwrap();
                w.write_u32(u32::MAX).unwrap();
                w.write_i64(i64::MIN).unwrap();
                w.write_i64(i64::MAX).unwrap();
                w.write_u64(u64::MAX).unwrap();
                w.write_bool(true).unwrap();
            });
            assert_eq!(r.read_i8().unwrap(), i8::MIN);
            assert_eq!(r.read_i16().unwrap(), i16::MIN);
            assert_eq!(r.read_u16().unwrap(), u16::MAX);
            assert_eq!(r.read_i32().unwrap(), i32::MIN);
            assert_eq!(r.read_i32().unwrap(), i32::MAX);
            assert_eq!(r.read_u32().unwrap(), u32::MAX);
            assert_eq!(r.read_i64().unwrap(), i64::MIN);
            assert_eq!(r.read_i64().unwrap(), i64::MAX);
            assert_eq!(r.read_u64().unwrap(), u64::MAX);
            assert!(r.read_bool().unwrap());
        }
    }

    #[test]
    fn float_specials_roundtrip_bit_exact() {
        let floats = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -0.0, f32::MIN_POSITIVE];
        let doubles = [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -0.0, f64::MAX];
        for endian in [Endian::Big, Endian::Little] {
            let mut r = roundtrip(endian, |w| {
                for v in floats {
                    w.write_f32(v).unwrap();
                }
                for v in doubles {
                    w.write_f64(v).unwrap();
                }
            });
            for v in floats {
                assert_eq!(r.read_f32().unwrap().to_bits(), v.to_bits());
            }
            for v in doubles {
                assert_eq!(r.read_f64().unwrap().to_bits(), v.to_bits());
            }
        }
    }

    #[test]
    fn override_reads_other_order() {
        let mut r = reader(&[0, 0, 0, 1, 1, 0, 0, 0], Endian::Big);
        assert_eq!(r.read_i32().unwrap(), 1);
        assert_eq!(r.read_i32_with(Endian::Little).unwrap(), 1);
    }

    #[test]
    fn unsigned_narrow_reads_zero_extend() {
        let bytes = [0xFFu8; 8];
        for width in 1..=4 {
            let mut r = reader(&bytes, Endian::Big);
            let value = r.read_uint(width).unwrap();
            assert_eq!(u64::from(value), (1u64 << (8 * width)) - 1);
            assert!(i64::from(value) >= 0);
        }
        for width in 1..=8 {
            let mut r = reader(&bytes, Endian::Little);
            let value = r.read_ulong(width).unwrap();
            assert_eq!(value.count_ones() as usize, 8 * width);
        }
    }

    #[test]
    fn signed_narrow_reads_sign_extend() {
        let mut r = reader(&[0x80, 0x7F, 0xFF, 0xFE, 0x00, 0x80], Endian::Big);
        assert_eq!(r.read_int(1).unwrap(), -128);
        assert_eq!(r.read_int(1).unwrap(), 127);
        assert_eq!(r.read_int(2).unwrap(), -2);
        assert_eq!(r.read_int_with(2, Endian::Little).unwrap(), -32768);

        let mut r = reader(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F], Endian::Little);
        assert_eq!(r.read_long(5).unwrap(), 0x7F_FFFF_FFFF);

        let mut r = reader(&[0x80, 0, 0, 0, 0, 0, 0, 0], Endian::Big);
        assert_eq!(r.read_long(8).unwrap(), i64::MIN);
    }

    #[test]
    fn zero_width_reads_consume_nothing() {
        let mut r = reader(&[9], Endian::Big);
        assert_eq!(r.read_uint(0).unwrap(), 0);
        assert_eq!(r.read_int(0).unwrap(), 0);
        assert_eq!(r.read_long(0).unwrap(), 0);
        assert_eq!(r.read_u8().unwrap(), 9);
    }

    #[test]
    fn narrow_roundtrip_truncates() {
        let mut r = roundtrip(Endian::Little, |w| {
            w.write_uint(0x12345678, 3).unwrap();
            w.write_ulong(u64::MAX, 6).unwrap();
        });
        assert_eq!(r.read_uint(3).unwrap(), 0x345678);
        assert_eq!(r.read_ulong(6).unwrap(), 0xFFFF_FFFF_FFFF);
    }

    #[test]
    fn invalid_narrow_width() {
        let mut r = reader(&[0; 16], Endian::Big);
        assert!(matches!(r.read_uint(5), Err(PrimitiveError::InvalidWidth { .. })));
        assert!(matches!(r.read_long(9), Err(PrimitiveError::InvalidWidth { .. })));
    }

    #[test]
    fn strings_and_big_integers_roundtrip() {
        let big = BigInt::parse_bytes(b"-123456789012345678901234567890", 10).unwrap();
        for endian in [Endian::Big, Endian::Little] {
            let mut r = roundtrip(endian, |w| {
                w.write_string("").unwrap();
                w.write_string("grüße").unwrap();
                w.write_big_integer(&BigInt::from(0)).unwrap();
                w.write_big_integer(&big).unwrap();
            });
            assert_eq!(r.read_string().unwrap(), "");
            assert_eq!(r.read_string().unwrap(), "grüße");
            assert_eq!(r.read_big_integer().unwrap(), BigInt::from(0));
            assert_eq!(r.read_big_integer().unwrap(), big);
        }
    }

    #[test]
    fn zero_length_big_integer_is_zero() {
        let mut r = reader(&[0, 0, 0, 0], Endian::Big);
        assert_eq!(r.read_big_integer().unwrap(), BigInt::from(0));
    }

    #[test]
    fn negative_length_prefix_rejected() {
        let mut r = reader(&[0xFF, 0xFF, 0xFF, 0xFF], Endian::Big);
        assert!(matches!(
            r.read_string(),
            Err(PrimitiveError::InvalidLength { length: -1, .. })
        ));
    }

    #[test]
    fn oversized_length_prefix_rejected_before_allocation() {
        let config = PrimitiveConfig {
            max_length: 16,
            ..PrimitiveConfig::default()
        };
        let mut r = PrimitiveReader::with_config(Cursor::new(vec![0, 0, 0, 17]), config);
        assert!(matches!(
            r.read_big_integer(),
            Err(PrimitiveError::InvalidLength { length: 17, max: 16 })
        ));

        let mut r = reader(&[0x7F, 0xFF, 0xFF, 0xFF], Endian::Big);
        assert!(matches!(
            r.read_string(),
            Err(PrimitiveError::InvalidLength { .. })
        ));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let mut r = reader(&[0, 0, 0, 2, 0xC3, 0x28], Endian::Big);
        assert!(matches!(r.read_string(), Err(PrimitiveError::InvalidUtf8(_))));
    }

    #[test]
    fn early_end_of_stream() {
        let mut r = reader(&[1, 2, 3], Endian::Big);
        let err = r.read_i32().unwrap_err();
        assert!(matches!(
            err,
            PrimitiveError::UnexpectedEof {
                expected: 4,
                read: 3
            }
        ));
        let io: std::io::Error = err.into();
        assert_eq!(io.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn truncated_string_body() {
        let mut r = reader(&[0, 0, 0, 5, b'a', b'b'], Endian::Big);
        assert!(matches!(
            r.read_string(),
            Err(PrimitiveError::UnexpectedEof {
                expected: 5,
                read: 2
            })
        ));
    }

    #[test]
    fn skip_fully_exact_and_short() {
        let mut r = reader(&[1, 2, 3, 4, 5], Endian::Big);
        r.skip_fully(3).unwrap();
        assert_eq!(r.read_u8().unwrap(), 4);
        assert!(matches!(
            r.skip_fully(4),
            Err(PrimitiveError::UnexpectedEof {
                expected: 4,
                read: 1
            })
        ));
    }

    #[test]
    fn plain_read_is_partial() {
        let mut r = reader(&[1, 2], Endian::Big);
        let mut buf = [0u8; 8];
        assert_eq!(r.read(&mut buf).unwrap(), 2);
        assert_eq!(r.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn interrupted_source_is_retried() {
        let source = InterruptedOnce {
            interrupted: false,
            inner: Cursor::new(vec![0, 7]),
        };
        let mut r = PrimitiveReader::new(source);
        assert_eq!(r.read_u16().unwrap(), 7);
        assert_eq!(r.endian(), Endian::Big);
        let _ = r.get_ref();
        let _ = r.get_mut();
        let _ = r.into_inner();
    }

    struct InterruptedOnce {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }
}
