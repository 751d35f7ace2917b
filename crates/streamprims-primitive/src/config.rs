/// Default upper bound for string and big integer length prefixes: 16 MiB.
pub const DEFAULT_MAX_LENGTH: usize = 16 * 1024 * 1024;

/// Byte order of multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Most significant byte first.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

impl Endian {
    /// Byte order of the current target.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

/// Controls primitive stream behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveConfig {
    /// Byte order used when a call doesn't specify one.
    pub endian: Endian,
    /// Largest accepted string/big integer length prefix, checked before allocating.
    pub max_length: usize,
}

impl PrimitiveConfig {
    /// Default configuration with an explicit byte order.
    pub fn with_endian(endian: Endian) -> Self {
        Self {
            endian,
            ..Self::default()
        }
    }
}

impl Default for PrimitiveConfig {
    fn default() -> Self {
        Self {
            endian: Endian::Big,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_big_endian() {
        let config = PrimitiveConfig::default();
        assert_eq!(config.endian, Endian::Big);
        assert_eq!(config.max_length, DEFAULT_MAX_LENGTH);
        assert_eq!(Endian::default(), Endian::Big);
    }

    #[test]
    fn native_matches_target() {
        let expected = if cfg!(target_endian = "little") {
            Endian::Little
        } else {
            Endian::Big
        };
        assert_eq!(Endian::native(), expected);
        assert_eq!(
            PrimitiveConfig::with_endian(Endian::Little).max_length,
            DEFAULT_MAX_LENGTH
        );
    }
}
