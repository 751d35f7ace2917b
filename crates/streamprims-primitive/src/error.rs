/// Errors that can occur while encoding or decoding primitives.
#[derive(Debug, thiserror::Error)]
pub enum PrimitiveError {
    /// The source ended before the requested bytes were read.
    #[error("unexpected end of stream ({read} of {expected} bytes)")]
    UnexpectedEof { expected: u64, read: u64 },

    /// A length prefix was negative or above the configured maximum.
    #[error("invalid length prefix {length} (must be 0..={max})")]
    InvalidLength { length: i64, max: usize },

    /// A narrow integer width exceeded the target type.
    #[error("invalid width {width} for a {bits}-bit integer")]
    InvalidWidth { width: usize, bits: u32 },

    /// String bytes were not valid UTF-8.
    #[error("string is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An I/O error occurred on the wrapped stream.
    #[error("primitive I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PrimitiveError> for std::io::Error {
    fn from(err: PrimitiveError) -> Self {
        match err {
            PrimitiveError::Io(io) => io,
            PrimitiveError::UnexpectedEof { .. } => {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, err)
            }
            PrimitiveError::InvalidWidth { .. } => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
            }
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrimitiveError>;
