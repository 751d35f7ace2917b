use std::fmt;

/// The part of an RLE frame being parsed when input ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// The byte following a signal byte.
    Indicator,
    /// One of the length extension bytes of a run header.
    LengthExtension,
    /// The repeated byte closing a run header.
    RunValue,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameKind::Indicator => "block indicator",
            FrameKind::LengthExtension => "run length extension",
            FrameKind::RunValue => "run value",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during RLE encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum RleError {
    /// The input ended in the middle of a frame.
    #[error("truncated frame: input ended while reading the {frame} of the frame at offset {offset}")]
    Truncated { frame: FrameKind, offset: u64 },

    /// A block indicator used the reserved `0b11` prefix without being an escape.
    #[error("reserved block indicator {0:#04x}")]
    ReservedIndicator(u8),

    /// A run header declared a run of zero bytes.
    #[error("run header declares an empty run")]
    EmptyRun,

    /// A run length outside `1..=MAX_RUN` was passed to the encoder.
    #[error("invalid run length {count} (must be 1..={max})")]
    InvalidRunLength { count: usize, max: usize },

    /// The encoder was closed.
    #[error("encoder closed")]
    Closed,

    /// An I/O error occurred on the wrapped stream.
    #[error("rle I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RleError> for std::io::Error {
    fn from(err: RleError) -> Self {
        match err {
            RleError::Io(io) => io,
            RleError::Closed => std::io::Error::new(std::io::ErrorKind::BrokenPipe, err),
            RleError::InvalidRunLength { .. } => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
            }
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RleError>;
