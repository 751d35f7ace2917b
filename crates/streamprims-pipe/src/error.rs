use std::time::Duration;

/// Errors that can occur in pipe operations.
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// The pipe was closed by either end.
    #[error("pipe closed")]
    Closed,

    /// A blocking operation did not complete before its deadline.
    #[error("pipe operation timed out after {0:?}")]
    Timeout(Duration),

    /// The configured capacity cannot hold any data.
    #[error("invalid pipe capacity {0} (must be at least 1 byte)")]
    InvalidCapacity(usize),
}

impl From<PipeError> for std::io::Error {
    fn from(err: PipeError) -> Self {
        let kind = match err {
            PipeError::Closed => std::io::ErrorKind::BrokenPipe,
            PipeError::Timeout(_) => std::io::ErrorKind::TimedOut,
            PipeError::InvalidCapacity(_) => std::io::ErrorKind::InvalidInput,
        };
        std::io::Error::new(kind, err)
    }
}

pub type Result<T> = std::result::Result<T, PipeError>;
