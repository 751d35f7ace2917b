use std::fmt;
use std::io;

use streamprims::pipe::PipeError;
use streamprims::rle::RleError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::InvalidData => DATA_INVALID,
        io::ErrorKind::NotFound
        | io::ErrorKind::PermissionDenied
        | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn pipe_error(context: &str, err: PipeError) -> CliError {
    let code = match err {
        PipeError::Timeout(_) => TIMEOUT,
        PipeError::InvalidCapacity(_) => USAGE,
        PipeError::Closed => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn rle_error(context: &str, err: RleError) -> CliError {
    match err {
        RleError::Io(source) => io_error(context, source),
        RleError::Truncated { .. } | RleError::ReservedIndicator(_) | RleError::EmptyRun => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        RleError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use streamprims::rle::FrameKind;

    use super::*;

    #[test]
    fn corrupt_input_is_data_invalid() {
        let err = rle_error(
            "decode failed",
            RleError::Truncated {
                frame: FrameKind::RunValue,
                offset: 3,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("decode failed: "));
        assert_eq!(rle_error("x", RleError::EmptyRun).code, DATA_INVALID);
    }

    #[test]
    fn wrapped_io_errors_use_io_mapping() {
        let err = rle_error("x", RleError::Io(io::Error::from(io::ErrorKind::TimedOut)));
        assert_eq!(err.code, TIMEOUT);
        let err = io_error("x", io::Error::from(io::ErrorKind::Other));
        assert_eq!(err.code, INTERNAL);
    }

    #[test]
    fn pipe_errors_map_to_codes() {
        assert_eq!(
            pipe_error("x", PipeError::Timeout(Duration::from_secs(1))).code,
            TIMEOUT
        );
        assert_eq!(pipe_error("x", PipeError::InvalidCapacity(0)).code, USAGE);
        assert_eq!(pipe_error("x", PipeError::Closed).code, FAILURE);
    }
}
