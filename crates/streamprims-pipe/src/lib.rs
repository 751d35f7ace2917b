//! Bounded in-process byte pipe.
//!
//! A pipe is a FIFO byte buffer shared by two handles:
//! - [`PipeWriter`] implements [`std::io::Write`] and blocks while the buffer is full
//! - [`PipeReader`] implements [`std::io::Read`] and blocks while the buffer is empty
//!
//! Closing either handle (or dropping it) closes the pipe. Buffered bytes stay
//! readable after close; writes fail immediately.

pub mod error;
pub mod handle;
pub mod pipe;

pub use error::{PipeError, Result};
pub use handle::{PipeReader, PipeWriter};
pub use pipe::{pipe, PipeConfig, DEFAULT_CAPACITY};
