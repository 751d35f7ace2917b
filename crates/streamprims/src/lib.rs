//! Composable byte-stream primitives.
//!
//! streamprims layers three independent pieces over `std::io::Read` and
//! `std::io::Write`:
//!
//! - [`pipe`]: bounded in-process FIFO with blocking writer and reader handles
//! - [`rle`]: signal-byte run-length encoder and decoder adapters
//! - [`primitive`]: endian-configurable codec for integers, floats, strings
//!   and big integers
//!
//! The pieces compose by wrapping; [`stack::encoded_pipe`] builds the usual
//! primitive-over-RLE-over-pipe arrangement in one call.

pub mod stack;

/// Re-export pipe types.
pub mod pipe {
    pub use streamprims_pipe::*;
}

/// Re-export RLE types.
pub mod rle {
    pub use streamprims_rle::*;
}

/// Re-export primitive codec types.
pub mod primitive {
    pub use streamprims_primitive::*;
}

pub use stack::{encoded_pipe, EncodedReader, EncodedWriter, StackConfig, StackError};
