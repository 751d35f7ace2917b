//! Endian-configurable primitive encoding over byte streams.
//!
//! [`PrimitiveWriter`] and [`PrimitiveReader`] wrap any `Write`/`Read` and
//! move fixed-width integers, floats, booleans, narrow variable-width
//! integers, and length-prefixed strings and big integers. Every operation
//! uses the stream's default [`Endian`] unless a `*_with` variant overrides it.
//!
//! Length prefixes are 4-byte signed integers in the effective byte order.
//! Big integer content is always big-endian two's complement.

pub mod config;
pub mod error;
pub mod reader;
pub mod writer;

pub use config::{Endian, PrimitiveConfig, DEFAULT_MAX_LENGTH};
pub use error::{PrimitiveError, Result};
pub use num_bigint::BigInt;
pub use reader::PrimitiveReader;
pub use writer::PrimitiveWriter;
