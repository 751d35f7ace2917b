//! Signal-byte run-length encoding for byte streams.
//!
//! The wire format has three frame shapes, all introduced by a configurable
//! signal byte:
//! - any other byte is a literal and appears verbatim
//! - `signal, 0xFF` is an escaped literal signal byte
//! - `signal, indicator, [extension bytes], value` is a run of `value`
//!
//! [`RleWriter`] encodes into any `Write`, [`RleReader`] decodes from any
//! `Read`, and the two compose with other byte-stream adapters by wrapping.

pub mod codec;
pub mod error;
pub mod reader;
pub mod signal;
pub mod writer;

pub use codec::{decode_frame, decode_to_vec, encode_run, encode_to_vec, Frame, RleConfig};
pub use error::{FrameKind, Result, RleError};
pub use reader::RleReader;
pub use signal::{DEFAULT_SIGNAL, ESCAPE, MAX_RUN};
pub use writer::{EncoderState, RleWriter};
