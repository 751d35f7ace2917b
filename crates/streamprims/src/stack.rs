//! Primitive values over RLE over a pipe, wired up in one call.

use std::io;

use streamprims_pipe::{pipe, PipeConfig, PipeError, PipeReader, PipeWriter};
use streamprims_primitive::{PrimitiveConfig, PrimitiveError, PrimitiveReader, PrimitiveWriter};
use streamprims_rle::{RleConfig, RleError, RleReader, RleWriter};

/// Writing end of an encoded pipe.
pub type EncodedWriter = PrimitiveWriter<RleWriter<PipeWriter>>;

/// Reading end of an encoded pipe.
pub type EncodedReader = PrimitiveReader<RleReader<PipeReader>>;

/// Errors from any layer of the stack.
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("pipe: {0}")]
    Pipe(#[from] PipeError),

    #[error("rle: {0}")]
    Rle(#[from] RleError),

    #[error("primitive: {0}")]
    Primitive(#[from] PrimitiveError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for stack operations.
pub type Result<T> = std::result::Result<T, StackError>;

impl From<StackError> for io::Error {
    fn from(err: StackError) -> Self {
        match err {
            StackError::Pipe(err) => err.into(),
            StackError::Rle(err) => err.into(),
            StackError::Primitive(err) => err.into(),
            StackError::Io(err) => err,
        }
    }
}

/// Configuration for each layer of an encoded pipe.
///
/// The RLE signal byte and the primitive byte order must match on both ends,
/// which [`encoded_pipe`] guarantees by using one config for both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackConfig {
    pub pipe: PipeConfig,
    pub rle: RleConfig,
    pub primitive: PrimitiveConfig,
}

/// Create a pipe whose writer encodes primitives through RLE and whose
/// reader decodes them back.
///
/// Values become visible to the reader once the writer's pending run is
/// flushed: call [`finish`] (or flush the writer) when done writing.
pub fn encoded_pipe(config: StackConfig) -> Result<(EncodedWriter, EncodedReader)> {
    let (pipe_writer, pipe_reader) = pipe(config.pipe)?;

    let writer = PrimitiveWriter::with_config(
        RleWriter::with_config(pipe_writer, config.rle),
        config.primitive,
    );
    let reader = PrimitiveReader::with_config(
        RleReader::with_config(pipe_reader, config.rle),
        config.primitive,
    );
    Ok((writer, reader))
}

/// Flush every layer of `writer` and close the pipe.
///
/// The reader sees end-of-stream after draining what was written.
pub fn finish(writer: EncodedWriter) -> Result<()> {
    let pipe_writer = writer.into_inner().finish()?;
    pipe_writer.close();
    Ok(())
}
