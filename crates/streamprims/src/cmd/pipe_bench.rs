use std::thread;
use std::time::Instant;

use streamprims::pipe::{pipe, PipeConfig, PipeError, PipeReader, PipeWriter};
use tracing::debug;

use crate::cmd::{usage, PipeBenchArgs};
use crate::exit::{pipe_error, CliError, CliResult, DATA_INVALID, INTERNAL, SUCCESS};
use crate::output::{print_report, BenchReport, OutputFormat};

/// Byte at stream position `pos`. The prime period catches reordered chunks.
fn pattern(pos: u64) -> u8 {
    (pos % 251) as u8
}

pub fn run(args: PipeBenchArgs, format: OutputFormat) -> CliResult<i32> {
    if args.chunk == 0 {
        return Err(usage("--chunk must be greater than zero"));
    }

    let config = PipeConfig {
        capacity: Some(args.capacity),
        read_timeout: Some(args.timeout),
        write_timeout: Some(args.timeout),
    };
    let (writer, mut reader) =
        pipe(config).map_err(|err| pipe_error("failed creating pipe", err))?;

    let started = Instant::now();
    let size = args.size;
    let chunk = args.chunk;
    let producer = thread::spawn(move || produce(writer, size, chunk));

    let consumed = consume(&mut reader, chunk);
    // Unblock the producer if the consumer bailed out early.
    reader.close();

    let produced = producer
        .join()
        .map_err(|_| CliError::new(INTERNAL, "producer thread panicked"))?;
    let elapsed = started.elapsed();

    let (received, mismatch) = consumed.map_err(|err| pipe_error("read failed", err))?;
    // Checked before the producer result: closing the reader fails its last send.
    if let Some(pos) = mismatch {
        return Err(CliError::new(
            DATA_INVALID,
            format!("byte at position {pos} arrived out of order"),
        ));
    }
    produced.map_err(|err| pipe_error("write failed", err))?;
    if received != size {
        return Err(CliError::new(
            DATA_INVALID,
            format!("received {received} of {size} bytes"),
        ));
    }

    let secs = elapsed.as_secs_f64();
    let throughput = if secs > 0.0 {
        received as f64 / (1024.0 * 1024.0) / secs
    } else {
        0.0
    };
    debug!(received, elapsed_ms = elapsed.as_millis(), "pipe-bench finished");

    let report = BenchReport {
        capacity: args.capacity,
        chunk,
        bytes: received,
        elapsed_ms: elapsed.as_millis(),
        throughput_mib_s: throughput,
        verified: true,
    };
    print_report(&report, format);
    Ok(SUCCESS)
}

fn produce(mut writer: PipeWriter, size: u64, chunk: usize) -> Result<(), PipeError> {
    let mut buf = vec![0u8; chunk];
    let mut pos = 0u64;
    while pos < size {
        let len = (size - pos).min(chunk as u64) as usize;
        for (i, byte) in buf[..len].iter_mut().enumerate() {
            *byte = pattern(pos + i as u64);
        }

        let mut sent = 0;
        while sent < len {
            sent += writer.send(&buf[sent..len])?;
        }
        pos += len as u64;
    }
    writer.close();
    Ok(())
}

/// Drain the pipe, returning the byte count and the first out-of-order position.
fn consume(reader: &mut PipeReader, chunk: usize) -> Result<(u64, Option<u64>), PipeError> {
    let mut buf = vec![0u8; chunk];
    let mut pos = 0u64;
    loop {
        let n = reader.recv(&mut buf)?;
        if n == 0 {
            return Ok((pos, None));
        }
        if let Some(i) = (0..n).find(|&i| buf[i] != pattern(pos + i as u64)) {
            return Ok((pos, Some(pos + i as u64)));
        }
        pos += n as u64;
    }
}
