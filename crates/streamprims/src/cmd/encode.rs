use std::io::{ErrorKind, Read};
use std::time::Instant;

use streamprims::rle::{RleConfig, RleWriter};
use tracing::{debug, info};

use crate::cmd::{open_input, open_output, CodecArgs, CountingWriter};
use crate::exit::{io_error, rle_error, CliResult, SUCCESS};
use crate::output::{print_report, CodecReport, OutputFormat};

const READ_CHUNK_SIZE: usize = 64 * 1024;

pub fn run(args: CodecArgs, format: OutputFormat) -> CliResult<i32> {
    let mut input = open_input(args.input.as_deref())?;
    let (output, to_stdout) = open_output(args.output.as_deref())?;

    let started = Instant::now();
    let mut encoder =
        RleWriter::with_config(CountingWriter::new(output), RleConfig::with_signal(args.signal));

    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    let mut bytes_in = 0u64;
    loop {
        let n = match input.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_error("read failed", err)),
        };
        encoder
            .encode(&chunk[..n])
            .map_err(|err| rle_error("encode failed", err))?;
        bytes_in += n as u64;
    }

    let counted = encoder
        .finish()
        .map_err(|err| rle_error("encode failed", err))?;

    let report = CodecReport {
        command: "encode",
        signal: args.signal,
        bytes_in,
        bytes_out: counted.count(),
        elapsed_ms: started.elapsed().as_millis(),
    };
    debug!(ratio = report.ratio(), "encode finished");

    // Encoded data owns stdout; the summary goes to the log instead.
    if to_stdout {
        info!(bytes_in = report.bytes_in, bytes_out = report.bytes_out, "encoded");
    } else {
        print_report(&report, format);
    }
    Ok(SUCCESS)
}
