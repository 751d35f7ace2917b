use std::io::Write;
use std::time::Instant;

use streamprims::rle::{RleConfig, RleReader};
use tracing::info;

use crate::cmd::{open_input, open_output, CodecArgs};
use crate::exit::{io_error, rle_error, CliResult, SUCCESS};
use crate::output::{print_report, CodecReport, OutputFormat};

const WRITE_CHUNK_SIZE: usize = 64 * 1024;

pub fn run(args: CodecArgs, format: OutputFormat) -> CliResult<i32> {
    let input = open_input(args.input.as_deref())?;
    let (mut output, to_stdout) = open_output(args.output.as_deref())?;

    let started = Instant::now();
    let mut decoder = RleReader::with_config(input, RleConfig::with_signal(args.signal));

    let mut chunk = vec![0u8; WRITE_CHUNK_SIZE];
    let mut bytes_out = 0u64;
    loop {
        let n = match decoder.decode(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                // Keep what decoded cleanly before the corruption.
                let _ = output.flush();
                return Err(rle_error("decode failed", err));
            }
        };
        output
            .write_all(&chunk[..n])
            .map_err(|err| io_error("write failed", err))?;
        bytes_out += n as u64;
    }
    output
        .flush()
        .map_err(|err| io_error("write failed", err))?;

    let report = CodecReport {
        command: "decode",
        signal: args.signal,
        bytes_in: decoder.consumed(),
        bytes_out,
        elapsed_ms: started.elapsed().as_millis(),
    };

    if to_stdout {
        info!(bytes_in = report.bytes_in, bytes_out = report.bytes_out, "decoded");
    } else {
        print_report(&report, format);
    }
    Ok(SUCCESS)
}
