use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use streamprims::rle::DEFAULT_SIGNAL;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod pipe_bench;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// RLE-encode a file or stdin.
    Encode(CodecArgs),
    /// Decode an RLE stream from a file or stdin.
    Decode(CodecArgs),
    /// Push data through a bounded pipe and report throughput.
    PipeBench(PipeBenchArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::PipeBench(args) => pipe_bench::run(args, format),
        Command::Version(args) => version::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct CodecArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,
    /// Output file. Writes stdout when omitted or `-`.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
    /// Signal byte introducing escapes and runs (decimal or 0x-prefixed hex).
    #[arg(long, default_value_t = DEFAULT_SIGNAL, value_parser = parse_byte)]
    pub signal: u8,
}

#[derive(Args, Debug)]
pub struct PipeBenchArgs {
    /// Pipe capacity in bytes.
    #[arg(long, default_value_t = 4096)]
    pub capacity: usize,
    /// Total bytes to transfer.
    #[arg(long, default_value_t = 1024 * 1024)]
    pub size: u64,
    /// Bytes per write and per read.
    #[arg(long, default_value_t = 512)]
    pub chunk: usize,
    /// Give up when either side blocks this long (e.g. 5s, 500ms).
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub timeout: Duration,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a byte given as decimal (`226`) or hex (`0xE2`).
pub fn parse_byte(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid byte value: {input} (expected 0..=255 or 0x00..=0xFF)"))
}

/// Parse a duration such as `5s`, `150ms`, or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

fn is_stdio(path: Option<&Path>) -> bool {
    path.is_none_or(|p| p == Path::new("-"))
}

pub fn open_input(path: Option<&Path>) -> CliResult<Box<dyn Read>> {
    match path {
        Some(path) if !is_stdio(Some(path)) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

/// Open the output sink. The flag is `true` when writing to stdout.
pub fn open_output(path: Option<&Path>) -> CliResult<(Box<dyn Write>, bool)> {
    match path {
        Some(path) if !is_stdio(Some(path)) => {
            let file = File::create(path)
                .map_err(|err| io_error(&format!("failed creating {}", path.display()), err))?;
            Ok((Box::new(BufWriter::new(file)), false))
        }
        _ => Ok((Box::new(BufWriter::new(io::stdout().lock())), true)),
    }
}

pub fn usage(message: impl Into<String>) -> CliError {
    CliError::new(USAGE, message)
}

/// Counts bytes passed through to the inner writer.
pub struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
