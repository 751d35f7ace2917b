use std::fmt;
use std::io::IsTerminal;

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Text
        } else {
            Self::Json
        }
    }
}

/// Summary of an `encode` or `decode` run.
#[derive(Debug, Serialize)]
pub struct CodecReport {
    pub command: &'static str,
    pub signal: u8,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub elapsed_ms: u128,
}

impl CodecReport {
    /// Encoded size relative to decoded size.
    pub fn ratio(&self) -> f64 {
        let (encoded, decoded) = match self.command {
            "encode" => (self.bytes_out, self.bytes_in),
            _ => (self.bytes_in, self.bytes_out),
        };
        if decoded == 0 {
            return 1.0;
        }
        encoded as f64 / decoded as f64
    }
}

impl fmt::Display for CodecReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} bytes in, {} bytes out (ratio {:.3}, signal {:#04x}) in {} ms",
            self.command,
            self.bytes_in,
            self.bytes_out,
            self.ratio(),
            self.signal,
            self.elapsed_ms
        )
    }
}

/// Summary of a `pipe-bench` run.
#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub capacity: usize,
    pub chunk: usize,
    pub bytes: u64,
    pub elapsed_ms: u128,
    pub throughput_mib_s: f64,
    pub verified: bool,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pipe-bench: {} bytes through a {}-byte pipe in {}-byte chunks, {} ms ({:.1} MiB/s), order {}",
            self.bytes,
            self.capacity,
            self.chunk,
            self.elapsed_ms,
            self.throughput_mib_s,
            if self.verified { "verified" } else { "NOT verified" }
        )
    }
}

pub fn print_report<T: Serialize + fmt::Display>(report: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Text => println!("{report}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_report_ratio_follows_direction() {
        let encode = CodecReport {
            command: "encode",
            signal: 0xE2,
            bytes_in: 100,
            bytes_out: 4,
            elapsed_ms: 0,
        };
        assert!((encode.ratio() - 0.04).abs() < 1e-9);

        let decode = CodecReport {
            command: "decode",
            bytes_in: 4,
            bytes_out: 100,
            ..encode
        };
        assert!((decode.ratio() - 0.04).abs() < 1e-9);
        assert!(decode.to_string().contains("signal 0xe2"));
    }

    #[test]
    fn empty_input_ratio_is_one() {
        let report = CodecReport {
            command: "encode",
            signal: 1,
            bytes_in: 0,
            bytes_out: 0,
            elapsed_ms: 0,
        };
        assert_eq!(report.ratio(), 1.0);
    }

    #[test]
    fn reports_serialize_as_flat_json() {
        let report = BenchReport {
            capacity: 4096,
            chunk: 512,
            bytes: 1024,
            elapsed_ms: 1,
            throughput_mib_s: 1.0,
            verified: true,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["capacity"], 4096);
        assert_eq!(value["verified"], true);
    }
}
