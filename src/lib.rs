//! Extraction of photon arrival times from PicoHarp 300 T2 (.pt2) files.
//!
//! A PT2 file is a fixed-layout header followed by a block of 32-bit records.
//! [`Pt2File`] decodes the header and hands out records one at a time, and
//! [`extract_timestamps`] drives the conversion of those records into a bare
//! stream of native-endian `u64` timestamps at a fixed resolution.

#[macro_use]
extern crate log;

pub mod configuration;
pub mod extract;
pub mod header;
pub mod logging;
pub mod reader;
pub mod record;

use thiserror::Error;

pub use configuration::{AppConfig, ExtractConfig, ExtractConfigBuilder, DEFAULT_RESOLUTION};
pub use extract::{extract_file, extract_timestamps, output_path_for, rescale, time_scale, ExtractSummary};
pub use header::FileHeader;
pub use reader::Pt2File;
pub use record::{decode_record, Pt2Record, RawRecord, RecordKind, PT2_TIME_UNIT};

/// Everything that can go wrong while decoding a PT2 stream or converting
/// its records.
#[derive(Debug, Error)]
pub enum Pt2Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Header ended early while reading the {section} (needed {expected} bytes, got {got})")]
    TruncatedHeader {
        section: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("Malformed header: {0}")]
    MalformedHeader(String),
    #[error("Record is {got} bytes long, expected {expected}")]
    ShortRecord { expected: usize, got: usize },
    #[error("Stream ended after {read} records, but the header declared {declared}")]
    UnexpectedEof { read: u32, declared: u32 },
    #[error("Time {time} doesn't fit in a u64 after scaling by {scale} (got {scaled})")]
    TimeOutOfRange { time: u64, scale: f64, scaled: f64 },
    #[error("Resolution must be a positive, finite number of seconds (received {0})")]
    InvalidResolution(f64),
}
