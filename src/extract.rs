//! The extraction loop: PT2 records in, native-endian `u64` timestamps out.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use num_traits::ToPrimitive;

use crate::configuration::ExtractConfig;
use crate::reader::Pt2File;
use crate::record::{Pt2Time, RecordKind, PT2_TIME_UNIT};
use crate::Pt2Error;

/// Suffix appended to the input filename to get the output filename
pub const OUTPUT_SUFFIX: &str = ".times";

/// Record counts of a finished extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub records_read: u32,
    pub timestamps_written: u64,
    pub overflows: u32,
    pub markers: u32,
}

/// Multiplier taking native PT2 times to output ticks of `resolution`
/// seconds.
pub fn time_scale(resolution: f64) -> f64 {
    PT2_TIME_UNIT / resolution
}

/// Rescales a native time, truncating toward zero.
///
/// Results that are NaN, negative or too large for a `u64` are errors and
/// never wrap around.
pub fn rescale(time: Pt2Time, scale: f64) -> Result<u64, Pt2Error> {
    let scaled = time as f64 * scale;
    if scaled < 0.0 {
        return Err(Pt2Error::TimeOutOfRange {
            time,
            scale,
            scaled,
        });
    }
    scaled.to_u64().ok_or(Pt2Error::TimeOutOfRange {
        time,
        scale,
        scaled,
    })
}

/// Converts the PT2 stream in `input` into bare timestamps written to
/// `output`, one per photon record and in file order.
///
/// Special records are skipped. Errors stop the conversion immediately;
/// whatever was written before the error stays in `output`.
pub fn extract_timestamps<R: Read, W: Write>(
    input: R,
    mut output: W,
    config: &ExtractConfig,
) -> Result<ExtractSummary, Pt2Error> {
    let mut pt2 = Pt2File::new(input)?;
    let n_records = pt2.n_records();
    let scale = time_scale(config.resolution());
    debug!(
        "Rescaling {} records by {} (resolution of {} s)",
        n_records,
        scale,
        config.resolution()
    );

    let mut summary = ExtractSummary::default();
    for _ in 0..n_records {
        let record = pt2.read_record()?;
        summary.records_read += 1;
        match record.kind {
            RecordKind::Photon => {
                let time = rescale(record.time, scale)?;
                output.write_all(&time.to_ne_bytes())?;
                summary.timestamps_written += 1;
            }
            RecordKind::Overflow => summary.overflows += 1,
            RecordKind::Marker(markers) => {
                trace!("Marker {:#06b} at {}", markers, record.time);
                summary.markers += 1;
            }
        }
    }
    output.flush()?;
    info!(
        "Wrote {} timestamps out of {} records ({} overflows, {} markers)",
        summary.timestamps_written, summary.records_read, summary.overflows, summary.markers
    );
    Ok(summary)
}

/// The output file for a given input file: the input path with
/// [`OUTPUT_SUFFIX`] appended, so that `data.pt2` becomes `data.pt2.times`.
pub fn output_path_for(input: &Path) -> PathBuf {
    let mut name: OsString = input.as_os_str().to_owned();
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// Converts the file at `input`, writing the timestamps next to it (see
/// [`output_path_for`]). Returns the output path along with the summary.
pub fn extract_file(
    input: &Path,
    config: &ExtractConfig,
) -> Result<(PathBuf, ExtractSummary), Pt2Error> {
    let output_path = output_path_for(input);
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(&output_path)?);
    info!("Converting {:?} into {:?}", input, output_path);
    let summary = extract_timestamps(reader, writer, config)?;
    Ok((output_path, summary))
}
