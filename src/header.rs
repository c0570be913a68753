//! The PT2 file header.
//!
//! The header is made of four fixed-size blocks (text, binary, board and
//! TTTR) followed by an image header whose length is given in the TTTR block.
//! Only the fields that describe the acquisition are kept; display settings
//! and the router channel table are skipped over.

use std::io::{self, Read};

use crate::Pt2Error;

pub const TEXT_HEADER_SIZE: usize = 328;
pub const BINARY_HEADER_SIZE: usize = 208;
pub const BOARD_HEADER_SIZE: usize = 156;
pub const TTTR_HEADER_SIZE: usize = 36;
/// Size of everything before the (variable length) image header
pub const FIXED_HEADER_SIZE: usize =
    TEXT_HEADER_SIZE + BINARY_HEADER_SIZE + BOARD_HEADER_SIZE + TTTR_HEADER_SIZE;

/// Offset of the record count inside the TTTR block
pub const TTTR_RECORDS_OFFSET: usize = 28;
/// Offset of the image header size (in 4-byte words) inside the TTTR block
pub const TTTR_IMG_HDR_SIZE_OFFSET: usize = 32;

const EXPECTED_IDENT: &str = "PicoHarp 300";
const T2_MEASUREMENT_MODE: i32 = 2;
const EXPECTED_BITS_PER_RECORD: i32 = 32;

/// Human readable part of the header.
#[derive(Debug, Clone, PartialEq)]
pub struct TextHeader {
    pub ident: String,
    pub format_version: String,
    pub creator_name: String,
    pub creator_version: String,
    pub file_time: String,
    pub comment: String,
}

impl TextHeader {
    fn from_bytes(buf: &[u8; TEXT_HEADER_SIZE]) -> Self {
        // CRLF sits between the file time and the comment
        TextHeader {
            ident: ascii_field(&buf[0..16]),
            format_version: ascii_field(&buf[16..22]),
            creator_name: ascii_field(&buf[22..40]),
            creator_version: ascii_field(&buf[40..52]),
            file_time: ascii_field(&buf[52..70]),
            comment: ascii_field(&buf[72..328]),
        }
    }
}

/// Acquisition settings of the measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryHeader {
    pub curves: i32,
    pub bits_per_record: i32,
    pub routing_channels: i32,
    pub number_of_boards: i32,
    pub active_curve: i32,
    pub measurement_mode: i32,
    pub sub_mode: i32,
    pub range_no: i32,
    pub offset: i32,
    /// Acquisition time in ms
    pub acquisition_time: i32,
    pub stop_at: i32,
    pub stop_on_overflow: bool,
    pub restart: bool,
}

impl BinaryHeader {
    fn from_bytes(buf: &[u8; BINARY_HEADER_SIZE]) -> Self {
        BinaryHeader {
            curves: le_i32(buf, 0),
            bits_per_record: le_i32(buf, 4),
            routing_channels: le_i32(buf, 8),
            number_of_boards: le_i32(buf, 12),
            active_curve: le_i32(buf, 16),
            measurement_mode: le_i32(buf, 20),
            sub_mode: le_i32(buf, 24),
            range_no: le_i32(buf, 28),
            offset: le_i32(buf, 32),
            acquisition_time: le_i32(buf, 36),
            stop_at: le_i32(buf, 40),
            stop_on_overflow: le_i32(buf, 44) != 0,
            restart: le_i32(buf, 48) != 0,
        }
    }
}

/// Settings of the (single) PicoHarp board used in the measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardHeader {
    pub hardware_ident: String,
    pub hardware_version: String,
    pub hardware_serial: i32,
    pub sync_divider: i32,
    pub cfd_zero_cross0: i32,
    pub cfd_level0: i32,
    pub cfd_zero_cross1: i32,
    pub cfd_level1: i32,
    /// Board resolution in ns. T2 times always use [`crate::PT2_TIME_UNIT`]
    /// regardless of this value.
    pub resolution: f32,
    pub router_model_code: i32,
    pub router_enabled: bool,
}

impl BoardHeader {
    fn from_bytes(buf: &[u8; BOARD_HEADER_SIZE]) -> Self {
        BoardHeader {
            hardware_ident: ascii_field(&buf[0..16]),
            hardware_version: ascii_field(&buf[16..24]),
            hardware_serial: le_i32(buf, 24),
            sync_divider: le_i32(buf, 28),
            cfd_zero_cross0: le_i32(buf, 32),
            cfd_level0: le_i32(buf, 36),
            cfd_zero_cross1: le_i32(buf, 40),
            cfd_level1: le_i32(buf, 44),
            resolution: le_f32(buf, 48),
            router_model_code: le_i32(buf, 52),
            router_enabled: le_i32(buf, 56) != 0,
        }
    }
}

/// Time-tagged mode specific part of the header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TttrHeader {
    pub ext_devices: i32,
    pub count_rate0: i32,
    pub count_rate1: i32,
    pub stop_after: i32,
    pub stop_reason: i32,
    pub n_records: u32,
    /// Size of the image header in 4-byte words
    pub img_hdr_size: i32,
}

impl TttrHeader {
    fn from_bytes(buf: &[u8; TTTR_HEADER_SIZE]) -> Self {
        // Two reserved words at offsets 4 and 8
        TttrHeader {
            ext_devices: le_i32(buf, 0),
            count_rate0: le_i32(buf, 12),
            count_rate1: le_i32(buf, 16),
            stop_after: le_i32(buf, 20),
            stop_reason: le_i32(buf, 24),
            n_records: le_u32(buf, TTTR_RECORDS_OFFSET),
            img_hdr_size: le_i32(buf, TTTR_IMG_HDR_SIZE_OFFSET),
        }
    }
}

/// The complete header of a PT2 file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub text: TextHeader,
    pub binary: BinaryHeader,
    pub board: BoardHeader,
    pub tttr: TttrHeader,
}

impl FileHeader {
    /// Reads the header from the start of the stream, leaving the stream
    /// positioned at the first record.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<FileHeader, Pt2Error> {
        let mut text = [0u8; TEXT_HEADER_SIZE];
        read_section(reader, &mut text, "text header")?;
        let mut binary = [0u8; BINARY_HEADER_SIZE];
        read_section(reader, &mut binary, "binary header")?;
        let mut board = [0u8; BOARD_HEADER_SIZE];
        read_section(reader, &mut board, "board header")?;
        let mut tttr = [0u8; TTTR_HEADER_SIZE];
        read_section(reader, &mut tttr, "TTTR header")?;

        let header = FileHeader {
            text: TextHeader::from_bytes(&text),
            binary: BinaryHeader::from_bytes(&binary),
            board: BoardHeader::from_bytes(&board),
            tttr: TttrHeader::from_bytes(&tttr),
        };
        header.skip_image_header(reader)?;
        header.warn_on_unexpected_format();
        debug!("Parsed PT2 header: {:#?}", header);
        Ok(header)
    }

    /// Number of records the file claims to hold
    pub fn n_records(&self) -> u32 {
        self.tttr.n_records
    }

    /// Total number of header bytes, image header included
    pub fn size(&self) -> usize {
        FIXED_HEADER_SIZE + 4 * self.tttr.img_hdr_size.max(0) as usize
    }

    fn skip_image_header<R: Read>(&self, reader: &mut R) -> Result<(), Pt2Error> {
        if self.tttr.img_hdr_size < 0 {
            return Err(Pt2Error::MalformedHeader(format!(
                "negative image header size ({})",
                self.tttr.img_hdr_size
            )));
        }
        let expected = 4 * self.tttr.img_hdr_size as u64;
        let skipped = io::copy(&mut reader.by_ref().take(expected), &mut io::sink())?;
        if skipped != expected {
            return Err(Pt2Error::TruncatedHeader {
                section: "image header",
                expected: expected as usize,
                got: skipped as usize,
            });
        }
        Ok(())
    }

    fn warn_on_unexpected_format(&self) {
        if self.text.ident != EXPECTED_IDENT {
            warn!(
                "Unexpected file ident {:?} (expected {:?}), parsing anyway",
                self.text.ident, EXPECTED_IDENT
            );
        }
        if self.binary.bits_per_record != EXPECTED_BITS_PER_RECORD {
            warn!(
                "Header claims {} bits per record, records will be read as 32 bits",
                self.binary.bits_per_record
            );
        }
        if self.binary.measurement_mode != T2_MEASUREMENT_MODE {
            warn!(
                "Measurement mode is {} rather than T2, times are probably meaningless",
                self.binary.measurement_mode
            );
        }
    }
}

/// Fills `buf` from the reader, returning the number of bytes actually read.
/// Stops early only at the end of the stream.
pub(crate) fn fill_buffer<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_section<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    section: &'static str,
) -> Result<(), Pt2Error> {
    let got = fill_buffer(reader, buf)?;
    if got != buf.len() {
        return Err(Pt2Error::TruncatedHeader {
            section,
            expected: buf.len(),
            got,
        });
    }
    Ok(())
}

/// NUL padded ASCII into a trimmed string
fn ascii_field(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

fn le_bytes(buf: &[u8], offset: usize) -> [u8; 4] {
    [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]
}

fn le_i32(buf: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(le_bytes(buf, offset))
}

fn le_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(le_bytes(buf, offset))
}

fn le_f32(buf: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(le_bytes(buf, offset))
}
