//! Decoding of single T2 records.
//!
//! Every record in a PT2 file is a little-endian `u32`. The lower 28 bits
//! hold the arrival time in units of [`PT2_TIME_UNIT`] and the upper 4 bits
//! hold the channel. Channel 15 is reserved for "special" records, which are
//! either overflows of the 28-bit time counter or external markers.

use crate::Pt2Error;

/// Native time unit of a PicoHarp 300 in T2 mode, in seconds.
pub const PT2_TIME_UNIT: f64 = 4e-12;

/// Size of one record on disk.
pub const RECORD_SIZE: usize = 4;

/// Amount of time units added to the running offset after each overflow
/// record.
pub const T2_WRAPAROUND: u64 = 210_698_240;

const TIME_MASK: u32 = 0x0FFF_FFFF;
const CHANNEL_SHIFT: u32 = 28;
const SPECIAL_CHANNEL: u8 = 0xF;
const MARKER_MASK: u32 = 0xF;

/// Absolute arrival time in native PT2 units
pub type Pt2Time = u64;

/// What a record stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A real photon arrival
    Photon,
    /// The 28-bit time counter wrapped around
    Overflow,
    /// External marker, carrying the marker bits that fired
    Marker(u8),
}

/// The two bit fields of a record, before any overflow correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    pub channel: u8,
    pub time: u32,
}

impl RawRecord {
    pub fn from_u32(word: u32) -> Self {
        RawRecord {
            channel: (word >> CHANNEL_SHIFT) as u8,
            time: word & TIME_MASK,
        }
    }

    pub fn kind(&self) -> RecordKind {
        if self.channel != SPECIAL_CHANNEL {
            return RecordKind::Photon;
        }
        match self.time & MARKER_MASK {
            0 => RecordKind::Overflow,
            markers => RecordKind::Marker(markers as u8),
        }
    }
}

/// Decode one record from the start of `buf`.
///
/// Only the first [`RECORD_SIZE`] bytes are looked at. A shorter buffer is
/// an error rather than a record made of whatever happens to be there.
pub fn decode_record(buf: &[u8]) -> Result<RawRecord, Pt2Error> {
    let bytes: [u8; RECORD_SIZE] = buf
        .get(..RECORD_SIZE)
        .and_then(|b| b.try_into().ok())
        .ok_or(Pt2Error::ShortRecord {
            expected: RECORD_SIZE,
            got: buf.len(),
        })?;
    Ok(RawRecord::from_u32(u32::from_le_bytes(bytes)))
}

/// A decoded record with its time already corrected for previous overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pt2Record {
    pub time: Pt2Time,
    pub channel: u8,
    pub kind: RecordKind,
}

impl Pt2Record {
    /// Whether this is a non-data marker (overflow or external marker)
    pub fn special(&self) -> bool {
        self.kind != RecordKind::Photon
    }
}

/// Keeps track of the overflows seen so far, turning raw records into
/// records with absolute times.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct OverflowTracker {
    offset: Pt2Time,
}

impl OverflowTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn resolve(&mut self, raw: RawRecord) -> Pt2Record {
        let kind = raw.kind();
        if kind == RecordKind::Overflow {
            self.offset += T2_WRAPAROUND;
        }
        Pt2Record {
            time: self.offset + raw.time as Pt2Time,
            channel: raw.channel,
            kind,
        }
    }
}
