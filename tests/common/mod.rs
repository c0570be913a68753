//! Helpers for building synthetic PT2 streams.
#![allow(dead_code)]

use libpt2times::header::{
    BINARY_HEADER_SIZE, BOARD_HEADER_SIZE, FIXED_HEADER_SIZE, TEXT_HEADER_SIZE,
    TTTR_IMG_HDR_SIZE_OFFSET, TTTR_RECORDS_OFFSET,
};

const TTTR_START: usize = TEXT_HEADER_SIZE + BINARY_HEADER_SIZE + BOARD_HEADER_SIZE;

pub fn photon(channel: u8, time: u32) -> u32 {
    assert!(channel < 0xF);
    ((channel as u32) << 28) | (time & 0x0FFF_FFFF)
}

pub fn overflow() -> u32 {
    0xF000_0000
}

pub fn marker(bits: u8) -> u32 {
    assert!(bits > 0 && bits < 0x10);
    0xF000_0000 | bits as u32
}

/// A PT2 file in memory: header, image header and records
pub struct Pt2Builder {
    declared: Option<u32>,
    img_hdr_words: u32,
    records: Vec<u32>,
}

impl Pt2Builder {
    pub fn new() -> Self {
        Pt2Builder {
            declared: None,
            img_hdr_words: 0,
            records: Vec::new(),
        }
    }

    pub fn with_records(&mut self, records: &[u32]) -> &mut Self {
        self.records.extend_from_slice(records);
        self
    }

    /// Overrides the record count written to the header
    pub fn declaring(&mut self, n_records: u32) -> &mut Self {
        self.declared = Some(n_records);
        self
    }

    pub fn with_image_header(&mut self, words: u32) -> &mut Self {
        self.img_hdr_words = words;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; FIXED_HEADER_SIZE];
        buf[..12].copy_from_slice(b"PicoHarp 300");
        buf[16..19].copy_from_slice(b"2.0");
        buf[TEXT_HEADER_SIZE + 4..TEXT_HEADER_SIZE + 8].copy_from_slice(&32i32.to_le_bytes());
        buf[TEXT_HEADER_SIZE + 20..TEXT_HEADER_SIZE + 24].copy_from_slice(&2i32.to_le_bytes());
        let n_records = self.declared.unwrap_or(self.records.len() as u32);
        let records_at = TTTR_START + TTTR_RECORDS_OFFSET;
        buf[records_at..records_at + 4].copy_from_slice(&n_records.to_le_bytes());
        let img_at = TTTR_START + TTTR_IMG_HDR_SIZE_OFFSET;
        buf[img_at..img_at + 4].copy_from_slice(&(self.img_hdr_words as i32).to_le_bytes());
        buf.extend(std::iter::repeat(0x5A).take(4 * self.img_hdr_words as usize));
        for record in &self.records {
            buf.extend_from_slice(&record.to_le_bytes());
        }
        buf
    }
}

/// Splits the output of an extraction into its native-endian integers
pub fn read_timestamps(bytes: &[u8]) -> Vec<u64> {
    assert_eq!(bytes.len() % 8, 0, "Output isn't a whole number of u64s");
    bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            u64::from_ne_bytes(word)
        })
        .collect()
}
