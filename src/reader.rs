//! Sequential reader over a PT2 stream.

use std::io::Read;

use crate::header::{fill_buffer, FileHeader};
use crate::record::{decode_record, OverflowTracker, Pt2Record, RECORD_SIZE};
use crate::Pt2Error;

/// An open PT2 stream.
///
/// Construction consumes the header. Afterwards each call to
/// [`Pt2File::read_record`] consumes exactly one record, so the underlying
/// reader should be buffered by the caller.
pub struct Pt2File<R: Read> {
    reader: R,
    header: FileHeader,
    records_read: u32,
    overflow: OverflowTracker,
}

impl<R: Read> Pt2File<R> {
    pub fn new(mut reader: R) -> Result<Self, Pt2Error> {
        let header = FileHeader::read_from(&mut reader)?;
        info!(
            "Opened a PT2 stream with {} records (created by {} {})",
            header.n_records(),
            header.text.creator_name,
            header.text.creator_version
        );
        Ok(Pt2File {
            reader,
            header,
            records_read: 0,
            overflow: OverflowTracker::new(),
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn n_records(&self) -> u32 {
        self.header.n_records()
    }

    /// Number of records consumed so far
    pub fn records_read(&self) -> u32 {
        self.records_read
    }

    /// Reads and decodes the next record.
    ///
    /// Hitting the end of the stream before a single byte of the record
    /// arrived is an [`Pt2Error::UnexpectedEof`], while a partial record is a
    /// [`Pt2Error::ShortRecord`].
    pub fn read_record(&mut self) -> Result<Pt2Record, Pt2Error> {
        let mut buf = [0u8; RECORD_SIZE];
        let got = fill_buffer(&mut self.reader, &mut buf)?;
        if got == 0 {
            return Err(Pt2Error::UnexpectedEof {
                read: self.records_read,
                declared: self.n_records(),
            });
        }
        let raw = decode_record(&buf[..got])?;
        self.records_read += 1;
        Ok(self.overflow.resolve(raw))
    }

    /// Iterates over the records that the header says are left in the
    /// stream. Iteration ends after the first error.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            file: self,
            failed: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Iterator returned by [`Pt2File::records`]
pub struct Records<'a, R: Read> {
    file: &'a mut Pt2File<R>,
    failed: bool,
}

impl<'a, R: Read> Iterator for Records<'a, R> {
    type Item = Result<Pt2Record, Pt2Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.file.records_read >= self.file.n_records() {
            return None;
        }
        let record = self.file.read_record();
        self.failed = record.is_err();
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let left = self.file.n_records().saturating_sub(self.file.records_read) as usize;
        (0, Some(left))
    }
}
