//! Reader for `.fvecs` vector files (SIFT/GIST benchmark format).
//!
//! Each record is a little-endian `i32` dimension followed by that many
//! little-endian `f32` components. All records in a file share one dimension.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// Bytes in a record header.
const HEADER_BYTES: usize = 4;

/// Streaming `.fvecs` reader yielding one vector per record.
///
/// Iteration stops cleanly at end of input. A record whose header disagrees
/// with the expected dimension, or that is cut short, yields an error.
#[derive(Debug)]
pub struct FvecsReader<R> {
    reader: R,
    dimension: usize,
    record: Vec<u8>,
    position: usize,
}

impl FvecsReader<BufReader<File>> {
    /// Opens `path` for records of `dimension` floats.
    pub fn open<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), dimension, "opened fvecs file");
        Ok(Self::new(BufReader::new(file), dimension))
    }
}

impl<R: Read> FvecsReader<R> {
    /// Wraps an arbitrary byte source.
    pub fn new(reader: R, dimension: usize) -> Self {
        Self {
            reader,
            dimension,
            record: vec![0u8; dimension * 4],
            position: 0,
        }
    }

    /// Expected vector dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Index of the next record to be read.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Size in bytes of one record.
    #[must_use]
    pub fn record_size(&self) -> usize {
        HEADER_BYTES + self.dimension * 4
    }

    /// Discards the next `count` records without decoding them.
    ///
    /// Returns how many were actually skipped, fewer if input ended first.
    pub fn skip_vectors(&mut self, count: usize) -> Result<usize> {
        let wanted = (count as u64).saturating_mul(self.record_size() as u64);
        let skipped_bytes = io::copy(&mut (&mut self.reader).take(wanted), &mut io::sink())?;

        // Reason: skipped_bytes <= wanted, which came from a usize product
        #[allow(clippy::cast_possible_truncation)]
        let skipped = (skipped_bytes / self.record_size() as u64) as usize;
        self.position += skipped;
        tracing::debug!(requested = count, skipped, "skipped fvecs records");
        Ok(skipped)
    }

    /// Reads the next vector, `Ok(None)` at a clean end of input.
    pub fn read_vector(&mut self) -> Result<Option<Vec<f32>>> {
        let mut header = [0u8; HEADER_BYTES];
        match read_full(&mut self.reader, &mut header)? {
            0 => return Ok(None),
            HEADER_BYTES => {}
            got => {
                return Err(Error::InvalidData(format!(
                    "truncated header for record {}: {got} of {HEADER_BYTES} bytes",
                    self.position
                )))
            }
        }

        let declared = i32::from_le_bytes(header);
        if usize::try_from(declared).ok() != Some(self.dimension) {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: usize::try_from(declared).unwrap_or(0),
            });
        }

        let got = read_full(&mut self.reader, &mut self.record)?;
        if got != self.record.len() {
            tracing::warn!(record = self.position, got, "truncated fvecs record");
            return Err(Error::InvalidData(format!(
                "truncated record {}: {got} of {} bytes",
                self.position,
                self.record.len()
            )));
        }

        self.position += 1;
        Ok(Some(
            self.record
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ))
    }
}

impl<R: Read> Iterator for FvecsReader<R> {
    type Item = Result<Vec<f32>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_vector().transpose()
    }
}

/// Writes `vector` as one `.fvecs` record.
pub fn write_fvecs_record<W: io::Write>(writer: &mut W, vector: &[f32]) -> Result<()> {
    let dimension = i32::try_from(vector.len()).map_err(|_| Error::InvalidDimension(vector.len()))?;
    writer.write_all(&dimension.to_le_bytes())?;
    for value in vector {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Reads until `buf` is full or input ends, returning the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
#[path = "fvecs_tests.rs"]
mod tests;
