//! A fresh byte cursor per call: [`ByteWriter`] accumulates an output buffer,
//! [`ByteReader`] walks an input slice without copying except where the
//! caller asks for an owned chunk. Neither type holds any state beyond the
//! buffer and the current position, so two cursors never interact even when
//! their encode/decode calls run on different threads concurrently.

use crate::error::WireError;

/// Growable output buffer. All multi-byte numeric writes in the body are
/// little-endian; the envelope writes its fingerprint big-endian directly
/// with `write_bytes`, bypassing the numeric helpers here.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_i64_le(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64_le(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

/// Read-only cursor over a caller-owned input slice.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        let byte = *self.data.get(self.pos).ok_or(WireError::OutOfBounds)?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn peek_u8(&self) -> Result<u8, WireError> {
        self.data.get(self.pos).copied().ok_or(WireError::OutOfBounds)
    }

    /// Reads `n` bytes and returns a borrowed slice, advancing the cursor.
    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let end = self.pos.checked_add(n).ok_or(WireError::OutOfBounds)?;
        if end > self.data.len() {
            return Err(WireError::OutOfBounds);
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_i64_le(&mut self) -> Result<i64, WireError> {
        let slice = self.read_slice(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(slice);
        Ok(i64::from_le_bytes(arr))
    }

    pub fn read_f64_le(&mut self) -> Result<f64, WireError> {
        let slice = self.read_slice(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(slice);
        Ok(f64::from_le_bytes(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_roundtrip() {
        let mut w = ByteWriter::new();
        w.write_u8(0x42);
        w.write_i64_le(-7);
        w.write_f64_le(3.5);
        let bytes = w.into_vec();

        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 0x42);
        assert_eq!(r.read_i64_le().unwrap(), -7);
        assert_eq!(r.read_f64_le().unwrap(), 3.5);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn read_past_end_is_out_of_bounds() {
        let bytes = [0x01u8];
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.read_u8().unwrap_err(), WireError::OutOfBounds);
    }

    #[test]
    fn read_slice_out_of_bounds() {
        let bytes = [0x01u8, 0x02];
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_slice(3).unwrap_err(), WireError::OutOfBounds);
    }
}
