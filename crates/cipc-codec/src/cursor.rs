use crate::codec::{Decode, Encode};
use crate::error::{CodecError, Result};

/// Size of the count/length prefix on strings and containers.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Bounds-checked cursor over a caller-supplied output buffer.
///
/// Every write checks the remaining space first; nothing is ever written
/// past the end of the slice.
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Unused space left in the buffer.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Copy raw bytes into the buffer.
    pub fn put_slice(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.remaining() {
            return Err(CodecError::BufferTooSmall {
                needed: self.pos + bytes.len(),
                available: self.buf.len(),
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.put_slice(&[value])
    }

    pub fn put_u16_le(&mut self, value: u16) -> Result<()> {
        self.put_slice(&value.to_le_bytes())
    }

    pub fn put_u32_le(&mut self, value: u32) -> Result<()> {
        self.put_slice(&value.to_le_bytes())
    }

    pub fn put_u64_le(&mut self, value: u64) -> Result<()> {
        self.put_slice(&value.to_le_bytes())
    }

    /// Write a 4-byte little-endian length or element-count prefix.
    pub fn put_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow { len })?;
        self.put_u32_le(len)
    }

    /// Encode a value at the current position.
    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.encode(self)
    }
}

/// Bounds-checked cursor over an input buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a fixed-size array.
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn get_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn get_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn get_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    /// Read a 4-byte length prefix for a byte payload.
    ///
    /// Fails without consuming the payload if fewer than `len` bytes remain.
    pub fn get_len(&mut self) -> Result<usize> {
        let len = self.get_u32_le()? as usize;
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: len,
                remaining: self.remaining(),
            });
        }
        Ok(len)
    }

    /// Read a 4-byte element-count prefix.
    ///
    /// Every encodable element occupies at least one byte, so a count larger
    /// than the remaining input is rejected before any allocation happens.
    pub fn get_count(&mut self) -> Result<usize> {
        self.get_len()
    }

    /// Decode the next value.
    pub fn decode<T: Decode>(&mut self) -> Result<T> {
        T::decode(self)
    }
}
