//! Primitive wire codec
//!
//! Fixed-width big-endian integers and length-prefixed vectors as used by the
//! TLS presentation language. `ByteReader` never reads past what a field
//! declares, so a caller can keep decoding the next message from the same
//! stream; a stream that ends early yields `TlsWireError::Truncated` instead
//! of an I/O `UnexpectedEof`.

use std::io::{ErrorKind, Read};

use tracing::trace;

use crate::{TlsWireError, TlsWireResult};

/// Largest value a 24-bit length field can carry
pub const U24_MAX: usize = 0x00FF_FFFF;

const READ_CHUNK_HINT: usize = 16 * 1024;

/// Sequential big-endian reader over any byte stream
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
    consumed: usize,
}

impl<R: Read> ByteReader<R> {
    /// Wrap a stream
    pub fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    /// Total bytes consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Give back the wrapped stream
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read exactly `n` bytes.
    ///
    /// Reads are bounded by `n`; additional buffered data in the stream is
    /// left untouched. The buffer grows with the bytes that actually arrive,
    /// so a declared length larger than the stream costs nothing up front.
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> TlsWireResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(n.min(READ_CHUNK_HINT));
        match (&mut self.inner).take(n as u64).read_to_end(&mut buf) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(TlsWireError::truncated(context, n, buf.len()))
            }
            Err(e) => return Err(e.into()),
        }
        if buf.len() < n {
            return Err(TlsWireError::truncated(context, n, buf.len()));
        }
        self.consumed += n;
        trace!(context, len = n, "read field");
        Ok(buf)
    }

    fn read_array<const N: usize>(&mut self, context: &'static str) -> TlsWireResult<[u8; N]> {
        let bytes = self.read_bytes(N, context)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    /// Read one byte
    pub fn read_u8(&mut self, context: &'static str) -> TlsWireResult<u8> {
        Ok(self.read_array::<1>(context)?[0])
    }

    /// Read a big-endian u16
    pub fn read_u16(&mut self, context: &'static str) -> TlsWireResult<u16> {
        Ok(u16::from_be_bytes(self.read_array(context)?))
    }

    /// Read a big-endian 24-bit integer
    pub fn read_u24(&mut self, context: &'static str) -> TlsWireResult<u32> {
        let [a, b, c] = self.read_array::<3>(context)?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    /// Read a big-endian u32
    pub fn read_u32(&mut self, context: &'static str) -> TlsWireResult<u32> {
        Ok(u32::from_be_bytes(self.read_array(context)?))
    }

    /// Read a big-endian u64
    pub fn read_u64(&mut self, context: &'static str) -> TlsWireResult<u64> {
        Ok(u64::from_be_bytes(self.read_array(context)?))
    }

    /// Read a fixed-size array
    pub fn read_fixed<const N: usize>(&mut self, context: &'static str) -> TlsWireResult<[u8; N]> {
        self.read_array(context)
    }

    /// Read a vector with a one-byte length prefix
    pub fn read_vec_u8(&mut self, context: &'static str) -> TlsWireResult<Vec<u8>> {
        let len = self.read_u8(context)? as usize;
        self.read_bytes(len, context)
    }

    /// Read a vector with a two-byte length prefix
    pub fn read_vec_u16(&mut self, context: &'static str) -> TlsWireResult<Vec<u8>> {
        let len = self.read_u16(context)? as usize;
        self.read_bytes(len, context)
    }

    /// Read a vector with a three-byte length prefix
    pub fn read_vec_u24(&mut self, context: &'static str) -> TlsWireResult<Vec<u8>> {
        let len = self.read_u24(context)? as usize;
        self.read_bytes(len, context)
    }
}

/// Big-endian writer into an owned buffer
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with preallocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take the written bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Append one byte
    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    /// Append a big-endian u16
    pub fn put_u16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Append a big-endian 24-bit integer
    pub fn put_u24(&mut self, value: u32) -> TlsWireResult<&mut Self> {
        if value as usize > U24_MAX {
            return Err(TlsWireError::MessageTooLarge {
                context: "u24 field",
                declared: value as usize,
                limit: U24_MAX,
            });
        }
        self.buf.extend_from_slice(&value.to_be_bytes()[1..]);
        Ok(self)
    }

    /// Append a big-endian u32
    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Append a big-endian u64
    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Append raw bytes
    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append a vector with a one-byte length prefix
    pub fn put_vec_u8(&mut self, bytes: &[u8], context: &'static str) -> TlsWireResult<&mut Self> {
        let len = prefix_len(bytes.len(), u8::MAX as usize, context)?;
        self.put_u8(len as u8);
        Ok(self.put_bytes(bytes))
    }

    /// Append a vector with a two-byte length prefix
    pub fn put_vec_u16(&mut self, bytes: &[u8], context: &'static str) -> TlsWireResult<&mut Self> {
        let len = prefix_len(bytes.len(), u16::MAX as usize, context)?;
        self.put_u16(len as u16);
        Ok(self.put_bytes(bytes))
    }

    /// Append a vector with a three-byte length prefix
    pub fn put_vec_u24(&mut self, bytes: &[u8], context: &'static str) -> TlsWireResult<&mut Self> {
        let len = prefix_len(bytes.len(), U24_MAX, context)?;
        self.put_u24(len as u32)?;
        Ok(self.put_bytes(bytes))
    }
}

fn prefix_len(len: usize, limit: usize, context: &'static str) -> TlsWireResult<usize> {
    if len > limit {
        return Err(TlsWireError::MessageTooLarge {
            context,
            declared: len,
            limit,
        });
    }
    Ok(len)
}
