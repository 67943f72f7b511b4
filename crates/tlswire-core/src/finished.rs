//! Finished message
//!
//! The body is `verify_data`, whose length depends on the negotiated suite
//! (12 bytes for TLS 1.2, the transcript hash length for TLS 1.3). Computing
//! the expected value needs the key schedule and lives with the caller;
//! this type only carries and compares it.

use std::io::Read;

use subtle::ConstantTimeEq;
use tlswire_types::{ByteReader, SecurityErrorType, TlsWireError, TlsWireResult};
use tracing::warn;

/// `verify_data` length used by every TLS 1.2 suite
pub const TLS12_VERIFY_DATA_LEN: usize = 12;

/// Plaintext Finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    verify_data: Vec<u8>,
}

impl Finished {
    /// Build from `verify_data`; it must not be empty
    pub fn new(verify_data: &[u8]) -> TlsWireResult<Self> {
        if verify_data.is_empty() {
            return Err(TlsWireError::invalid_input("verify_data", "empty"));
        }
        Ok(Self {
            verify_data: verify_data.to_vec(),
        })
    }

    /// Read a body of exactly `length` bytes
    pub fn from_reader<R: Read>(reader: &mut ByteReader<R>, length: usize) -> TlsWireResult<Self> {
        let verify_data = reader.read_bytes(length, "finished verify_data")?;
        if verify_data.is_empty() {
            return Err(TlsWireError::invalid_input("verify_data", "empty"));
        }
        Ok(Self { verify_data })
    }

    /// Read a body of exactly `length` bytes from a raw stream
    pub fn from_stream<R: Read>(stream: &mut R, length: usize) -> TlsWireResult<Self> {
        Self::from_reader(&mut ByteReader::new(stream), length)
    }

    /// The verify_data bytes
    pub fn verify_data(&self) -> &[u8] {
        &self.verify_data
    }

    /// Body length
    pub fn size_of(&self) -> usize {
        self.verify_data.len()
    }

    /// Body bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.verify_data.clone()
    }

    /// Compare against the locally computed value in constant time
    pub fn verify(&self, expected: &[u8]) -> TlsWireResult<()> {
        if bool::from(self.verify_data.ct_eq(expected)) {
            return Ok(());
        }
        warn!(len = self.verify_data.len(), "finished verify_data mismatch");
        Err(TlsWireError::security(
            SecurityErrorType::VerificationFailed,
            "finished verify_data does not match the handshake transcript",
        ))
    }
}
