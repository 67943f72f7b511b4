//! Protected handshake payloads
//!
//! Once keys are in place, handshake messages travel as opaque ciphertext.
//! [`Encrypted`] holds those bytes; [`EncryptedHandshake`] tags them with
//! the direction they travel in, so a client Finished can not be passed
//! where a server Finished is expected. The wire form is the ciphertext
//! itself with no extra framing; the surrounding record supplies the length.

use core::fmt;
use core::marker::PhantomData;
use std::io::Read;

use tlswire_types::{ByteReader, TlsWireResult};
use tracing::trace;

/// Opaque ciphertext. Owns its bytes: construction copies the input and
/// accessors never hand out mutable access.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Encrypted {
    bytes: Vec<u8>,
}

impl Encrypted {
    /// Copy `bytes` into a new payload
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Read exactly `length` bytes
    pub fn from_reader<R: Read>(reader: &mut ByteReader<R>, length: usize) -> TlsWireResult<Self> {
        let bytes = reader.read_bytes(length, "encrypted payload")?;
        Ok(Self { bytes })
    }

    /// Read exactly `length` bytes from a raw stream
    pub fn from_stream<R: Read>(stream: &mut R, length: usize) -> TlsWireResult<Self> {
        Self::from_reader(&mut ByteReader::new(stream), length)
    }

    /// Ciphertext bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes
    pub fn size_of(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Fresh copy of the ciphertext
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl From<Vec<u8>> for Encrypted {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl fmt::Debug for Encrypted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encrypted({} bytes)", self.bytes.len())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Direction marker for [`EncryptedHandshake`]
pub trait Direction: sealed::Sealed {
    /// Label used in logs and debug output
    const LABEL: &'static str;
}

/// Encrypted handshake message of no particular direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unspecified;

/// Client to server Finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientFinished;

/// Server to client Finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerFinished;

impl sealed::Sealed for Unspecified {}
impl sealed::Sealed for ClientFinished {}
impl sealed::Sealed for ServerFinished {}

impl Direction for Unspecified {
    const LABEL: &'static str = "EncryptedHandshake";
}

impl Direction for ClientFinished {
    const LABEL: &'static str = "ClientFinishedEncrypted";
}

impl Direction for ServerFinished {
    const LABEL: &'static str = "ServerFinishedEncrypted";
}

/// A handshake message carried as an [`Encrypted`] payload
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedHandshake<D: Direction = Unspecified> {
    payload: Encrypted,
    direction: PhantomData<D>,
}

/// Client Finished as it appears on the wire
pub type ClientFinishedEncrypted = EncryptedHandshake<ClientFinished>;

/// Server Finished as it appears on the wire
pub type ServerFinishedEncrypted = EncryptedHandshake<ServerFinished>;

impl<D: Direction> EncryptedHandshake<D> {
    /// Wrap an existing payload
    pub fn new(payload: Encrypted) -> Self {
        Self {
            payload,
            direction: PhantomData,
        }
    }

    /// Copy ciphertext bytes into a new message
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(Encrypted::from_slice(bytes))
    }

    /// Read exactly `length` bytes; nothing past them is consumed
    pub fn from_reader<R: Read>(reader: &mut ByteReader<R>, length: usize) -> TlsWireResult<Self> {
        let payload = Encrypted::from_reader(reader, length)?;
        trace!(message = D::LABEL, length, "read encrypted handshake message");
        Ok(Self::new(payload))
    }

    /// Read exactly `length` bytes from a raw stream
    pub fn from_stream<R: Read>(stream: &mut R, length: usize) -> TlsWireResult<Self> {
        Self::from_reader(&mut ByteReader::new(stream), length)
    }

    /// Wrapped payload
    pub fn payload(&self) -> &Encrypted {
        &self.payload
    }

    /// Unwrap the payload
    pub fn into_payload(self) -> Encrypted {
        self.payload
    }

    /// Message label
    pub fn label(&self) -> &'static str {
        D::LABEL
    }

    /// Byte length of the payload
    pub fn size_of(&self) -> usize {
        self.payload.size_of()
    }

    /// Wire bytes (the ciphertext)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.payload.to_bytes()
    }
}

impl<D: Direction> fmt::Debug for EncryptedHandshake<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({} bytes)", D::LABEL, self.payload.size_of())
    }
}
