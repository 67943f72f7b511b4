//! Handshake message framing
//!
//! ```text
//! struct {
//!     HandshakeType msg_type;  // u8
//!     uint24 length;           // body length
//!     select (msg_type) { ... } body;
//! } Handshake;
//! ```
//!
//! Bodies are always read by their declared length first and decoded from
//! that buffer, so a malformed body can never pull bytes belonging to the
//! next message off the stream.

use std::io::{Cursor, Read};

use serde::Serialize;
use tlswire_types::{ByteReader, ByteWriter, TlsWireError, TlsWireResult};
use tracing::{debug, trace};

use crate::encrypted::{ClientFinishedEncrypted, EncryptedHandshake, ServerFinishedEncrypted};
use crate::finished::Finished;
use crate::hello::{ClientHello, ServerHello};

/// Handshake message type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum HandshakeType {
    /// hello_request (0)
    HelloRequest = 0,
    /// client_hello (1)
    ClientHello = 1,
    /// server_hello (2)
    ServerHello = 2,
    /// new_session_ticket (4)
    NewSessionTicket = 4,
    /// encrypted_extensions (8)
    EncryptedExtensions = 8,
    /// certificate (11)
    Certificate = 11,
    /// server_key_exchange (12)
    ServerKeyExchange = 12,
    /// certificate_request (13)
    CertificateRequest = 13,
    /// server_hello_done (14)
    ServerHelloDone = 14,
    /// certificate_verify (15)
    CertificateVerify = 15,
    /// client_key_exchange (16)
    ClientKeyExchange = 16,
    /// finished (20)
    Finished = 20,
}

impl HandshakeType {
    /// Wire code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Protocol name
    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeType::HelloRequest => "hello_request",
            HandshakeType::ClientHello => "client_hello",
            HandshakeType::ServerHello => "server_hello",
            HandshakeType::NewSessionTicket => "new_session_ticket",
            HandshakeType::EncryptedExtensions => "encrypted_extensions",
            HandshakeType::Certificate => "certificate",
            HandshakeType::ServerKeyExchange => "server_key_exchange",
            HandshakeType::CertificateRequest => "certificate_request",
            HandshakeType::ServerHelloDone => "server_hello_done",
            HandshakeType::CertificateVerify => "certificate_verify",
            HandshakeType::ClientKeyExchange => "client_key_exchange",
            HandshakeType::Finished => "finished",
        }
    }
}

impl TryFrom<u8> for HandshakeType {
    type Error = TlsWireError;

    fn try_from(code: u8) -> TlsWireResult<Self> {
        Ok(match code {
            0 => HandshakeType::HelloRequest,
            1 => HandshakeType::ClientHello,
            2 => HandshakeType::ServerHello,
            4 => HandshakeType::NewSessionTicket,
            8 => HandshakeType::EncryptedExtensions,
            11 => HandshakeType::Certificate,
            12 => HandshakeType::ServerKeyExchange,
            13 => HandshakeType::CertificateRequest,
            14 => HandshakeType::ServerHelloDone,
            15 => HandshakeType::CertificateVerify,
            16 => HandshakeType::ClientKeyExchange,
            20 => HandshakeType::Finished,
            other => {
                return Err(TlsWireError::UnknownCode {
                    vocabulary: "handshake type",
                    code: other as u16,
                })
            }
        })
    }
}

impl core::fmt::Display for HandshakeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four-byte handshake header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeHeader {
    /// Message type
    pub msg_type: HandshakeType,
    /// Body length (24-bit on the wire)
    pub length: u32,
}

impl HandshakeHeader {
    /// Encoded header size
    pub const LEN: usize = 4;

    /// Read a header and check the declared body length against `max_len`
    pub fn read<R: Read>(reader: &mut ByteReader<R>, max_len: usize) -> TlsWireResult<Self> {
        let msg_type = HandshakeType::try_from(reader.read_u8("handshake type")?)?;
        let length = reader.read_u24("handshake length")?;
        if length as usize > max_len {
            return Err(TlsWireError::MessageTooLarge {
                context: "handshake message",
                declared: length as usize,
                limit: max_len,
            });
        }
        trace!(%msg_type, length, "read handshake header");
        Ok(Self { msg_type, length })
    }

    /// Append the header to `writer`
    pub fn write_to(&self, writer: &mut ByteWriter) -> TlsWireResult<()> {
        writer.put_u8(self.msg_type.code()).put_u24(self.length)?;
        Ok(())
    }
}

/// Decode a message body from a buffer that must be consumed exactly
pub(crate) fn decode_exact<'a, T>(
    body: &'a [u8],
    context: &'static str,
    decode: impl FnOnce(&mut ByteReader<Cursor<&'a [u8]>>) -> TlsWireResult<T>,
) -> TlsWireResult<T> {
    let mut reader = ByteReader::new(Cursor::new(body));
    let value = decode(&mut reader)?;
    if reader.consumed() != body.len() {
        return Err(TlsWireError::length_mismatch(
            context,
            body.len(),
            reader.consumed(),
        ));
    }
    Ok(value)
}

/// Any handshake message the engine models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeMessage {
    /// Plaintext ClientHello
    ClientHello(ClientHello),
    /// Plaintext ServerHello
    ServerHello(ServerHello),
    /// Plaintext (already decrypted) Finished
    Finished(Finished),
    /// Encrypted handshake message of unspecified type
    EncryptedHandshake(EncryptedHandshake),
    /// Client Finished as protected on the wire
    ClientFinishedEncrypted(ClientFinishedEncrypted),
    /// Server Finished as protected on the wire
    ServerFinishedEncrypted(ServerFinishedEncrypted),
}

impl HandshakeMessage {
    /// Read one framed plaintext message (header and body).
    ///
    /// Only ClientHello, ServerHello and Finished bodies are modeled; other
    /// known types are rejected as invalid input.
    pub fn read_plaintext<R: Read>(
        reader: &mut ByteReader<R>,
        max_len: usize,
    ) -> TlsWireResult<Self> {
        let header = HandshakeHeader::read(reader, max_len)?;
        let length = header.length as usize;
        let message = match header.msg_type {
            HandshakeType::ClientHello => {
                HandshakeMessage::ClientHello(ClientHello::from_reader(reader, length)?)
            }
            HandshakeType::ServerHello => {
                HandshakeMessage::ServerHello(ServerHello::from_reader(reader, length)?)
            }
            HandshakeType::Finished => {
                HandshakeMessage::Finished(Finished::from_reader(reader, length)?)
            }
            other => {
                return Err(TlsWireError::invalid_input(
                    "handshake type",
                    format!("{other} bodies are not modeled"),
                ))
            }
        };
        debug!(message = message.name(), length, "read plaintext handshake message");
        Ok(message)
    }

    /// Read from a raw stream with the given body limit
    pub fn read_plaintext_from<R: Read>(stream: &mut R, max_len: usize) -> TlsWireResult<Self> {
        Self::read_plaintext(&mut ByteReader::new(stream), max_len)
    }

    /// Short variant name for logs and state errors
    pub fn name(&self) -> &'static str {
        match self {
            HandshakeMessage::ClientHello(_) => "ClientHello",
            HandshakeMessage::ServerHello(_) => "ServerHello",
            HandshakeMessage::Finished(_) => "Finished",
            HandshakeMessage::EncryptedHandshake(_) => "EncryptedHandshake",
            HandshakeMessage::ClientFinishedEncrypted(_) => "ClientFinishedEncrypted",
            HandshakeMessage::ServerFinishedEncrypted(_) => "ServerFinishedEncrypted",
        }
    }

    /// Plaintext handshake type; `None` for protected messages
    pub fn handshake_type(&self) -> Option<HandshakeType> {
        match self {
            HandshakeMessage::ClientHello(_) => Some(HandshakeType::ClientHello),
            HandshakeMessage::ServerHello(_) => Some(HandshakeType::ServerHello),
            HandshakeMessage::Finished(_) => Some(HandshakeType::Finished),
            _ => None,
        }
    }

    /// Body size in bytes (no framing)
    pub fn size_of(&self) -> usize {
        match self {
            HandshakeMessage::ClientHello(m) => m.size_of(),
            HandshakeMessage::ServerHello(m) => m.size_of(),
            HandshakeMessage::Finished(m) => m.size_of(),
            HandshakeMessage::EncryptedHandshake(m) => m.size_of(),
            HandshakeMessage::ClientFinishedEncrypted(m) => m.size_of(),
            HandshakeMessage::ServerFinishedEncrypted(m) => m.size_of(),
        }
    }

    /// Body bytes (no framing)
    pub fn to_bytes(&self) -> TlsWireResult<Vec<u8>> {
        Ok(match self {
            HandshakeMessage::ClientHello(m) => m.to_bytes()?,
            HandshakeMessage::ServerHello(m) => m.to_bytes()?,
            HandshakeMessage::Finished(m) => m.to_bytes(),
            HandshakeMessage::EncryptedHandshake(m) => m.to_bytes(),
            HandshakeMessage::ClientFinishedEncrypted(m) => m.to_bytes(),
            HandshakeMessage::ServerFinishedEncrypted(m) => m.to_bytes(),
        })
    }

    /// Header plus body, for plaintext messages
    pub fn to_framed_bytes(&self) -> TlsWireResult<Vec<u8>> {
        let msg_type = self.handshake_type().ok_or_else(|| {
            TlsWireError::invalid_input(
                "handshake message",
                format!("{} carries no plaintext header", self.name()),
            )
        })?;
        let body = self.to_bytes()?;
        let mut writer = ByteWriter::with_capacity(HandshakeHeader::LEN + body.len());
        HandshakeHeader {
            msg_type,
            length: body.len() as u32,
        }
        .write_to(&mut writer)?;
        writer.put_bytes(&body);
        Ok(writer.into_bytes())
    }
}

impl From<ClientHello> for HandshakeMessage {
    fn from(m: ClientHello) -> Self {
        HandshakeMessage::ClientHello(m)
    }
}

impl From<ServerHello> for HandshakeMessage {
    fn from(m: ServerHello) -> Self {
        HandshakeMessage::ServerHello(m)
    }
}

impl From<Finished> for HandshakeMessage {
    fn from(m: Finished) -> Self {
        HandshakeMessage::Finished(m)
    }
}

impl From<EncryptedHandshake> for HandshakeMessage {
    fn from(m: EncryptedHandshake) -> Self {
        HandshakeMessage::EncryptedHandshake(m)
    }
}

impl From<ClientFinishedEncrypted> for HandshakeMessage {
    fn from(m: ClientFinishedEncrypted) -> Self {
        HandshakeMessage::ClientFinishedEncrypted(m)
    }
}

impl From<ServerFinishedEncrypted> for HandshakeMessage {
    fn from(m: ServerFinishedEncrypted) -> Self {
        HandshakeMessage::ServerFinishedEncrypted(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlswire_types::MAX_HANDSHAKE_MESSAGE_LEN;

    #[test]
    fn test_handshake_type_codes() {
        assert_eq!(HandshakeType::try_from(20).unwrap(), HandshakeType::Finished);
        assert_eq!(HandshakeType::Finished.code(), 20);
        assert!(matches!(
            HandshakeType::try_from(3),
            Err(TlsWireError::UnknownCode {
                vocabulary: "handshake type",
                code: 3
            })
        ));
    }

    #[test]
    fn test_header_limit() {
        let raw = [0x14u8, 0x01, 0x00, 0x01];
        let mut reader = ByteReader::new(&raw[..]);
        assert!(matches!(
            HandshakeHeader::read(&mut reader, MAX_HANDSHAKE_MESSAGE_LEN),
            Err(TlsWireError::MessageTooLarge {
                declared: 0x010001,
                ..
            })
        ));
    }

    #[test]
    fn test_header_at_limit_accepted() {
        let raw = [0x14u8, 0x01, 0x00, 0x00];
        let header = HandshakeHeader::read(&mut ByteReader::new(&raw[..]), MAX_HANDSHAKE_MESSAGE_LEN).unwrap();
        assert_eq!(header.msg_type, HandshakeType::Finished);
        assert_eq!(header.length as usize, MAX_HANDSHAKE_MESSAGE_LEN);
    }

    #[test]
    fn test_read_finished_and_frame() {
        let raw = [0x14u8, 0x00, 0x00, 0x03, 0xAA, 0xBB, 0xCC, 0xFF];
        let mut stream = &raw[..];
        let msg = HandshakeMessage::read_plaintext_from(&mut stream, 1024).unwrap();
        assert_eq!(msg.name(), "Finished");
        assert_eq!(msg.size_of(), 3);
        assert_eq!(msg.to_framed_bytes().unwrap(), raw[..7].to_vec());
        assert_eq!(stream, &[0xFFu8][..]);
    }

    #[test]
    fn test_unmodeled_type_rejected() {
        let raw = [0x0bu8, 0x00, 0x00, 0x00];
        assert!(matches!(
            HandshakeMessage::read_plaintext_from(&mut &raw[..], 1024),
            Err(TlsWireError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_encrypted_has_no_framing() {
        let msg = HandshakeMessage::from(ClientFinishedEncrypted::from_slice(&[1, 2, 3]));
        assert_eq!(msg.to_bytes().unwrap(), vec![1, 2, 3]);
        assert!(msg.to_framed_bytes().is_err());
    }
}
