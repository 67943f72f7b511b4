//! TLS extension framework
//!
//! Every extension shares the same envelope:
//!
//! ```text
//! struct {
//!     ExtensionType extension_type;      // u16
//!     opaque extension_data<0..2^16-1>;  // u16 length + payload
//! } Extension;
//! ```
//!
//! The generic reader never interprets the payload. Typed views (see
//! [`crate::sct`]) wrap an [`Extension`] and decode its payload on demand, so
//! re-serializing a typed extension always reproduces the original bytes.

use std::io::{Cursor, Read};

use serde::Serialize;
use tlswire_types::{ByteReader, ByteWriter, TlsWireError, TlsWireResult};
use tracing::{debug, trace};

/// Extension type codes (IANA "TLS ExtensionType Values")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExtensionType {
    /// server_name (0)
    ServerName,
    /// status_request (5)
    StatusRequest,
    /// supported_groups (10)
    SupportedGroups,
    /// ec_point_formats (11)
    EcPointFormats,
    /// signature_algorithms (13)
    SignatureAlgorithms,
    /// application_layer_protocol_negotiation (16)
    ApplicationLayerProtocolNegotiation,
    /// signed_certificate_timestamp (18)
    SignedCertificateTimestamp,
    /// extended_master_secret (23)
    ExtendedMasterSecret,
    /// session_ticket (35)
    SessionTicket,
    /// supported_versions (43)
    SupportedVersions,
    /// psk_key_exchange_modes (45)
    PskKeyExchangeModes,
    /// key_share (51)
    KeyShare,
    /// renegotiation_info (65281)
    RenegotiationInfo,
    /// Any code without a named variant
    Unknown(u16),
}

impl ExtensionType {
    /// Map a wire code; total, unknown codes are preserved
    pub fn from_code(code: u16) -> Self {
        match code {
            0x0000 => ExtensionType::ServerName,
            0x0005 => ExtensionType::StatusRequest,
            0x000a => ExtensionType::SupportedGroups,
            0x000b => ExtensionType::EcPointFormats,
            0x000d => ExtensionType::SignatureAlgorithms,
            0x0010 => ExtensionType::ApplicationLayerProtocolNegotiation,
            0x0012 => ExtensionType::SignedCertificateTimestamp,
            0x0017 => ExtensionType::ExtendedMasterSecret,
            0x0023 => ExtensionType::SessionTicket,
            0x002b => ExtensionType::SupportedVersions,
            0x002d => ExtensionType::PskKeyExchangeModes,
            0x0033 => ExtensionType::KeyShare,
            0xff01 => ExtensionType::RenegotiationInfo,
            other => ExtensionType::Unknown(other),
        }
    }

    /// Get the wire format representation
    pub fn code(&self) -> u16 {
        match self {
            ExtensionType::ServerName => 0x0000,
            ExtensionType::StatusRequest => 0x0005,
            ExtensionType::SupportedGroups => 0x000a,
            ExtensionType::EcPointFormats => 0x000b,
            ExtensionType::SignatureAlgorithms => 0x000d,
            ExtensionType::ApplicationLayerProtocolNegotiation => 0x0010,
            ExtensionType::SignedCertificateTimestamp => 0x0012,
            ExtensionType::ExtendedMasterSecret => 0x0017,
            ExtensionType::SessionTicket => 0x0023,
            ExtensionType::SupportedVersions => 0x002b,
            ExtensionType::PskKeyExchangeModes => 0x002d,
            ExtensionType::KeyShare => 0x0033,
            ExtensionType::RenegotiationInfo => 0xff01,
            ExtensionType::Unknown(code) => *code,
        }
    }

    /// IANA name, or `unknown` for unnamed codes
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionType::ServerName => "server_name",
            ExtensionType::StatusRequest => "status_request",
            ExtensionType::SupportedGroups => "supported_groups",
            ExtensionType::EcPointFormats => "ec_point_formats",
            ExtensionType::SignatureAlgorithms => "signature_algorithms",
            ExtensionType::ApplicationLayerProtocolNegotiation => {
                "application_layer_protocol_negotiation"
            }
            ExtensionType::SignedCertificateTimestamp => "signed_certificate_timestamp",
            ExtensionType::ExtendedMasterSecret => "extended_master_secret",
            ExtensionType::SessionTicket => "session_ticket",
            ExtensionType::SupportedVersions => "supported_versions",
            ExtensionType::PskKeyExchangeModes => "psk_key_exchange_modes",
            ExtensionType::KeyShare => "key_share",
            ExtensionType::RenegotiationInfo => "renegotiation_info",
            ExtensionType::Unknown(_) => "unknown",
        }
    }
}

impl From<u16> for ExtensionType {
    fn from(code: u16) -> Self {
        ExtensionType::from_code(code)
    }
}

impl core::fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (0x{:04x})", self.as_str(), self.code())
    }
}

/// One type-length-value extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    extension_type: ExtensionType,
    data: Vec<u8>,
}

impl Extension {
    /// Size of the type and length fields
    pub const HEADER_LEN: usize = 4;

    /// Build an extension; the payload must fit a u16 length
    pub fn new(extension_type: ExtensionType, data: Vec<u8>) -> TlsWireResult<Self> {
        if data.len() > u16::MAX as usize {
            return Err(TlsWireError::MessageTooLarge {
                context: "extension payload",
                declared: data.len(),
                limit: u16::MAX as usize,
            });
        }
        Ok(Self {
            extension_type,
            data,
        })
    }

    /// Extension with an empty payload
    pub fn empty(extension_type: ExtensionType) -> Self {
        Self {
            extension_type,
            data: Vec::new(),
        }
    }

    /// Read one extension: type, length `L`, then exactly `L` payload bytes
    pub fn from_reader<R: Read>(reader: &mut ByteReader<R>) -> TlsWireResult<Self> {
        let extension_type = ExtensionType::from_code(reader.read_u16("extension type")?);
        let length = reader.read_u16("extension length")? as usize;
        let data = reader.read_bytes(length, "extension payload")?;
        trace!(%extension_type, length, "parsed extension");
        Ok(Self {
            extension_type,
            data,
        })
    }

    /// Read one extension from a raw stream
    pub fn from_stream<R: Read>(stream: &mut R) -> TlsWireResult<Self> {
        Self::from_reader(&mut ByteReader::new(stream))
    }

    /// Parse an extension that must span all of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> TlsWireResult<Self> {
        let mut reader = ByteReader::new(Cursor::new(bytes));
        let extension = Self::from_reader(&mut reader)?;
        if reader.consumed() != bytes.len() {
            return Err(TlsWireError::length_mismatch(
                "extension",
                extension.size_of(),
                bytes.len(),
            ));
        }
        Ok(extension)
    }

    /// Extension type
    pub fn extension_type(&self) -> ExtensionType {
        self.extension_type
    }

    /// Declared payload length; always equals `data().len()`
    pub fn length(&self) -> u16 {
        self.data.len() as u16
    }

    /// Opaque payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Encoded size including the 4-byte header
    pub fn size_of(&self) -> usize {
        Self::HEADER_LEN + self.data.len()
    }

    /// Append the wire encoding to `writer`
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer
            .put_u16(self.extension_type.code())
            .put_u16(self.length())
            .put_bytes(&self.data);
    }

    /// Wire encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(self.size_of());
        self.write_to(&mut writer);
        writer.into_bytes()
    }
}

/// The `Extension extensions<0..2^16-1>` block of a hello message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    entries: Vec<Extension>,
}

impl Extensions {
    /// Empty block
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting duplicate types
    pub fn from_vec(entries: Vec<Extension>) -> TlsWireResult<Self> {
        let mut block = Self::new();
        for extension in entries {
            block.push(extension)?;
        }
        Ok(block)
    }

    /// Append an extension; a type may appear at most once
    pub fn push(&mut self, extension: Extension) -> TlsWireResult<()> {
        if self.get(extension.extension_type()).is_some() {
            return Err(TlsWireError::invalid_input(
                "extensions",
                format!("duplicate {}", extension.extension_type()),
            ));
        }
        self.entries.push(extension);
        Ok(())
    }

    /// Read the u16 block length, then extensions until the block is used up
    pub fn from_reader<R: Read>(reader: &mut ByteReader<R>) -> TlsWireResult<Self> {
        let block = reader.read_vec_u16("extensions block")?;
        let mut inner = ByteReader::new(Cursor::new(block.as_slice()));
        let mut extensions = Self::new();
        while inner.consumed() < block.len() {
            extensions.push(Extension::from_reader(&mut inner)?)?;
        }
        debug!(count = extensions.len(), bytes = block.len(), "parsed extensions block");
        Ok(extensions)
    }

    /// First extension of `extension_type`
    pub fn get(&self, extension_type: ExtensionType) -> Option<&Extension> {
        self.entries
            .iter()
            .find(|e| e.extension_type() == extension_type)
    }

    /// Iterate in wire order
    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.entries.iter()
    }

    /// Number of extensions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the block holds no extensions
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encoded size including the 2-byte block length
    pub fn size_of(&self) -> usize {
        2 + self.body_len()
    }

    fn body_len(&self) -> usize {
        self.entries.iter().map(Extension::size_of).sum()
    }

    /// Append the wire encoding to `writer`
    pub fn write_to(&self, writer: &mut ByteWriter) -> TlsWireResult<()> {
        let mut body = ByteWriter::with_capacity(self.body_len());
        for extension in &self.entries {
            extension.write_to(&mut body);
        }
        writer.put_vec_u16(&body.into_bytes(), "extensions block")?;
        Ok(())
    }

    /// Wire encoding
    pub fn to_bytes(&self) -> TlsWireResult<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.size_of());
        self.write_to(&mut writer)?;
        Ok(writer.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_roundtrip() {
        let raw = [0x00u8, 0x10, 0x00, 0x03, 0x02, 0x68, 0x32];
        let ext = Extension::from_bytes(&raw).unwrap();
        assert_eq!(
            ext.extension_type(),
            ExtensionType::ApplicationLayerProtocolNegotiation
        );
        assert_eq!(ext.length(), 3);
        assert_eq!(ext.data(), &[0x02, 0x68, 0x32]);
        assert_eq!(ext.to_bytes(), raw.to_vec());
    }

    #[test]
    fn test_unknown_type_preserved() {
        let raw = [0xFAu8, 0xFA, 0x00, 0x00];
        let ext = Extension::from_bytes(&raw).unwrap();
        assert_eq!(ext.extension_type(), ExtensionType::Unknown(0xFAFA));
        assert_eq!(ext.to_bytes(), raw.to_vec());
    }

    #[test]
    fn test_truncated_payload() {
        let raw = [0x00u8, 0x00, 0x00, 0x08, 0x01, 0x02];
        let err = Extension::from_stream(&mut &raw[..]).unwrap_err();
        assert!(matches!(
            err,
            TlsWireError::Truncated {
                context: "extension payload",
                expected: 8,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_from_bytes_rejects_trailing_data() {
        let raw = [0x00u8, 0x17, 0x00, 0x00, 0xFF];
        assert!(matches!(
            Extension::from_bytes(&raw),
            Err(TlsWireError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_reader_leaves_following_bytes() {
        let raw = [0x00u8, 0x17, 0x00, 0x00, 0x00, 0x2b, 0x00, 0x01, 0x04];
        let mut stream = &raw[..];
        let first = Extension::from_stream(&mut stream).unwrap();
        assert_eq!(first.extension_type(), ExtensionType::ExtendedMasterSecret);
        assert_eq!(stream.len(), 5);
        let second = Extension::from_stream(&mut stream).unwrap();
        assert_eq!(second.extension_type(), ExtensionType::SupportedVersions);
        assert!(stream.is_empty());
    }

    #[test]
    fn test_block_roundtrip_and_duplicates() {
        let block = [
            0x00u8, 0x0a, // block length
            0x00, 0x17, 0x00, 0x00, // extended_master_secret
            0xff, 0x01, 0x00, 0x02, 0x01, 0x00, // renegotiation_info
        ];
        let mut reader = ByteReader::new(Cursor::new(&block[..]));
        let exts = Extensions::from_reader(&mut reader).unwrap();
        assert_eq!(exts.len(), 2);
        assert!(exts.get(ExtensionType::RenegotiationInfo).is_some());
        assert_eq!(exts.to_bytes().unwrap(), block.to_vec());

        let dup = [0x00u8, 0x08, 0x00, 0x17, 0x00, 0x00, 0x00, 0x17, 0x00, 0x00];
        let mut reader = ByteReader::new(Cursor::new(&dup[..]));
        assert!(Extensions::from_reader(&mut reader).unwrap_err().is_decode_error());
    }

    #[test]
    fn test_extension_overrunning_block_is_truncation() {
        let block = [0x00u8, 0x05, 0x00, 0x17, 0x00, 0x04, 0x01];
        let mut reader = ByteReader::new(Cursor::new(&block[..]));
        assert!(matches!(
            Extensions::from_reader(&mut reader),
            Err(TlsWireError::Truncated { .. })
        ));
    }

    #[test]
    fn test_new_rejects_oversized_payload() {
        assert!(Extension::new(ExtensionType::ServerName, vec![0; 70_000]).is_err());
    }
}
