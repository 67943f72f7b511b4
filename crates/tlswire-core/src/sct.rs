//! signed_certificate_timestamp extension (RFC 6962 section 3.3)
//!
//! In a ClientHello the extension is empty and only requests timestamps. In
//! a ServerHello it carries a `SignedCertificateTimestampList`. The raw
//! payload is kept as received; [`SignedCertificateTimestampExtension::records`]
//! decodes the list only when asked.

use std::io::{Cursor, Read};

use serde::Serialize;
use tlswire_types::{ByteReader, ByteWriter, TlsWireError, TlsWireResult};
use tracing::debug;

use crate::extension::{Extension, ExtensionType};

/// Length of a CT log id (SHA-256 of the log's public key)
pub const LOG_ID_LEN: usize = 32;

/// Typed view of an extension whose type is signed_certificate_timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificateTimestampExtension {
    extension: Extension,
}

impl SignedCertificateTimestampExtension {
    /// Read a full extension (type, length, payload) and require type 0x0012
    pub fn from_reader<R: Read>(reader: &mut ByteReader<R>) -> TlsWireResult<Self> {
        Self::try_from(Extension::from_reader(reader)?)
    }

    /// Read from a raw stream
    pub fn from_stream<R: Read>(stream: &mut R) -> TlsWireResult<Self> {
        Self::from_reader(&mut ByteReader::new(stream))
    }

    /// Empty extension, as sent by a client requesting timestamps
    pub fn request() -> Self {
        Self {
            extension: Extension::empty(ExtensionType::SignedCertificateTimestamp),
        }
    }

    /// Build the server form from decoded timestamps
    pub fn from_records(records: &[SignedCertificateTimestamp]) -> TlsWireResult<Self> {
        let mut list = ByteWriter::new();
        for record in records {
            list.put_vec_u16(&record.to_bytes()?, "serialized SCT")?;
        }
        let mut payload = ByteWriter::with_capacity(list.len() + 2);
        payload.put_vec_u16(&list.into_bytes(), "SCT list")?;
        let extension = Extension::new(
            ExtensionType::SignedCertificateTimestamp,
            payload.into_bytes(),
        )?;
        Ok(Self { extension })
    }

    /// Always [`ExtensionType::SignedCertificateTimestamp`]
    pub fn extension_type(&self) -> ExtensionType {
        self.extension.extension_type()
    }

    /// Raw payload
    pub fn data(&self) -> &[u8] {
        self.extension.data()
    }

    /// Encoded size including the 4-byte header
    pub fn size_of(&self) -> usize {
        self.extension.size_of()
    }

    /// Byte-identical re-encoding of what was read
    pub fn to_bytes(&self) -> Vec<u8> {
        self.extension.to_bytes()
    }

    /// Underlying generic extension
    pub fn as_extension(&self) -> &Extension {
        &self.extension
    }

    /// Decode the timestamp list. An empty payload (client request form)
    /// yields no records.
    pub fn records(&self) -> TlsWireResult<Vec<SignedCertificateTimestamp>> {
        let data = self.extension.data();
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = ByteReader::new(Cursor::new(data));
        let list = reader.read_vec_u16("SCT list")?;
        if reader.consumed() != data.len() {
            return Err(TlsWireError::length_mismatch(
                "SCT extension",
                reader.consumed(),
                data.len(),
            ));
        }

        let mut entries = ByteReader::new(Cursor::new(list.as_slice()));
        let mut records = Vec::new();
        while entries.consumed() < list.len() {
            let serialized = entries.read_vec_u16("serialized SCT")?;
            records.push(SignedCertificateTimestamp::from_bytes(&serialized)?);
        }
        debug!(count = records.len(), "decoded signed certificate timestamps");
        Ok(records)
    }
}

impl TryFrom<Extension> for SignedCertificateTimestampExtension {
    type Error = TlsWireError;

    fn try_from(extension: Extension) -> TlsWireResult<Self> {
        if extension.extension_type() != ExtensionType::SignedCertificateTimestamp {
            return Err(TlsWireError::invalid_input(
                "extension type",
                format!(
                    "expected {}, got {}",
                    ExtensionType::SignedCertificateTimestamp,
                    extension.extension_type()
                ),
            ));
        }
        Ok(Self { extension })
    }
}

impl From<SignedCertificateTimestampExtension> for Extension {
    fn from(sct: SignedCertificateTimestampExtension) -> Self {
        sct.extension
    }
}

/// One decoded `SignedCertificateTimestamp` (v1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedCertificateTimestamp {
    /// Version (v1 = 0)
    pub version: u8,
    /// Log id
    pub log_id: [u8; LOG_ID_LEN],
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Opaque CT extensions
    pub extensions: Vec<u8>,
    /// HashAlgorithm code of the signature
    pub hash_algorithm: u8,
    /// SignatureAlgorithm code of the signature
    pub signature_algorithm: u8,
    /// Log signature
    pub signature: Vec<u8>,
}

impl SignedCertificateTimestamp {
    /// Parse one serialized SCT; the bytes must hold exactly one record
    pub fn from_bytes(bytes: &[u8]) -> TlsWireResult<Self> {
        let mut reader = ByteReader::new(Cursor::new(bytes));
        let sct = Self {
            version: reader.read_u8("SCT version")?,
            log_id: reader.read_fixed::<LOG_ID_LEN>("SCT log id")?,
            timestamp: reader.read_u64("SCT timestamp")?,
            extensions: reader.read_vec_u16("SCT extensions")?,
            hash_algorithm: reader.read_u8("SCT hash algorithm")?,
            signature_algorithm: reader.read_u8("SCT signature algorithm")?,
            signature: reader.read_vec_u16("SCT signature")?,
        };
        if reader.consumed() != bytes.len() {
            return Err(TlsWireError::length_mismatch(
                "serialized SCT",
                reader.consumed(),
                bytes.len(),
            ));
        }
        Ok(sct)
    }

    /// Serialized form (without the outer u16 length)
    pub fn to_bytes(&self) -> TlsWireResult<Vec<u8>> {
        let mut writer = ByteWriter::new();
        writer
            .put_u8(self.version)
            .put_bytes(&self.log_id)
            .put_u64(self.timestamp)
            .put_vec_u16(&self.extensions, "SCT extensions")?
            .put_u8(self.hash_algorithm)
            .put_u8(self.signature_algorithm)
            .put_vec_u16(&self.signature, "SCT signature")?;
        Ok(writer.into_bytes())
    }
}
