//! ClientHello and ServerHello bodies
//!
//! Both keep cipher suites as raw codes so that offers containing GREASE or
//! unregistered suites re-encode byte for byte. The registry is consulted
//! only when a caller asks for typed suites.

use std::io::{Cursor, Read};

use tlswire_types::{
    ByteReader, ByteWriter, CipherSuite, CipherSuiteRegistry, TlsWireError, TlsWireResult,
};
use tracing::trace;

use crate::extension::{ExtensionType, Extensions};
use crate::handshake::decode_exact;
use crate::key_share::KeyShareEntry;

/// `legacy_version` value sent by TLS 1.2 and 1.3 peers
pub const TLS12_VERSION: u16 = 0x0303;

/// Length of the hello random
pub const RANDOM_LEN: usize = 32;

const MAX_SESSION_ID_LEN: usize = 32;

fn read_session_id(reader: &mut ByteReader<Cursor<&[u8]>>) -> TlsWireResult<Vec<u8>> {
    let session_id = reader.read_vec_u8("session id")?;
    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(TlsWireError::MessageTooLarge {
            context: "session id",
            declared: session_id.len(),
            limit: MAX_SESSION_ID_LEN,
        });
    }
    Ok(session_id)
}

/// Extensions block if any bytes remain in the body, else `None`
fn read_optional_extensions(
    reader: &mut ByteReader<Cursor<&[u8]>>,
    body_len: usize,
) -> TlsWireResult<Option<Extensions>> {
    if reader.consumed() == body_len {
        return Ok(None);
    }
    Extensions::from_reader(reader).map(Some)
}

fn read_body<R: Read>(
    reader: &mut ByteReader<R>,
    length: usize,
    context: &'static str,
) -> TlsWireResult<Vec<u8>> {
    let body = reader.read_bytes(length, context)?;
    trace!(context, length, "read hello body");
    Ok(body)
}

/// ClientHello
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// legacy_version
    pub legacy_version: u16,
    /// Client random
    pub random: [u8; RANDOM_LEN],
    /// legacy_session_id
    pub session_id: Vec<u8>,
    /// Offered suite codes, in client preference order
    pub cipher_suites: Vec<u16>,
    /// legacy_compression_methods
    pub compression_methods: Vec<u8>,
    /// Extensions block; `None` when the body ends after compression methods
    pub extensions: Option<Extensions>,
}

impl ClientHello {
    /// TLS 1.2-style hello offering `suites` with null compression
    pub fn new(random: [u8; RANDOM_LEN], suites: &[CipherSuite], extensions: Extensions) -> Self {
        Self {
            legacy_version: TLS12_VERSION,
            random,
            session_id: Vec::new(),
            cipher_suites: suites.iter().map(CipherSuite::wire_format).collect(),
            compression_methods: vec![0],
            extensions: Some(extensions),
        }
    }

    /// Read a body of exactly `length` bytes
    pub fn from_reader<R: Read>(reader: &mut ByteReader<R>, length: usize) -> TlsWireResult<Self> {
        let body = read_body(reader, length, "client hello")?;
        decode_exact(&body, "client hello", |r| {
            let legacy_version = r.read_u16("client version")?;
            let random = r.read_fixed::<RANDOM_LEN>("client random")?;
            let session_id = read_session_id(r)?;
            let suites_raw = r.read_vec_u16("cipher suite list")?;
            if suites_raw.is_empty() || suites_raw.len() % 2 != 0 {
                return Err(TlsWireError::invalid_input(
                    "cipher suite list",
                    format!("length {} is not a positive even number", suites_raw.len()),
                ));
            }
            let cipher_suites = suites_raw
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            let compression_methods = r.read_vec_u8("compression methods")?;
            if compression_methods.is_empty() {
                return Err(TlsWireError::invalid_input("compression methods", "empty"));
            }
            let extensions = read_optional_extensions(r, body.len())?;
            Ok(Self {
                legacy_version,
                random,
                session_id,
                cipher_suites,
                compression_methods,
                extensions,
            })
        })
    }

    /// Offered suites known to `registry`, in offer order
    pub fn offered_suites(&self, registry: &CipherSuiteRegistry) -> Vec<CipherSuite> {
        self.cipher_suites
            .iter()
            .filter_map(|code| registry.by_identifier(*code).ok())
            .collect()
    }

    /// Offered key shares, if the hello carries a key_share extension
    pub fn key_shares(&self) -> TlsWireResult<Vec<KeyShareEntry>> {
        match self
            .extensions
            .as_ref()
            .and_then(|e| e.get(ExtensionType::KeyShare))
        {
            Some(ext) => KeyShareEntry::from_client_extension(ext),
            None => Ok(Vec::new()),
        }
    }

    /// Body size
    pub fn size_of(&self) -> usize {
        2 + RANDOM_LEN
            + 1
            + self.session_id.len()
            + 2
            + self.cipher_suites.len() * 2
            + 1
            + self.compression_methods.len()
            + self.extensions.as_ref().map_or(0, Extensions::size_of)
    }

    /// Body bytes
    pub fn to_bytes(&self) -> TlsWireResult<Vec<u8>> {
        let mut suites = ByteWriter::with_capacity(self.cipher_suites.len() * 2);
        for code in &self.cipher_suites {
            suites.put_u16(*code);
        }

        let mut writer = ByteWriter::with_capacity(self.size_of());
        writer
            .put_u16(self.legacy_version)
            .put_bytes(&self.random)
            .put_vec_u8(&self.session_id, "session id")?
            .put_vec_u16(&suites.into_bytes(), "cipher suite list")?
            .put_vec_u8(&self.compression_methods, "compression methods")?;
        if let Some(extensions) = &self.extensions {
            extensions.write_to(&mut writer)?;
        }
        Ok(writer.into_bytes())
    }
}

/// ServerHello
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// legacy_version
    pub legacy_version: u16,
    /// Server random
    pub random: [u8; RANDOM_LEN],
    /// legacy_session_id_echo
    pub session_id: Vec<u8>,
    /// Selected suite code
    pub cipher_suite: u16,
    /// Selected compression method
    pub compression_method: u8,
    /// Extensions block; `None` when the body ends after the compression method
    pub extensions: Option<Extensions>,
}

impl ServerHello {
    /// Hello selecting `suite` with null compression
    pub fn new(random: [u8; RANDOM_LEN], suite: CipherSuite, extensions: Extensions) -> Self {
        Self {
            legacy_version: TLS12_VERSION,
            random,
            session_id: Vec::new(),
            cipher_suite: suite.wire_format(),
            compression_method: 0,
            extensions: Some(extensions),
        }
    }

    /// Read a body of exactly `length` bytes
    pub fn from_reader<R: Read>(reader: &mut ByteReader<R>, length: usize) -> TlsWireResult<Self> {
        let body = read_body(reader, length, "server hello")?;
        decode_exact(&body, "server hello", |r| {
            Ok(Self {
                legacy_version: r.read_u16("server version")?,
                random: r.read_fixed::<RANDOM_LEN>("server random")?,
                session_id: read_session_id(r)?,
                cipher_suite: r.read_u16("cipher suite")?,
                compression_method: r.read_u8("compression method")?,
                extensions: read_optional_extensions(r, body.len())?,
            })
        })
    }

    /// Selected suite resolved through `registry`
    pub fn selected_suite(&self, registry: &CipherSuiteRegistry) -> TlsWireResult<CipherSuite> {
        registry.by_identifier(self.cipher_suite)
    }

    /// The server's key share, if present
    pub fn key_share(&self) -> TlsWireResult<Option<KeyShareEntry>> {
        self.extensions
            .as_ref()
            .and_then(|e| e.get(ExtensionType::KeyShare))
            .map(KeyShareEntry::from_server_extension)
            .transpose()
    }

    /// Body size
    pub fn size_of(&self) -> usize {
        2 + RANDOM_LEN
            + 1
            + self.session_id.len()
            + 2
            + 1
            + self.extensions.as_ref().map_or(0, Extensions::size_of)
    }

    /// Body bytes
    pub fn to_bytes(&self) -> TlsWireResult<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.size_of());
        writer
            .put_u16(self.legacy_version)
            .put_bytes(&self.random)
            .put_vec_u8(&self.session_id, "session id")?
            .put_u16(self.cipher_suite)
            .put_u8(self.compression_method);
        if let Some(extensions) = &self.extensions {
            extensions.write_to(&mut writer)?;
        }
        Ok(writer.into_bytes())
    }
}
