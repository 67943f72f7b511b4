//! key_share extension (RFC 8446 section 4.2.8)

use std::io::Cursor;

use tlswire_types::{
    ByteReader, ByteWriter, BytesOrder, SecurityErrorType, TlsWireError, TlsWireResult,
    X25519_KEY_LEN,
};

use crate::extension::{Extension, ExtensionType};
use crate::handshake::decode_exact;

/// NamedGroup code for x25519
pub const GROUP_X25519: u16 = 0x001d;

/// One `KeyShareEntry`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyShareEntry {
    /// NamedGroup code
    pub group: u16,
    /// Public key in the group's wire encoding
    pub key_exchange: Vec<u8>,
}

impl KeyShareEntry {
    /// Entry for `group`
    pub fn new(group: u16, key_exchange: Vec<u8>) -> Self {
        Self {
            group,
            key_exchange,
        }
    }

    /// x25519 entry from a public key held in `order`.
    ///
    /// The key_exchange field is always little-endian on the wire
    /// (RFC 7748); `order` is the order the embedding application keeps
    /// keys in, usually `EngineConfig::x25519_wire_order`.
    pub fn x25519(public_key: &[u8], order: BytesOrder) -> TlsWireResult<Self> {
        let wire = order
            .normalize_into(public_key, X25519_KEY_LEN, BytesOrder::LittleEndian)
            .map_err(|e| {
                TlsWireError::security(
                    SecurityErrorType::InvalidKeyEncoding,
                    format!("x25519 key share: {e}"),
                )
            })?;
        Ok(Self::new(GROUP_X25519, wire))
    }

    /// The x25519 public key converted to `order`
    pub fn x25519_key_in(&self, order: BytesOrder) -> TlsWireResult<Vec<u8>> {
        if self.group != GROUP_X25519 || self.key_exchange.len() != X25519_KEY_LEN {
            return Err(TlsWireError::security(
                SecurityErrorType::InvalidKeyEncoding,
                format!(
                    "key share group 0x{:04x} with {} byte key is not x25519",
                    self.group,
                    self.key_exchange.len()
                ),
            ));
        }
        Ok(BytesOrder::LittleEndian.convert(&self.key_exchange, order))
    }

    fn write_to(&self, writer: &mut ByteWriter) -> TlsWireResult<()> {
        writer
            .put_u16(self.group)
            .put_vec_u16(&self.key_exchange, "key_exchange")?;
        Ok(())
    }

    fn read_from(reader: &mut ByteReader<Cursor<&[u8]>>) -> TlsWireResult<Self> {
        Ok(Self {
            group: reader.read_u16("key share group")?,
            key_exchange: reader.read_vec_u16("key_exchange")?,
        })
    }

    /// ServerHello form: a single entry
    pub fn to_server_extension(&self) -> TlsWireResult<Extension> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer)?;
        Extension::new(ExtensionType::KeyShare, writer.into_bytes())
    }

    /// ClientHello form: a u16-prefixed list of entries
    pub fn to_client_extension(entries: &[KeyShareEntry]) -> TlsWireResult<Extension> {
        let mut list = ByteWriter::new();
        for entry in entries {
            entry.write_to(&mut list)?;
        }
        let mut writer = ByteWriter::with_capacity(list.len() + 2);
        writer.put_vec_u16(&list.into_bytes(), "client_shares")?;
        Extension::new(ExtensionType::KeyShare, writer.into_bytes())
    }

    /// Decode the ServerHello form
    pub fn from_server_extension(extension: &Extension) -> TlsWireResult<Self> {
        expect_key_share(extension)?;
        decode_exact(extension.data(), "key_share", Self::read_from)
    }

    /// Decode the ClientHello form
    pub fn from_client_extension(extension: &Extension) -> TlsWireResult<Vec<Self>> {
        expect_key_share(extension)?;
        let list = decode_exact(extension.data(), "key_share", |reader| {
            reader.read_vec_u16("client_shares")
        })?;
        let mut entries = ByteReader::new(Cursor::new(list.as_slice()));
        let mut shares = Vec::new();
        while entries.consumed() < list.len() {
            shares.push(Self::read_from(&mut entries)?);
        }
        Ok(shares)
    }
}

fn expect_key_share(extension: &Extension) -> TlsWireResult<()> {
    if extension.extension_type() != ExtensionType::KeyShare {
        return Err(TlsWireError::invalid_input(
            "extension type",
            format!("expected key_share, got {}", extension.extension_type()),
        ));
    }
    Ok(())
}
