//! Cipher suite registry
//!
//! Suites are identified on the wire by a 2-byte code and everywhere else by
//! their canonical IANA name. The registry is built once from a static table,
//! rejects duplicate codes or names at construction, and afterwards answers
//! lookups in either direction in O(1). It is read-only and shared by every
//! connection.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{ByteReader, ByteWriter};
use crate::errors::SecurityErrorType;
use crate::{TlsWireError, TlsWireResult};

/// A named, numerically-coded bundle of algorithm choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSuite {
    identifier: u16,
    name: &'static str,
    legacy: bool,
}

impl CipherSuite {
    /// Define a suite. Only registry tables call this.
    pub const fn define(identifier: u16, name: &'static str, legacy: bool) -> Self {
        Self {
            identifier,
            name,
            legacy,
        }
    }

    /// Get the wire format representation
    pub fn wire_format(&self) -> u16 {
        self.identifier
    }

    /// Canonical name, e.g. `TLS_RSA_WITH_RC4_128_SHA`
    pub fn as_str(&self) -> &'static str {
        self.name
    }

    /// Historical suite kept only for interoperability testing against
    /// constrained peers
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }
}

impl core::fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (0x{:04x})", self.name, self.identifier)
    }
}

/// Suites known to the engine, in default preference order
pub const STANDARD_SUITES: &[CipherSuite] = &[
    CipherSuite::define(0x1301, "TLS_AES_128_GCM_SHA256", false),
    CipherSuite::define(0x1302, "TLS_AES_256_GCM_SHA384", false),
    CipherSuite::define(0x1303, "TLS_CHACHA20_POLY1305_SHA256", false),
    CipherSuite::define(0xC02B, "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256", false),
    CipherSuite::define(0xC02F, "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256", false),
    CipherSuite::define(0xC02C, "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384", false),
    CipherSuite::define(0xC030, "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384", false),
    CipherSuite::define(0xCCA8, "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256", false),
    CipherSuite::define(0xCCA9, "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256", false),
    CipherSuite::define(0x009C, "TLS_RSA_WITH_AES_128_GCM_SHA256", true),
    CipherSuite::define(0x009D, "TLS_RSA_WITH_AES_256_GCM_SHA384", true),
    CipherSuite::define(0x002F, "TLS_RSA_WITH_AES_128_CBC_SHA", true),
    CipherSuite::define(0x0035, "TLS_RSA_WITH_AES_256_CBC_SHA", true),
    CipherSuite::define(0x000A, "TLS_RSA_WITH_3DES_EDE_CBC_SHA", true),
    CipherSuite::define(0x0005, "TLS_RSA_WITH_RC4_128_SHA", true),
    CipherSuite::define(0x0004, "TLS_RSA_WITH_RC4_128_MD5", true),
    CipherSuite::define(0x00FF, "TLS_EMPTY_RENEGOTIATION_INFO_SCSV", true),
];

static GLOBAL: LazyLock<CipherSuiteRegistry> = LazyLock::new(|| {
    CipherSuiteRegistry::from_definitions(STANDARD_SUITES)
        .unwrap_or_else(|e| panic!("built-in cipher suite table is inconsistent: {e}"))
});

/// Bidirectional, validated lookup table of cipher suites
#[derive(Debug, Clone)]
pub struct CipherSuiteRegistry {
    suites: Vec<CipherSuite>,
    by_identifier: HashMap<u16, usize>,
    by_name: HashMap<&'static str, usize>,
}

impl CipherSuiteRegistry {
    /// Build a registry, failing on the first duplicate code or name
    pub fn from_definitions(definitions: &[CipherSuite]) -> TlsWireResult<Self> {
        let mut by_identifier = HashMap::with_capacity(definitions.len());
        let mut by_name = HashMap::with_capacity(definitions.len());

        for (index, suite) in definitions.iter().enumerate() {
            if by_identifier.insert(suite.identifier, index).is_some() {
                return Err(TlsWireError::DuplicateCipherSuite {
                    field: "identifier",
                    value: format!("0x{:04x}", suite.identifier),
                });
            }
            if by_name.insert(suite.name, index).is_some() {
                return Err(TlsWireError::DuplicateCipherSuite {
                    field: "name",
                    value: suite.name.to_string(),
                });
            }
        }

        Ok(Self {
            suites: definitions.to_vec(),
            by_identifier,
            by_name,
        })
    }

    /// The process-wide registry over [`STANDARD_SUITES`]
    pub fn global() -> &'static CipherSuiteRegistry {
        &GLOBAL
    }

    /// Look a suite up by its wire code
    pub fn by_identifier(&self, identifier: u16) -> TlsWireResult<CipherSuite> {
        self.by_identifier
            .get(&identifier)
            .map(|&i| self.suites[i])
            .ok_or(TlsWireError::UnknownCode {
                vocabulary: "cipher suite",
                code: identifier,
            })
    }

    /// Look a suite up by its canonical name
    pub fn by_name(&self, name: &str) -> TlsWireResult<CipherSuite> {
        self.by_name
            .get(name)
            .map(|&i| self.suites[i])
            .ok_or_else(|| TlsWireError::UnknownName {
                vocabulary: "cipher suite",
                name: name.to_string(),
            })
    }

    /// All suites in definition order
    pub fn all(&self) -> &[CipherSuite] {
        &self.suites
    }

    /// Whether `identifier` is known
    pub fn contains(&self, identifier: u16) -> bool {
        self.by_identifier.contains_key(&identifier)
    }

    /// Number of suites
    pub fn len(&self) -> usize {
        self.suites.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Decode a `CipherSuite cipher_suites<2..2^16-2>` list.
    ///
    /// Codes the registry does not know (GREASE values, suites from newer
    /// peers) are skipped: an offer may legitimately contain them.
    pub fn decode_list(&self, raw: &[u8]) -> TlsWireResult<Vec<CipherSuite>> {
        if raw.len() % 2 != 0 {
            return Err(TlsWireError::invalid_input(
                "cipher suite list",
                format!("odd length {}", raw.len()),
            ));
        }

        let mut suites = Vec::with_capacity(raw.len() / 2);
        for pair in raw.chunks_exact(2) {
            let code = u16::from_be_bytes([pair[0], pair[1]]);
            match self.by_identifier(code) {
                Ok(suite) => suites.push(suite),
                Err(_) => debug!("skipping unknown cipher suite 0x{:04x}", code),
            }
        }
        Ok(suites)
    }

    /// Encode a suite list with its u16 length prefix
    pub fn encode_list(suites: &[CipherSuite]) -> TlsWireResult<Vec<u8>> {
        let mut body = ByteWriter::with_capacity(suites.len() * 2);
        for suite in suites {
            body.put_u16(suite.identifier);
        }
        let mut out = ByteWriter::with_capacity(body.len() + 2);
        out.put_vec_u16(&body.into_bytes(), "cipher suite list")?;
        Ok(out.into_bytes())
    }

    /// Read a length-prefixed suite list from a stream
    pub fn read_list<R: std::io::Read>(&self, reader: &mut ByteReader<R>) -> TlsWireResult<Vec<CipherSuite>> {
        let raw = reader.read_vec_u16("cipher suite list")?;
        self.decode_list(&raw)
    }

    /// Pick the first suite in `preference` that the peer offered.
    ///
    /// Preference order wins over offer order.
    pub fn negotiate(offered: &[CipherSuite], preference: &[CipherSuite]) -> TlsWireResult<CipherSuite> {
        let chosen = preference
            .iter()
            .find(|candidate| offered.iter().any(|o| o.identifier == candidate.identifier))
            .copied()
            .ok_or_else(|| {
                TlsWireError::security(
                    SecurityErrorType::NoCommonCipherSuite,
                    format!(
                        "peer offered {} suites, none of the {} enabled",
                        offered.len(),
                        preference.len()
                    ),
                )
            })?;
        debug!(suite = %chosen, "negotiated cipher suite");
        Ok(chosen)
    }
}

impl Serialize for CipherSuite {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

impl<'de> Deserialize<'de> for CipherSuite {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        CipherSuiteRegistry::global()
            .by_name(&name)
            .map_err(serde::de::Error::custom)
    }
}
