//! RSA key loading and premaster-secret transport
//!
//! RSA suites carry no Diffie-Hellman exchange: the client picks a 48-byte
//! premaster secret and encrypts it to the server's public key with PKCS#1
//! v1.5. Keys come from PEM files; a file that cannot be read and a file that
//! does not hold an RSA key are reported as different security errors, both
//! naming the path.

use core::fmt;
use std::path::Path;

use rand_core::{CryptoRng, OsRng, RngCore};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use tlswire_types::{BytesOrder, SecurityErrorType, TlsWireError, TlsWireResult};
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Length of a TLS 1.2 RSA premaster secret
pub const PREMASTER_SECRET_LEN: usize = 48;

/// Load an RSA public key from a PEM file (`PUBLIC KEY` or `RSA PUBLIC KEY`)
pub fn load_public_key_pem(path: impl AsRef<Path>) -> TlsWireResult<RsaPublicKey> {
    let path = path.as_ref();
    let text = read_pem_file(path)?;
    decode_public_pem(&text).map_err(|reason| malformed(Some(path), "public", &reason))
}

/// Load an RSA private key from a PEM file (`PRIVATE KEY` or `RSA PRIVATE KEY`)
pub fn load_private_key_pem(path: impl AsRef<Path>) -> TlsWireResult<RsaPrivateKey> {
    let path = path.as_ref();
    let text = read_pem_file(path)?;
    decode_private_pem(&text).map_err(|reason| malformed(Some(path), "private", &reason))
}

/// Parse an RSA public key from PEM text
pub fn public_key_from_pem(text: &str) -> TlsWireResult<RsaPublicKey> {
    decode_public_pem(text).map_err(|reason| malformed(None, "public", &reason))
}

/// Parse an RSA private key from PEM text
pub fn private_key_from_pem(text: &str) -> TlsWireResult<RsaPrivateKey> {
    decode_private_pem(text).map_err(|reason| malformed(None, "private", &reason))
}

fn decode_public_pem(text: &str) -> Result<RsaPublicKey, String> {
    RsaPublicKey::from_public_key_pem(text)
        .or_else(|spki_err| {
            RsaPublicKey::from_pkcs1_pem(text)
                .map_err(|pkcs1_err| format!("SPKI: {spki_err}; PKCS#1: {pkcs1_err}"))
        })
}

fn decode_private_pem(text: &str) -> Result<RsaPrivateKey, String> {
    RsaPrivateKey::from_pkcs8_pem(text)
        .or_else(|pkcs8_err| {
            RsaPrivateKey::from_pkcs1_pem(text)
                .map_err(|pkcs1_err| format!("PKCS#8: {pkcs8_err}; PKCS#1: {pkcs1_err}"))
        })
}

fn read_pem_file(path: &Path) -> TlsWireResult<Zeroizing<String>> {
    let bytes = Zeroizing::new(std::fs::read(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "key file unreadable");
        TlsWireError::security(
            SecurityErrorType::KeyFileUnreadable,
            format!("cannot read key file {}: {e}", path.display()),
        )
    })?);

    let text = std::str::from_utf8(&bytes)
        .map_err(|e| malformed(Some(path), "RSA", &format!("not UTF-8 text: {e}")))?;
    Ok(Zeroizing::new(text.to_string()))
}

fn malformed(path: Option<&Path>, which: &str, reason: &str) -> TlsWireError {
    let message = match path {
        Some(path) => {
            warn!(path = %path.display(), "key file is not a valid PEM-encoded RSA key");
            format!(
                "cannot parse {which} key file {} as PEM-encoded RSA key: {reason}",
                path.display()
            )
        }
        None => format!("cannot parse {which} key text as PEM-encoded RSA key: {reason}"),
    };
    TlsWireError::security(SecurityErrorType::KeyFileMalformed, message)
}

/// 48-byte premaster secret, wiped on drop
#[derive(Clone, PartialEq, Eq)]
pub struct PremasterSecret(Zeroizing<[u8; PREMASTER_SECRET_LEN]>);

impl PremasterSecret {
    /// Secret bytes
    pub fn as_bytes(&self) -> &[u8; PREMASTER_SECRET_LEN] {
        &self.0
    }

    /// Protocol version carried in the first two bytes
    pub fn client_version(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }
}

impl fmt::Debug for PremasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PremasterSecret(version=0x{:04x}, [REDACTED])", self.client_version())
    }
}

/// RSA key transport for legacy `TLS_RSA_WITH_*` suites
#[derive(Debug)]
pub struct RsaKeyTransport<R = OsRng> {
    rng: R,
}

impl RsaKeyTransport<OsRng> {
    /// Transport drawing entropy from the operating system
    pub fn new() -> Self {
        Self { rng: OsRng }
    }
}

impl Default for RsaKeyTransport<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> RsaKeyTransport<R> {
    /// Transport with an explicit entropy source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Client side: choose a premaster secret and encrypt it to `server_key`.
    ///
    /// Returns the secret and the `EncryptedPreMasterSecret` bytes.
    pub fn encrypt_premaster(
        &mut self,
        server_key: &RsaPublicKey,
        client_version: u16,
    ) -> TlsWireResult<(PremasterSecret, Vec<u8>)> {
        let mut secret = Zeroizing::new([0u8; PREMASTER_SECRET_LEN]);
        secret[..2].copy_from_slice(&client_version.to_be_bytes());
        self.rng.try_fill_bytes(&mut secret[2..]).map_err(|e| {
            TlsWireError::security(
                SecurityErrorType::AlgorithmUnavailable,
                format!("RSA premaster generation: entropy source failed: {e}"),
            )
        })?;

        let encrypted = server_key
            .encrypt(&mut self.rng, Pkcs1v15Encrypt, secret.as_slice())
            .map_err(|e| {
                TlsWireError::security(
                    SecurityErrorType::InvalidKeyEncoding,
                    format!("RSA PKCS#1 v1.5 encryption failed: {e}"),
                )
            })?;

        debug!(
            modulus_bits = server_key.size() * 8,
            "encrypted RSA premaster secret"
        );
        Ok((PremasterSecret(secret), encrypted))
    }

    /// Server side: recover the premaster secret.
    ///
    /// A ciphertext that fails to decrypt, has the wrong length or carries a
    /// version other than `client_version` is not reported. A random secret
    /// is returned in its place, chosen without branching on which check
    /// failed, and the handshake fails later at Finished (RFC 5246 section
    /// 7.4.7.1). Only an entropy failure is an error.
    pub fn decrypt_premaster(
        &mut self,
        server_key: &RsaPrivateKey,
        encrypted: &[u8],
        client_version: u16,
    ) -> TlsWireResult<PremasterSecret> {
        let mut substitute = Zeroizing::new([0u8; PREMASTER_SECRET_LEN]);
        substitute[..2].copy_from_slice(&client_version.to_be_bytes());
        self.rng.try_fill_bytes(&mut substitute[2..]).map_err(|e| {
            TlsWireError::security(
                SecurityErrorType::AlgorithmUnavailable,
                format!("RSA premaster substitute: entropy source failed: {e}"),
            )
        })?;

        let decrypted = server_key
            .decrypt(Pkcs1v15Encrypt, encrypted)
            .map(Zeroizing::new);
        let (decrypted_ok, plain) = match &decrypted {
            Ok(plain) => (Choice::from(1), plain.as_slice()),
            Err(_) => (Choice::from(0), &[][..]),
        };

        let mut candidate = Zeroizing::new([0u8; PREMASTER_SECRET_LEN]);
        let copied = plain.len().min(PREMASTER_SECRET_LEN);
        candidate[..copied].copy_from_slice(&plain[..copied]);

        let length_ok = plain.len().ct_eq(&PREMASTER_SECRET_LEN);
        let version_ok = u16::from_be_bytes([candidate[0], candidate[1]]).ct_eq(&client_version);
        let valid = decrypted_ok & length_ok & version_ok;

        let mut secret = Zeroizing::new([0u8; PREMASTER_SECRET_LEN]);
        for (out, (real, fake)) in secret.iter_mut().zip(candidate.iter().zip(substitute.iter())) {
            *out = u8::conditional_select(fake, real, valid);
        }

        debug!(
            modulus_bits = server_key.size() * 8,
            "processed RSA premaster secret"
        );
        Ok(PremasterSecret(secret))
    }
}

/// Modulus of `key` encoded in `order`
pub fn modulus_bytes(key: &RsaPublicKey, order: BytesOrder) -> Vec<u8> {
    match order {
        BytesOrder::BigEndian => key.n().to_bytes_be(),
        BytesOrder::LittleEndian => key.n().to_bytes_le(),
    }
}

/// Whether `raw` (in `order`) is the modulus of `key`
pub fn verify_modulus_match(raw: &[u8], order: BytesOrder, key: &RsaPublicKey) -> bool {
    let width = key.size();
    match order.normalize(raw, width) {
        Ok(normalized) => {
            let expected = order.normalize(&modulus_bytes(key, order), width);
            match expected {
                Ok(expected) => bool::from(normalized.ct_eq(&expected)),
                Err(_) => false,
            }
        }
        Err(_) => false,
    }
}
