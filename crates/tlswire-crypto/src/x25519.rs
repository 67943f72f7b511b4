//! X25519 key exchange
//!
//! RFC 7748 encodes both the scalar and the u-coordinate as 32-byte
//! little-endian integers; that is the form `x25519-dalek` works with and the
//! form used on the wire. Standard big-integer encodings use big-endian, so
//! every import and export goes through [`BytesOrder`] explicitly.

use core::fmt;

use rand_core::{CryptoRng, OsRng, RngCore};
use subtle::ConstantTimeEq;
use tlswire_types::{BytesOrder, SecurityErrorType, TlsWireError, TlsWireResult, X25519_KEY_LEN};
use tracing::{debug, warn};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::traits::{KeyExchangeHandler, KeyPair, SharedSecret};

/// X25519 public key (u-coordinate)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct X25519PublicKey(PublicKey);

impl X25519PublicKey {
    /// Little-endian wire bytes
    pub fn as_wire_bytes(&self) -> &[u8; X25519_KEY_LEN] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for X25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("X25519PublicKey(")?;
        for b in self.0.as_bytes() {
            write!(f, "{b:02x}")?;
        }
        f.write_str(")")
    }
}

/// X25519 private scalar, wiped on drop
#[derive(Clone)]
pub struct X25519PrivateKey(StaticSecret);

impl X25519PrivateKey {
    /// Public key for this scalar
    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey(PublicKey::from(&self.0))
    }
}

impl fmt::Debug for X25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("X25519PrivateKey([REDACTED])")
    }
}

/// Diffie-Hellman over Curve25519
#[derive(Debug)]
pub struct X25519Handler<R = OsRng> {
    rng: R,
}

impl X25519Handler<OsRng> {
    /// Handler drawing entropy from the operating system
    pub fn new() -> Self {
        Self { rng: OsRng }
    }
}

impl Default for X25519Handler<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> X25519Handler<R> {
    /// Handler with an explicit entropy source (seeded RNGs make key
    /// generation reproducible in tests)
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    fn wire_bytes(bytes: &[u8], order: BytesOrder, what: &str) -> TlsWireResult<[u8; X25519_KEY_LEN]> {
        if bytes.is_empty() {
            return Err(TlsWireError::security(
                SecurityErrorType::InvalidKeyEncoding,
                format!("empty X25519 {what}"),
            ));
        }

        let normalized = order
            .normalize_into(bytes, X25519_KEY_LEN, BytesOrder::LittleEndian)
            .map_err(|_| {
                TlsWireError::security(
                    SecurityErrorType::InvalidKeyEncoding,
                    format!(
                        "X25519 {what} does not fit in {X25519_KEY_LEN} bytes ({} byte {}-endian encoding)",
                        bytes.len(),
                        order.as_str()
                    ),
                )
            })?;

        let mut out = [0u8; X25519_KEY_LEN];
        out.copy_from_slice(&normalized);
        Ok(out)
    }
}

impl<R: RngCore + CryptoRng> KeyExchangeHandler for X25519Handler<R> {
    type PrivateKey = X25519PrivateKey;
    type PublicKey = X25519PublicKey;

    fn algorithm(&self) -> &'static str {
        "X25519"
    }

    fn generate_key_pair(&mut self) -> TlsWireResult<KeyPair<X25519PrivateKey, X25519PublicKey>> {
        let mut scalar = Zeroizing::new([0u8; X25519_KEY_LEN]);
        self.rng.try_fill_bytes(scalar.as_mut()).map_err(|e| {
            TlsWireError::security(
                SecurityErrorType::AlgorithmUnavailable,
                format!("X25519 key generation: entropy source failed: {e}"),
            )
        })?;

        let private_key = X25519PrivateKey(StaticSecret::from(*scalar));
        let public_key = private_key.public_key();
        debug!(algorithm = "X25519", "generated ephemeral key pair");
        Ok(KeyPair::new(private_key, public_key))
    }

    fn public_key_from(&self, bytes: &[u8], order: BytesOrder) -> TlsWireResult<X25519PublicKey> {
        let wire = Self::wire_bytes(bytes, order, "public key")?;
        if wire.iter().all(|&b| b == 0) {
            return Err(TlsWireError::security(
                SecurityErrorType::InvalidCurvePoint,
                "X25519 public key is the zero point",
            ));
        }
        Ok(X25519PublicKey(PublicKey::from(wire)))
    }

    fn private_key_from(&self, bytes: &[u8], order: BytesOrder) -> TlsWireResult<X25519PrivateKey> {
        let wire = Zeroizing::new(Self::wire_bytes(bytes, order, "private key")?);
        Ok(X25519PrivateKey(StaticSecret::from(*wire)))
    }

    fn shared_secret(
        &self,
        private_key: &X25519PrivateKey,
        public_key: &X25519PublicKey,
    ) -> TlsWireResult<SharedSecret> {
        let shared = private_key.0.diffie_hellman(&public_key.0);
        if !shared.was_contributory() {
            warn!(peer = ?public_key, "rejecting low-order X25519 public key");
            return Err(TlsWireError::security(
                SecurityErrorType::InvalidCurvePoint,
                "X25519 peer key is a low-order point (all-zero shared secret)",
            ));
        }
        Ok(SharedSecret::new(shared.as_bytes().to_vec()))
    }

    fn public_key_bytes(&self, public_key: &X25519PublicKey, order: BytesOrder) -> Vec<u8> {
        BytesOrder::LittleEndian.convert(public_key.as_wire_bytes(), order)
    }

    fn private_key_bytes(&self, private_key: &X25519PrivateKey, order: BytesOrder) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(BytesOrder::LittleEndian.convert(private_key.0.as_bytes(), order))
    }

    fn verify_key_match(&self, raw: &[u8], order: BytesOrder, public_key: &X25519PublicKey) -> bool {
        match Self::wire_bytes(raw, order, "public key") {
            Ok(wire) => bool::from(wire[..].ct_eq(&public_key.as_wire_bytes()[..])),
            Err(_) => false,
        }
    }
}
