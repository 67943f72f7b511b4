//! Key exchange abstraction
//!
//! A handler owns the algorithm-specific parts of a single handshake's key
//! agreement: generating the ephemeral pair, importing the peer's key from
//! its wire encoding, and computing the shared secret. Key derivation from
//! that secret lives outside this crate.

use core::fmt;

use tlswire_types::{BytesOrder, TlsWireResult};
use zeroize::Zeroizing;

/// A private key together with its public half
#[derive(Debug)]
pub struct KeyPair<Sk, Pk> {
    private_key: Sk,
    public_key: Pk,
}

impl<Sk, Pk> KeyPair<Sk, Pk> {
    /// Pair up a private and public key
    pub fn new(private_key: Sk, public_key: Pk) -> Self {
        Self {
            private_key,
            public_key,
        }
    }

    /// Private half
    pub fn private_key(&self) -> &Sk {
        &self.private_key
    }

    /// Public half
    pub fn public_key(&self) -> &Pk {
        &self.public_key
    }
}

/// Output of a key agreement, wiped on drop
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    /// Wrap raw secret bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Secret bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the secret is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret([REDACTED; {}])", self.0.len())
    }
}

/// Key-pair generation, key marshaling and shared-secret derivation for one
/// key exchange mechanism.
///
/// Implementations must be deterministic for fixed keys: two sessions that
/// pin the same key pairs agree on the same secret.
pub trait KeyExchangeHandler {
    /// Private key type
    type PrivateKey;
    /// Public key type
    type PublicKey;

    /// Algorithm name for diagnostics
    fn algorithm(&self) -> &'static str;

    /// Generate a fresh key pair from the handler's entropy source
    fn generate_key_pair(&mut self) -> TlsWireResult<KeyPair<Self::PrivateKey, Self::PublicKey>>;

    /// Import a peer public key from its encoding in `order`
    fn public_key_from(&self, bytes: &[u8], order: BytesOrder) -> TlsWireResult<Self::PublicKey>;

    /// Import a pinned private key from its encoding in `order`
    fn private_key_from(&self, bytes: &[u8], order: BytesOrder) -> TlsWireResult<Self::PrivateKey>;

    /// Single-pass agreement between our private key and the peer's public key
    fn shared_secret(
        &self,
        private_key: &Self::PrivateKey,
        public_key: &Self::PublicKey,
    ) -> TlsWireResult<SharedSecret>;

    /// Encode a public key in `order`; inverse of [`Self::public_key_from`]
    fn public_key_bytes(&self, public_key: &Self::PublicKey, order: BytesOrder) -> Vec<u8>;

    /// Encode a private key in `order`; inverse of [`Self::private_key_from`]
    fn private_key_bytes(
        &self,
        private_key: &Self::PrivateKey,
        order: BytesOrder,
    ) -> Zeroizing<Vec<u8>>;

    /// Whether `raw` (in `order`) encodes the same key as `public_key`,
    /// without building a new key object
    fn verify_key_match(&self, raw: &[u8], order: BytesOrder, public_key: &Self::PublicKey) -> bool;
}
