//! # tlswire crypto
//!
//! Key exchange for the tlswire handshake engine. Primitive operations come
//! from `x25519-dalek` and `rsa`; this crate adds explicit byte-order
//! handling, key-file loading with precise diagnostics, and the
//! [`KeyExchangeHandler`] seam the handshake layer is written against.
//!
//! ```text
//! KeyExchangeHandler
//! └── X25519Handler        ephemeral ECDHE over Curve25519
//! RsaKeyTransport          PKCS#1 v1.5 premaster secret (TLS_RSA_WITH_*)
//! load_*_key_pem           PEM files → rsa keys
//! ```
//!
//! ```rust
//! use tlswire_crypto::{KeyExchangeHandler, X25519Handler};
//! use tlswire_types::BytesOrder;
//!
//! let mut client = X25519Handler::new();
//! let mut server = X25519Handler::new();
//! let c = client.generate_key_pair()?;
//! let s = server.generate_key_pair()?;
//!
//! let wire = server.public_key_bytes(s.public_key(), BytesOrder::LittleEndian);
//! let peer = client.public_key_from(&wire, BytesOrder::LittleEndian)?;
//! let k1 = client.shared_secret(c.private_key(), &peer)?;
//! let k2 = server.shared_secret(s.private_key(), c.public_key())?;
//! assert_eq!(k1, k2);
//! # Ok::<(), tlswire_types::TlsWireError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_import_braces, unused_qualifications)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod rsa_keys;
pub mod traits;
pub mod x25519;

pub use rsa_keys::{
    load_private_key_pem, load_public_key_pem, PremasterSecret, RsaKeyTransport,
    PREMASTER_SECRET_LEN,
};
pub use traits::{KeyExchangeHandler, KeyPair, SharedSecret};
pub use x25519::{X25519Handler, X25519PrivateKey, X25519PublicKey};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
