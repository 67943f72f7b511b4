//! tlswire
//!
//! TLS handshake and record-layer message engine. This crate re-exports the
//! workspace crates under one name:
//!
//! - [`types`]: errors, byte order, primitive codec, cipher suite registry
//! - [`crypto`]: X25519 key exchange, RSA key files and premaster transport
//! - [`engine`]: extensions, handshake messages, sequencer, configuration
//!
//! The `tlswire-dump` binary decodes captured handshake bytes and prints a
//! summary.

pub use tlswire_core as engine;
pub use tlswire_crypto as crypto;
pub use tlswire_types as types;

pub use tlswire_core::{
    ClientFinishedEncrypted, ClientHello, EngineConfig, Extension, ExtensionType, Extensions,
    Finished, HandshakeMessage, HandshakeSequencer, HandshakeState, ServerFinishedEncrypted,
    ServerHello, SignedCertificateTimestampExtension,
};
pub use tlswire_crypto::{KeyExchangeHandler, X25519Handler};
pub use tlswire_types::{
    BytesOrder, CipherSuite, CipherSuiteRegistry, SecurityErrorType, TlsWireError, TlsWireResult,
};
