//! # tlswire core
//!
//! Handshake message model, extension framework and client-side handshake
//! sequencing for the tlswire engine.
//!
//! ## Architecture
//!
//! ```text
//! tlswire-core
//! ├── extension   Extension TLV, Extensions block, ExtensionType
//! ├── sct         signed_certificate_timestamp (RFC 6962)
//! ├── key_share   key_share entries (RFC 8446)
//! ├── handshake   HandshakeType, HandshakeHeader, HandshakeMessage
//! ├── hello       ClientHello, ServerHello
//! ├── finished    Finished (plaintext verify_data)
//! ├── encrypted   Encrypted, EncryptedHandshake<D> and Finished aliases
//! ├── sequencer   HandshakeSequencer state machine
//! └── config      EngineConfig (JSON / TLSWIRE_* environment)
//! ```
//!
//! Every reader takes a [`ByteReader`](tlswire_types::ByteReader) and
//! consumes exactly the bytes its message declares, so several messages can
//! be decoded back to back from one stream.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_import_braces, unused_qualifications)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod encrypted;
pub mod extension;
pub mod finished;
pub mod handshake;
pub mod hello;
pub mod key_share;
pub mod sct;
pub mod sequencer;

pub use config::EngineConfig;
pub use encrypted::{
    ClientFinishedEncrypted, Direction, Encrypted, EncryptedHandshake, ServerFinishedEncrypted,
};
pub use extension::{Extension, ExtensionType, Extensions};
pub use finished::Finished;
pub use handshake::{HandshakeHeader, HandshakeMessage, HandshakeType};
pub use hello::{ClientHello, ServerHello, RANDOM_LEN, TLS12_VERSION};
pub use key_share::{KeyShareEntry, GROUP_X25519};
pub use sct::{SignedCertificateTimestamp, SignedCertificateTimestampExtension};
pub use sequencer::{HandshakeSequencer, HandshakeState};
