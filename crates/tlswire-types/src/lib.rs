//! # tlswire types
//!
//! Shared vocabulary for the tlswire handshake engine: the error taxonomy,
//! byte-order selection for large unsigned integers, the primitive big-endian
//! codec and the cipher suite registry.
//!
//! ## Architecture
//!
//! ```text
//! tlswire-types
//! ├── errors        TlsWireError (decode / security / protocol / io)
//! ├── order         BytesOrder (big vs little endian integers)
//! ├── codec         ByteReader / ByteWriter
//! └── cipher_suite  CipherSuite, CipherSuiteRegistry
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_import_braces, unused_qualifications)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod cipher_suite;
pub mod codec;
pub mod errors;
pub mod order;

pub use cipher_suite::{CipherSuite, CipherSuiteRegistry};
pub use codec::{ByteReader, ByteWriter};
pub use errors::{SecurityErrorType, TlsWireError, TlsWireResult};
pub use order::BytesOrder;

/// Default upper bound for a single handshake message body
pub const MAX_HANDSHAKE_MESSAGE_LEN: usize = 64 * 1024;

/// X25519 public keys, private scalars and shared secrets are 32 bytes
pub const X25519_KEY_LEN: usize = 32;
