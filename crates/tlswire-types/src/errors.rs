//! Error types for tlswire operations
//!
//! Every failure in the engine is terminal for the handshake attempt that
//! produced it. Errors fall into three classes that callers treat differently:
//!
//! - **malformed input** (`Truncated`, `LengthMismatch`, `UnknownCode`, ...):
//!   the peer or the caller handed us bytes that do not decode;
//! - **security** (`Security { .. }`): an algorithm, key or proof failed and
//!   the caller should alert rather than retry;
//! - **resource** (`Io`): the underlying stream failed and the error is
//!   propagated unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tlswire operations
pub type TlsWireResult<T> = Result<T, TlsWireError>;

/// Comprehensive error type for tlswire operations
#[derive(Debug, Error)]
pub enum TlsWireError {
    /// The stream ended before the declared number of bytes was available
    #[error("truncated {context}: expected {expected} bytes, got {actual}")]
    Truncated {
        /// What was being read
        context: &'static str,
        /// Bytes the length header promised
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// A declared length disagrees with the data it describes
    #[error("length mismatch in {context}: declared {declared}, actual {actual}")]
    LengthMismatch {
        /// What was being decoded
        context: &'static str,
        /// Length carried on the wire or in the object
        declared: usize,
        /// Length observed
        actual: usize,
    },

    /// A declared length exceeds the configured or structural limit
    #[error("{context} too large: declared {declared} bytes, limit {limit}")]
    MessageTooLarge {
        /// What was being decoded or encoded
        context: &'static str,
        /// Requested size
        declared: usize,
        /// Maximum allowed size
        limit: usize,
    },

    /// A code outside a closed vocabulary
    #[error("unknown {vocabulary} code 0x{code:04x}")]
    UnknownCode {
        /// Vocabulary the code was looked up in
        vocabulary: &'static str,
        /// Offending code
        code: u16,
    },

    /// A name outside a closed vocabulary
    #[error("unknown {vocabulary} name `{name}`")]
    UnknownName {
        /// Vocabulary the name was looked up in
        vocabulary: &'static str,
        /// Offending name
        name: String,
    },

    /// Structurally invalid input that is not a length problem
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Field that contains invalid data
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Cipher suite definitions collide at registry construction
    #[error("duplicate cipher suite {field}: {value}")]
    DuplicateCipherSuite {
        /// `identifier` or `name`
        field: &'static str,
        /// The colliding value
        value: String,
    },

    /// Cryptographic or key-material failure
    #[error("security error ({error_type}): {message}")]
    Security {
        /// Security error type
        error_type: SecurityErrorType,
        /// Detailed error message
        message: String,
    },

    /// A well-formed message arrived in a handshake state that does not accept it
    #[error("unexpected {message} in state {state}")]
    UnexpectedMessage {
        /// Sequencer state at the time
        state: &'static str,
        /// Message that was offered
        message: &'static str,
    },

    /// The handshake was already aborted by an earlier fatal error
    #[error("handshake aborted: {reason}")]
    Aborted {
        /// Reason recorded at abort time
        reason: String,
    },

    /// Underlying stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Security-specific error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityErrorType {
    /// The requested algorithm is not available from the provider
    AlgorithmUnavailable,
    /// Key bytes have the wrong shape for the algorithm
    InvalidKeyEncoding,
    /// Curve point is invalid or of low order
    InvalidCurvePoint,
    /// Key file could not be opened or read
    KeyFileUnreadable,
    /// Key file was read but does not hold a valid key
    KeyFileMalformed,
    /// An integrity proof (Finished verify data) did not match
    VerificationFailed,
    /// Client and server share no cipher suite
    NoCommonCipherSuite,
}

impl SecurityErrorType {
    /// Get the snake_case label used in messages and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityErrorType::AlgorithmUnavailable => "algorithm_unavailable",
            SecurityErrorType::InvalidKeyEncoding => "invalid_key_encoding",
            SecurityErrorType::InvalidCurvePoint => "invalid_curve_point",
            SecurityErrorType::KeyFileUnreadable => "key_file_unreadable",
            SecurityErrorType::KeyFileMalformed => "key_file_malformed",
            SecurityErrorType::VerificationFailed => "verification_failed",
            SecurityErrorType::NoCommonCipherSuite => "no_common_cipher_suite",
        }
    }
}

impl core::fmt::Display for SecurityErrorType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TlsWireError {
    /// Create a truncation error
    pub fn truncated(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::Truncated {
            context,
            expected,
            actual,
        }
    }

    /// Create a length mismatch error
    pub fn length_mismatch(context: &'static str, declared: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            context,
            declared,
            actual,
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Create a security error
    pub fn security(error_type: SecurityErrorType, message: impl Into<String>) -> Self {
        Self::Security {
            error_type,
            message: message.into(),
        }
    }

    /// Security error type, if this is a security error
    pub fn security_type(&self) -> Option<SecurityErrorType> {
        match self {
            TlsWireError::Security { error_type, .. } => Some(*error_type),
            _ => None,
        }
    }

    /// Check if this error means the input bytes could not be decoded
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            TlsWireError::Truncated { .. }
                | TlsWireError::LengthMismatch { .. }
                | TlsWireError::MessageTooLarge { .. }
                | TlsWireError::UnknownCode { .. }
                | TlsWireError::UnknownName { .. }
                | TlsWireError::InvalidInput { .. }
        )
    }

    /// Check if this error is a cryptographic/security failure
    pub fn is_security_error(&self) -> bool {
        matches!(self, TlsWireError::Security { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            TlsWireError::Truncated { .. }
            | TlsWireError::LengthMismatch { .. }
            | TlsWireError::MessageTooLarge { .. }
            | TlsWireError::UnknownCode { .. }
            | TlsWireError::UnknownName { .. }
            | TlsWireError::InvalidInput { .. } => "decode",
            TlsWireError::DuplicateCipherSuite { .. } => "registry",
            TlsWireError::Security { .. } => "security",
            TlsWireError::UnexpectedMessage { .. } | TlsWireError::Aborted { .. } => "protocol",
            TlsWireError::Io(_) => "io",
        }
    }
}
