//! Byte order selection for large unsigned integers
//!
//! Curve coordinates and RSA moduli travel as fixed-width unsigned integers.
//! Standard key encodings write them big-endian (the "mathematical" form) while
//! X25519 puts them on the wire little-endian. `BytesOrder` names which form a
//! given byte slice is in; nothing here guesses.

use serde::{Deserialize, Serialize};

use crate::{TlsWireError, TlsWireResult};

/// Byte order of an encoded unsigned integer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BytesOrder {
    /// Most significant byte first
    BigEndian,
    /// Least significant byte first
    #[default]
    LittleEndian,
}

impl BytesOrder {
    /// The other order
    pub fn reversed(self) -> Self {
        match self {
            BytesOrder::BigEndian => BytesOrder::LittleEndian,
            BytesOrder::LittleEndian => BytesOrder::BigEndian,
        }
    }

    /// Get human-readable string
    pub fn as_str(&self) -> &'static str {
        match self {
            BytesOrder::BigEndian => "big",
            BytesOrder::LittleEndian => "little",
        }
    }

    /// Parse the `big`/`little` configuration spelling
    pub fn from_name(name: &str) -> TlsWireResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "big" | "big_endian" | "be" => Ok(BytesOrder::BigEndian),
            "little" | "little_endian" | "le" => Ok(BytesOrder::LittleEndian),
            _ => Err(TlsWireError::UnknownName {
                vocabulary: "byte order",
                name: name.to_string(),
            }),
        }
    }

    /// Re-encode `bytes` from `self` into `to`
    pub fn convert(self, bytes: &[u8], to: BytesOrder) -> Vec<u8> {
        let mut out = bytes.to_vec();
        if self != to {
            out.reverse();
        }
        out
    }

    /// Normalize an encoded unsigned integer to exactly `width` bytes.
    ///
    /// Zero bytes on the most significant side are insignificant and may be
    /// dropped (a sign byte produced by a signed big-integer encoder) or
    /// added (a short encoding). If the magnitude needs more than `width`
    /// bytes the value does not fit and is rejected rather than truncated.
    pub fn normalize(self, bytes: &[u8], width: usize) -> TlsWireResult<Vec<u8>> {
        let significant = match self {
            BytesOrder::BigEndian => {
                let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
                &bytes[first..]
            }
            BytesOrder::LittleEndian => {
                let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
                &bytes[..end]
            }
        };

        if significant.len() > width {
            return Err(TlsWireError::MessageTooLarge {
                context: "unsigned integer",
                declared: significant.len(),
                limit: width,
            });
        }

        let mut out = vec![0u8; width];
        match self {
            BytesOrder::BigEndian => out[width - significant.len()..].copy_from_slice(significant),
            BytesOrder::LittleEndian => out[..significant.len()].copy_from_slice(significant),
        }
        Ok(out)
    }

    /// Normalize to `width` bytes in `self` order and return them in `to` order
    pub fn normalize_into(self, bytes: &[u8], width: usize, to: BytesOrder) -> TlsWireResult<Vec<u8>> {
        let normalized = self.normalize(bytes, width)?;
        Ok(self.convert(&normalized, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_reverses_only_across_orders() {
        let be = [0x01, 0x02, 0x03];
        assert_eq!(BytesOrder::BigEndian.convert(&be, BytesOrder::LittleEndian), vec![3, 2, 1]);
        assert_eq!(BytesOrder::BigEndian.convert(&be, BytesOrder::BigEndian), vec![1, 2, 3]);
    }

    #[test]
    fn test_normalize_pads_on_significant_side() {
        assert_eq!(
            BytesOrder::BigEndian.normalize(&[0xAB, 0xCD], 4).unwrap(),
            vec![0x00, 0x00, 0xAB, 0xCD]
        );
        assert_eq!(
            BytesOrder::LittleEndian.normalize(&[0xCD, 0xAB], 4).unwrap(),
            vec![0xCD, 0xAB, 0x00, 0x00]
        );
    }

    #[test]
    fn test_normalize_strips_sign_byte() {
        let mut with_sign = vec![0x00];
        with_sign.extend_from_slice(&[0xFF; 4]);
        assert_eq!(BytesOrder::BigEndian.normalize(&with_sign, 4).unwrap(), vec![0xFF; 4]);
    }

    #[test]
    fn test_normalize_rejects_overflow() {
        let err = BytesOrder::BigEndian.normalize(&[0x01, 0x00, 0x00, 0x00, 0x00], 4).unwrap_err();
        assert!(err.is_decode_error());
        // 0x01 is the most significant byte in little-endian here
        assert!(BytesOrder::LittleEndian.normalize(&[0, 0, 0, 0, 1], 4).is_err());
        assert!(BytesOrder::LittleEndian.normalize(&[1, 0, 0, 0, 0], 4).is_ok());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(BytesOrder::from_name("BIG").unwrap(), BytesOrder::BigEndian);
        assert_eq!(BytesOrder::from_name(" little ").unwrap(), BytesOrder::LittleEndian);
        assert!(BytesOrder::from_name("middle").is_err());
    }
}
