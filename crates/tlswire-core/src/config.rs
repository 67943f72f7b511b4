//! Engine configuration
//!
//! Defaults are usable as-is. Overrides come from JSON or from environment
//! variables:
//!
//! | variable | field |
//! |---|---|
//! | `TLSWIRE_CIPHER_SUITES` | `cipher_suites` (comma separated names) |
//! | `TLSWIRE_ALLOW_LEGACY_SUITES` | `allow_legacy_suites` (`true`/`false`/`1`/`0`) |
//! | `TLSWIRE_X25519_WIRE_ORDER` | `x25519_wire_order` (`big`/`little`) |
//! | `TLSWIRE_MAX_HANDSHAKE_MESSAGE_LEN` | `max_handshake_message_len` |

use std::env;

use serde::{Deserialize, Serialize};
use tlswire_types::codec::U24_MAX;
use tlswire_types::{
    BytesOrder, CipherSuite, CipherSuiteRegistry, SecurityErrorType, TlsWireError, TlsWireResult,
    MAX_HANDSHAKE_MESSAGE_LEN,
};
use tracing::{info, warn};

/// Settings shared by the codec and the sequencer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Suites to offer, by IANA name, in preference order. Empty means every
    /// registered suite allowed by `allow_legacy_suites`.
    pub cipher_suites: Vec<String>,
    /// Whether legacy (non-AEAD or non-forward-secret) suites may be used
    pub allow_legacy_suites: bool,
    /// Byte order X25519 keys are exchanged in with the embedding application
    pub x25519_wire_order: BytesOrder,
    /// Largest handshake message body accepted
    pub max_handshake_message_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cipher_suites: Vec::new(),
            allow_legacy_suites: false,
            x25519_wire_order: BytesOrder::LittleEndian,
            max_handshake_message_len: MAX_HANDSHAKE_MESSAGE_LEN,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> TlsWireResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TlsWireError::invalid_input("engine config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `TLSWIRE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden through `lookup`. Invalid values are logged and
    /// ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(list) = lookup("TLSWIRE_CIPHER_SUITES") {
            config.cipher_suites = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(flag) = lookup("TLSWIRE_ALLOW_LEGACY_SUITES") {
            match parse_flag(&flag) {
                Some(allow) => config.allow_legacy_suites = allow,
                None => warn!(
                    "Invalid TLSWIRE_ALLOW_LEGACY_SUITES '{}', using {}",
                    flag, config.allow_legacy_suites
                ),
            }
        }

        if let Some(order) = lookup("TLSWIRE_X25519_WIRE_ORDER") {
            match BytesOrder::from_name(&order) {
                Ok(order) => config.x25519_wire_order = order,
                Err(e) => warn!(
                    "Invalid TLSWIRE_X25519_WIRE_ORDER '{}': {}, using {}",
                    order,
                    e,
                    config.x25519_wire_order.as_str()
                ),
            }
        }

        if let Some(len_str) = lookup("TLSWIRE_MAX_HANDSHAKE_MESSAGE_LEN") {
            match len_str.parse::<usize>() {
                Ok(len) if (1..=U24_MAX).contains(&len) => {
                    config.max_handshake_message_len = len;
                }
                Ok(len) => warn!(
                    "Invalid max handshake message length '{}', using default {}",
                    len, config.max_handshake_message_len
                ),
                Err(e) => warn!(
                    "Failed to parse TLSWIRE_MAX_HANDSHAKE_MESSAGE_LEN '{}': {}",
                    len_str, e
                ),
            }
        }

        info!(
            suites = config.cipher_suites.len(),
            allow_legacy = config.allow_legacy_suites,
            x25519_order = config.x25519_wire_order.as_str(),
            max_message_len = config.max_handshake_message_len,
            "engine configuration loaded"
        );
        config
    }

    /// Check values the type system does not
    pub fn validate(&self) -> TlsWireResult<()> {
        if self.max_handshake_message_len == 0 || self.max_handshake_message_len > U24_MAX {
            return Err(TlsWireError::invalid_input(
                "max_handshake_message_len",
                format!("must be between 1 and {U24_MAX}"),
            ));
        }
        Ok(())
    }

    /// Suites to offer, resolved against `registry`.
    ///
    /// Unknown names fail with `UnknownName`. Legacy suites are dropped when
    /// not allowed; if nothing remains the result is `NoCommonCipherSuite`.
    pub fn resolve_cipher_suites(
        &self,
        registry: &CipherSuiteRegistry,
    ) -> TlsWireResult<Vec<CipherSuite>> {
        let candidates = if self.cipher_suites.is_empty() {
            registry.all().to_vec()
        } else {
            self.cipher_suites
                .iter()
                .map(|name| registry.by_name(name))
                .collect::<TlsWireResult<Vec<_>>>()?
        };

        let suites: Vec<CipherSuite> = candidates
            .into_iter()
            .filter(|suite| {
                let keep = self.allow_legacy_suites || !suite.is_legacy();
                if !keep && !self.cipher_suites.is_empty() {
                    warn!(suite = %suite, "dropping legacy suite, allow_legacy_suites is off");
                }
                keep
            })
            .collect();

        if suites.is_empty() {
            return Err(TlsWireError::security(
                SecurityErrorType::NoCommonCipherSuite,
                "configuration enables no cipher suites",
            ));
        }
        Ok(suites)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" => Some(true),
        "0" => Some(false),
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.cipher_suites.is_empty());
        assert!(!config.allow_legacy_suites);
        assert_eq!(config.x25519_wire_order, BytesOrder::LittleEndian);
        assert_eq!(config.max_handshake_message_len, 64 * 1024);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("TLSWIRE_CIPHER_SUITES", "TLS_AES_256_GCM_SHA384, TLS_AES_128_GCM_SHA256"),
            ("TLSWIRE_ALLOW_LEGACY_SUITES", "TRUE"),
            ("TLSWIRE_X25519_WIRE_ORDER", "big"),
            ("TLSWIRE_MAX_HANDSHAKE_MESSAGE_LEN", "4096"),
        ]));
        assert_eq!(
            config.cipher_suites,
            vec!["TLS_AES_256_GCM_SHA384", "TLS_AES_128_GCM_SHA256"]
        );
        assert!(config.allow_legacy_suites);
        assert_eq!(config.x25519_wire_order, BytesOrder::BigEndian);
        assert_eq!(config.max_handshake_message_len, 4096);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("TLSWIRE_X25519_WIRE_ORDER", "middle"),
            ("TLSWIRE_MAX_HANDSHAKE_MESSAGE_LEN", "0"),
        ]));
        assert_eq!(config, EngineConfig::default());

        let config =
            EngineConfig::from_lookup(lookup(&[("TLSWIRE_MAX_HANDSHAKE_MESSAGE_LEN", "lots")]));
        assert_eq!(config.max_handshake_message_len, MAX_HANDSHAKE_MESSAGE_LEN);
    }

    #[test]
    fn test_legacy_flag_values() {
        let allow = |v: &str| {
            EngineConfig::from_lookup(lookup(&[("TLSWIRE_ALLOW_LEGACY_SUITES", v)])).allow_legacy_suites
        };
        assert!(allow("1"));
        assert!(allow(" True "));
        assert!(!allow("0"));
        assert!(!allow("FALSE"));
        // unrecognised values keep the default
        assert!(!allow("yes please"));
        assert_eq!(parse_flag("yes please"), None);
        assert_eq!(parse_flag("false"), Some(false));
    }

    #[test]
    fn test_from_json() {
        let config = EngineConfig::from_json_str(
            r#"{"allow_legacy_suites": true, "x25519_wire_order": "big_endian"}"#,
        )
        .unwrap();
        assert!(config.allow_legacy_suites);
        assert_eq!(config.x25519_wire_order, BytesOrder::BigEndian);
        assert_eq!(config.max_handshake_message_len, MAX_HANDSHAKE_MESSAGE_LEN);

        assert!(EngineConfig::from_json_str(r#"{"max_handshake_message_len": 0}"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{"surprise": 1}"#).is_err());
    }

    #[test]
    fn test_resolve_cipher_suites() {
        let registry = CipherSuiteRegistry::global();

        let all_modern = EngineConfig::default().resolve_cipher_suites(registry).unwrap();
        assert!(!all_modern.is_empty());
        assert!(all_modern.iter().all(|s| !s.is_legacy()));

        let config = EngineConfig {
            cipher_suites: vec!["TLS_RSA_WITH_RC4_128_SHA".into(), "TLS_AES_128_GCM_SHA256".into()],
            ..EngineConfig::default()
        };
        let suites = config.resolve_cipher_suites(registry).unwrap();
        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].as_str(), "TLS_AES_128_GCM_SHA256");

        let legacy_only = EngineConfig {
            cipher_suites: vec!["TLS_RSA_WITH_RC4_128_SHA".into()],
            ..EngineConfig::default()
        };
        let err = legacy_only.resolve_cipher_suites(registry).unwrap_err();
        assert_eq!(err.security_type(), Some(SecurityErrorType::NoCommonCipherSuite));

        let unknown = EngineConfig {
            cipher_suites: vec!["TLS_NOPE".into()],
            ..EngineConfig::default()
        };
        assert!(matches!(
            unknown.resolve_cipher_suites(registry),
            Err(TlsWireError::UnknownName { .. })
        ));
    }
}
