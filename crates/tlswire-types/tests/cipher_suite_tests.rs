//! Registry totality and uniqueness over the built-in suite table

use std::collections::HashSet;

use tlswire_types::cipher_suite::STANDARD_SUITES;
use tlswire_types::{CipherSuite, CipherSuiteRegistry, TlsWireError};

#[test]
fn test_every_suite_reachable_both_ways() {
    let registry = CipherSuiteRegistry::global();
    assert_eq!(registry.len(), STANDARD_SUITES.len());

    for suite in registry.all() {
        assert_eq!(registry.by_identifier(suite.wire_format()).unwrap(), *suite);
        assert_eq!(registry.by_name(suite.as_str()).unwrap(), *suite);
    }
}

#[test]
fn test_identifiers_and_names_unique() {
    let ids: HashSet<u16> = STANDARD_SUITES.iter().map(|s| s.wire_format()).collect();
    let names: HashSet<&str> = STANDARD_SUITES.iter().map(|s| s.as_str()).collect();
    assert_eq!(ids.len(), STANDARD_SUITES.len());
    assert_eq!(names.len(), STANDARD_SUITES.len());
}

#[test]
fn test_all_preserves_definition_order() {
    let codes: Vec<u16> = CipherSuiteRegistry::global()
        .all()
        .iter()
        .take(3)
        .map(|s| s.wire_format())
        .collect();
    assert_eq!(codes, vec![0x1301, 0x1302, 0x1303]);
}

#[test]
fn test_custom_registry_is_independent_of_global() {
    let defs = [
        CipherSuite::define(0x0005, "TLS_RSA_WITH_RC4_128_SHA", true),
        CipherSuite::define(0x000A, "TLS_RSA_WITH_3DES_EDE_CBC_SHA", true),
    ];
    let registry = CipherSuiteRegistry::from_definitions(&defs).unwrap();
    assert_eq!(registry.len(), 2);
    assert!(!registry.contains(0x1301));
    assert!(matches!(
        registry.by_name("TLS_AES_128_GCM_SHA256"),
        Err(TlsWireError::UnknownName { .. })
    ));
}

#[test]
fn test_list_encoding_matches_wire_layout() {
    let registry = CipherSuiteRegistry::global();
    let suites = vec![
        registry.by_name("TLS_RSA_WITH_RC4_128_SHA").unwrap(),
        registry.by_name("TLS_AES_128_GCM_SHA256").unwrap(),
    ];
    let encoded = CipherSuiteRegistry::encode_list(&suites).unwrap();
    assert_eq!(encoded, hex::decode("000400051301").unwrap());
    assert_eq!(registry.decode_list(&encoded[2..]).unwrap(), suites);
}

#[test]
fn test_cipher_suite_serializes_as_name() {
    let suite = CipherSuiteRegistry::global().by_identifier(0x1303).unwrap();
    let json = serde_json::to_string(&suite).unwrap();
    assert_eq!(json, "\"TLS_CHACHA20_POLY1305_SHA256\"");
    let back: CipherSuite = serde_json::from_str(&json).unwrap();
    assert_eq!(back, suite);
    assert!(serde_json::from_str::<CipherSuite>("\"TLS_BOGUS\"").is_err());
}
