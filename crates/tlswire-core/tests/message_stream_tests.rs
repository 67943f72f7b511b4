//! Decoding several messages back to back from one stream

use std::io::Cursor;

use tlswire_core::{
    ClientFinishedEncrypted, ClientHello, Encrypted, Extension, ExtensionType, Extensions,
    HandshakeMessage, ServerFinishedEncrypted, SignedCertificateTimestampExtension, RANDOM_LEN,
};
use tlswire_types::{ByteReader, CipherSuiteRegistry, TlsWireError, MAX_HANDSHAKE_MESSAGE_LEN};

#[test]
fn test_sct_extension_reencodes_original_bytes() {
    let raw = hex::decode("0012000401020304").unwrap();
    let sct = SignedCertificateTimestampExtension::from_stream(&mut raw.as_slice()).unwrap();
    assert_eq!(sct.extension_type().code(), 0x0012);
    assert_eq!(sct.size_of(), 8);
    assert_eq!(hex::encode(sct.to_bytes()), "0012000401020304");
}

#[test]
fn test_client_finished_encrypted_equivalence() {
    let payload = [0x0Au8, 0x0B, 0x0C, 0x0D];
    let direct = ClientFinishedEncrypted::new(Encrypted::from_slice(&payload));
    let streamed = ClientFinishedEncrypted::from_stream(&mut &payload[..], 4).unwrap();

    assert_eq!(direct.size_of(), 4);
    assert_eq!(direct, streamed);
    assert_eq!(direct.to_bytes(), streamed.to_bytes());
    assert_eq!(hex::encode(streamed.to_bytes()), "0a0b0c0d");
}

#[test]
fn test_truncated_encrypted_stream() {
    let err = ServerFinishedEncrypted::from_stream(&mut &[0x01u8, 0x02, 0x03][..], 12).unwrap_err();
    assert!(err.is_decode_error());
    assert!(matches!(
        err,
        TlsWireError::Truncated {
            expected: 12,
            actual: 3,
            ..
        }
    ));
}

#[test]
fn test_mixed_stream_is_not_over_read() {
    let registry = CipherSuiteRegistry::global();
    let suites = [registry.by_name("TLS_AES_128_GCM_SHA256").unwrap()];

    let mut extensions = Extensions::new();
    extensions
        .push(SignedCertificateTimestampExtension::request().into())
        .unwrap();
    extensions
        .push(Extension::new(ExtensionType::ServerName, b"\x00\x0e\x00\x00\x0bexample.com".to_vec()).unwrap())
        .unwrap();
    let hello = ClientHello::new([0x77; RANDOM_LEN], &suites, extensions);
    let framed = HandshakeMessage::from(hello.clone()).to_framed_bytes().unwrap();

    let mut stream = framed.clone();
    stream.extend_from_slice(&[0xE1; 5]);
    stream.extend_from_slice(&[0xE2; 3]);
    stream.push(0xFF);

    let mut reader = ByteReader::new(Cursor::new(stream.as_slice()));
    match HandshakeMessage::read_plaintext(&mut reader, MAX_HANDSHAKE_MESSAGE_LEN).unwrap() {
        HandshakeMessage::ClientHello(parsed) => {
            assert_eq!(parsed, hello);
            let exts = parsed.extensions.as_ref().unwrap();
            assert!(exts.get(ExtensionType::SignedCertificateTimestamp).is_some());
        }
        other => panic!("expected ClientHello, got {}", other.name()),
    }
    assert_eq!(reader.consumed(), framed.len());

    let first = ServerFinishedEncrypted::from_reader(&mut reader, 5).unwrap();
    let second = ClientFinishedEncrypted::from_reader(&mut reader, 3).unwrap();
    assert_eq!(first.to_bytes(), vec![0xE1; 5]);
    assert_eq!(second.to_bytes(), vec![0xE2; 3]);
    assert_eq!(reader.consumed(), stream.len() - 1);

    let rest = reader.into_inner();
    assert_eq!(rest.position() as usize, stream.len() - 1);
}

#[test]
fn test_extension_sequence_roundtrip() {
    let raw = hex::decode("002b00030203040012000401020304ff0100010000170000").unwrap();
    let mut reader = ByteReader::new(raw.as_slice());
    let mut parsed = Vec::new();
    while reader.consumed() < raw.len() {
        parsed.push(Extension::from_reader(&mut reader).unwrap());
    }

    let types: Vec<_> = parsed.iter().map(Extension::extension_type).collect();
    assert_eq!(
        types,
        vec![
            ExtensionType::SupportedVersions,
            ExtensionType::SignedCertificateTimestamp,
            ExtensionType::RenegotiationInfo,
            ExtensionType::ExtendedMasterSecret,
        ]
    );
    let reencoded: Vec<u8> = parsed.iter().flat_map(Extension::to_bytes).collect();
    assert_eq!(reencoded, raw);
}

#[test]
fn test_oversized_message_rejected_before_body() {
    // header declares 0x100000 bytes, only the header is present
    let raw = [0x01u8, 0x10, 0x00, 0x00];
    let err = HandshakeMessage::read_plaintext(&mut ByteReader::new(&raw[..]), MAX_HANDSHAKE_MESSAGE_LEN)
        .unwrap_err();
    assert!(matches!(err, TlsWireError::MessageTooLarge { .. }));
}
