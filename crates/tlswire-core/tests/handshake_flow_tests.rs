//! Client handshake driven over a byte stream, with X25519 key shares

use std::io::Cursor;

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tlswire_core::{
    ClientFinishedEncrypted, ClientHello, EngineConfig, Extensions, Finished, HandshakeMessage,
    HandshakeSequencer, HandshakeState, KeyShareEntry, ServerHello, GROUP_X25519, RANDOM_LEN,
};
use tlswire_crypto::{KeyExchangeHandler, X25519Handler};
use tlswire_types::{BytesOrder, ByteReader, CipherSuiteRegistry, TlsWireError};

#[test]
fn test_full_handshake_over_stream() {
    let registry = CipherSuiteRegistry::global();
    // the application keeps keys big-endian; the wire stays little-endian
    let config = EngineConfig {
        x25519_wire_order: BytesOrder::BigEndian,
        ..EngineConfig::default()
    };
    let order = config.x25519_wire_order;
    let offered = config.resolve_cipher_suites(registry).unwrap();

    let mut client_kx = X25519Handler::with_rng(ChaCha20Rng::seed_from_u64(10));
    let mut server_kx = X25519Handler::with_rng(ChaCha20Rng::seed_from_u64(20));
    let client_pair = client_kx.generate_key_pair().unwrap();
    let server_pair = server_kx.generate_key_pair().unwrap();

    // client side
    let share =
        KeyShareEntry::x25519(&client_kx.public_key_bytes(client_pair.public_key(), order), order)
            .unwrap();
    assert_eq!(
        share.key_exchange,
        client_kx.public_key_bytes(client_pair.public_key(), BytesOrder::LittleEndian)
    );
    let mut client_exts = Extensions::new();
    client_exts
        .push(KeyShareEntry::to_client_extension(&[share]).unwrap())
        .unwrap();
    let client_hello = ClientHello::new([0xC1; RANDOM_LEN], &offered, client_exts);
    let mut sequencer = HandshakeSequencer::with_config(&client_hello, registry, &config);

    // server side: pick a suite, answer with its own share
    let received = HandshakeMessage::read_plaintext_from(
        &mut HandshakeMessage::from(client_hello.clone())
            .to_framed_bytes()
            .unwrap()
            .as_slice(),
        config.max_handshake_message_len,
    )
    .unwrap();
    let HandshakeMessage::ClientHello(received) = received else {
        panic!("server expected a ClientHello");
    };
    let chosen = CipherSuiteRegistry::negotiate(&received.offered_suites(registry), &offered[1..]).unwrap();
    let client_share = &received.key_shares().unwrap()[0];
    let client_pub = server_kx
        .public_key_from(&client_share.x25519_key_in(order).unwrap(), order)
        .unwrap();
    let server_secret = server_kx
        .shared_secret(server_pair.private_key(), &client_pub)
        .unwrap();

    let mut server_exts = Extensions::new();
    server_exts
        .push(
            KeyShareEntry::x25519(&server_kx.public_key_bytes(server_pair.public_key(), order), order)
                .unwrap()
                .to_server_extension()
            .unwrap(),
        )
        .unwrap();
    let server_hello = ServerHello::new([0x5E; RANDOM_LEN], chosen, server_exts);

    let mut flight = HandshakeMessage::from(server_hello).to_framed_bytes().unwrap();
    flight.extend_from_slice(&[0xAA; 40]); // encrypted extensions
    flight.extend_from_slice(&[0xBB; 32]); // server finished

    // client consumes the server flight
    let mut reader = ByteReader::new(Cursor::new(flight.as_slice()));
    let hello = sequencer.read_server_hello(&mut reader).unwrap();
    assert_eq!(sequencer.negotiated_suite(), Some(chosen));

    let server_share = hello.key_share().unwrap().unwrap();
    assert_eq!(server_share.group, GROUP_X25519);
    let server_pub = client_kx
        .public_key_from(&server_share.x25519_key_in(order).unwrap(), order)
        .unwrap();
    let client_secret = client_kx
        .shared_secret(client_pair.private_key(), &server_pub)
        .unwrap();
    assert_eq!(client_secret, server_secret);

    let ee = sequencer.read_encrypted_handshake(&mut reader, 40).unwrap();
    assert_eq!(ee.size_of(), 40);
    assert_eq!(sequencer.state(), HandshakeState::AwaitingServerFinished);

    let finished = sequencer.read_server_finished(&mut reader, 32).unwrap();
    assert_eq!(finished.to_bytes(), vec![0xBB; 32]);
    assert_eq!(sequencer.state(), HandshakeState::AwaitingClientFinishedSent);
    assert_eq!(reader.consumed(), flight.len());

    sequencer
        .on_client_finished_sent(&ClientFinishedEncrypted::from_slice(&[0xCC; 32]))
        .unwrap();
    assert!(sequencer.is_established());
    assert_eq!(sequencer.messages_seen(), 4);
}

#[test]
fn test_unexpected_message_in_server_flight_aborts() {
    let registry = CipherSuiteRegistry::global();
    let suite = registry.by_name("TLS_AES_128_GCM_SHA256").unwrap();
    let hello = ClientHello::new([1; RANDOM_LEN], &[suite], Extensions::new());
    let mut sequencer = HandshakeSequencer::new(&hello, registry);

    // a Finished where the ServerHello belongs
    let flight = [0x14u8, 0x00, 0x00, 0x02, 0x01, 0x02];
    let err = sequencer
        .read_server_hello(&mut ByteReader::new(&flight[..]))
        .unwrap_err();
    assert!(matches!(
        err,
        TlsWireError::UnexpectedMessage {
            message: "Finished",
            ..
        }
    ));
    assert_eq!(sequencer.state(), HandshakeState::Aborted);
}

#[test]
fn test_malformed_server_hello_aborts() {
    let registry = CipherSuiteRegistry::global();
    let suite = registry.by_name("TLS_AES_128_GCM_SHA256").unwrap();
    let hello = ClientHello::new([1; RANDOM_LEN], &[suite], Extensions::new());
    let mut sequencer = HandshakeSequencer::new(&hello, registry);

    // declares 38 bytes, carries 4
    let flight = [0x02u8, 0x00, 0x00, 0x26, 0x03, 0x03, 0x00, 0x00];
    let err = sequencer
        .read_server_hello(&mut ByteReader::new(&flight[..]))
        .unwrap_err();
    assert!(matches!(err, TlsWireError::Truncated { .. }));
    assert_eq!(sequencer.state(), HandshakeState::Aborted);
    assert!(sequencer.abort_reason().unwrap().starts_with("decode error"));
}

#[test]
fn test_decrypted_finished_verifies() {
    let verify_data = [0x42u8; 12];
    let framed = HandshakeMessage::from(Finished::new(&verify_data).unwrap())
        .to_framed_bytes()
        .unwrap();
    assert_eq!(&framed[..4], &[0x14, 0x00, 0x00, 0x0c]);

    let HandshakeMessage::Finished(finished) =
        HandshakeMessage::read_plaintext_from(&mut framed.as_slice(), 1024).unwrap()
    else {
        panic!("expected Finished");
    };
    assert!(finished.verify(&verify_data).is_ok());
    assert!(finished.verify(&[0u8; 12]).is_err());
}
