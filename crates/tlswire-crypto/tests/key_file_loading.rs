//! PEM key loading: unreadable vs. malformed files are distinct failures

use std::path::PathBuf;

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use tlswire_crypto::rsa_keys::{modulus_bytes, verify_modulus_match};
use tlswire_crypto::{load_private_key_pem, load_public_key_pem, RsaPrivateKey, RsaPublicKey};
use tlswire_types::{BytesOrder, SecurityErrorType};

struct TempFile(PathBuf);

impl TempFile {
    fn with_contents(name: &str, contents: &[u8]) -> Self {
        let path = std::env::temp_dir().join(format!("tlswire-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        Self(path)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn generated_key() -> RsaPrivateKey {
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    RsaPrivateKey::new(&mut rng, 1024).unwrap()
}

#[test]
fn test_loads_spki_public_and_pkcs1_private_keys() {
    let private = generated_key();
    let public = RsaPublicKey::from(&private);

    let pub_pem = public.to_public_key_pem(LineEnding::LF).unwrap();
    let priv_pem = private.to_pkcs1_pem(LineEnding::LF).unwrap();
    let pub_file = TempFile::with_contents("pub.pem", pub_pem.as_bytes());
    let priv_file = TempFile::with_contents("priv.pem", priv_pem.as_bytes());

    let loaded_public = load_public_key_pem(&pub_file.0).unwrap();
    let loaded_private = load_private_key_pem(&priv_file.0).unwrap();
    assert_eq!(loaded_public, public);
    assert_eq!(RsaPublicKey::from(&loaded_private), public);

    let raw = modulus_bytes(&public, BytesOrder::LittleEndian);
    assert!(verify_modulus_match(&raw, BytesOrder::LittleEndian, &loaded_public));
}

#[test]
fn test_invalid_pem_is_malformed_and_names_path() {
    let file = TempFile::with_contents(
        "bad-pub.pem",
        b"-----BEGIN PUBLIC KEY-----\nthis is not base64!!\n-----END PUBLIC KEY-----\n",
    );

    let err = load_public_key_pem(&file.0).unwrap_err();
    assert!(err.is_security_error());
    assert_eq!(err.security_type(), Some(SecurityErrorType::KeyFileMalformed));
    let message = err.to_string();
    assert!(message.contains(&file.0.display().to_string()), "{message}");
    assert!(message.contains("cannot parse"), "{message}");
}

#[test]
fn test_missing_file_is_unreadable_and_names_path() {
    let path = std::env::temp_dir().join("tlswire-definitely-missing-key.pem");
    let err = load_public_key_pem(&path).unwrap_err();
    assert_eq!(err.security_type(), Some(SecurityErrorType::KeyFileUnreadable));
    let message = err.to_string();
    assert!(message.contains(&path.display().to_string()), "{message}");
    assert!(message.contains("cannot read"), "{message}");
}

#[test]
fn test_binary_file_is_malformed_not_unreadable() {
    let file = TempFile::with_contents("binary.pem", &[0xFF, 0xFE, 0x00, 0x80]);
    let err = load_private_key_pem(&file.0).unwrap_err();
    assert_eq!(err.security_type(), Some(SecurityErrorType::KeyFileMalformed));
}
