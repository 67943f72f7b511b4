//! tlswire-dump: print the handshake messages found in a capture
//!
//! ```text
//! tlswire-dump [--hex] <FILE>
//! ```
//!
//! The file holds back-to-back plaintext handshake messages (type, u24
//! length, body), either raw or hex encoded. Hex input is detected
//! automatically; `--hex` forces it.
//!
//! Environment:
//! - `RUST_LOG` filters log output (default `tlswire=info`)
//! - `TLSWIRE_LOG_FORMAT=json` switches logs to JSON
//! - `TLSWIRE_*` engine settings, see `EngineConfig`

use std::env;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tlswire::engine::handshake::{HandshakeHeader, HandshakeType};
use tlswire::engine::key_share::KeyShareEntry;
use tlswire::types::{ByteReader, BytesOrder};
use tlswire::{
    CipherSuiteRegistry, ClientHello, EngineConfig, ExtensionType, Extensions, Finished,
    ServerHello, SignedCertificateTimestampExtension, TlsWireError, TlsWireResult,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Print the TLS handshake messages found in a capture file.
#[derive(Parser, Debug)]
#[command(name = "tlswire-dump")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Treat the input as hex even if it does not look like it.
    #[arg(long)]
    hex: bool,
    /// Capture file of back-to-back handshake messages.
    file: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let config = EngineConfig::from_env();
    match run(&cli.file, cli.hex, &config) {
        Ok(count) => {
            info!(messages = count, "dump complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(
                category = e.category(),
                "failed to decode {}: {}",
                cli.file.display(),
                e
            );
            ExitCode::FAILURE
        }
    }
}

/// Initialize structured logging with configurable levels
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tlswire=info,tlswire_core=info,tlswire_crypto=warn".into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if env::var("TLSWIRE_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.compact())
            .try_init()
    };

    if result.is_err() {
        eprintln!("logging was already initialized");
    }
}

fn load_input(path: &Path, force_hex: bool) -> TlsWireResult<Vec<u8>> {
    let raw = std::fs::read(path)?;
    let text: String = String::from_utf8_lossy(&raw)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let looks_hex = !text.is_empty() && text.chars().all(|c| c.is_ascii_hexdigit());

    if force_hex || looks_hex {
        hex::decode(&text).map_err(|e| TlsWireError::invalid_input("hex input", e.to_string()))
    } else {
        Ok(raw)
    }
}

fn run(path: &Path, force_hex: bool, config: &EngineConfig) -> TlsWireResult<usize> {
    let input = load_input(path, force_hex)?;
    let registry = CipherSuiteRegistry::global();
    let mut reader = ByteReader::new(Cursor::new(input.as_slice()));
    let mut count = 0;

    while reader.consumed() < input.len() {
        let offset = reader.consumed();
        let header = HandshakeHeader::read(&mut reader, config.max_handshake_message_len)?;
        let length = header.length as usize;
        println!("[{offset:>6}] {} ({length} bytes)", header.msg_type);

        match header.msg_type {
            HandshakeType::ClientHello => {
                let hello = ClientHello::from_reader(&mut reader, length)?;
                println!("         version 0x{:04x}", hello.legacy_version);
                for code in &hello.cipher_suites {
                    match registry.by_identifier(*code) {
                        Ok(suite) => println!("         offers {suite}"),
                        Err(_) => println!("         offers unknown 0x{code:04x}"),
                    }
                }
                print_extensions(hello.extensions.as_ref(), false, config.x25519_wire_order);
            }
            HandshakeType::ServerHello => {
                let hello = ServerHello::from_reader(&mut reader, length)?;
                println!("         version 0x{:04x}", hello.legacy_version);
                match hello.selected_suite(registry) {
                    Ok(suite) => println!("         selects {suite}"),
                    Err(_) => println!("         selects unknown 0x{:04x}", hello.cipher_suite),
                }
                print_extensions(hello.extensions.as_ref(), true, config.x25519_wire_order);
            }
            HandshakeType::Finished => {
                let finished = Finished::from_reader(&mut reader, length)?;
                println!("         verify_data {}", hex::encode(finished.verify_data()));
            }
            other => {
                reader.read_bytes(length, "handshake body")?;
                warn!(message = %other, length, "body not decoded");
            }
        }
        count += 1;
    }
    Ok(count)
}

fn print_extensions(extensions: Option<&Extensions>, from_server: bool, key_order: BytesOrder) {
    let Some(extensions) = extensions else {
        println!("         no extensions");
        return;
    };
    for ext in extensions.iter() {
        println!("         extension {} ({} bytes)", ext.extension_type(), ext.length());
        match ext.extension_type() {
            ExtensionType::SignedCertificateTimestamp => {
                match SignedCertificateTimestampExtension::try_from(ext.clone())
                    .and_then(|sct| sct.records())
                {
                    Ok(records) => {
                        for record in records {
                            println!(
                                "           sct v{} log {} at {}",
                                u16::from(record.version) + 1,
                                hex::encode(record.log_id),
                                record.timestamp
                            );
                        }
                    }
                    Err(e) => println!("           undecodable SCT list: {e}"),
                }
            }
            ExtensionType::KeyShare if from_server => {
                match KeyShareEntry::from_server_extension(ext) {
                    Ok(entry) => match entry.x25519_key_in(key_order) {
                        Ok(key) => println!(
                            "           x25519 key {} ({})",
                            hex::encode(key),
                            key_order.as_str()
                        ),
                        Err(_) => println!(
                            "           group 0x{:04x} key {}",
                            entry.group,
                            hex::encode(&entry.key_exchange)
                        ),
                    },
                    Err(e) => println!("           undecodable key share: {e}"),
                }
            }
            ExtensionType::KeyShare => match KeyShareEntry::from_client_extension(ext) {
                Ok(entries) => {
                    for entry in entries {
                        println!(
                            "           group 0x{:04x} ({} byte key)",
                            entry.group,
                            entry.key_exchange.len()
                        );
                    }
                }
                Err(e) => println!("           undecodable key share: {e}"),
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from(["tlswire-dump", "--hex", "capture.hex"]).unwrap();
        assert!(cli.hex);
        assert_eq!(cli.file, PathBuf::from("capture.hex"));

        let cli = Cli::try_parse_from(["tlswire-dump", "capture.bin"]).unwrap();
        assert!(!cli.hex);

        assert!(Cli::try_parse_from(["tlswire-dump"]).is_err());
        assert!(Cli::try_parse_from(["tlswire-dump", "--bogus", "x"]).is_err());
    }
}
