//! Client-side handshake sequencing
//!
//! ```text
//! AwaitingServerHello --ServerHello--> AwaitingServerFinished
//! AwaitingServerFinished --EncryptedHandshake--> AwaitingServerFinished
//! AwaitingServerFinished --ServerFinishedEncrypted--> AwaitingClientFinishedSent
//! AwaitingClientFinishedSent --ClientFinishedEncrypted sent--> Established
//! any --error--> Aborted
//! ```
//!
//! Any error while in a state (decode failure, message out of order, suite
//! not offered) is fatal: the sequencer moves to `Aborted` and refuses every
//! later input.

use std::io::Read;

use serde::Serialize;
use tlswire_types::{ByteReader, CipherSuite, CipherSuiteRegistry, TlsWireError, TlsWireResult};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::encrypted::{ClientFinishedEncrypted, EncryptedHandshake, ServerFinishedEncrypted};
use crate::handshake::HandshakeMessage;
use crate::hello::{ClientHello, ServerHello};

/// Handshake progress as seen by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandshakeState {
    /// ClientHello sent, waiting for the server's reply
    AwaitingServerHello,
    /// ServerHello accepted, reading until the server's Finished
    AwaitingServerFinished,
    /// Server Finished received, client Finished not yet sent
    AwaitingClientFinishedSent,
    /// Both Finished messages exchanged
    Established,
    /// A fatal error ended the handshake
    Aborted,
}

impl HandshakeState {
    /// State name as used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeState::AwaitingServerHello => "AWAITING_SERVER_HELLO",
            HandshakeState::AwaitingServerFinished => "AWAITING_SERVER_FINISHED",
            HandshakeState::AwaitingClientFinishedSent => "AWAITING_CLIENT_FINISHED_SENT",
            HandshakeState::Established => "ESTABLISHED",
            HandshakeState::Aborted => "ABORTED",
        }
    }
}

impl core::fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives one client handshake from "ClientHello sent" to established
#[derive(Debug)]
pub struct HandshakeSequencer {
    state: HandshakeState,
    offered: Vec<CipherSuite>,
    negotiated: Option<CipherSuite>,
    abort_reason: Option<String>,
    max_message_len: usize,
    messages_seen: usize,
}

impl HandshakeSequencer {
    /// Sequencer for a ClientHello that has just been sent
    pub fn new(client_hello: &ClientHello, registry: &CipherSuiteRegistry) -> Self {
        Self::with_config(client_hello, registry, &EngineConfig::default())
    }

    /// Same as [`Self::new`] with limits taken from `config`
    pub fn with_config(
        client_hello: &ClientHello,
        registry: &CipherSuiteRegistry,
        config: &EngineConfig,
    ) -> Self {
        let offered = client_hello.offered_suites(registry);
        debug!(offered = offered.len(), "handshake sequencer started");
        Self {
            state: HandshakeState::AwaitingServerHello,
            offered,
            negotiated: None,
            abort_reason: None,
            max_message_len: config.max_handshake_message_len,
            messages_seen: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Suite chosen by the server, once ServerHello is accepted
    pub fn negotiated_suite(&self) -> Option<CipherSuite> {
        self.negotiated
    }

    /// Why the handshake aborted, if it did
    pub fn abort_reason(&self) -> Option<&str> {
        self.abort_reason.as_deref()
    }

    /// Whether both Finished messages have been exchanged
    pub fn is_established(&self) -> bool {
        self.state == HandshakeState::Established
    }

    /// Messages accepted so far
    pub fn messages_seen(&self) -> usize {
        self.messages_seen
    }

    /// Read a framed plaintext ServerHello from `reader` and accept it
    pub fn read_server_hello<R: Read>(
        &mut self,
        reader: &mut ByteReader<R>,
    ) -> TlsWireResult<ServerHello> {
        let max_len = self.max_message_len;
        self.step(|seq| {
            seq.expect_state(HandshakeState::AwaitingServerHello, "ServerHello")?;
            match HandshakeMessage::read_plaintext(reader, max_len)? {
                HandshakeMessage::ServerHello(hello) => {
                    seq.accept_server_hello(&hello)?;
                    Ok(hello)
                }
                other => Err(TlsWireError::UnexpectedMessage {
                    state: seq.state.as_str(),
                    message: other.name(),
                }),
            }
        })
    }

    /// Accept an already decoded ServerHello; returns the negotiated suite
    pub fn on_server_hello(&mut self, hello: &ServerHello) -> TlsWireResult<CipherSuite> {
        self.step(|seq| {
            seq.expect_state(HandshakeState::AwaitingServerHello, "ServerHello")?;
            seq.accept_server_hello(hello)
        })
    }

    fn accept_server_hello(&mut self, hello: &ServerHello) -> TlsWireResult<CipherSuite> {
        let suite = self
            .offered
            .iter()
            .find(|s| s.wire_format() == hello.cipher_suite)
            .copied()
            .ok_or_else(|| {
                TlsWireError::invalid_input(
                    "server hello",
                    format!("server selected 0x{:04x}, which was not offered", hello.cipher_suite),
                )
            })?;
        self.negotiated = Some(suite);
        self.transition(HandshakeState::AwaitingServerFinished);
        info!(suite = %suite, "server hello accepted");
        Ok(suite)
    }

    /// Read a protected handshake message of `length` bytes that precedes
    /// the server Finished (certificate, extensions and the like)
    pub fn read_encrypted_handshake<R: Read>(
        &mut self,
        reader: &mut ByteReader<R>,
        length: usize,
    ) -> TlsWireResult<EncryptedHandshake> {
        self.step(|seq| {
            seq.expect_state(HandshakeState::AwaitingServerFinished, "EncryptedHandshake")?;
            seq.check_length(length)?;
            let message = EncryptedHandshake::from_reader(reader, length)?;
            seq.messages_seen += 1;
            debug!(length, "encrypted handshake message before server finished");
            Ok(message)
        })
    }

    /// Read the protected server Finished of `length` bytes and accept it
    pub fn read_server_finished<R: Read>(
        &mut self,
        reader: &mut ByteReader<R>,
        length: usize,
    ) -> TlsWireResult<ServerFinishedEncrypted> {
        self.step(|seq| {
            seq.expect_state(HandshakeState::AwaitingServerFinished, "ServerFinishedEncrypted")?;
            seq.check_length(length)?;
            let finished = ServerFinishedEncrypted::from_reader(reader, length)?;
            seq.accept_server_finished(&finished);
            Ok(finished)
        })
    }

    /// Accept an already read server Finished
    pub fn on_server_finished(&mut self, finished: &ServerFinishedEncrypted) -> TlsWireResult<()> {
        self.step(|seq| {
            seq.expect_state(HandshakeState::AwaitingServerFinished, "ServerFinishedEncrypted")?;
            seq.check_length(finished.size_of())?;
            seq.accept_server_finished(finished);
            Ok(())
        })
    }

    fn accept_server_finished(&mut self, finished: &ServerFinishedEncrypted) {
        self.transition(HandshakeState::AwaitingClientFinishedSent);
        info!(len = finished.size_of(), "server finished received");
    }

    /// Record that the client Finished was sent
    pub fn on_client_finished_sent(
        &mut self,
        finished: &ClientFinishedEncrypted,
    ) -> TlsWireResult<()> {
        self.step(|seq| {
            seq.expect_state(
                HandshakeState::AwaitingClientFinishedSent,
                "ClientFinishedEncrypted",
            )?;
            seq.transition(HandshakeState::Established);
            info!(
                len = finished.size_of(),
                suite = ?seq.negotiated.map(|s| s.as_str()),
                "handshake established"
            );
            Ok(())
        })
    }

    /// Abort the handshake; later inputs fail with `Aborted`
    pub fn abort(&mut self, reason: impl Into<String>) {
        if self.state == HandshakeState::Aborted {
            return;
        }
        let reason = reason.into();
        warn!(state = %self.state, reason = %reason, "handshake aborted");
        self.state = HandshakeState::Aborted;
        self.abort_reason = Some(reason);
    }

    fn step<T>(&mut self, f: impl FnOnce(&mut Self) -> TlsWireResult<T>) -> TlsWireResult<T> {
        if self.state == HandshakeState::Aborted {
            return Err(TlsWireError::Aborted {
                reason: self.abort_reason.clone().unwrap_or_default(),
            });
        }
        let result = f(self);
        if let Err(e) = &result {
            self.abort(format!("{} error: {e}", e.category()));
        }
        result
    }

    fn expect_state(&self, expected: HandshakeState, message: &'static str) -> TlsWireResult<()> {
        if self.state != expected {
            return Err(TlsWireError::UnexpectedMessage {
                state: self.state.as_str(),
                message,
            });
        }
        Ok(())
    }

    fn check_length(&self, length: usize) -> TlsWireResult<()> {
        if length > self.max_message_len {
            return Err(TlsWireError::MessageTooLarge {
                context: "handshake message",
                declared: length,
                limit: self.max_message_len,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: HandshakeState) {
        debug!(from = %self.state, to = %next, "handshake state transition");
        self.state = next;
        self.messages_seen += 1;
    }
}
