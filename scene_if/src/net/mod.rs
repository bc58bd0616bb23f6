//! # Network Module
//!
//! This module provides the framed JSON-over-TCP transport used between the
//! client and the driving simulator. A message on the wire is a JSON (UTF-8)
//! body followed by the literal 4-byte trailer `|end` - there is no length
//! prefix and no checksum.
//!
//! The framing is delimiter-based for compatibility with the existing
//! simulator: a JSON payload that itself contained the trailer bytes would
//! desynchronise the stream. This is a known wire-format fragility and must
//! not be "fixed" here without breaking the protocol.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The literal byte sequence marking the end of one wire message.
pub const FRAME_TRAILER: &[u8] = b"|end";

/// Size of the chunk read from the socket in one `read` call.
const RECV_CHUNK_SIZE: usize = 4096;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters for the scene socket.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// The address the scene socket binds to, for example `"127.0.0.1:5061"`.
    /// The simulator is the connecting peer.
    pub scene_bind_address: String,
}

/// Accumulates raw bytes from the socket and splits complete frames off the
/// front of the buffer.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buffer: Vec<u8>,
}

/// A TCP socket carrying trailer-delimited JSON frames.
///
/// The socket accepts exactly one inbound connection for the lifetime of the
/// session; there is no reconnection.
pub struct FramedSocket {
    stream: TcpStream,
    buffer: FrameBuffer,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Could not bind to {0}: {1}")]
    BindError(String, std::io::Error),

    #[error("Could not accept the simulator connection: {0}")]
    AcceptError(std::io::Error),

    #[error("The connection was closed by the peer")]
    ConnectionClosed,

    #[error("Could not read from the socket: {0}")]
    ReadError(std::io::Error),

    #[error("Could not write to the socket: {0}")]
    WriteError(std::io::Error),

    #[error("Could not serialize the outgoing message: {0}")]
    SerializeError(serde_json::Error),

    #[error("Could not deserialize the incoming frame: {0}")]
    DeserializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes received from the socket.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Split one complete frame body off the front of the buffer, or `None`
    /// if no trailer has been buffered yet. The remainder is retained for the
    /// next call.
    pub fn take_frame(&mut self) -> Option<Vec<u8>> {
        let pos = self
            .buffer
            .windows(FRAME_TRAILER.len())
            .position(|window| window == FRAME_TRAILER)?;

        let mut remainder = self.buffer.split_off(pos + FRAME_TRAILER.len());
        std::mem::swap(&mut self.buffer, &mut remainder);

        // Remainder now holds the frame plus its trailer
        remainder.truncate(pos);
        Some(remainder)
    }
}

impl FramedSocket {
    /// Bind to `bind_address` and block until the simulator connects.
    ///
    /// The listener is dropped once the single connection has been accepted -
    /// a second peer can never be admitted into the session. Address reuse is
    /// enabled (the standard library sets `SO_REUSEADDR` on Unix listeners).
    pub fn listen(bind_address: &str) -> Result<Self, NetError> {
        let listener = TcpListener::bind(bind_address)
            .map_err(|e| NetError::BindError(bind_address.into(), e))?;

        info!("Waiting for the simulator to connect to {}", bind_address);

        let (stream, peer_address) = listener.accept().map_err(|e| NetError::AcceptError(e))?;

        info!("Simulator connected from {}", peer_address);

        Ok(Self::from_stream(stream))
    }

    /// Wrap an already-connected stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream,
            buffer: FrameBuffer::new(),
        }
    }

    /// Block until a complete frame has been buffered and decode its JSON
    /// body.
    ///
    /// Returns [`NetError::ConnectionClosed`] if a socket read yields zero
    /// bytes before a trailer is found.
    pub fn recv<T: DeserializeOwned>(&mut self) -> Result<T, NetError> {
        let mut chunk = [0u8; RECV_CHUNK_SIZE];

        loop {
            if let Some(frame) = self.buffer.take_frame() {
                return serde_json::from_slice(&frame).map_err(|e| NetError::DeserializeError(e));
            }

            let num_read = self
                .stream
                .read(&mut chunk)
                .map_err(|e| NetError::ReadError(e))?;

            if num_read == 0 {
                return Err(NetError::ConnectionClosed);
            }

            self.buffer.extend(&chunk[..num_read]);
        }
    }

    /// JSON-encode `msg`, append the trailer and write the whole buffer to
    /// the socket (full write or failure).
    pub fn send<T: Serialize>(&mut self, msg: &T) -> Result<(), NetError> {
        let mut bytes = serde_json::to_vec(msg).map_err(|e| NetError::SerializeError(e))?;
        bytes.extend_from_slice(FRAME_TRAILER);

        self.stream
            .write_all(&bytes)
            .map_err(|e| NetError::WriteError(e))
    }

    /// Shut down both directions of the connection.
    ///
    /// Errors are ignored - the peer may already have gone away.
    pub fn close(&mut self) {
        self.stream.shutdown(Shutdown::Both).ok();
        info!("Connection closed");
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
