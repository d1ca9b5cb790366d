//! Single-connection line framer used by the diarization merger (§4.5).

use std::io::Read;
use std::net::{TcpListener, TcpStream};

use crate::error::MergerError;

/// Observable lifecycle of one [`PortReader`]'s connection. Only the final
/// `Streaming -> Closed` transition is externally visible, via
/// [`PortReader::read_line`] returning the end-of-stream sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    NotOpened,
    Listening,
    Connected,
    Streaming,
    Closed,
}

/// Blocking, single-connection, line-oriented TCP reader.
///
/// Binds a listening socket on loopback, accepts exactly one peer, and reads
/// it one byte at a time so [`PortReader::has_data`]'s peek-based readiness
/// probe stays accurate between calls to `read_line`.
pub struct PortReader {
    port: u16,
    listener: Option<TcpListener>,
    stream: Option<TcpStream>,
    state: ReaderState,
}

impl PortReader {
    pub fn new(port: u16) -> PortReader {
        PortReader {
            port,
            listener: None,
            stream: None,
            state: ReaderState::NotOpened,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Bind `port` and block until exactly one peer connects. The listener
    /// is kept open afterward so later connection attempts queue in the
    /// kernel backlog and are never accepted, matching "subsequent peers are
    /// ignored."
    pub fn open(&mut self) -> Result<(), MergerError> {
        let listener = TcpListener::bind(("127.0.0.1", self.port)).map_err(|source| MergerError::AddressInUse {
            port: self.port,
            source,
        })?;
        self.state = ReaderState::Listening;
        tracing::debug!(port = self.port, "port reader listening");

        let (stream, _addr) = listener.accept()?;
        self.listener = Some(listener);
        self.stream = Some(stream);
        self.state = ReaderState::Connected;
        tracing::debug!(port = self.port, "port reader accepted a peer");
        Ok(())
    }

    /// Nonblocking readiness check: true iff at least one byte is available
    /// to read and the peer has not half-closed the connection.
    pub fn has_data(&mut self) -> Result<bool, MergerError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(false);
        };
        stream.set_nonblocking(true)?;
        let mut probe = [0u8; 1];
        let result = stream.peek(&mut probe);
        stream.set_nonblocking(false)?;

        match result {
            Ok(0) => Ok(false),
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Blocking read up to (and excluding) the next `\n`. Returns `None` (the
    /// end-of-stream sentinel) if the peer closed with an empty
    /// accumulator; returns the partial line if it closed mid-line.
    pub fn read_line(&mut self) -> Result<Option<String>, MergerError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };

        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match stream.read(&mut byte) {
                Ok(0) => {
                    self.state = ReaderState::Closed;
                    if line.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
                }
                Ok(_) => {
                    if byte[0] == b'\n' {
                        self.state = ReaderState::Streaming;
                        return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
                    }
                    line.push(byte[0]);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn close(&mut self) {
        self.stream = None;
        self.listener = None;
        self.state = ReaderState::Closed;
    }
}
