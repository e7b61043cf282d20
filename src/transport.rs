//! UDP transport for finished tapes.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_TERMINATOR: &str = ";\n";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("tape contains non-ASCII characters")]
    NonAscii,

    #[error("could not resolve {host}:{port}")]
    Resolve { host: String, port: u16 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Sends tapes as single ASCII datagrams to a fixed address
pub struct TapeSender {
    socket: UdpSocket,
    target: SocketAddr,
    terminator: String,
}

impl TapeSender {
    /// Bind an ephemeral local socket for sending to `host:port`
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let target = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| TransportError::Resolve {
                host: host.to_string(),
                port,
            })?;

        let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)?;

        Ok(TapeSender {
            socket,
            target,
            terminator: DEFAULT_TERMINATOR.to_string(),
        })
    }

    pub fn with_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// The datagram that would be sent for `tape`
    pub fn payload(&self, tape: &str) -> Result<Vec<u8>> {
        let message = format!("{}{}", tape, self.terminator);
        if !message.is_ascii() {
            return Err(TransportError::NonAscii);
        }
        Ok(message.into_bytes())
    }

    /// Send `tape` followed by the terminator, returning the bytes sent
    pub fn send(&self, tape: &str) -> Result<usize> {
        let payload = self.payload(tape)?;
        let sent = self.socket.send_to(&payload, self.target)?;
        info!("sent {} bytes to {}", sent, self.target);
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_payload_appends_terminator() {
        let sender = TapeSender::new("127.0.0.1", 9).unwrap();
        assert_eq!(sender.payload("1 - 2").unwrap(), b"1 - 2;\n".to_vec());

        let sender = sender.with_terminator("\n");
        assert_eq!(sender.payload("60").unwrap(), b"60\n".to_vec());
    }

    #[test]
    fn test_non_ascii_rejected() {
        let sender = TapeSender::new("127.0.0.1", 9).unwrap();
        assert!(matches!(sender.payload("1 – 2"), Err(TransportError::NonAscii)));
        assert!(matches!(sender.send("♪"), Err(TransportError::NonAscii)));
    }

    #[test]
    fn test_send_over_loopback() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();

        let sender = TapeSender::new("127.0.0.1", port).unwrap();
        let sent = sender.send("1 - 1 - 1 - - -").unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(len, sent);
        assert_eq!(&buf[..len], b"1 - 1 - 1 - - -;\n");
    }
}
