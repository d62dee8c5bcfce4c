//! TCP connection management.
//!
//! One [`Connection`] owns one socket wrapped in the framing codec. The
//! crypto decision is made at establish time and never changes for the life
//! of the socket. All sends go through the owning task, which serializes
//! them; the receive side is a plain framed stream.

use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info};

use crate::common::error::{ConnectionError, ProtocolError};
use crate::protocol::framing::{CryptoMode, Frame, FrameCodec, OutboundFrame};

/// Resolve a host to its first IPv4 address. Hosts with only AAAA records
/// are rejected; the wire protocol predates IPv6 deployments.
async fn resolve_ipv4(host: &str, port: u16) -> Result<SocketAddr, ConnectionError> {
    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|source| ConnectionError::ConnectFailed {
            host: host.to_string(),
            port,
            source,
        })?;
    addrs
        .into_iter()
        .find(|addr| addr.is_ipv4())
        .ok_or_else(|| ConnectionError::NoIpv4Address {
            host: host.to_string(),
        })
}

pub struct Connection<S = TcpStream> {
    framed: Framed<S, FrameCodec>,
}

impl Connection<TcpStream> {
    /// Resolve, connect and assemble the codec pipeline.
    pub async fn establish(
        host: &str,
        port: u16,
        mode: CryptoMode,
    ) -> Result<Self, ConnectionError> {
        let addr = resolve_ipv4(host, port).await?;
        debug!("Resolved {host} to {addr}");
        let stream =
            TcpStream::connect(addr)
                .await
                .map_err(|source| ConnectionError::ConnectFailed {
                    host: host.to_string(),
                    port,
                    source,
                })?;
        info!("Connected to {addr}");
        Ok(Self::from_stream(stream, mode))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn from_stream(stream: S, mode: CryptoMode) -> Self {
        Self {
            framed: Framed::new(stream, FrameCodec::new(mode)),
        }
    }

    pub async fn send(&mut self, frame: OutboundFrame) -> Result<(), ProtocolError> {
        self.framed.send(frame).await
    }

    pub async fn send_all(&mut self, frames: Vec<OutboundFrame>) -> Result<(), ProtocolError> {
        for frame in frames {
            self.framed.send(frame).await?;
        }
        Ok(())
    }

    /// Next inbound frame. `None` means the remote closed the connection.
    pub async fn next_frame(&mut self) -> Option<Result<Frame, ProtocolError>> {
        self.framed.next().await
    }

    /// Flush and close the writer, releasing the socket.
    pub async fn close(mut self) {
        let _ = self.framed.close().await;
    }
}
