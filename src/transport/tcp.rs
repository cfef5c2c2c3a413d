//! TCP transport implementation for WiFi and Ethernet networks

use crate::transport::traits::{NetworkInterface, TransportStream};
use anyhow::Result;
use async_trait::async_trait;
use demo_runner_shared::{Credentials, NetworkType, ServerInfo};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tracing::debug;

/// TCP stream wrapper implementing TransportStream
pub struct TcpTransportStream {
    inner: TcpStream,
}

impl TcpTransportStream {
    pub fn new(stream: TcpStream) -> Self {
        Self { inner: stream }
    }
}

impl AsyncRead for TcpTransportStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for TcpTransportStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

#[async_trait]
impl TransportStream for TcpTransportStream {
    async fn shutdown(&mut self) -> Result<()> {
        tokio::io::AsyncWriteExt::shutdown(&mut self.inner).await?;
        Ok(())
    }
}

/// TCP interface connecting straight to the server address
pub struct TcpInterface {
    network: NetworkType,
    name: &'static str,
}

impl TcpInterface {
    /// Create a TCP interface for the WiFi network
    pub fn wifi() -> Self {
        Self {
            network: NetworkType::Wifi,
            name: "WiFi",
        }
    }

    /// Create a TCP interface for the wired network
    pub fn ethernet() -> Self {
        Self {
            network: NetworkType::Ethernet,
            name: "Ethernet",
        }
    }
}

#[async_trait]
impl NetworkInterface for TcpInterface {
    async fn connect(
        &self,
        server: &ServerInfo,
        credentials: &Credentials,
    ) -> Result<Box<dyn TransportStream>> {
        debug!(
            "[{}] Connecting to {} (alpn={:?})",
            self.name,
            server.address(),
            credentials.alpn_protocols
        );
        let stream = TcpStream::connect(server.address()).await?;
        Ok(Box::new(TcpTransportStream::new(stream)))
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn network_type(&self) -> NetworkType {
        self.network
    }
}
